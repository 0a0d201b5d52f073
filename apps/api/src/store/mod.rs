//! Record stores behind injected traits.
//!
//! `AppState` carries `Arc<dyn AnalysisStore>` and `Arc<dyn CourseRepository>`;
//! PostgreSQL backs them in production, in-memory maps when no database is configured.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::analysis::AnalysisResult;
use crate::models::course::{Course, CourseUpdate, NewCourse};

pub mod memory;
pub mod postgres;

/// Per-user analysis records. Append-only: results are inserted, never updated.
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    async fn save(&self, user_id: &str, result: &AnalysisResult) -> anyhow::Result<()>;

    /// Newest first.
    async fn list(&self, user_id: &str) -> anyhow::Result<Vec<AnalysisResult>>;
}

/// User-curated course catalog.
#[async_trait]
pub trait CourseRepository: Send + Sync {
    async fn create(&self, course: NewCourse) -> anyhow::Result<Course>;

    /// Ordered by `created_at`, then `id`.
    async fn list(&self) -> anyhow::Result<Vec<Course>>;

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Course>>;

    async fn update(&self, id: Uuid, update: CourseUpdate) -> anyhow::Result<Option<Course>>;

    /// Returns whether a course was removed.
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
}
