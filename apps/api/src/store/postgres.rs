use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::analysis::AnalysisResult;
use crate::models::course::{Course, CourseUpdate, NewCourse};
use crate::store::{AnalysisStore, CourseRepository};

/// Analysis records as JSONB documents keyed by user.
#[derive(Clone)]
pub struct PgAnalysisStore {
    pool: PgPool,
}

impl PgAnalysisStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnalysisStore for PgAnalysisStore {
    async fn save(&self, user_id: &str, result: &AnalysisResult) -> anyhow::Result<()> {
        let payload = serde_json::to_value(result)?;
        // Append-only: a new analysis is always a new row
        sqlx::query(
            r#"
            INSERT INTO analyses (id, user_id, career_goal, payload, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(result.id)
        .bind(user_id)
        .bind(&result.career_goal)
        .bind(payload)
        .bind(result.timestamp)
        .execute(&self.pool)
        .await?;

        info!("Stored analysis {} for user {user_id}", result.id);
        Ok(())
    }

    async fn list(&self, user_id: &str) -> anyhow::Result<Vec<AnalysisResult>> {
        let rows: Vec<serde_json::Value> = sqlx::query_scalar(
            "SELECT payload FROM analyses WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|payload| {
                serde_json::from_value(payload).context("Stored analysis has an invalid shape")
            })
            .collect()
    }
}

#[derive(Clone)]
pub struct PgCourseRepository {
    pool: PgPool,
}

impl PgCourseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

#[async_trait]
impl CourseRepository for PgCourseRepository {
    async fn create(&self, course: NewCourse) -> anyhow::Result<Course> {
        let course = course.into_course();
        sqlx::query(
            r#"
            INSERT INTO courses
                (id, title, category, level, description, url, created_by, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(course.id)
        .bind(&course.title)
        .bind(&course.category)
        .bind(&course.level)
        .bind(&course.description)
        .bind(&course.url)
        .bind(&course.created_by)
        .bind(course.created_at)
        .execute(&self.pool)
        .await?;
        Ok(course)
    }

    async fn list(&self) -> anyhow::Result<Vec<Course>> {
        Ok(
            sqlx::query_as::<_, Course>("SELECT * FROM courses ORDER BY created_at, id")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Course>> {
        Ok(
            sqlx::query_as::<_, Course>("SELECT * FROM courses WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn update(&self, id: Uuid, update: CourseUpdate) -> anyhow::Result<Option<Course>> {
        Ok(sqlx::query_as::<_, Course>(
            r#"
            UPDATE courses SET
                title = COALESCE($2, title),
                category = COALESCE($3, category),
                level = COALESCE($4, level),
                description = COALESCE($5, description),
                url = COALESCE($6, url)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(trimmed(update.title))
        .bind(trimmed(update.category))
        .bind(trimmed(update.level))
        .bind(update.description)
        .bind(update.url)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
