use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::analysis::AnalysisResult;
use crate::models::course::{Course, CourseUpdate, NewCourse};
use crate::store::{AnalysisStore, CourseRepository};

#[derive(Default)]
pub struct InMemoryAnalysisStore {
    records: RwLock<HashMap<String, Vec<AnalysisResult>>>,
}

#[async_trait]
impl AnalysisStore for InMemoryAnalysisStore {
    async fn save(&self, user_id: &str, result: &AnalysisResult) -> anyhow::Result<()> {
        self.records
            .write()
            .await
            .entry(user_id.to_string())
            .or_default()
            .push(result.clone());
        Ok(())
    }

    async fn list(&self, user_id: &str) -> anyhow::Result<Vec<AnalysisResult>> {
        let mut records = self
            .records
            .read()
            .await
            .get(user_id)
            .cloned()
            .unwrap_or_default();
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(records)
    }
}

/// Last writer wins under concurrent updates.
#[derive(Default)]
pub struct InMemoryCourseRepository {
    courses: RwLock<HashMap<Uuid, Course>>,
}

#[async_trait]
impl CourseRepository for InMemoryCourseRepository {
    async fn create(&self, course: NewCourse) -> anyhow::Result<Course> {
        let course = course.into_course();
        self.courses.write().await.insert(course.id, course.clone());
        Ok(course)
    }

    async fn list(&self) -> anyhow::Result<Vec<Course>> {
        let mut courses: Vec<Course> = self.courses.read().await.values().cloned().collect();
        courses.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(courses)
    }

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Course>> {
        Ok(self.courses.read().await.get(&id).cloned())
    }

    async fn update(&self, id: Uuid, update: CourseUpdate) -> anyhow::Result<Option<Course>> {
        let mut courses = self.courses.write().await;
        Ok(courses.get_mut(&id).map(|course| {
            update.apply(course);
            course.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        Ok(self.courses.write().await.remove(&id).is_some())
    }
}
