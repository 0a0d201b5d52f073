use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An entry in the user-curated course catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub category: String,
    pub level: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCourse {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub level: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub created_by: Option<String>,
}

/// Partial update. Absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseUpdate {
    pub title: Option<String>,
    pub category: Option<String>,
    pub level: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
}

impl NewCourse {
    /// Returns the first blank required field, if any.
    pub fn missing_field(&self) -> Option<&'static str> {
        [
            ("title", &self.title),
            ("category", &self.category),
            ("level", &self.level),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
    }

    pub fn into_course(self) -> Course {
        Course {
            id: Uuid::new_v4(),
            title: self.title.trim().to_string(),
            category: self.category.trim().to_string(),
            level: self.level.trim().to_string(),
            description: self.description,
            url: self.url,
            created_by: self.created_by,
            created_at: Utc::now(),
        }
    }
}

impl CourseUpdate {
    /// Returns the first required field the update would blank out, if any.
    pub fn blanked_field(&self) -> Option<&'static str> {
        [
            ("title", &self.title),
            ("category", &self.category),
            ("level", &self.level),
        ]
        .into_iter()
        .find(|(_, value)| value.as_deref().is_some_and(|v| v.trim().is_empty()))
        .map(|(name, _)| name)
    }

    pub fn apply(self, course: &mut Course) {
        if let Some(title) = self.title {
            course.title = title.trim().to_string();
        }
        if let Some(category) = self.category {
            course.category = category.trim().to_string();
        }
        if let Some(level) = self.level {
            course.level = level.trim().to_string();
        }
        if self.description.is_some() {
            course.description = self.description;
        }
        if self.url.is_some() {
            course.url = self.url;
        }
    }
}
