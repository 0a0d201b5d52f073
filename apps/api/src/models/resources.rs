use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::analysis::Source;

/// A learning resource with a resolved, trusted link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningCourse {
    pub title: String,
    pub provider: String,
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opportunity {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
}

/// A course as the provider structured it. The link may be missing or untrusted
/// until the sanitizer has looked at it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseCandidate {
    pub title: String,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub cost: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpportunityCandidate {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
}

/// Output of the structuring step, before link sanitization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredResources {
    #[serde(default)]
    pub courses: Vec<CourseCandidate>,
    #[serde(default)]
    pub opportunities: Vec<OpportunityCandidate>,
}

/// Body of `POST /api/courses/external`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceQuery {
    pub role: String,
    pub skills: Vec<String>,
}

impl ResourceQuery {
    /// Reads the query leniently: a non-string `role` counts as missing, a
    /// non-array `skills` as empty, and non-string or blank skills are dropped.
    pub fn from_json(body: &Value) -> Self {
        let role = body
            .get("role")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim()
            .to_string();
        let skills = body
            .get("skills")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        Self { role, skills }
    }
}

/// Learning resources for a role. Not persisted.
///
/// `used_vertex` and `fallback` are provenance hints, not guarantees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningResourceSet {
    pub role: String,
    pub skills: Vec<String>,
    pub courses: Vec<LearningCourse>,
    pub opportunities: Vec<Opportunity>,
    pub sources: Vec<Source>,
    pub used_vertex: bool,
    pub fallback: bool,
}
