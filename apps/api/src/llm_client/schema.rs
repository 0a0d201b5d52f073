//! Response schemas handed to the provider, and shaping of what comes back.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::models::analysis::{AnalysisRecommendations, AnalysisReport};

/// Schema for resume analysis output. All four top-level fields are required.
pub fn analysis_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "resumeScore": { "type": "INTEGER" },
            "missingSkills": {
                "type": "ARRAY",
                "items": { "type": "STRING" }
            },
            "recommendations": {
                "type": "OBJECT",
                "properties": {
                    "certifications": { "type": "ARRAY", "items": { "type": "STRING" } },
                    "opportunities": { "type": "ARRAY", "items": { "type": "STRING" } }
                },
                "required": ["certifications", "opportunities"]
            },
            "summary": { "type": "STRING" }
        },
        "required": ["resumeScore", "missingSkills", "recommendations", "summary"]
    })
}

/// Schema for the structuring pass over discovery notes.
pub fn learning_resources_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "courses": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "title": { "type": "STRING" },
                        "provider": { "type": "STRING" },
                        "link": { "type": "STRING" },
                        "cost": { "type": "STRING" },
                        "duration": { "type": "STRING" },
                        "level": { "type": "STRING" }
                    },
                    "required": ["title"]
                }
            },
            "opportunities": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING" },
                        "description": { "type": "STRING" },
                        "link": { "type": "STRING" },
                        "difficulty": { "type": "STRING" }
                    },
                    "required": ["name"]
                }
            }
        },
        "required": ["courses"]
    })
}

/// Analysis exactly as the provider returned it, before clamping.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawAnalysis {
    resume_score: f64,
    missing_skills: Vec<String>,
    recommendations: AnalysisRecommendations,
    summary: String,
}

impl From<RawAnalysis> for AnalysisReport {
    fn from(raw: RawAnalysis) -> Self {
        Self {
            resume_score: raw.resume_score.round().clamp(0.0, 100.0) as u8,
            missing_skills: raw
                .missing_skills
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            recommendations: raw.recommendations,
            summary: raw.summary.trim().to_string(),
        }
    }
}
