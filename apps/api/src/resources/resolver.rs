//! Learning-resources resolution.
//!
//! Order: secondary search → AI discover + structure (sanitized) → static catalog.
//! Opportunities come from the search provider when it was used, otherwise from
//! the static catalog. The AI path never supplies opportunities.

use tracing::{info, warn};

use crate::llm_client::AiProvider;
use crate::models::analysis::Source;
use crate::models::resources::{LearningCourse, LearningResourceSet};
use crate::resources::catalog::{static_courses, static_opportunities};
use crate::resources::sanitize::sanitize_courses;
use crate::search_client::{ResourceSearch, SearchError};

/// Static catalog response, used when everything else is unusable.
pub fn fallback_resource_set(role: &str, skills: &[String]) -> LearningResourceSet {
    LearningResourceSet {
        role: role.to_string(),
        skills: skills.to_vec(),
        courses: static_courses(),
        opportunities: static_opportunities(),
        sources: vec![],
        used_vertex: false,
        fallback: true,
    }
}

/// Runs the AI discovery → structuring pipeline and sanitizes the result.
/// Citations are returned even when structuring fails.
async fn discover_courses(
    ai: &dyn AiProvider,
    role: &str,
    skills: &[String],
) -> (Vec<LearningCourse>, Vec<Source>) {
    let discovery = match ai.discover_learning_resources(role, &skills.join(", ")).await {
        Ok(discovery) => discovery,
        Err(e) => {
            warn!("AI discovery failed for role '{role}': {e}");
            return (vec![], vec![]);
        }
    };

    let structured = match ai
        .structure_learning_resources(&discovery.text, &discovery.sources)
        .await
    {
        Ok(structured) => structured,
        Err(e) => {
            warn!("AI structuring failed for role '{role}': {e}");
            return (vec![], discovery.sources);
        }
    };

    let proposed = structured.courses.len();
    let courses = sanitize_courses(structured.courses, &discovery.sources);
    info!(
        "AI discovery for '{role}': {} of {proposed} courses kept after link sanitization",
        courses.len()
    );
    (courses, discovery.sources)
}

/// Resolves learning resources for a role. Infallible: provider failures degrade
/// to the next step and ultimately to the static catalog.
pub async fn resolve_learning_resources(
    search: &dyn ResourceSearch,
    ai: &dyn AiProvider,
    role: &str,
    skills: &[String],
) -> LearningResourceSet {
    // Step 1: secondary search provider
    let searched = match search.search_resources(role, skills).await {
        Ok(found) if !found.courses.is_empty() => Some(found),
        Ok(_) => {
            info!("Search provider returned no courses for '{role}'");
            None
        }
        Err(SearchError::NotConfigured) => None,
        Err(e) => {
            warn!("Search provider failed for '{role}', falling back: {e}");
            None
        }
    };

    if let Some(found) = searched {
        return LearningResourceSet {
            role: role.to_string(),
            skills: skills.to_vec(),
            courses: found.courses,
            opportunities: found.opportunities,
            sources: vec![],
            used_vertex: true,
            fallback: false,
        };
    }

    // Step 2: AI discovery + structuring
    let (mut courses, sources) = discover_courses(ai, role, skills).await;

    // Step 3: static catalog
    if courses.is_empty() {
        info!("No live courses for '{role}', serving static catalog");
        courses = static_courses();
    }

    let fallback = sources.is_empty();
    LearningResourceSet {
        role: role.to_string(),
        skills: skills.to_vec(),
        courses,
        opportunities: static_opportunities(),
        sources,
        used_vertex: false,
        fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::Discovery;
    use crate::models::resources::{CourseCandidate, Opportunity, StructuredResources};
    use crate::search_client::SearchResources;
    use crate::test_support::{FakeAi, FakeSearch};

    fn skills() -> Vec<String> {
        vec!["SQL".to_string(), "Statistics".to_string()]
    }

    fn search_course() -> LearningCourse {
        LearningCourse {
            title: "Data Science on Google Cloud".into(),
            provider: "Google Cloud Skills Boost".into(),
            link: "https://www.cloudskillsboost.google/paths/17".into(),
            cost: None,
            duration: None,
            level: None,
        }
    }

    fn trusted_discovery() -> Discovery {
        Discovery {
            text: "Coursera offers SQL for Data Science".into(),
            sources: vec![Source {
                uri: "https://www.coursera.org/learn/sql-for-data-science".into(),
                title: "coursera.org".into(),
            }],
        }
    }

    #[tokio::test]
    async fn test_search_results_win_and_keep_own_opportunities() {
        let search = FakeSearch::returning(SearchResources {
            courses: vec![search_course()],
            opportunities: vec![],
        });
        let ai = FakeAi::default();

        let set = resolve_learning_resources(&search, &ai, "Data Scientist", &skills()).await;

        assert!(set.used_vertex);
        assert!(!set.fallback);
        assert_eq!(set.courses, vec![search_course()]);
        assert!(set.opportunities.is_empty(), "must not mix in catalog opportunities");
        assert!(ai.calls().is_empty());
    }

    #[tokio::test]
    async fn test_search_opportunities_are_passed_through() {
        let opportunity = Opportunity {
            name: "Kaggle Days".into(),
            description: None,
            link: "https://www.kaggle.com/events".into(),
            difficulty: None,
        };
        let search = FakeSearch::returning(SearchResources {
            courses: vec![search_course()],
            opportunities: vec![opportunity.clone()],
        });

        let set =
            resolve_learning_resources(&search, &FakeAi::default(), "Data Scientist", &skills())
                .await;
        assert_eq!(set.opportunities, vec![opportunity]);
    }

    #[tokio::test]
    async fn test_empty_search_falls_through_to_ai_pipeline() {
        let search = FakeSearch::returning(SearchResources::default());
        let ai = FakeAi {
            discovery: Some(trusted_discovery()),
            structured: Some(StructuredResources {
                courses: vec![CourseCandidate {
                    title: "SQL for Data Science".into(),
                    provider: Some("Coursera".into()),
                    link: None,
                    ..Default::default()
                }],
                opportunities: vec![],
            }),
            ..Default::default()
        };

        let set = resolve_learning_resources(&search, &ai, "Data Scientist", &skills()).await;

        assert!(!set.used_vertex);
        assert!(!set.fallback);
        assert_eq!(set.courses.len(), 1);
        assert_eq!(
            set.courses[0].link,
            "https://www.coursera.org/learn/sql-for-data-science"
        );
        assert_eq!(set.opportunities, static_opportunities());
        assert_eq!(set.sources.len(), 1);
        assert_eq!(ai.calls(), vec!["discover:SQL, Statistics", "structure"]);
    }

    #[tokio::test]
    async fn test_unconfigured_search_and_empty_ai_yield_static_catalog() {
        let search = FakeSearch::not_configured();
        let ai = FakeAi {
            discovery: Some(Discovery {
                text: "nothing useful".into(),
                sources: vec![],
            }),
            structured: Some(StructuredResources::default()),
            ..Default::default()
        };

        let set = resolve_learning_resources(&search, &ai, "Data Scientist", &skills()).await;

        assert_eq!(set.courses, static_courses());
        assert_eq!(set.opportunities, static_opportunities());
        assert!(set.fallback);
        assert!(!set.used_vertex);
    }

    #[tokio::test]
    async fn test_untrusted_ai_courses_are_dropped_before_fallback() {
        let ai = FakeAi {
            discovery: Some(Discovery {
                text: "a blog post".into(),
                sources: vec![],
            }),
            structured: Some(StructuredResources {
                courses: vec![CourseCandidate {
                    title: "Shady Bootcamp".into(),
                    link: Some("https://shady.example/bootcamp".into()),
                    ..Default::default()
                }],
                opportunities: vec![],
            }),
            ..Default::default()
        };

        let set =
            resolve_learning_resources(&FakeSearch::failing(503), &ai, "Analyst", &[]).await;

        assert!(set.courses.iter().all(|c| c.title != "Shady Bootcamp"));
        assert_eq!(set.courses, static_courses());
        assert!(set.fallback);
    }

    #[tokio::test]
    async fn test_citations_clear_fallback_even_when_catalog_supplies_courses() {
        let ai = FakeAi {
            discovery: Some(trusted_discovery()),
            structured: None,
            ..Default::default()
        };

        let set = resolve_learning_resources(&FakeSearch::not_configured(), &ai, "Analyst", &[])
            .await;

        assert_eq!(set.courses, static_courses());
        assert_eq!(set.sources.len(), 1);
        assert!(!set.fallback);
    }

    #[tokio::test]
    async fn test_all_providers_down_yields_catalog() {
        let set = resolve_learning_resources(
            &FakeSearch::failing(500),
            &FakeAi::default(),
            "Analyst",
            &skills(),
        )
        .await;
        assert_eq!(set, fallback_resource_set("Analyst", &skills()));
    }
}
