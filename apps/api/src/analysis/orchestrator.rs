//! Resume analysis orchestration.
//!
//! Flow: validate input → one provider call → stamp id/timestamp/goal →
//! best-effort persist → return. No retries here; see `client` for those.

use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::llm_client::AiProvider;
use crate::models::analysis::{AnalysisResult, AnalyzeRequest};
use crate::store::AnalysisStore;

/// Where a request ended up. `Validated` means the result exists but was not stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisPhase {
    Idle,
    AwaitingProvider,
    Validated,
    Persisted,
    Failed,
}

#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub result: AnalysisResult,
    pub phase: AnalysisPhase,
}

fn enter(phase: &mut AnalysisPhase, next: AnalysisPhase) {
    debug!("Analysis phase {:?} -> {:?}", phase, next);
    *phase = next;
}

/// Validates the request, runs the provider once and persists the result when a
/// user is known. Storage failures are logged and swallowed.
pub async fn run_analysis(
    ai: &dyn AiProvider,
    store: &dyn AnalysisStore,
    request: &AnalyzeRequest,
) -> Result<AnalysisOutcome, AppError> {
    let mut phase = AnalysisPhase::Idle;

    let career_goal = request.career_goal.trim();
    if request.resume_text.trim().is_empty() {
        return Err(AppError::Validation("resumeText is required".to_string()));
    }
    if career_goal.is_empty() {
        return Err(AppError::Validation("careerGoal is required".to_string()));
    }

    enter(&mut phase, AnalysisPhase::AwaitingProvider);
    let analysis = match ai.analyze_resume(&request.resume_text, career_goal).await {
        Ok(analysis) => analysis,
        Err(e) => {
            enter(&mut phase, AnalysisPhase::Failed);
            return Err(AppError::AnalysisFailed {
                details: e.to_string(),
            });
        }
    };

    let result = AnalysisResult::new(analysis.report, career_goal, analysis.sources);
    enter(&mut phase, AnalysisPhase::Validated);
    info!(
        "Analysis {} complete: score={} goal='{}'",
        result.id, result.report.resume_score, result.career_goal
    );

    let user_id = request
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty());
    if let Some(user_id) = user_id {
        match store.save(user_id, &result).await {
            Ok(()) => enter(&mut phase, AnalysisPhase::Persisted),
            Err(e) => warn!("Failed to persist analysis {} for {user_id}: {e:#}", result.id),
        }
    }

    Ok(AnalysisOutcome { result, phase })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryAnalysisStore;
    use crate::test_support::{sample_report, FailingStore, FakeAi};
    use chrono::{TimeZone, Utc};

    fn request(resume: &str, goal: &str, user: Option<&str>) -> AnalyzeRequest {
        AnalyzeRequest {
            resume_text: resume.to_string(),
            career_goal: goal.to_string(),
            user_id: user.map(String::from),
        }
    }

    #[tokio::test]
    async fn test_missing_fields_never_call_provider() {
        let ai = FakeAi::analyzing(sample_report());
        let store = InMemoryAnalysisStore::default();

        let err = run_analysis(&ai, &store, &request("", "Data Scientist", None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = run_analysis(&ai, &store, &request("resume text", "  ", None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        assert!(ai.calls().is_empty());
    }

    #[tokio::test]
    async fn test_successful_analysis_is_stamped_and_persisted() {
        let ai = FakeAi::analyzing(sample_report());
        let store = InMemoryAnalysisStore::default();
        let resume = "x".repeat(500);
        let before = Utc::now();

        let outcome = run_analysis(&ai, &store, &request(&resume, "Data Scientist", Some("u1")))
            .await
            .unwrap();

        assert_eq!(outcome.phase, AnalysisPhase::Persisted);
        assert_eq!(outcome.result.career_goal, "Data Scientist");
        assert!(outcome.result.timestamp >= before);
        assert!(outcome.result.report.resume_score <= 100);

        let stored = store.list("u1").await.unwrap();
        assert_eq!(stored, vec![outcome.result.clone()]);
        assert_eq!(ai.calls(), vec!["analyze:Data Scientist:500"]);
    }

    #[tokio::test]
    async fn test_client_supplied_timestamp_is_ignored() {
        let body = serde_json::json!({
            "resumeText": "x".repeat(500),
            "careerGoal": "Data Scientist",
            "timestamp": "2001-01-01T00:00:00Z"
        });
        let req: AnalyzeRequest = serde_json::from_value(body).unwrap();
        let ai = FakeAi::analyzing(sample_report());

        let outcome = run_analysis(&ai, &InMemoryAnalysisStore::default(), &req)
            .await
            .unwrap();
        let client_ts = Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0).unwrap();
        assert_ne!(outcome.result.timestamp, client_ts);
    }

    #[tokio::test]
    async fn test_anonymous_analysis_is_not_persisted() {
        let ai = FakeAi::analyzing(sample_report());
        let store = InMemoryAnalysisStore::default();

        let outcome = run_analysis(&ai, &store, &request("resume", "SRE", None))
            .await
            .unwrap();
        assert_eq!(outcome.phase, AnalysisPhase::Validated);
    }

    #[tokio::test]
    async fn test_storage_failure_does_not_fail_request() {
        let ai = FakeAi::analyzing(sample_report());

        let outcome = run_analysis(&ai, &FailingStore, &request("resume", "SRE", Some("u1")))
            .await
            .unwrap();
        assert_eq!(outcome.phase, AnalysisPhase::Validated);
        assert_eq!(outcome.result.report, sample_report());
    }

    #[tokio::test]
    async fn test_provider_failure_surfaces_cause() {
        let ai = FakeAi::default();
        let store = InMemoryAnalysisStore::default();

        let err = run_analysis(&ai, &store, &request("resume", "SRE", Some("u1")))
            .await
            .unwrap_err();
        match err {
            AppError::AnalysisFailed { details } => {
                assert!(details.contains("no text content"), "{details}")
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(store.list("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_provider_called_exactly_once() {
        let ai = FakeAi::default();
        let _ = run_analysis(
            &ai,
            &InMemoryAnalysisStore::default(),
            &request("resume", "SRE", None),
        )
        .await;
        assert_eq!(ai.calls().len(), 1);
    }
}
