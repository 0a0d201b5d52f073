use std::panic::AssertUnwindSafe;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use futures::FutureExt;
use serde_json::Value;
use tracing::{error, warn};

use crate::errors::AppError;
use crate::models::resources::{LearningResourceSet, ResourceQuery};
use crate::resources::resolver::{fallback_resource_set, resolve_learning_resources};
use crate::state::AppState;

/// POST /api/courses/external
///
/// Only a missing role is an error. A body that is not JSON has no role. Loosely
/// typed skills are filtered rather than rejected. Anything going wrong inside
/// resolution, a panic included, is answered with the static catalog.
pub async fn handle_external_courses(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<LearningResourceSet>, AppError> {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            warn!("Unreadable learning-resources request: {rejection}");
            Value::Null
        }
    };
    let ResourceQuery { role, skills } = ResourceQuery::from_json(&body);
    if role.is_empty() {
        return Err(AppError::Validation("role is required".to_string()));
    }
    let role = role.as_str();

    let resolution = resolve_learning_resources(
        state.search.as_ref(),
        state.ai.as_ref(),
        role,
        &skills,
    );
    let set = match AssertUnwindSafe(resolution).catch_unwind().await {
        Ok(set) => set,
        Err(_) => {
            error!("Learning-resources resolution panicked for '{role}', serving static catalog");
            fallback_resource_set(role, &skills)
        }
    };

    Ok(Json(set))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::llm_client::Discovery;
    use crate::models::resources::{CourseCandidate, StructuredResources};
    use crate::resources::catalog::{static_courses, static_opportunities};
    use crate::test_support::{body_json, test_router, test_state, FakeAi, FakeSearch};

    fn request(body: Value) -> Request<Body> {
        Request::post("/api/courses/external")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_missing_role_is_400() {
        let app = test_router(test_state(FakeAi::default(), FakeSearch::not_configured()));
        let response = app
            .oneshot(request(json!({ "skills": ["SQL"] })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_body_without_json_content_type_is_400() {
        let app = test_router(test_state(FakeAi::default(), FakeSearch::not_configured()));
        let response = app
            .oneshot(
                Request::post("/api/courses/external")
                    .body(Body::from(r#"{"role":"Analyst"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_loosely_typed_skills_still_return_200() {
        for skills in [json!("SQL"), json!(["SQL", null, 7]), json!({ "a": 1 })] {
            let app = test_router(test_state(FakeAi::default(), FakeSearch::not_configured()));
            let response = app
                .oneshot(request(json!({ "role": "Data Scientist", "skills": skills.clone() })))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::OK, "skills: {skills}");
            let body = body_json(response).await;
            assert_eq!(body["courses"], json!(static_courses()));
            assert!(body["skills"].as_array().unwrap().iter().all(|s| s == "SQL"));
        }
    }

    #[tokio::test]
    async fn test_all_providers_failing_returns_static_catalog() {
        let app = test_router(test_state(FakeAi::default(), FakeSearch::failing(502)));
        let response = app
            .oneshot(request(json!({ "role": "Data Scientist", "skills": ["SQL"] })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["role"], "Data Scientist");
        assert_eq!(body["skills"], json!(["SQL"]));
        assert_eq!(body["courses"], json!(static_courses()));
        assert_eq!(body["opportunities"], json!(static_opportunities()));
        assert_eq!(body["fallback"], true);
        assert_eq!(body["usedVertex"], false);
    }

    #[tokio::test]
    async fn test_panic_in_pipeline_still_returns_200_catalog() {
        let ai = FakeAi {
            panic_on_discovery: true,
            ..Default::default()
        };
        let app = test_router(test_state(ai, FakeSearch::not_configured()));
        let response = app
            .oneshot(request(json!({ "role": "Analyst" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["courses"], json!(static_courses()));
        assert_eq!(body["fallback"], true);
    }

    #[tokio::test]
    async fn test_sanitized_ai_courses_are_returned() {
        let ai = FakeAi {
            discovery: Some(Discovery {
                text: "notes".into(),
                sources: vec![crate::models::analysis::Source {
                    uri: "https://www.udacity.com/course/sql".into(),
                    title: "udacity.com".into(),
                }],
            }),
            structured: Some(StructuredResources {
                courses: vec![
                    CourseCandidate {
                        title: "SQL Nanodegree".into(),
                        provider: Some("Udacity".into()),
                        link: Some("https://www.udacity.com/course/sql".into()),
                        ..Default::default()
                    },
                    CourseCandidate {
                        title: "Random Course".into(),
                        link: Some("https://untrusted.example/course".into()),
                        ..Default::default()
                    },
                ],
                opportunities: vec![],
            }),
            ..Default::default()
        };
        let app = test_router(test_state(ai, FakeSearch::not_configured()));
        let body = body_json(
            app.oneshot(request(json!({ "role": "Data Engineer", "skills": ["SQL", " "] })))
                .await
                .unwrap(),
        )
        .await;

        let courses = body["courses"].as_array().unwrap();
        assert_eq!(courses.len(), 2, "untrusted link replaced by the trusted citation");
        assert_eq!(courses[0]["title"], "SQL Nanodegree");
        assert_eq!(courses[1]["link"], "https://www.udacity.com/course/sql");
        assert_eq!(body["skills"], json!(["SQL"]));
        assert_eq!(body["fallback"], false);
    }
}
