pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::report::handlers;
use crate::state::AppState;

/// Room for multipart boundaries and the tier field on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    // The upload handler enforces the per-file limit itself; this only caps the whole body.
    let body_limit = state
        .config
        .max_upload_bytes
        .saturating_mul(2)
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/tiers", get(handlers::handle_list_tiers))
        .route(
            "/api/v1/reports",
            get(handlers::handle_list_reports).delete(handlers::handle_clear_reports),
        )
        .route("/api/v1/reports/upload", post(handlers::handle_upload))
        .route("/api/v1/reports/:id", get(handlers::handle_get_report))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::llm_client::CompletionService;
    use crate::report::generator::tests::FakeCompletion;
    use crate::report::generator::ReportGenerator;
    use crate::report::prompt_builder::PromptMode;
    use crate::report::store::ReportStore;

    const BOUNDARY: &str = "XHELIXBOUNDARY";
    const SAMPLE: &str = "# comment\nrs1815739\t17\t12345\tCC\nrs9939609,16,54321,AT\n";

    fn test_config(max_upload_bytes: usize) -> Config {
        Config {
            anthropic_api_key: None,
            llm_model: "test-model".to_string(),
            llm_max_tokens: 256,
            llm_timeout_secs: 5,
            redis_url: None,
            report_store_key: "test".to_string(),
            prompt_mode: PromptMode::Markers,
            max_prompt_chars: 1_000,
            max_upload_bytes,
            strict_tiers: false,
            port: 0,
            rust_log: "info".to_string(),
        }
    }

    fn test_state(completion: Option<Arc<dyn CompletionService>>) -> AppState {
        AppState {
            generator: ReportGenerator::new(completion, PromptMode::Markers, 1_000),
            store: ReportStore::in_memory(),
            config: test_config(4 * 1024 * 1024),
        }
    }

    fn multipart_request(file: Option<(&str, &str)>, tier: Option<&str>) -> Request<Body> {
        let mut body = String::new();
        if let Some(tier) = tier {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"package\"\r\n\r\n{tier}\r\n"
            ));
        }
        if let Some((name, content)) = file {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{name}\"\r\nContent-Type: text/plain\r\n\r\n{content}\r\n"
            ));
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));

        Request::builder()
            .method("POST")
            .uri("/api/v1/reports/upload")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = build_router(test_state(None));
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_upload_then_list() {
        let state = test_state(None);
        let app = build_router(state.clone());

        let response = app
            .clone()
            .oneshot(multipart_request(Some(("genome.txt", SAMPLE)), Some("snapshot")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let outcome = json_body(response).await;
        assert_eq!(outcome["ok"], true);
        assert_eq!(outcome["demoMode"], true);
        assert_eq!(outcome["sourceFileName"], "genome.txt");
        assert_eq!(outcome["matchedMarkerCount"], 2);

        let response = app
            .clone()
            .oneshot(Request::get("/api/v1/reports").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let listed = json_body(response).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);
        assert_eq!(listed[0]["id"], outcome["reportId"]);

        let id = outcome["reportId"].as_str().unwrap();
        let response = app
            .oneshot(
                Request::get(format!("/api/v1/reports/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["tierId"], "snapshot");
    }

    #[tokio::test]
    async fn test_upload_without_file_is_rejected() {
        let app = build_router(test_state(None));
        let response = app
            .oneshot(multipart_request(None, Some("core")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_oversized_upload_is_rejected() {
        let mut state = test_state(None);
        state.config = test_config(16);
        let app = build_router(state);
        let response = app
            .oneshot(multipart_request(Some(("big.txt", SAMPLE)), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_file_far_beyond_limit_gets_size_message() {
        let mut state = test_state(None);
        state.config = test_config(16);
        let app = build_router(state);
        let big = SAMPLE.repeat(5_000);
        let response = app
            .oneshot(multipart_request(Some(("big.txt", big.as_str())), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body = json_body(response).await;
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"]["code"], "PAYLOAD_TOO_LARGE");
        assert!(body["error"]["message"].as_str().unwrap().contains("MB"));
    }

    #[tokio::test]
    async fn test_body_over_router_limit_gets_size_message() {
        let mut state = test_state(None);
        state.config = test_config(16);
        let app = build_router(state);
        // The tier field comes first, so the body limit trips before the file is reached.
        let padding = "x".repeat(200 * 1024);
        let response = app
            .oneshot(multipart_request(Some(("genome.txt", SAMPLE)), Some(padding.as_str())))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "PAYLOAD_TOO_LARGE");
        assert!(body["error"]["message"].as_str().unwrap().contains("MB"));
    }

    #[tokio::test]
    async fn test_insufficient_markers_status() {
        let app = build_router(test_state(None));
        let response = app
            .oneshot(multipart_request(
                Some(("other.txt", "rs1\t1\t1\tAA\n")),
                Some("elite"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let outcome = json_body(response).await;
        assert_eq!(outcome["ok"], false);
        assert_eq!(outcome["error"]["code"], "INSUFFICIENT_MARKERS");
        assert!(outcome["bodyText"].is_null());
    }

    #[tokio::test]
    async fn test_empty_completion_maps_to_bad_gateway() {
        let fake: Arc<dyn CompletionService> = FakeCompletion::replying("");
        let app = build_router(test_state(Some(fake)));
        let response = app
            .oneshot(multipart_request(Some(("genome.txt", SAMPLE)), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let outcome = json_body(response).await;
        assert_eq!(outcome["failure"], "empty_response");
    }

    #[tokio::test]
    async fn test_clear_and_missing_report() {
        let state = test_state(None);
        let app = build_router(state.clone());
        app.clone()
            .oneshot(multipart_request(Some(("genome.txt", SAMPLE)), None))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(
                Request::delete("/api/v1/reports")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(state.store.list().await.unwrap().is_empty());

        let response = app
            .oneshot(
                Request::get(format!("/api/v1/reports/{}", uuid::Uuid::new_v4()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_tier_catalog_listing() {
        let app = build_router(test_state(None));
        let response = app
            .oneshot(Request::get("/api/v1/tiers").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = json_body(response).await;
        let tiers = body["tiers"].as_array().unwrap();
        assert_eq!(tiers.len(), 4);
        assert_eq!(tiers[0]["id"], "snapshot");
        assert_eq!(tiers[0]["markerCount"], 3);
        assert_eq!(tiers[2]["label"], "Methylation+ Performance");
    }
}
