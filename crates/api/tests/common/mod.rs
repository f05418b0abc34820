//! Shared helpers for API integration tests.
//!
//! Builds the full application router with the production middleware stack,
//! a temp-file-backed store, and in-process mock providers, so tests exercise
//! the same request path the binary serves.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use tempfile::TempDir;
use tower::ServiceExt;

use formrelay_api::config::ServerConfig;
use formrelay_api::router::build_app_router;
use formrelay_api::state::AppState;
use formrelay_core::content::{ContentError, ContentGenerator};
use formrelay_core::Survey;
use formrelay_engine::SurveyService;
use formrelay_providers::form::{
    CreateFormOutcome, CreateFormRequest, CreatedForm, FormProvider, FormProviderError,
};
use formrelay_providers::mail::{MailProvider, MailProviderError, SendOutcome};
use formrelay_store::SurveyStore;

/// Mock form provider: returns a fixed form, or rejects as unconfigured.
struct MockForms {
    configured: bool,
}

#[async_trait]
impl FormProvider for MockForms {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn create_form(
        &self,
        _request: &CreateFormRequest,
    ) -> Result<CreateFormOutcome, FormProviderError> {
        if !self.configured {
            return Err(FormProviderError::NotConfigured(
                "FORMS_API_URL is not set; cannot create forms".to_string(),
            ));
        }
        Ok(CreateFormOutcome::Created(CreatedForm {
            form_id: "F1".to_string(),
            form_url: "https://forms.example/F1".to_string(),
            response_url: Some("https://forms.example/F1/responses".to_string()),
        }))
    }
}

/// Mock mailer: delivery fails for any recipient whose address contains
/// `fail`, succeeds otherwise.
struct MockMailer;

#[async_trait]
impl MailProvider for MockMailer {
    fn is_configured(&self) -> bool {
        true
    }

    async fn send(
        &self,
        recipient: &str,
        _subject: &str,
        _body: &str,
    ) -> Result<SendOutcome, MailProviderError> {
        if recipient.contains("fail") {
            Ok(SendOutcome::failed(format!("mailbox unavailable: {recipient}")))
        } else {
            Ok(SendOutcome::ok(format!("delivered to {recipient}")))
        }
    }
}

/// Mock content generator embedding the seed, so previews differ per call.
struct MockContent;

#[async_trait]
impl ContentGenerator for MockContent {
    fn is_configured(&self) -> bool {
        true
    }

    async fn generate(&self, survey: &Survey, seed: &str) -> Result<String, ContentError> {
        Ok(format!("Draft for {} [{}]", survey.title, seed))
    }
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config(store_path: &std::path::Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        store_path: store_path.display().to_string(),
    }
}

/// A fully wired test application. Keeps the temp dir alive for the store.
pub struct TestApp {
    pub router: Router,
    _dir: TempDir,
}

/// Build the application with working mock providers.
pub fn build_test_app() -> TestApp {
    build_test_app_with_forms(true)
}

/// Build the application, optionally with an unconfigured form provider.
pub fn build_test_app_with_forms(forms_configured: bool) -> TestApp {
    let dir = tempfile::tempdir().expect("tempdir");
    let store_path = dir.path().join("surveys.json");
    let store = Arc::new(SurveyStore::open(&store_path).expect("open store"));

    let service = Arc::new(SurveyService::new(
        store,
        Arc::new(MockForms {
            configured: forms_configured,
        }),
        Arc::new(MockMailer),
        Arc::new(MockContent),
    ));

    let config = test_config(&store_path);
    let state = AppState {
        service,
        config: Arc::new(config.clone()),
    };

    TestApp {
        router: build_app_router(state, &config),
        _dir: dir,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Send a GET request to the app.
pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .expect("request");
    app.clone().oneshot(request).await.expect("response")
}

/// Send a POST request with a JSON body.
pub async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request");
    app.clone().oneshot(request).await.expect("response")
}

/// Send a DELETE request.
pub async fn delete(app: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .expect("request");
    app.clone().oneshot(request).await.expect("response")
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    use http_body_util::BodyExt;
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("valid JSON body")
}

/// Create a survey through the API and return its id.
pub async fn create_survey(app: &Router, title: &str) -> String {
    let response = post_json(
        app,
        "/api/v1/surveys",
        serde_json::json!({
            "title": title,
            "description": "integration test survey",
            "questions": ["Q1", "Q2", "Q3"],
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    json["id"].as_str().expect("survey id").to_string()
}
