//! Form provider adapter.
//!
//! [`FormProvider`] materializes a survey's questions into a fillable remote
//! form and returns its access URLs. Ordinary failures (network, upstream
//! errors) come back as [`CreateFormOutcome::Failed`] so the caller can still
//! persist a degraded draft record; only a missing configuration is a hard
//! error, surfaced to the client as actionable.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Parameters for creating a remote form.
#[derive(Debug, Clone, Serialize)]
pub struct CreateFormRequest {
    pub title: String,
    pub description: Option<String>,
    pub questions: Vec<String>,
}

/// Identifiers and URLs assigned by the form provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedForm {
    pub form_id: String,
    pub form_url: String,
    #[serde(default)]
    pub response_url: Option<String>,
}

/// Tagged result of a form-creation attempt.
#[derive(Debug, Clone)]
pub enum CreateFormOutcome {
    /// The form exists remotely.
    Created(CreatedForm),
    /// The provider could not create the form; `detail` is human-readable.
    Failed { detail: String },
}

/// Hard errors from a form provider. Ordinary failures are NOT errors; they
/// arrive as [`CreateFormOutcome::Failed`].
#[derive(Debug, thiserror::Error)]
pub enum FormProviderError {
    /// No credentials or endpoint on file. Surfaced to the caller as a
    /// client-facing configuration error rather than a degraded create.
    #[error("Form provider not configured: {0}")]
    NotConfigured(String),
}

/// External service that materializes surveys into fillable forms.
#[async_trait]
pub trait FormProvider: Send + Sync {
    /// Whether the provider has credentials and an endpoint to call.
    fn is_configured(&self) -> bool;

    /// Create a remote form. Must not fail for ordinary provider trouble;
    /// return [`CreateFormOutcome::Failed`] instead.
    async fn create_form(
        &self,
        request: &CreateFormRequest,
    ) -> Result<CreateFormOutcome, FormProviderError>;
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

/// Configuration for the HTTP form provider.
#[derive(Debug, Clone)]
pub struct FormProviderConfig {
    /// Base URL of the forms service, e.g. `https://forms.example/api`.
    pub api_url: String,
    /// Optional bearer token.
    pub api_token: Option<String>,
}

impl FormProviderConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `FORMS_API_URL` is not set, signalling that form
    /// creation is not configured.
    ///
    /// | Variable          | Required | Default |
    /// |-------------------|----------|---------|
    /// | `FORMS_API_URL`   | yes      | —       |
    /// | `FORMS_API_TOKEN` | no       | —       |
    pub fn from_env() -> Option<Self> {
        let api_url = std::env::var("FORMS_API_URL").ok()?;
        Some(Self {
            api_url,
            api_token: std::env::var("FORMS_API_TOKEN").ok(),
        })
    }
}

/// [`FormProvider`] backed by a forms service spoken to over HTTP.
///
/// `POST {api_url}/forms` with the JSON-encoded [`CreateFormRequest`];
/// the service responds with a [`CreatedForm`] payload.
pub struct HttpFormProvider {
    config: Option<FormProviderConfig>,
    client: reqwest::Client,
}

impl HttpFormProvider {
    /// Create a provider with the given (possibly absent) configuration.
    pub fn new(config: Option<FormProviderConfig>) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Create a provider configured from the environment.
    pub fn from_env() -> Self {
        Self::new(FormProviderConfig::from_env())
    }

    async fn post_create(
        &self,
        config: &FormProviderConfig,
        request: &CreateFormRequest,
    ) -> Result<CreatedForm, String> {
        let url = format!("{}/forms", config.api_url.trim_end_matches('/'));

        let mut req = self.client.post(&url).json(request);
        if let Some(token) = &config.api_token {
            req = req.bearer_auth(token);
        }

        let response = req
            .send()
            .await
            .map_err(|e| format!("Form service request failed: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("Form service returned {status}: {body}"));
        }

        response
            .json::<CreatedForm>()
            .await
            .map_err(|e| format!("Form service returned an unreadable payload: {e}"))
    }
}

#[async_trait]
impl FormProvider for HttpFormProvider {
    fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    async fn create_form(
        &self,
        request: &CreateFormRequest,
    ) -> Result<CreateFormOutcome, FormProviderError> {
        let config = self.config.as_ref().ok_or_else(|| {
            FormProviderError::NotConfigured(
                "FORMS_API_URL is not set; cannot create forms".to_string(),
            )
        })?;

        tracing::info!(title = %request.title, questions = request.questions.len(), "Creating remote form");

        match self.post_create(config, request).await {
            Ok(form) => {
                tracing::info!(form_id = %form.form_id, "Remote form created");
                Ok(CreateFormOutcome::Created(form))
            }
            Err(detail) => {
                tracing::error!(error = %detail, "Form creation failed");
                Ok(CreateFormOutcome::Failed { detail })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_returns_none_without_api_url() {
        std::env::remove_var("FORMS_API_URL");
        assert!(FormProviderConfig::from_env().is_none());
    }

    #[tokio::test]
    async fn unconfigured_provider_rejects_create() {
        let provider = HttpFormProvider::new(None);
        assert!(!provider.is_configured());

        let request = CreateFormRequest {
            title: "T".to_string(),
            description: None,
            questions: vec!["Q1".to_string()],
        };
        let err = provider.create_form(&request).await.unwrap_err();
        assert!(err.to_string().contains("not configured"));
    }

    #[tokio::test]
    async fn unreachable_service_yields_failed_outcome_not_error() {
        // Nothing listens on this port; the request error must surface as a
        // tagged Failed outcome so the caller can persist a degraded draft.
        let provider = HttpFormProvider::new(Some(FormProviderConfig {
            api_url: "http://127.0.0.1:1".to_string(),
            api_token: None,
        }));

        let request = CreateFormRequest {
            title: "T".to_string(),
            description: None,
            questions: vec!["Q1".to_string()],
        };
        match provider.create_form(&request).await.unwrap() {
            CreateFormOutcome::Failed { detail } => {
                assert!(detail.contains("Form service request failed"));
            }
            CreateFormOutcome::Created(_) => panic!("expected Failed outcome"),
        }
    }

    #[test]
    fn created_form_parses_without_response_url() {
        let form: CreatedForm =
            serde_json::from_str(r#"{"form_id":"F1","form_url":"https://forms.example/F1"}"#)
                .unwrap();
        assert_eq!(form.form_id, "F1");
        assert!(form.response_url.is_none());
    }
}
