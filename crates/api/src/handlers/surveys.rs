//! Handlers for the `/surveys` resource.
//!
//! Each endpoint maps 1:1 onto a [`SurveyService`] operation; domain errors
//! are translated to HTTP statuses by [`AppError`].

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use formrelay_core::types::Timestamp;
use formrelay_core::{Survey, SurveyStatus};
use formrelay_engine::{ApproveSurvey, CreateSurvey, RecipientOutcome};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Body of `POST /surveys`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSurveyRequest {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,
    pub description: Option<String>,
    #[validate(length(min = 1, message = "at least one question is required"))]
    pub questions: Vec<String>,
    #[validate(email(message = "recipient_email must be a valid email address"))]
    pub recipient_email: Option<String>,
}

/// Body of `POST /surveys/{id}/approve`.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ApproveSurveyRequest {
    #[validate(email(message = "recipient_email must be a valid email address"))]
    pub recipient_email: Option<String>,
    pub recipient_emails: Option<Vec<String>>,
    pub email_subject: Option<String>,
    pub email_body: Option<String>,
    #[serde(default)]
    pub use_generated_content: bool,
}

/// Query parameters for `GET /surveys`.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// If `true`, deleted surveys are included. Defaults to `false`.
    pub include_deleted: Option<bool>,
}

/// A survey as rendered to API clients.
#[derive(Debug, Serialize)]
pub struct SurveyResponse {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: SurveyStatus,
    pub form_url: Option<String>,
    pub response_url: Option<String>,
    pub questions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_emails: Option<Vec<String>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    /// Aggregate email dispatch status; present on approval responses only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_detail: Option<String>,
    /// Per-recipient delivery results; present on approval responses only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_results: Option<Vec<RecipientOutcome>>,
}

impl From<Survey> for SurveyResponse {
    fn from(survey: Survey) -> Self {
        let recipients = if survey.recipient_emails.is_empty() {
            None
        } else {
            Some(survey.recipient_emails.clone())
        };
        Self {
            id: survey.id,
            title: survey.title,
            description: survey.description,
            status: survey.status,
            form_url: survey.form_url,
            response_url: survey.response_url,
            questions: survey.questions,
            recipient_emails: recipients,
            created_at: survey.created_at,
            updated_at: survey.updated_at,
            email_status: None,
            email_detail: None,
            email_results: None,
        }
    }
}

/// Response of `GET /surveys`.
#[derive(Debug, Serialize)]
pub struct SurveyListResponse {
    pub surveys: Vec<SurveyResponse>,
}

/// Response of `POST /surveys/{id}/generate-email`.
#[derive(Debug, Serialize)]
pub struct GeneratedEmailResponse {
    pub email_body: String,
    pub timestamp: String,
    pub success: bool,
}

fn validated<T: Validate>(payload: &T) -> Result<(), AppError> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/surveys
///
/// Create a new survey in draft status: validates the input, creates the
/// remote form, and persists the record. Returns 201 with the new survey.
pub async fn create_survey(
    State(state): State<AppState>,
    Json(payload): Json<CreateSurveyRequest>,
) -> AppResult<impl IntoResponse> {
    validated(&payload)?;

    let survey = state
        .service
        .create(CreateSurvey {
            title: payload.title,
            description: payload.description,
            questions: payload.questions,
            recipient_email: payload.recipient_email,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(SurveyResponse::from(survey))))
}

/// GET /api/v1/surveys
///
/// List surveys; deleted records are excluded unless `include_deleted=true`.
pub async fn list_surveys(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> AppResult<Json<SurveyListResponse>> {
    let include_deleted = params.include_deleted.unwrap_or(false);
    let surveys = state
        .service
        .list(include_deleted)
        .into_iter()
        .map(SurveyResponse::from)
        .collect();

    Ok(Json(SurveyListResponse { surveys }))
}

/// GET /api/v1/surveys/{id}
pub async fn get_survey(
    State(state): State<AppState>,
    Path(survey_id): Path<String>,
) -> AppResult<Json<SurveyResponse>> {
    let survey = state.service.get(&survey_id)?;
    Ok(Json(SurveyResponse::from(survey)))
}

/// POST /api/v1/surveys/{id}/approve
///
/// Approve a draft survey and send notification emails to its recipients.
/// The response carries the approved record plus the aggregate and
/// per-recipient email outcomes.
pub async fn approve_survey(
    State(state): State<AppState>,
    Path(survey_id): Path<String>,
    Json(payload): Json<ApproveSurveyRequest>,
) -> AppResult<Json<SurveyResponse>> {
    validated(&payload)?;

    let outcome = state
        .service
        .approve(
            &survey_id,
            ApproveSurvey {
                recipient_email: payload.recipient_email,
                recipient_emails: payload.recipient_emails,
                email_subject: payload.email_subject,
                email_body: payload.email_body,
                use_generated_content: payload.use_generated_content,
            },
        )
        .await?;

    let mut response = SurveyResponse::from(outcome.survey);
    response.email_status = Some(outcome.email_status.as_str().to_string());
    response.email_detail = Some(outcome.email_detail);
    response.email_results = Some(outcome.recipients);

    Ok(Json(response))
}

/// POST /api/v1/surveys/{id}/generate-email
///
/// Generate a fresh draft email body for the survey without persisting it.
pub async fn generate_email(
    State(state): State<AppState>,
    Path(survey_id): Path<String>,
) -> AppResult<Json<GeneratedEmailResponse>> {
    let draft = state.service.generate_draft_email(&survey_id).await?;

    Ok(Json(GeneratedEmailResponse {
        email_body: draft.body,
        timestamp: draft.seed,
        success: true,
    }))
}

/// DELETE /api/v1/surveys/{id}
///
/// Soft-delete a survey. Returns 204 No Content; the record is retained
/// with `status = deleted`.
pub async fn delete_survey(
    State(state): State<AppState>,
    Path(survey_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.service.delete(&survey_id)?;
    Ok(StatusCode::NO_CONTENT)
}
