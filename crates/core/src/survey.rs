//! The [`Survey`] record and its lifecycle state machine.
//!
//! Status transitions are monotonic: `Draft -> Approved`, `Draft -> Deleted`,
//! `Approved -> Deleted`. Nothing leaves `Deleted` and nothing re-enters
//! `Draft`. Deletion is a soft flag; the record is retained for audit.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{self, SurveyId, Timestamp};

/// Maximum length for a survey title.
pub const MAX_TITLE_LEN: usize = 200;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle status of a survey. Serialized as its lowercase tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurveyStatus {
    Draft,
    Approved,
    Deleted,
}

impl SurveyStatus {
    /// The lowercase wire tag for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            SurveyStatus::Draft => "draft",
            SurveyStatus::Approved => "approved",
            SurveyStatus::Deleted => "deleted",
        }
    }
}

impl std::fmt::Display for SurveyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a survey title: non-empty and within the length limit.
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation(
            "Survey title must not be empty".to_string(),
        ));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(CoreError::Validation(format!(
            "Survey title too long: {} chars (max {MAX_TITLE_LEN})",
            title.chars().count()
        )));
    }
    Ok(())
}

/// Validate a question list: at least one question is required.
pub fn validate_questions(questions: &[String]) -> Result<(), CoreError> {
    if questions.is_empty() {
        return Err(CoreError::Validation(
            "At least one question is required".to_string(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Survey
// ---------------------------------------------------------------------------

/// The persisted survey record.
///
/// `form_id`, `form_url`, and `response_url` are assigned by the form
/// provider at creation; `form_id` and `form_url` are immutable once set,
/// while `response_url` may be refreshed by maintenance paths. Recipient and
/// email fields stay empty until approval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Survey {
    pub id: SurveyId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub questions: Vec<String>,
    pub status: SurveyStatus,
    #[serde(default)]
    pub form_id: Option<String>,
    #[serde(default)]
    pub form_url: Option<String>,
    #[serde(default)]
    pub response_url: Option<String>,
    /// Legacy single-recipient field; mirrors the first entry of
    /// `recipient_emails` after approval.
    #[serde(default)]
    pub recipient_email: Option<String>,
    #[serde(default)]
    pub recipient_emails: Vec<String>,
    #[serde(default)]
    pub email_subject: Option<String>,
    #[serde(default)]
    pub email_body: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Survey {
    /// Create a new draft survey with a fresh id and current timestamps.
    ///
    /// Callers are expected to have validated `title` and `questions`
    /// beforehand via [`validate_title`] and [`validate_questions`].
    pub fn new(
        title: String,
        description: Option<String>,
        questions: Vec<String>,
        recipient_email: Option<String>,
    ) -> Self {
        let now = types::now();
        Self {
            id: types::new_survey_id(),
            title,
            description,
            questions,
            status: SurveyStatus::Draft,
            form_id: None,
            form_url: None,
            response_url: None,
            recipient_email,
            recipient_emails: Vec::new(),
            email_subject: None,
            email_body: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check that this survey can be approved.
    ///
    /// Already-approved and deleted surveys are hard errors, never silently
    /// accepted.
    pub fn ensure_approvable(&self) -> Result<(), CoreError> {
        match self.status {
            SurveyStatus::Draft => Ok(()),
            SurveyStatus::Approved => Err(CoreError::InvalidTransition(
                "Survey is already approved".to_string(),
            )),
            SurveyStatus::Deleted => Err(CoreError::InvalidTransition(
                "Cannot approve a deleted survey".to_string(),
            )),
        }
    }

    /// Transition to `Approved`, recording recipients and email content.
    ///
    /// The first recipient is mirrored into the legacy `recipient_email`
    /// field for record compatibility.
    pub fn approve(&mut self, recipients: Vec<String>, subject: String, body: String) {
        self.status = SurveyStatus::Approved;
        self.recipient_email = recipients.first().cloned();
        self.recipient_emails = recipients;
        self.email_subject = Some(subject);
        self.email_body = Some(body);
        self.touch();
    }

    /// Soft-delete: flag the record as deleted and refresh `updated_at`.
    /// No other field is mutated past this point.
    pub fn mark_deleted(&mut self) {
        self.status = SurveyStatus::Deleted;
        self.touch();
    }

    /// Refresh `updated_at` to the current time.
    pub fn touch(&mut self) {
        self.updated_at = types::now();
    }
}
