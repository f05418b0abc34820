//! The survey lifecycle service.

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use rand::Rng;

use formrelay_core::content::{self, ContentGenerator};
use formrelay_core::{survey, CoreError, Survey};
use formrelay_providers::form::{CreateFormOutcome, CreateFormRequest, FormProvider};
use formrelay_providers::mail::MailProvider;
use formrelay_store::{StoreError, SurveyStore};

use crate::dispatch::{self, EmailDispatchStatus, RecipientOutcome};

/// Input for the create operation.
#[derive(Debug, Clone)]
pub struct CreateSurvey {
    pub title: String,
    pub description: Option<String>,
    pub questions: Vec<String>,
    pub recipient_email: Option<String>,
}

/// Input for the approve operation. A recipient list takes precedence over
/// the single-address field; at least one address must result.
#[derive(Debug, Clone, Default)]
pub struct ApproveSurvey {
    pub recipient_email: Option<String>,
    pub recipient_emails: Option<Vec<String>>,
    pub email_subject: Option<String>,
    pub email_body: Option<String>,
    pub use_generated_content: bool,
}

/// Result of an approval: the persisted record plus the email fan-out
/// outcome. Per-recipient results are for caller display only; the record
/// itself stores just the recipient set.
#[derive(Debug, Clone)]
pub struct ApprovalOutcome {
    pub survey: Survey,
    pub email_status: EmailDispatchStatus,
    pub email_detail: String,
    pub recipients: Vec<RecipientOutcome>,
}

/// A freshly generated draft email body and the seed that produced it.
#[derive(Debug, Clone)]
pub struct DraftEmail {
    pub body: String,
    pub seed: String,
}

/// Orchestrates the survey lifecycle across the store and the external
/// providers. All operations are short sequential units of work; the store's
/// coarse lock is the only concurrency discipline required.
pub struct SurveyService {
    store: Arc<SurveyStore>,
    forms: Arc<dyn FormProvider>,
    mailer: Arc<dyn MailProvider>,
    content: Arc<dyn ContentGenerator>,
}

impl SurveyService {
    pub fn new(
        store: Arc<SurveyStore>,
        forms: Arc<dyn FormProvider>,
        mailer: Arc<dyn MailProvider>,
        content: Arc<dyn ContentGenerator>,
    ) -> Self {
        Self {
            store,
            forms,
            mailer,
            content,
        }
    }

    /// Create a new draft survey backed by a remote form.
    ///
    /// An unconfigured form provider aborts the operation with a
    /// configuration error. Any other provider failure still yields a
    /// persisted draft: the failure detail lands in `form_url` and `form_id`
    /// gets an `ERROR-` marker, so user input is never lost to a flaky
    /// upstream.
    pub async fn create(&self, input: CreateSurvey) -> Result<Survey, CoreError> {
        survey::validate_title(&input.title)?;
        survey::validate_questions(&input.questions)?;

        let request = CreateFormRequest {
            title: input.title.clone(),
            description: input.description.clone(),
            questions: input.questions.clone(),
        };

        let outcome = self
            .forms
            .create_form(&request)
            .await
            .map_err(|e| CoreError::Configuration(e.to_string()))?;

        let mut record = Survey::new(
            input.title,
            input.description,
            input.questions,
            input.recipient_email,
        );

        match outcome {
            CreateFormOutcome::Created(form) => {
                record.form_id = Some(form.form_id);
                record.form_url = Some(form.form_url);
                record.response_url = form.response_url;
            }
            CreateFormOutcome::Failed { detail } => {
                let marker: u32 = rand::rng().random_range(100..=999);
                tracing::warn!(
                    survey_id = %record.id,
                    error = %detail,
                    "Form creation failed; persisting degraded draft"
                );
                record.form_id = Some(format!("ERROR-{marker}"));
                record.form_url = Some(detail);
            }
        }

        self.store.put(record.clone()).map_err(store_error)?;
        tracing::info!(survey_id = %record.id, "Survey created");
        Ok(record)
    }

    /// List surveys, excluding deleted records unless asked.
    pub fn list(&self, include_deleted: bool) -> Vec<Survey> {
        self.store.list(include_deleted)
    }

    /// Fetch one survey by id.
    pub fn get(&self, id: &str) -> Result<Survey, CoreError> {
        self.store
            .get(id)
            .ok_or_else(|| CoreError::NotFound(id.to_string()))
    }

    /// Approve a draft survey and notify its recipients.
    ///
    /// The status transition is persisted before dispatch and is not rolled
    /// back by email failures; delivery trouble is reported in the returned
    /// [`EmailDispatchStatus`] instead.
    pub async fn approve(
        &self,
        id: &str,
        input: ApproveSurvey,
    ) -> Result<ApprovalOutcome, CoreError> {
        let mut record = self.get(id)?;
        record.ensure_approvable()?;

        let recipients = normalize_recipients(&input)?;

        let subject = input
            .email_subject
            .clone()
            .unwrap_or_else(|| content::default_subject(&record));
        let body = self.resolve_body(&record, &input).await;

        record.approve(recipients.clone(), subject.clone(), body.clone());
        self.store.put(record.clone()).map_err(store_error)?;
        tracing::info!(survey_id = %record.id, recipients = recipients.len(), "Survey approved");

        let (results, fault) = self.dispatch_emails(&recipients, &subject, &body).await;

        let (email_status, email_detail) = match fault {
            Some(detail) => (EmailDispatchStatus::Error, detail),
            None => dispatch::aggregate(&results),
        };

        if email_status != EmailDispatchStatus::Success {
            tracing::warn!(
                survey_id = %record.id,
                status = %email_status,
                detail = %email_detail,
                "Email dispatch did not fully succeed"
            );
        }

        Ok(ApprovalOutcome {
            survey: record,
            email_status,
            email_detail,
            recipients: results,
        })
    }

    /// Soft-delete a survey. The record is retained with `status = deleted`;
    /// deleting an already-deleted survey succeeds at the storage layer.
    pub fn delete(&self, id: &str) -> Result<(), CoreError> {
        let mut record = self.get(id)?;
        record.mark_deleted();
        self.store.put(record).map_err(store_error)?;
        tracing::info!(survey_id = id, "Survey deleted");
        Ok(())
    }

    /// Generate a fresh draft email for a survey without persisting it.
    ///
    /// A new RFC 3339 timestamp seeds every call so repeated previews reach
    /// the generator with distinct prompts; nothing is cached and the record
    /// is not touched.
    pub async fn generate_draft_email(&self, id: &str) -> Result<DraftEmail, CoreError> {
        let record = self.get(id)?;
        let seed = Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true);

        let body = match self.content.generate(&record, &seed).await {
            Ok(body) => body,
            Err(err) => {
                tracing::warn!(survey_id = id, error = %err, "Draft generation failed; using template");
                content::default_body(&record)
            }
        };

        Ok(DraftEmail { body, seed })
    }

    /// Determine the approval email body.
    ///
    /// Priority: explicit body, then generated content when requested (with
    /// silent fallback), then the default template.
    async fn resolve_body(&self, record: &Survey, input: &ApproveSurvey) -> String {
        if let Some(body) = &input.email_body {
            return body.clone();
        }

        if input.use_generated_content {
            let seed = Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true);
            match self.content.generate(record, &seed).await {
                Ok(body) => return body,
                Err(err) => {
                    tracing::warn!(
                        survey_id = %record.id,
                        error = %err,
                        "Content generation failed; using template email body"
                    );
                }
            }
        }

        content::default_body(record)
    }

    /// Send one email per recipient, sequentially, continuing through
    /// individual failures. A dispatch-level fault stops the loop and is
    /// returned separately from the per-recipient results.
    async fn dispatch_emails(
        &self,
        recipients: &[String],
        subject: &str,
        body: &str,
    ) -> (Vec<RecipientOutcome>, Option<String>) {
        let mut results = Vec::with_capacity(recipients.len());

        for recipient in recipients {
            match self.mailer.send(recipient, subject, body).await {
                Ok(outcome) => {
                    if !outcome.success {
                        tracing::warn!(to = %recipient, detail = %outcome.detail, "Email delivery failed");
                    }
                    results.push(RecipientOutcome {
                        recipient: recipient.clone(),
                        success: outcome.success,
                        detail: outcome.detail,
                    });
                }
                Err(err) => {
                    tracing::error!(to = %recipient, error = %err, "Email dispatch fault");
                    return (results, Some(format!("Error sending emails: {err}")));
                }
            }
        }

        (results, None)
    }
}

/// Normalize approval recipients: the list wins over the single address, and
/// at least one address must remain.
fn normalize_recipients(input: &ApproveSurvey) -> Result<Vec<String>, CoreError> {
    let recipients = match &input.recipient_emails {
        Some(list) if !list.is_empty() => list.clone(),
        _ => input
            .recipient_email
            .clone()
            .map(|addr| vec![addr])
            .unwrap_or_default(),
    };

    if recipients.is_empty() {
        return Err(CoreError::Validation(
            "At least one recipient email is required".to_string(),
        ));
    }
    Ok(recipients)
}

fn store_error(err: StoreError) -> CoreError {
    CoreError::Internal(err.to_string())
}
