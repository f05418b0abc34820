//! Email content generation.
//!
//! Two interchangeable strategies sit behind [`ContentGenerator`]: the
//! deterministic [`TemplateContent`] defined here (no external calls, cannot
//! fail) and the generative provider in `formrelay-providers`, which falls
//! back to the template on any upstream error. The lifecycle engine treats
//! generation failure as non-fatal in every path.

use async_trait::async_trait;

use crate::survey::Survey;

/// Error type for generative content providers.
///
/// [`TemplateContent`] never produces one of these; generative providers use
/// them internally but are expected to fall back to the template rather than
/// let them reach the caller.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// No credentials or endpoint configured.
    #[error("Content provider not configured: {0}")]
    NotConfigured(String),

    /// The upstream text-generation call failed.
    #[error("Content provider error: {0}")]
    Provider(String),
}

/// A strategy for producing the approval-notification email body.
///
/// `seed` is a monotonically increasing token (the caller passes the current
/// timestamp) embedded in the generation request to defeat upstream caching;
/// deterministic implementations ignore it.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Whether this generator has everything it needs to run.
    fn is_configured(&self) -> bool;

    /// Produce an email body for the survey.
    async fn generate(&self, survey: &Survey, seed: &str) -> Result<String, ContentError>;
}

/// Default subject line for an approval email.
pub fn default_subject(survey: &Survey) -> String {
    format!("Survey: {}", survey.title)
}

/// Default templated email body: title, description, and form link.
pub fn default_body(survey: &Survey) -> String {
    format!(
        "\nHello,\n\n\
         A new survey has been approved and is ready for your response:\n\n\
         Title: {}\n\
         Description: {}\n\n\
         Please click the following link to access the survey:\n\
         {}\n\n\
         Thank you for your participation!\n",
        survey.title,
        survey.description.as_deref().unwrap_or("No description provided"),
        survey.form_url.as_deref().unwrap_or("No survey link available"),
    )
}

/// The deterministic template strategy. Always configured, never fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateContent;

#[async_trait]
impl ContentGenerator for TemplateContent {
    fn is_configured(&self) -> bool {
        true
    }

    async fn generate(&self, survey: &Survey, _seed: &str) -> Result<String, ContentError> {
        Ok(default_body(survey))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn survey() -> Survey {
        let mut s = Survey::new(
            "Team Pulse".to_string(),
            Some("Quarterly check-in".to_string()),
            vec!["How is the workload?".to_string()],
            None,
        );
        s.form_url = Some("https://forms.example/abc".to_string());
        s
    }

    #[test]
    fn default_subject_uses_title() {
        assert_eq!(default_subject(&survey()), "Survey: Team Pulse");
    }

    #[test]
    fn default_body_mentions_title_description_and_link() {
        let body = default_body(&survey());
        assert!(body.contains("Team Pulse"));
        assert!(body.contains("Quarterly check-in"));
        assert!(body.contains("https://forms.example/abc"));
    }

    #[test]
    fn default_body_handles_missing_description_and_url() {
        let mut s = survey();
        s.description = None;
        s.form_url = None;
        let body = default_body(&s);
        assert!(body.contains("No description provided"));
        assert!(body.contains("No survey link available"));
    }

    #[tokio::test]
    async fn template_generator_is_always_configured() {
        let gen = TemplateContent;
        assert!(gen.is_configured());
        let body = gen.generate(&survey(), "seed-1").await.unwrap();
        assert!(body.contains("Team Pulse"));
    }
}
