//! Generative email content provider.
//!
//! [`GenerativeContent`] implements [`ContentGenerator`] against a
//! Gemini-style text-generation REST API. The prompt embeds the survey's
//! title, description, form link, and its actual questions, plus a
//! uniqueness token derived from the caller's seed so repeated calls produce
//! fresh drafts instead of a cached one. Every failure mode — missing
//! credentials, transport errors, safety-blocked or unreadable responses —
//! falls back to the deterministic template body and is never fatal.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use formrelay_core::content::{self, ContentError, ContentGenerator};
use formrelay_core::Survey;

/// Default model when `GENAI_MODEL` is not set.
const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Default API base when `GENAI_API_URL` is not set.
const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Configuration for the generative content provider.
#[derive(Debug, Clone)]
pub struct GenAiConfig {
    /// API key for the text-generation service.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
    /// API base URL.
    pub api_base: String,
}

impl GenAiConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `GENAI_API_KEY` is not set, signalling that
    /// generative content is unavailable and the template fallback applies.
    ///
    /// | Variable        | Required | Default                     |
    /// |-----------------|----------|-----------------------------|
    /// | `GENAI_API_KEY` | yes      | —                           |
    /// | `GENAI_MODEL`   | no       | `gemini-1.5-flash`          |
    /// | `GENAI_API_URL` | no       | Google generative language  |
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("GENAI_API_KEY").ok()?;
        Some(Self {
            api_key,
            model: std::env::var("GENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            api_base: std::env::var("GENAI_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
        })
    }
}

// Response shape of a `generateContent` call, reduced to the fields we read.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

/// [`ContentGenerator`] backed by a remote text-generation API.
pub struct GenerativeContent {
    config: Option<GenAiConfig>,
    client: reqwest::Client,
}

impl GenerativeContent {
    /// Create a provider with the given (possibly absent) configuration.
    pub fn new(config: Option<GenAiConfig>) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Create a provider configured from the environment.
    pub fn from_env() -> Self {
        Self::new(GenAiConfig::from_env())
    }

    /// Build the generation prompt for a survey.
    ///
    /// The prompt instructs the model to reference at least three of the
    /// survey's questions verbatim and to keep the draft under 250 words.
    /// The `Generation ID` line carries the caller's seed so identical
    /// surveys still yield distinct prompts across calls.
    pub fn build_prompt(survey: &Survey, seed: &str) -> String {
        let mut questions_section = String::new();
        if !survey.questions.is_empty() {
            questions_section.push_str("\nSurvey Questions:\n");
            for (i, q) in survey.questions.iter().enumerate() {
                questions_section.push_str(&format!("  {}. {}\n", i + 1, q));
            }
        }

        format!(
            "Please create a professional and personalized email to invite someone to \
             complete a survey.\n\n\
             Survey details:\n\
             - Title: {}\n\
             - Description: {}\n\
             - Survey Link: {}\n\
             {}\n\
             Generation ID: {}\n\n\
             The email should:\n\
             1. Be polite and professional with a warm greeting\n\
             2. Briefly explain the purpose of the survey based on its title and description\n\
             3. IMPORTANT: Specifically mention at least 3 questions from the survey, using \
             the exact wording of the questions listed above\n\
             4. Emphasize the importance and value of the recipient's feedback\n\
             5. Include the survey link prominently\n\
             6. Thank the recipient for their time\n\
             7. End with a professional sign-off\n\
             8. Be concise but engaging (maximum 250 words)\n\
             9. Create a NEW, FRESH draft each time rather than a templated one\n\n\
             Format the email with proper spacing, an appropriate greeting, and a sign-off.",
            survey.title,
            survey.description.as_deref().unwrap_or("No description provided"),
            survey.form_url.as_deref().unwrap_or("No survey link available"),
            questions_section,
            seed,
        )
    }

    /// Substitute any placeholder tokens the model may have emitted.
    fn fill_placeholders(survey: &Survey, body: String) -> String {
        body.replace(
            "[SURVEY LINK]",
            survey.form_url.as_deref().unwrap_or(""),
        )
        .replace("[SURVEY TITLE]", &survey.title)
    }

    async fn request_draft(
        &self,
        config: &GenAiConfig,
        survey: &Survey,
        seed: &str,
    ) -> Result<String, ContentError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            config.api_base.trim_end_matches('/'),
            config.model,
            config.api_key,
        );

        let payload = json!({
            "contents": [{ "parts": [{ "text": Self::build_prompt(survey, seed) }] }],
            "generationConfig": {
                "temperature": 0.9,
                "topP": 0.95,
                "topK": 40,
                "maxOutputTokens": 1000,
            },
        });

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ContentError::Provider(format!("Generation request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ContentError::Provider(format!(
                "Generation service returned {status}"
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ContentError::Provider(format!("Unreadable generation payload: {e}")))?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                ContentError::Provider("Generation response contained no text".to_string())
            })?;

        Ok(Self::fill_placeholders(survey, text))
    }
}

#[async_trait]
impl ContentGenerator for GenerativeContent {
    fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    /// Generate an email body, falling back to the deterministic template on
    /// any provider error. This method never returns `Err`.
    async fn generate(&self, survey: &Survey, seed: &str) -> Result<String, ContentError> {
        let Some(config) = &self.config else {
            tracing::warn!("GENAI_API_KEY not set; using template email body");
            return Ok(content::default_body(survey));
        };

        match self.request_draft(config, survey, seed).await {
            Ok(body) => Ok(body),
            Err(err) => {
                tracing::warn!(error = %err, "Content generation failed; using template email body");
                Ok(content::default_body(survey))
            }
        }
    }
}
