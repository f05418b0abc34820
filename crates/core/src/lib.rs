//! Formrelay domain core.
//!
//! Pure domain types and logic for the survey lifecycle: the [`Survey`]
//! record, its status state machine, validation rules, the default email
//! content template, and the [`ContentGenerator`] trait that generative
//! providers implement. This crate performs no IO.

pub mod content;
pub mod error;
pub mod survey;
pub mod types;

pub use content::{ContentError, ContentGenerator, TemplateContent};
pub use error::CoreError;
pub use survey::{Survey, SurveyStatus};
