//! Survey lifecycle engine.
//!
//! [`SurveyService`] is the single owner of survey state transitions. It
//! orchestrates the form provider (create), the persistence store (every
//! mutation), the content generator (approve, draft preview), and the mail
//! provider (approve, once per recipient), aggregating per-recipient email
//! results into one [`EmailDispatchStatus`] per operation.

pub mod dispatch;
pub mod service;

pub use dispatch::{EmailDispatchStatus, RecipientOutcome};
pub use service::{ApproveSurvey, ApprovalOutcome, CreateSurvey, DraftEmail, SurveyService};
