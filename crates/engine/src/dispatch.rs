//! Email dispatch aggregation.
//!
//! Approval fans one email out per recipient, sequentially, continuing
//! through individual failures. The per-recipient results collapse into a
//! single [`EmailDispatchStatus`] for the operation; the survey record keeps
//! only the recipient set, never per-recipient delivery state.

use serde::Serialize;

/// Aggregate outcome of an approval's email fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmailDispatchStatus {
    /// Every send succeeded.
    Success,
    /// Some sends succeeded, some failed.
    PartialSuccess,
    /// Every send failed.
    Failed,
    /// The dispatch loop itself faulted (provider-level exception, distinct
    /// from a returned per-recipient failure).
    Error,
}

impl EmailDispatchStatus {
    /// The wire tag for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailDispatchStatus::Success => "SUCCESS",
            EmailDispatchStatus::PartialSuccess => "PARTIAL_SUCCESS",
            EmailDispatchStatus::Failed => "FAILED",
            EmailDispatchStatus::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for EmailDispatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivery result for one recipient, reported to the caller for display
/// but not persisted on the survey record.
#[derive(Debug, Clone, Serialize)]
pub struct RecipientOutcome {
    pub recipient: String,
    pub success: bool,
    pub detail: String,
}

/// Collapse per-recipient results into an aggregate status and a
/// human-readable detail string.
///
/// Dispatch-level faults are handled by the caller and never reach this
/// function; `results` holds one entry per attempted recipient.
pub fn aggregate(results: &[RecipientOutcome]) -> (EmailDispatchStatus, String) {
    let sent = results.iter().filter(|r| r.success).count();

    if sent == results.len() {
        (
            EmailDispatchStatus::Success,
            "Emails sent successfully".to_string(),
        )
    } else if sent == 0 {
        (
            EmailDispatchStatus::Failed,
            "Failed to send all email notifications".to_string(),
        )
    } else {
        (
            EmailDispatchStatus::PartialSuccess,
            "Failed to send email to one or more recipients".to_string(),
        )
    }
}
