//! Shared type aliases and timestamp helpers.

use chrono::{DateTime, FixedOffset, Utc};

/// Survey identifiers are UUID v4 strings.
pub type SurveyId = String;

/// All record timestamps carry an explicit fixed offset so they round-trip
/// through the JSON snapshot losslessly.
pub type Timestamp = DateTime<FixedOffset>;

/// Seconds east of UTC for the service's record timezone (UTC+5:30).
const RECORD_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

/// The fixed offset applied to all record timestamps.
pub fn record_offset() -> FixedOffset {
    // 5:30 east is always in range.
    FixedOffset::east_opt(RECORD_OFFSET_SECS).expect("valid fixed offset")
}

/// Current time in the record timezone.
pub fn now() -> Timestamp {
    Utc::now().with_timezone(&record_offset())
}

/// Generate a fresh survey id.
pub fn new_survey_id() -> SurveyId {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_offset_is_five_thirty() {
        assert_eq!(record_offset().local_minus_utc(), 19800);
    }

    #[test]
    fn now_carries_record_offset() {
        let ts = now();
        assert_eq!(ts.offset().local_minus_utc(), 19800);
    }

    #[test]
    fn survey_ids_are_unique() {
        assert_ne!(new_survey_id(), new_survey_id());
    }
}
