use chrono::{DateTime, Utc};
use serde::Serialize;

/// Report timestamp layout: UTC, zero-padded, literal `Z`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// A file as it appears in the files-by-owner report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    pub owner_email: String,
    pub file_id: String,
    pub file_name: String,
    pub file_type: String,
    pub created_time: Option<DateTime<Utc>>,
    pub modified_time: Option<DateTime<Utc>>,
    pub size_bytes: i64,
}

/// Parse an RFC 3339 timestamp as returned by the Drive API.
///
/// Empty or malformed input yields `None` rather than an error: one bad
/// timestamp must never abort an audit.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if raw.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Format a timestamp for report output, or an empty string when unset.
pub fn format_timestamp(value: Option<&DateTime<Utc>>) -> String {
    value
        .map(|t| t.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_default()
}
