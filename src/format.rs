//! Display formatting for server-generated instants.

use jiff::Timestamp;

use crate::error::FormatError;

/// Format an instant for display as `DD/MM/YYYY HH:MM`.
///
/// Total for any valid instant and deterministic: the same instant always
/// renders to the same non-empty string.
pub fn format_timestamp(ts: &Timestamp) -> String {
    ts.strftime("%d/%m/%Y %H:%M").to_string()
}

/// Format an optional instant, failing on absence.
///
/// Absent closed-timestamps are legitimate for open tickets; callers check
/// presence before asking for a display string. Reaching this with `None` is
/// a programming-contract error, not a user-facing condition.
pub fn format_optional(ts: Option<&Timestamp>) -> Result<String, FormatError> {
    match ts {
        Some(ts) => Ok(format_timestamp(ts)),
        None => Err(FormatError::AbsentInstant),
    }
}

/// Parse a wire timestamp (RFC 3339) into an instant.
pub fn parse_timestamp(s: &str) -> Result<Timestamp, FormatError> {
    s.parse::<Timestamp>()
        .map_err(|_| FormatError::InvalidTimestamp(s.to_string()))
}

/// The current instant as a wire timestamp (RFC 3339, millisecond precision).
pub fn wire_now() -> String {
    Timestamp::now().strftime("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}
