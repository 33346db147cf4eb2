//! Refresh-stamp formatting
//!
//! The freshness log stores a single line, `Last updated: <stamp>`, with the
//! stamp in day/month/year hour:minute:second form. Writer and staleness
//! check both go through these helpers so the format cannot drift.

use chrono::NaiveDateTime;

/// Wall-clock format used in the freshness log
pub const REFRESH_STAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Prefix written ahead of the stamp in the log file
pub const REFRESH_STAMP_PREFIX: &str = "Last updated: ";

/// Format a timestamp as a freshness-log line
pub fn format_refresh_stamp(t: NaiveDateTime) -> String {
    format!("{}{}", REFRESH_STAMP_PREFIX, t.format(REFRESH_STAMP_FORMAT))
}

/// Parse a freshness-log line back into a timestamp.
///
/// Returns `None` for a missing prefix or an unparsable stamp; callers treat
/// both as "stale".
pub fn parse_refresh_stamp(line: &str) -> Option<NaiveDateTime> {
    let stamp = line.strip_prefix(REFRESH_STAMP_PREFIX)?;
    NaiveDateTime::parse_from_str(stamp.trim(), REFRESH_STAMP_FORMAT).ok()
}
