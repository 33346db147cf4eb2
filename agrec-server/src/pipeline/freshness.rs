//! Freshness log
//!
//! One text file under the data root records when the pipeline last
//! completed. The conditional serving policy reads it to decide whether a
//! refresh is due. A missing or unreadable stamp always reads as stale; the
//! log failing must push toward refreshing, never toward serving old data.

use std::path::PathBuf;
use std::time::Duration;

use agrec_common::time::{format_refresh_stamp, parse_refresh_stamp};
use agrec_common::Result;
use chrono::Local;
use tracing::warn;

use crate::artifacts::write_atomic;

/// Default maximum age of the last refresh before a conditional request
/// re-runs the pipeline
pub const DEFAULT_STALENESS_THRESHOLD: Duration = Duration::from_secs(3600);

/// Persisted last-refresh stamp
#[derive(Debug, Clone)]
pub struct FreshnessLog {
    path: PathBuf,
}

impl FreshnessLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Record the current wall-clock time, creating the log if absent and
    /// overwriting any previous stamp
    pub fn record_refresh(&self) -> Result<()> {
        let line = format_refresh_stamp(Local::now().naive_local());
        write_atomic(&self.path, line.as_bytes())?;
        Ok(())
    }

    /// True if the last refresh is strictly older than `threshold`.
    ///
    /// Elapsed time is compared at whole-second resolution (the stamp's own
    /// precision), so an age of exactly the threshold is not stale. Missing
    /// log: stale. Malformed log: stale, with a warning.
    pub fn is_stale(&self, threshold: Duration) -> bool {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(_) => return true,
        };

        let Some(stamp) = parse_refresh_stamp(contents.trim_end()) else {
            warn!(
                "Freshness log {} is malformed; treating as stale",
                self.path.display()
            );
            return true;
        };

        let elapsed_secs = (Local::now().naive_local() - stamp).num_seconds();
        elapsed_secs > threshold.as_secs() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use tempfile::tempdir;

    const ONE_HOUR: Duration = Duration::from_secs(3600);

    /// Write a stamp `age` in the past directly into the log file
    fn log_with_age(dir: &std::path::Path, age: ChronoDuration) -> FreshnessLog {
        let path = dir.join("refresh_log.txt");
        let stamp = Local::now().naive_local() - age;
        std::fs::write(&path, format_refresh_stamp(stamp)).unwrap();
        FreshnessLog::new(path)
    }

    #[test]
    fn test_missing_log_is_stale() {
        let dir = tempdir().unwrap();
        let log = FreshnessLog::new(dir.path().join("refresh_log.txt"));
        assert!(log.is_stale(ONE_HOUR));
    }

    #[test]
    fn test_fresh_after_record_refresh() {
        let dir = tempdir().unwrap();
        let log = FreshnessLog::new(dir.path().join("refresh_log.txt"));
        log.record_refresh().unwrap();
        assert!(!log.is_stale(ONE_HOUR));
    }

    #[test]
    fn test_record_refresh_overwrites_old_stamp() {
        let dir = tempdir().unwrap();
        let log = log_with_age(dir.path(), ChronoDuration::hours(5));
        assert!(log.is_stale(ONE_HOUR));
        log.record_refresh().unwrap();
        assert!(!log.is_stale(ONE_HOUR));
    }

    #[test]
    fn test_malformed_log_is_stale() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("refresh_log.txt");
        std::fs::write(&path, "Last updated: yesterday, probably").unwrap();
        assert!(FreshnessLog::new(path).is_stale(ONE_HOUR));
    }

    #[test]
    fn test_not_stale_one_second_before_threshold() {
        let dir = tempdir().unwrap();
        let log = log_with_age(dir.path(), ChronoDuration::seconds(3599));
        assert!(!log.is_stale(ONE_HOUR));
    }

    #[test]
    fn test_stale_one_second_past_threshold() {
        let dir = tempdir().unwrap();
        let log = log_with_age(dir.path(), ChronoDuration::seconds(3601));
        assert!(log.is_stale(ONE_HOUR));
    }

    #[test]
    fn test_exactly_at_threshold_is_not_stale() {
        let dir = tempdir().unwrap();
        let log = log_with_age(dir.path(), ChronoDuration::seconds(3600));
        assert!(!log.is_stale(ONE_HOUR));
    }

    #[test]
    fn test_future_stamp_is_not_stale() {
        let dir = tempdir().unwrap();
        let log = log_with_age(dir.path(), ChronoDuration::seconds(-120));
        assert!(!log.is_stale(ONE_HOUR));
    }
}
