use crate::domain::errors::RawLogError;
use crate::domain::observation::RawActivity;
use crate::domain::ports::RawValueLogger;
use chrono::{DateTime, FixedOffset, SecondsFormat};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

/// Appends `[<timestamp>] In: <n>, Out: <m>` lines to a local file.
pub struct FileRawValueLogger {
    path: PathBuf,
}

impl FileRawValueLogger {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn format_line(timestamp: DateTime<FixedOffset>, activity: RawActivity) -> String {
        format!(
            "[{}] In: {}, Out: {}",
            timestamp.to_rfc3339_opts(SecondsFormat::Micros, false),
            activity.entries,
            activity.exits
        )
    }
}

impl RawValueLogger for FileRawValueLogger {
    fn append(
        &self,
        timestamp: DateTime<FixedOffset>,
        activity: RawActivity,
    ) -> Result<(), RawLogError> {
        let line = Self::format_line(timestamp, activity);
        let to_error = |source| RawLogError {
            path: self.path.display().to_string(),
            source,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(to_error)?;
        writeln!(file, "{}", line).map_err(to_error)?;

        debug!("Appended raw values to {:?}", self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 5, 1, 8, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_line_format() {
        let line = FileRawValueLogger::format_line(at(), RawActivity::new(12, 7));
        assert_eq!(line, "[2024-05-01T08:30:00.000000+00:00] In: 12, Out: 7");
    }

    #[test]
    fn test_append_accumulates_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.log");
        let logger = FileRawValueLogger::new(path.clone());

        logger.append(at(), RawActivity::new(1, 2)).unwrap();
        logger.append(at(), RawActivity::new(3, 4)).unwrap();

        let contents = std::fs::read_to_string(path).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("In: 1, Out: 2"));
        assert!(lines[1].ends_with("In: 3, Out: 4"));
    }

    #[test]
    fn test_unwritable_path_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let logger = FileRawValueLogger::new(dir.path().join("missing").join("raw.log"));

        let err = logger.append(at(), RawActivity::new(1, 1)).unwrap_err();
        assert!(err.to_string().contains("raw.log"));
    }
}
