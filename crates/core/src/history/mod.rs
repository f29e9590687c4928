//! Scanning of plain-text `git log` exports.
//!
//! Only the `Author:` and `Date:` header lines matter. `git log` lists the
//! newest commit first, so the export is walked bottom-up: every `Author:`
//! line is then preceded by the `Date:` line of the same commit.

pub mod report;
pub mod stats;

use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::errors::LogError;

pub use report::{newcomers_csv, roster_lines};
pub use stats::{monthly_active, newcomers, Newcomer, YearMonth};

/// Formats accepted on `Date:` lines, after whitespace normalisation.
const DATE_FORMATS: &[&str] = &[
    // git default: `Mon Jan 1 12:00:00 2018 +0100`
    "%a %b %d %H:%M:%S %Y %z",
    // --date=iso
    "%Y-%m-%d %H:%M:%S %z",
];

/// One commit's author line and date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub author: String,
    pub date: DateTime<Utc>,
}

/// Commits of a `git log` export, oldest first.
#[derive(Debug, Clone, Default)]
pub struct GitLog {
    entries: Vec<LogEntry>,
}

impl GitLog {
    /// Parse the text of a `git log` export.
    pub fn parse(text: &str) -> Result<Self, LogError> {
        debug!("parsing git log ({} bytes)", text.len());
        let lines: Vec<&str> = text.lines().collect();

        let mut entries = Vec::new();
        let mut pending: Option<DateTime<Utc>> = None;
        for (idx, line) in lines.iter().enumerate().rev() {
            let line_no = idx + 1;
            if let Some(value) = line.strip_prefix("Date:") {
                if pending.is_some() {
                    return Err(LogError::DateWithoutAuthor { line: line_no });
                }
                let value = value.trim();
                pending = Some(parse_git_date(value).ok_or_else(|| LogError::InvalidDate {
                    line: line_no,
                    value: value.to_string(),
                })?);
            } else if let Some(author) = line.strip_prefix("Author:") {
                let date = pending
                    .take()
                    .ok_or(LogError::AuthorWithoutDate { line: line_no })?;
                entries.push(LogEntry {
                    author: author.trim().to_string(),
                    date,
                });
            }
        }

        if pending.is_some() {
            warn!("git log starts with a date that has no author, ignoring it");
        }
        debug!(count = entries.len(), "parsed git log entries");
        Ok(Self { entries })
    }

    /// Read and parse a `git log` export from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LogError> {
        let path = path.as_ref();
        info!(path = %path.display(), "reading git log");
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Raw author lines, oldest commit first.
    pub fn authors(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.author.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parse the value of a `Date:` line into UTC.
pub fn parse_git_date(value: &str) -> Option<DateTime<Utc>> {
    let normalized = value.split_whitespace().collect::<Vec<_>>().join(" ");
    DATE_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(&normalized, fmt).ok())
        .or_else(|| DateTime::parse_from_rfc2822(&normalized).ok())
        .or_else(|| DateTime::parse_from_rfc3339(&normalized).ok())
        .map(|d| d.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SAMPLE_LOG: &str = "\
commit 3333333333333333333333333333333333333333
Author: Jane Doe <jane@example.com>
Date:   Tue Mar 6 09:15:00 2018 +0100

    Third commit

commit 2222222222222222222222222222222222222222
Merge: 1111111 0000000
Author: Max Power <max@example.com>
Date:   Mon Feb 5 18:00:00 2018 -0500

    Second commit
    Date: inside a message is indented and ignored

commit 1111111111111111111111111111111111111111
Author: Jane Doe <jane@example.com>
Date:   Mon Jan 1 12:00:00 2018 +0000

    Initial commit
";

    #[test]
    fn test_parse_sample_log_oldest_first() {
        let log = GitLog::parse(SAMPLE_LOG).unwrap();
        assert_eq!(log.len(), 3);

        let authors: Vec<&str> = log.authors().collect();
        assert_eq!(
            authors,
            vec![
                "Jane Doe <jane@example.com>",
                "Max Power <max@example.com>",
                "Jane Doe <jane@example.com>",
            ]
        );
        assert_eq!(
            log.entries()[0].date,
            Utc.with_ymd_and_hms(2018, 1, 1, 12, 0, 0).unwrap()
        );
        assert_eq!(
            log.entries()[1].date,
            Utc.with_ymd_and_hms(2018, 2, 5, 23, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_author_without_date() {
        let text = "commit 1\nAuthor: Jane Doe <jane@example.com>\n";
        let result = GitLog::parse(text);
        assert!(matches!(result, Err(LogError::AuthorWithoutDate { line: 2 })));
    }

    #[test]
    fn test_two_dates_without_author() {
        let text = "Date:   Mon Jan 1 12:00:00 2018 +0000\nDate:   Mon Jan 1 12:00:00 2018 +0000\n";
        let result = GitLog::parse(text);
        assert!(matches!(result, Err(LogError::DateWithoutAuthor { line: 1 })));
    }

    #[test]
    fn test_invalid_date() {
        let text = "Author: Jane\nDate: yesterday-ish\n";
        let result = GitLog::parse(text);
        assert!(matches!(
            result,
            Err(LogError::InvalidDate { line: 2, ref value }) if value == "yesterday-ish"
        ));
    }

    #[test]
    fn test_parse_git_date_formats() {
        let expected = Utc.with_ymd_and_hms(2018, 1, 1, 11, 0, 0).unwrap();
        assert_eq!(parse_git_date("Mon Jan 1 12:00:00 2018 +0100"), Some(expected));
        assert_eq!(parse_git_date("Mon Jan  1 12:00:00 2018 +0100"), Some(expected));
        assert_eq!(parse_git_date("2018-01-01 12:00:00 +0100"), Some(expected));
        assert_eq!(parse_git_date("Mon, 1 Jan 2018 12:00:00 +0100"), Some(expected));
        assert_eq!(parse_git_date("2018-01-01T12:00:00+01:00"), Some(expected));
        assert_eq!(parse_git_date("not a date"), None);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("git.log");
        std::fs::write(&path, SAMPLE_LOG).unwrap();
        let log = GitLog::load(&path).unwrap();
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_load_missing_file() {
        let result = GitLog::load("/nonexistent/git.log");
        assert!(matches!(result, Err(LogError::IoError(_))));
    }
}
