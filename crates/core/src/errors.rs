//! Error types for the gitnewcomers core library.
//!
//! Each subsystem has its own error type derived with `thiserror`.
//!
//! Parsing an individual author string never fails, so there is no parser
//! error here: only malformed input files surface as errors.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Name feed errors
// ---------------------------------------------------------------------------

/// Errors from loading the name-mapping feed or a curated author list.
#[derive(Debug, Error)]
pub enum FeedError {
    /// A record started with a tag other than `u2n`, `n2u` or `m2m`.
    #[error("name feed line {line}: invalid record tag \"{tag}\"")]
    UnknownTag { line: usize, tag: String },

    /// The file could not be found.
    #[error("mapping file not found: {0}")]
    FileNotFound(String),

    /// Generic I/O wrapper.
    #[error("mapping file I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// TOML parse error.
    #[error("configuration parse error: {0}")]
    ParseError(String),

    /// A config value is invalid.
    #[error("invalid configuration value for '{field}': {detail}")]
    InvalidValue { field: String, detail: String },

    /// Generic I/O error reading the config file.
    #[error("configuration I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Git log errors
// ---------------------------------------------------------------------------

/// Errors from scanning a `git log` export.
#[derive(Debug, Error)]
pub enum LogError {
    /// A `Date:` line followed another one without an `Author:` in between.
    #[error("git log line {line}: two dates without an author in between")]
    DateWithoutAuthor { line: usize },

    /// An `Author:` line had no `Date:` line belonging to it.
    #[error("git log line {line}: author without date")]
    AuthorWithoutDate { line: usize },

    /// The value of a `Date:` line could not be parsed.
    #[error("git log line {line}: unparsable date \"{value}\"")]
    InvalidDate { line: usize, value: String },

    /// Generic I/O wrapper.
    #[error("git log I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = FeedError::UnknownTag {
            line: 3,
            tag: "x2y".into(),
        };
        assert_eq!(
            err.to_string(),
            "name feed line 3: invalid record tag \"x2y\""
        );

        let err = LogError::AuthorWithoutDate { line: 7 };
        assert_eq!(err.to_string(), "git log line 7: author without date");

        let err = ConfigError::InvalidValue {
            field: "common_names.min_len".into(),
            detail: "must be at least 1".into(),
        };
        assert!(err.to_string().contains("min_len"));
    }
}
