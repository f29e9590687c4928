//! Filter for tokens too generic to identify a single contributor.
//!
//! Short handles and popular first names are shared by many people; letting
//! them act as aliases would fuse unrelated contributors through one token.

use std::collections::HashSet;

use crate::config::CommonNamesConfig;

/// Built-in stoplist of first names and system accounts.
pub const DEFAULT_COMMON_NAMES: &[&str] = &[
    "chris", "philipp", "raymond", "robert", "stephen", "thomas", "anton", "bernd", "benjamin",
    "brandon", "marco", "martin", "steve", "daniel", "michael", "derek", "david", "jason",
    "grzegorz", "simon", "andrew", "richard", "scott", "steph", "tyler", "github", "admin",
    "bugzilla", "mozilla", "bugmail",
];

/// Decides whether a token is "very common".
#[derive(Debug, Clone)]
pub struct CommonNames {
    min_len: usize,
    stoplist: HashSet<String>,
}

impl Default for CommonNames {
    fn default() -> Self {
        Self::from_config(&CommonNamesConfig::default())
    }
}

impl CommonNames {
    /// Built-in stoplist plus the configured extras.
    pub fn from_config(config: &CommonNamesConfig) -> Self {
        let stoplist = DEFAULT_COMMON_NAMES
            .iter()
            .map(|s| s.to_string())
            .chain(config.extra.iter().map(|s| s.trim().to_lowercase()))
            .filter(|s| !s.is_empty())
            .collect();
        Self {
            min_len: config.min_len,
            stoplist,
        }
    }

    /// True if `token` is shorter than the minimum length or stoplisted.
    pub fn is_very_common(&self, token: &str) -> bool {
        token.chars().count() < self.min_len || self.stoplist.contains(&token.to_lowercase())
    }
}
