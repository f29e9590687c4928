//! Contributor statistics over a scanned `git log`.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use chrono::{DateTime, Datelike, Utc};
use tracing::debug;

use super::LogEntry;
use crate::identity::aliases::alias_key;
use crate::identity::AliasResolver;

/// A contributor and the date of their first commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Newcomer {
    pub author: String,
    pub first_commit: DateTime<Utc>,
}

/// Calendar month used as the bucket for activity counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: &DateTime<Utc>) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Canonical authors of one log entry.
fn canonical_authors(entry: &LogEntry, resolver: Option<&AliasResolver>) -> Vec<String> {
    match resolver {
        Some(r) => r.deanonymize(&entry.author),
        None => vec![entry.author.clone()],
    }
}

/// Every contributor with the date of their first commit, in log order.
///
/// Entries are expected oldest first, as produced by
/// [`GitLog`](super::GitLog). With a resolver, co-authored lines count for
/// each named author and aliases collapse to one contributor.
pub fn newcomers(entries: &[LogEntry], resolver: Option<&AliasResolver>) -> Vec<Newcomer> {
    let mut seen = HashSet::new();
    let mut result = Vec::new();
    for entry in entries {
        for author in canonical_authors(entry, resolver) {
            if seen.insert(alias_key(&author)) {
                result.push(Newcomer {
                    author,
                    first_commit: entry.date,
                });
            }
        }
    }
    debug!(count = result.len(), "collected newcomers");
    result
}

/// Number of distinct contributors active in each calendar month.
pub fn monthly_active(
    entries: &[LogEntry],
    resolver: Option<&AliasResolver>,
) -> BTreeMap<YearMonth, usize> {
    let mut active: HashMap<YearMonth, HashSet<String>> = HashMap::new();
    for entry in entries {
        let month = YearMonth::of(&entry.date);
        let authors = active.entry(month).or_default();
        for author in canonical_authors(entry, resolver) {
            authors.insert(alias_key(&author));
        }
    }
    active
        .into_iter()
        .map(|(month, authors)| (month, authors.len()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(author: &str, y: i32, m: u32, d: u32) -> LogEntry {
        LogEntry {
            author: author.to_string(),
            date: Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap(),
        }
    }

    fn sample() -> Vec<LogEntry> {
        vec![
            entry("Jane Doe <jane@x.com>", 2018, 1, 1),
            entry("jdoe <jane@x.com>", 2018, 1, 15),
            entry("Max Power <max@y.org>", 2018, 2, 3),
            entry("Jane Doe <jane@x.com> and Ann Other <ann@z.net>", 2018, 2, 20),
        ]
    }

    #[test]
    fn test_newcomers_without_resolver_use_raw_lines() {
        let result = newcomers(&sample(), None);
        assert_eq!(result.len(), 4);
        assert_eq!(result[1].author, "jdoe <jane@x.com>");
    }

    #[test]
    fn test_newcomers_with_resolver() {
        let mut resolver = AliasResolver::default();
        resolver.initialize_from_author_list(["Jane Doe <jane@x.com>;jdoe <jane@x.com>"]);

        let result = newcomers(&sample(), Some(&resolver));
        let names: Vec<&str> = result.iter().map(|n| n.author.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Jane Doe <jane@x.com>",
                "Max Power <max@y.org>",
                "Ann Other <ann@z.net>",
            ]
        );
        assert_eq!(
            result[2].first_commit,
            Utc.with_ymd_and_hms(2018, 2, 20, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_monthly_active() {
        let mut resolver = AliasResolver::default();
        resolver.initialize_from_author_list(["Jane Doe <jane@x.com>;jdoe <jane@x.com>"]);

        let active = monthly_active(&sample(), Some(&resolver));
        let counts: Vec<(String, usize)> = active
            .iter()
            .map(|(m, c)| (m.to_string(), *c))
            .collect();
        assert_eq!(
            counts,
            vec![("2018-01".to_string(), 1), ("2018-02".to_string(), 3)]
        );
    }
}
