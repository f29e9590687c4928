//! Mail/name relations loaded from an external name-mapping feed.
//!
//! The feed is a `;`-separated text file with three record kinds:
//!
//! ```text
//! u2n;<mail>;<x>;<x>;<name>=<x>
//! n2u;<x>;<name>;<x>;<mail>=<x>[;<mail>=<x>...]
//! m2m;<mail>;<mail>
//! ```
//!
//! Mail-to-name and name-to-mail are plain multimaps. Mail-to-mail and
//! name-to-name are equivalence relations: whenever one mail is linked to a
//! second name, or one name to a second mail, the alternatives are fused so
//! that later lookups see every spelling regardless of record order.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info};

use super::alias_index::AliasIndex;
use super::aliases::{alias_key, AliasSet};
use crate::errors::FeedError;

/// Counts reported after loading feed records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedStats {
    /// Records that produced at least one link.
    pub applied: usize,
    /// Records ignored for having too few fields or empty values.
    pub skipped: usize,
}

/// The four alias relations derived from a name feed.
#[derive(Debug, Clone, Default)]
pub struct NameFeed {
    mail_to_names: HashMap<String, AliasSet>,
    name_to_mails: HashMap<String, AliasSet>,
    mail_aliases: AliasIndex,
    name_aliases: AliasIndex,
}

impl NameFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a feed file from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, FeedError> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading name feed");

        if !path.exists() {
            return Err(FeedError::FileNotFound(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)?;
        let mut feed = Self::new();
        feed.load_lines(contents.lines())?;
        Ok(feed)
    }

    /// Apply feed records in order. An unknown record tag aborts loading.
    pub fn load_lines<I, S>(&mut self, lines: I) -> Result<FeedStats, FeedError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut stats = FeedStats::default();
        for (idx, line) in lines.into_iter().enumerate() {
            let line = line.as_ref().trim_end();
            if line.trim().is_empty() {
                continue;
            }
            if self.apply_record(idx + 1, line)? {
                stats.applied += 1;
            } else {
                stats.skipped += 1;
            }
        }
        info!(
            applied = stats.applied,
            skipped = stats.skipped,
            mails = self.mail_to_names.len(),
            names = self.name_to_mails.len(),
            "name feed loaded"
        );
        Ok(stats)
    }

    /// Returns whether the record linked anything.
    fn apply_record(&mut self, line_no: usize, line: &str) -> Result<bool, FeedError> {
        let fields: Vec<&str> = line.split(';').collect();
        match fields[0] {
            "u2n" => {
                if fields.len() < 5 {
                    debug!(line = line_no, "skipping u2n record without name");
                    return Ok(false);
                }
                Ok(self.link_mail_and_name(fields[1], value_of(fields[4])))
            }
            "n2u" => {
                if fields.len() < 5 {
                    debug!(line = line_no, "skipping n2u record without mail");
                    return Ok(false);
                }
                let name = fields[2];
                let mut linked = false;
                for entry in fields[4..].iter().flat_map(|f| f.split(',')) {
                    linked |= self.link_mail_and_name(value_of(entry), name);
                }
                Ok(linked)
            }
            "m2m" => {
                let (a, b) = match fields.len() {
                    3 => (fields[1], fields[2]),
                    n if n >= 4 => (fields[2], fields[3]),
                    _ => {
                        debug!(line = line_no, "skipping m2m record with one mail");
                        return Ok(false);
                    }
                };
                Ok(self.link_mails(a, b))
            }
            tag => Err(FeedError::UnknownTag {
                line: line_no,
                tag: tag.to_string(),
            }),
        }
    }

    /// Link a mail address to a name, keeping the alias relations consistent.
    ///
    /// If the mail already had other names, those names and `name` become
    /// aliases of each other; likewise for other mails already linked to
    /// `name`. Returns `false` if either value is blank.
    pub fn link_mail_and_name(&mut self, mail: &str, name: &str) -> bool {
        let (mail, name) = (mail.trim(), name.trim());
        if mail.is_empty() || name.is_empty() {
            return false;
        }

        let names = self.mail_to_names.entry(alias_key(mail)).or_default();
        if names.insert(name) && names.len() > 1 {
            let alternatives: Vec<String> = names.iter().map(str::to_string).collect();
            self.name_aliases.merge(alternatives);
        }

        let mails = self.name_to_mails.entry(alias_key(name)).or_default();
        if mails.insert(mail) && mails.len() > 1 {
            let alternatives: Vec<String> = mails.iter().map(str::to_string).collect();
            self.mail_aliases.merge(alternatives);
        }
        true
    }

    /// Declare two mail addresses to belong to the same person.
    pub fn link_mails(&mut self, mail: &str, other: &str) -> bool {
        let (mail, other) = (mail.trim(), other.trim());
        if mail.is_empty() || other.is_empty() {
            return false;
        }
        self.mail_aliases.merge([mail, other]);
        true
    }

    /// Names linked to a mail address.
    pub fn names_for_mail<'a>(&'a self, mail: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.mail_to_names
            .get(&alias_key(mail))
            .into_iter()
            .flat_map(AliasSet::iter)
    }

    /// Mail addresses linked to a name.
    pub fn mails_for_name<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.name_to_mails
            .get(&alias_key(name))
            .into_iter()
            .flat_map(AliasSet::iter)
    }

    /// Other mail addresses of the same person, excluding `mail` itself.
    pub fn mails_like<'a>(&'a self, mail: &str) -> impl Iterator<Item = &'a str> + 'a {
        others_in(&self.mail_aliases, mail)
    }

    /// Other names of the same person, excluding `name` itself.
    pub fn names_like<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a str> + 'a {
        others_in(&self.name_aliases, name)
    }

    pub fn is_empty(&self) -> bool {
        self.mail_to_names.is_empty() && self.mail_aliases.is_empty()
    }
}

fn others_in<'a>(index: &'a AliasIndex, alias: &str) -> impl Iterator<Item = &'a str> + 'a {
    let key = alias_key(alias);
    index
        .lookup(alias)
        .into_iter()
        .flat_map(AliasSet::iter)
        .filter(move |a| alias_key(a) != key)
}

/// The part of a feed field before its `=` annotation.
fn value_of(field: &str) -> &str {
    field.split_once('=').map_or(field, |(value, _)| value).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted<'a>(it: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
        let mut v: Vec<&str> = it.collect();
        v.sort();
        v
    }

    #[test]
    fn test_u2n_links_both_directions() {
        let mut feed = NameFeed::new();
        let stats = feed
            .load_lines(["u2n;jane@x.com;1;2;Jane Doe=17"])
            .unwrap();
        assert_eq!(stats, FeedStats { applied: 1, skipped: 0 });
        assert_eq!(sorted(feed.names_for_mail("JANE@x.com")), vec!["Jane Doe"]);
        assert_eq!(sorted(feed.mails_for_name("jane doe")), vec!["jane@x.com"]);
    }

    #[test]
    fn test_short_u2n_record_is_skipped() {
        let mut feed = NameFeed::new();
        let stats = feed.load_lines(["u2n;jane@x.com;1;2"]).unwrap();
        assert_eq!(stats, FeedStats { applied: 0, skipped: 1 });
        assert!(feed.is_empty());
    }

    #[test]
    fn test_short_n2u_and_m2m_records_are_skipped() {
        let mut feed = NameFeed::new();
        let stats = feed.load_lines(["n2u;x;Jane Doe;x", "m2m;a@x.com"]).unwrap();
        assert_eq!(stats, FeedStats { applied: 0, skipped: 2 });
        assert!(feed.is_empty());
        assert_eq!(feed.mails_for_name("Jane Doe").count(), 0);
        assert_eq!(feed.mails_like("a@x.com").count(), 0);
    }

    #[test]
    fn test_n2u_links_every_mail() {
        let mut feed = NameFeed::new();
        feed.load_lines(["n2u;x;Jane Doe;x;jane@x.com=3;jd@y.org=1, jane@z.net=2"])
            .unwrap();
        assert_eq!(
            sorted(feed.mails_for_name("Jane Doe")),
            vec!["jane@x.com", "jane@z.net", "jd@y.org"]
        );
        // Mails sharing a name become aliases of each other.
        assert_eq!(
            sorted(feed.mails_like("jd@y.org")),
            vec!["jane@x.com", "jane@z.net"]
        );
    }

    #[test]
    fn test_m2m_both_layouts() {
        let mut feed = NameFeed::new();
        feed.load_lines(["m2m;a@x.com;b@x.com", "m2m;ignored;b@x.com;c@x.com"])
            .unwrap();
        assert_eq!(
            sorted(feed.mails_like("a@x.com")),
            vec!["b@x.com", "c@x.com"]
        );
    }

    #[test]
    fn test_mail_with_two_names_links_names() {
        let mut feed = NameFeed::new();
        feed.load_lines([
            "u2n;jane@x.com;1;2;Jane Doe=1",
            "u2n;jane@x.com;1;2;J. Doe=1",
            "u2n;other@x.com;1;2;Janie=1",
            "u2n;other@x.com;1;2;J. Doe=1",
        ])
        .unwrap();

        // Janie is reached through the second mail's J. Doe link.
        assert_eq!(
            sorted(feed.names_like("Jane Doe")),
            vec!["J. Doe", "Janie"]
        );
        // J. Doe now has two mails, which are fused as well.
        assert_eq!(sorted(feed.mails_like("jane@x.com")), vec!["other@x.com"]);
    }

    #[test]
    fn test_consistency_is_order_independent() {
        let records = [
            "u2n;a@x.com;1;2;Alpha Name=1",
            "u2n;b@x.com;1;2;Alpha Name=1",
            "u2n;b@x.com;1;2;Beta Name=1",
        ];
        let mut forward = NameFeed::new();
        forward.load_lines(records).unwrap();
        let mut backward = NameFeed::new();
        backward.load_lines(records.iter().rev()).unwrap();

        for feed in [&forward, &backward] {
            assert_eq!(sorted(feed.mails_like("a@x.com")), vec!["b@x.com"]);
            assert_eq!(sorted(feed.names_like("Beta Name")), vec!["Alpha Name"]);
        }
    }

    #[test]
    fn test_unknown_tag_is_fatal() {
        let mut feed = NameFeed::new();
        let result = feed.load_lines(["u2n;a@x.com;1;2;A Name=1", "", "x2y;foo"]);
        assert!(matches!(
            result,
            Err(FeedError::UnknownTag { line: 3, ref tag }) if tag == "x2y"
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("names.csv");
        std::fs::write(&path, "u2n;jane@x.com;1;2;Jane Doe=1\r\nm2m;jane@x.com;jd@y.org\n")
            .unwrap();

        let feed = NameFeed::load(&path).unwrap();
        assert_eq!(sorted(feed.names_for_mail("jane@x.com")), vec!["Jane Doe"]);
        assert_eq!(sorted(feed.mails_like("jane@x.com")), vec!["jd@y.org"]);
    }

    #[test]
    fn test_load_nonexistent() {
        let result = NameFeed::load("/nonexistent/names.csv");
        assert!(matches!(result, Err(FeedError::FileNotFound(_))));
    }
}
