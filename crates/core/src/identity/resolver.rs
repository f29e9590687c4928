//! Alias candidate generation and author consolidation.
//!
//! [`AliasResolver`] combines the parsed parts of an author string with the
//! name-feed relations to produce every spelling that plausibly denotes the
//! same person, and keeps an [`AliasIndex`] of known people to map raw
//! author lines to canonical names.

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, info, warn};

use super::alias_index::{AliasIndex, ClassId};
use super::aliases::AliasSet;
use super::common::CommonNames;
use super::name_feed::NameFeed;
use super::parser::{authors_from_line, ParsedAuthor};
use crate::config::{AppConfig, IdentityConfig};
use crate::errors::FeedError;

/// Co-author markers rewritten to `", "` before a line is split.
const AUTHOR_SEPARATORS: &[&str] = &[" and ", " / ", " & "];

/// Separator between the names of an author line once markers are rewritten.
/// A bare `,` may occur inside a single author, e.g. in a mail list.
const NAME_SEPARATOR: &str = ", ";

static PLUS_MARKER: OnceLock<Regex> = OnceLock::new();

/// `plus ` as a word of its own: at the start of the line or after a space
/// or comma, never inside a name such as "Surplus".
fn plus_marker() -> &'static Regex {
    PLUS_MARKER.get_or_init(|| Regex::new(r"(^|,|\s)plus\s+").expect("plus regex must compile"))
}

/// Resolves raw author strings to canonical contributor names.
#[derive(Debug, Clone)]
pub struct AliasResolver {
    feed: NameFeed,
    common: CommonNames,
    /// Known people; the first member of each class is its canonical name.
    index: AliasIndex,
    boilerplate: Vec<String>,
}

impl Default for AliasResolver {
    fn default() -> Self {
        Self::new(NameFeed::new(), CommonNames::default())
    }
}

impl AliasResolver {
    pub fn new(feed: NameFeed, common: CommonNames) -> Self {
        Self {
            feed,
            common,
            index: AliasIndex::new(),
            boilerplate: IdentityConfig::default().boilerplate_suffixes,
        }
    }

    /// Build a resolver from configuration, loading the name feed and the
    /// curated author list if they are configured.
    pub fn from_config(config: &AppConfig) -> Result<Self, FeedError> {
        info!("initializing alias resolver");

        let feed = match &config.identity.names_feed {
            Some(path) if path.exists() => NameFeed::load(path)?,
            Some(path) => {
                warn!(path = %path.display(), "name feed not found, starting without it");
                NameFeed::new()
            }
            None => {
                debug!("no name feed configured");
                NameFeed::new()
            }
        };

        let mut resolver = Self::new(feed, CommonNames::from_config(&config.common_names))
            .with_boilerplate(config.identity.boilerplate_suffixes.clone());

        match &config.identity.author_list {
            Some(path) if path.exists() => {
                resolver.load_author_list(path)?;
            }
            Some(path) => {
                warn!(path = %path.display(), "author list not found, starting without it");
            }
            None => debug!("no author list configured"),
        }

        Ok(resolver)
    }

    /// Replace the organisation boilerplate stripped from author lines.
    pub fn with_boilerplate(mut self, suffixes: Vec<String>) -> Self {
        self.boilerplate = suffixes;
        self
    }

    pub fn feed(&self) -> &NameFeed {
        &self.feed
    }

    pub fn index(&self) -> &AliasIndex {
        &self.index
    }

    /// Every alias plausibly denoting the same person as `raw`.
    ///
    /// The result always starts with `raw`. Mail-derived aliases come next,
    /// then name-derived ones, then the login. Tokens the common-name filter
    /// rejects are never added on their own.
    pub fn candidates(&self, raw: &str) -> AliasSet {
        let mut found = AliasSet::new();
        found.insert(raw);

        let author = ParsedAuthor::parse(raw);
        if let Some(mail) = author.mail() {
            found.insert(mail);
            let local = mail.split_once('@').map_or(mail, |(local, _)| local);
            if !self.common.is_very_common(local) {
                found.insert(local);
            }
            // user+tag@domain
            if let Some((user, _)) = local.split_once('+') {
                if !self.common.is_very_common(user) {
                    found.insert(user);
                }
            }
            found.extend(self.feed.names_for_mail(mail));
            found.extend(self.feed.mails_like(mail));
        }

        if let Some(name) = author.name() {
            if !self.common.is_very_common(name) {
                found.insert(name);
                found.extend(self.feed.names_like(name));
                found.extend(self.feed.mails_for_name(name));
            }
        }

        // Logins are specific enough to skip the filter.
        if let Some(login) = author.login() {
            found.insert(login);
        }

        found
    }

    /// Seed the index from a curated roster.
    ///
    /// Each line lists the known aliases of one person, separated by `;` or
    /// `,`. The aliases and all their parsed parts are merged as one class;
    /// the first alias on the line becomes the canonical name. Returns the
    /// number of lines merged.
    pub fn initialize_from_author_list<I, S>(&mut self, lines: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut merged = 0;
        for line in lines {
            let mut aliases = AliasSet::new();
            for author in authors_from_line(line.as_ref()) {
                aliases.extend(author.all_parts());
            }
            if self.index.merge(aliases).is_some() {
                merged += 1;
            }
        }
        info!(
            lines = merged,
            people = self.index.len(),
            "author list merged"
        );
        merged
    }

    /// Read a curated roster from disk and merge it.
    pub fn load_author_list<P: AsRef<Path>>(&mut self, path: P) -> Result<usize, FeedError> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading author list");

        if !path.exists() {
            return Err(FeedError::FileNotFound(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)?;
        Ok(self.initialize_from_author_list(contents.lines()))
    }

    /// Group raw author names into people.
    ///
    /// Each element may hold several comma-separated names. Every name's
    /// candidates are merged into a copy of the seeded index, so the
    /// resolver itself is left untouched. Groups contain only the given
    /// names, in order of first appearance.
    pub fn consolidate<I, S>(&self, raw_names: I) -> Vec<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut working = self.index.clone();
        let mut seen = AliasSet::new();
        for line in raw_names {
            for name in split_on_commas(line.as_ref()) {
                working.merge(self.candidates(name));
                seen.insert(name);
            }
        }

        let mut positions: HashMap<ClassId, usize> = HashMap::new();
        let mut groups: Vec<Vec<String>> = Vec::new();
        for name in seen {
            let Some(id) = working.class_id(&name) else {
                continue;
            };
            let pos = *positions.entry(id).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[pos].push(name);
        }

        info!(people = groups.len(), "authors consolidated");
        groups
    }

    /// Merge the candidates of raw author names into the resolver's own
    /// index, so later [`deanonymize`](Self::deanonymize) calls know them.
    pub fn absorb_authors<I, S>(&mut self, raw_names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in raw_names {
            for name in split_on_commas(line.as_ref()) {
                let candidates = self.candidates(name);
                self.index.merge(candidates);
            }
        }
        debug!(people = self.index.len(), "absorbed authors");
    }

    /// Split an author line naming several people into individual names.
    pub fn split_authors(&self, line: &str) -> Vec<String> {
        let mut line = plus_marker().replace_all(line, "$1").into_owned();
        for suffix in &self.boilerplate {
            line = line.replace(suffix.as_str(), "");
        }
        for sep in AUTHOR_SEPARATORS {
            line = line.replace(*sep, NAME_SEPARATOR);
        }
        line.split(NAME_SEPARATOR)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Canonical name of one author, or the name itself if nobody known
    /// matches any of its candidates.
    pub fn canonical_name(&self, name: &str) -> String {
        self.candidates(name)
            .iter()
            .find_map(|alias| self.index.representative(alias))
            .map_or_else(|| name.to_string(), str::to_string)
    }

    /// Canonical names of every author on a raw author line.
    pub fn deanonymize(&self, raw_line: &str) -> Vec<String> {
        self.split_authors(raw_line)
            .iter()
            .map(|name| self.canonical_name(name))
            .collect()
    }
}

fn split_on_commas(line: &str) -> impl Iterator<Item = &str> {
    line.split(',').map(str::trim).filter(|s| !s.is_empty())
}
