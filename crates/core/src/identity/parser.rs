//! Decomposition of raw author strings into name, login and mail parts.
//!
//! Author strings found in commit histories look like
//! `Display Name [login] <mail@domain>`, with any subset of the three parts
//! present. Parsing never fails: a string that matches none of the patterns
//! is taken as a bare mail address or, failing that, as a bare name.

use std::sync::OnceLock;

use regex::Regex;

static PATTERNS: OnceLock<AuthorPatterns> = OnceLock::new();

/// Pre-compiled author-line patterns.
#[derive(Debug)]
struct AuthorPatterns {
    name: Regex,
    login: Regex,
    mail: Regex,
}

impl AuthorPatterns {
    fn new() -> Self {
        Self {
            // Leading display name. U+FFFD shows up where historical data
            // was decoded with the wrong charset.
            name: Regex::new(r"^(?P<name>[\w \-?.'\x{FFFD}]+[\w?])(?:[ <]|$)")
                .expect("name regex must compile"),

            // `Name [login]` or `Name (login)`, optionally followed by a mail
            // part. ` -?` is a character range.
            login: Regex::new(r"^(?P<name>[\w -?.]+) (?:\[|\():?(?P<login>\w+)(?:\)|\])(?: <|$)")
                .expect("login regex must compile"),

            // Trailing `<mail>`; the closing bracket may be cut off.
            mail: Regex::new(r"<(?P<mail>[^>]+)>?$").expect("mail regex must compile"),
        }
    }
}

fn patterns() -> &'static AuthorPatterns {
    PATTERNS.get_or_init(AuthorPatterns::new)
}

/// The structural parts of one raw author string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAuthor {
    raw: String,
    name: Option<String>,
    login: Option<String>,
    mail: Option<String>,
}

impl ParsedAuthor {
    pub fn parse(raw: &str) -> Self {
        let p = patterns();

        let name = p
            .name
            .captures(raw)
            .and_then(|c| c.name("name"))
            .map(|m| m.as_str().to_string());
        let login = p
            .login
            .captures(raw)
            .and_then(|c| c.name("login"))
            .map(|m| m.as_str().to_string());
        let mail = p
            .mail
            .captures(raw)
            .and_then(|c| c.name("mail"))
            .map(|m| m.as_str().to_string());

        if name.is_none() && login.is_none() && mail.is_none() {
            return if raw.contains('@') && !raw.contains(' ') {
                Self {
                    raw: raw.to_string(),
                    name: None,
                    login: None,
                    mail: Some(raw.trim_matches(|c| c == '<' || c == '>').to_string()),
                }
            } else {
                Self {
                    raw: raw.to_string(),
                    name: Some(raw.to_string()),
                    login: None,
                    mail: None,
                }
            };
        }

        Self {
            raw: raw.to_string(),
            name,
            login,
            mail,
        }
    }

    /// The string as it was given.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn login(&self) -> Option<&str> {
        self.login.as_deref()
    }

    pub fn mail(&self) -> Option<&str> {
        self.mail.as_deref()
    }

    /// The raw string followed by every part that was found.
    pub fn all_parts(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.raw.as_str())
            .chain(self.name())
            .chain(self.mail())
            .chain(self.login())
    }
}

/// Parse one line of a curated roster: aliases separated by `;` or `,`.
pub fn authors_from_line(line: &str) -> Vec<ParsedAuthor> {
    line.split([';', ','])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ParsedAuthor::parse)
        .collect()
}
