//! TOML-based configuration for gitnewcomers.
//!
//! Every section and field is optional; an empty file yields the built-in
//! defaults. Command-line flags override the values loaded here.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::ConfigError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level application configuration loaded from a TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Process-wide settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Alias sources and multi-author line handling.
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Tokens too generic to identify a person.
    #[serde(default)]
    pub common_names: CommonNamesConfig,
}

// ---------------------------------------------------------------------------
// General
// ---------------------------------------------------------------------------

/// Process-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Minimum tracing level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "warn".into()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Where aliases come from and how multi-author lines are recognised.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Name-mapping feed with `u2n` / `n2u` / `m2m` records.
    #[serde(default)]
    pub names_feed: Option<PathBuf>,

    /// Curated roster, one person per line.
    #[serde(default)]
    pub author_list: Option<PathBuf>,

    /// Organisation boilerplate stripped from author lines before splitting.
    #[serde(default = "default_boilerplate_suffixes")]
    pub boilerplate_suffixes: Vec<String>,
}

fn default_boilerplate_suffixes() -> Vec<String> {
    vec!["and the rest of the Xiph.Org Foundation".into()]
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            names_feed: None,
            author_list: None,
            boilerplate_suffixes: default_boilerplate_suffixes(),
        }
    }
}

// ---------------------------------------------------------------------------
// Common names
// ---------------------------------------------------------------------------

/// Settings for the very-common-name filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommonNamesConfig {
    /// Tokens shorter than this many characters never form an alias.
    #[serde(default = "default_min_len")]
    pub min_len: usize,

    /// Additional stoplist entries on top of the built-in list.
    #[serde(default)]
    pub extra: Vec<String>,
}

fn default_min_len() -> usize {
    5
}

impl Default for CommonNamesConfig {
    fn default() -> Self {
        Self {
            min_len: default_min_len(),
            extra: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading & validation
// ---------------------------------------------------------------------------

impl AppConfig {
    /// Load configuration from a TOML file at `path`.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading configuration");

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        debug!("configuration parsed successfully");
        Ok(config)
    }

    /// Validate that all values are sane and referenced files exist.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.common_names.min_len == 0 {
            return Err(ConfigError::InvalidValue {
                field: "common_names.min_len".into(),
                detail: "must be at least 1".into(),
            });
        }
        if let Some(ref path) = self.identity.names_feed {
            if !path.exists() {
                return Err(ConfigError::InvalidValue {
                    field: "identity.names_feed".into(),
                    detail: format!("file not found: {}", path.display()),
                });
            }
        }
        if let Some(ref path) = self.identity.author_list {
            if !path.exists() {
                return Err(ConfigError::InvalidValue {
                    field: "identity.author_list".into(),
                    detail: format!("file not found: {}", path.display()),
                });
            }
        }
        if self.identity.boilerplate_suffixes.iter().any(|s| s.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "identity.boilerplate_suffixes".into(),
                detail: "entries must not be blank".into(),
            });
        }

        Ok(())
    }

    /// Convenience: load and validate in one call.
    pub fn load_and_validate<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = Self::load_from_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Annotated configuration written by `gitnewcomers init`.
    pub fn default_toml() -> &'static str {
        r#"# gitnewcomers configuration
# Every value is optional; command-line flags take precedence.

[general]
log_level = "warn"

[identity]
# names_feed = "names.csv"
# author_list = "authors.txt"
boilerplate_suffixes = ["and the rest of the Xiph.Org Foundation"]

[common_names]
min_len = 5
# extra = ["jonas", "buildbot"]
"#
    }
}
