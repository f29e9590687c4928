//! gitnewcomers core library.
//!
//! This crate resolves the many spellings of a repository contributor to one
//! canonical identity and derives contributor statistics from `git log`
//! exports: configuration, author-string parsing, alias indexing, and log
//! scanning.

pub mod config;
pub mod errors;
pub mod identity;
pub mod history;

// Re-exports for convenience.
pub use config::AppConfig;
pub use identity::AliasResolver;
pub use history::GitLog;
