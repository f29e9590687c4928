//! Contributor identity resolution.
//!
//! The resolution pipeline is:
//! 1. Parse a raw author string into name, login and mail parts
//! 2. Expand the parts into alias candidates, consulting the name feed
//! 3. Merge candidate sets into equivalence classes of aliases
//!
//! A curated author list seeds the classes and decides which spelling is
//! canonical for each person.

pub mod alias_index;
pub mod aliases;
pub mod common;
pub mod name_feed;
pub mod parser;
pub mod resolver;

pub use alias_index::{AliasIndex, ClassId};
pub use aliases::AliasSet;
pub use common::CommonNames;
pub use name_feed::{FeedStats, NameFeed};
pub use parser::ParsedAuthor;
pub use resolver::AliasResolver;
