//! loot_registry - Config-driven lookup from integer ids to loot tables
//!
//! This library provides:
//! - Selector: parsed `1-3,7,9-12` range expressions over matcher ids
//! - LootRegistry: ordered (Selector, LootTable) rules loaded from a JSON document
//! - LootTable: the tables a registry resolves to, including the shared empty table
//! - ResourceLoader: the seam through which registry and table files are read
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use loot_registry::{LootContext, LootRegistry, LoaderConfig};
//!
//! let config = LoaderConfig::load(Path::new("config/loot.toml"))?;
//! let loader = config.loader();
//! let registry = LootRegistry::load_with(&loader, "monster_drops.json", &config);
//!
//! let table = registry.get(20010101);
//! let drops = table.produce(&LootContext::default(), &mut rand::thread_rng());
//! ```

mod config;
mod drop;
mod loader;
mod registry;
mod selector;
mod table;

#[cfg(test)]
mod testing;

pub use config::{FailurePolicy, LoaderConfig};
pub use drop::{Drop, LootContext};
pub use loader::{load_table, try_load_table, DirLoader, MemoryLoader, ResourceLoader};
pub use registry::{LootRegistry, Rule};
pub use selector::Selector;
pub use table::{LootTable, TableError, WeightedTable};

use std::path::PathBuf;
use thiserror::Error;

/// Error parsing a selector expression
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid selector '{input}': {kind}")]
pub struct SelectorParseError {
    pub input: String,
    pub kind: SelectorErrorKind,
}

/// Why a selector expression was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorErrorKind {
    #[error("empty segment")]
    EmptySegment,
    #[error("'{0}' is not an integer")]
    InvalidInteger(String),
    #[error("segment has more than one '-'")]
    MalformedRange,
    #[error("range {lo}-{hi} has lower bound above upper bound")]
    ReversedRange { lo: u32, hi: u32 },
}

/// Error building a registry or loading a table document
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error reading '{path}': {error}")]
    Io {
        error: std::io::Error,
        path: PathBuf,
    },
    #[error("JSON error in '{path}': {error}")]
    Json {
        error: serde_json::Error,
        path: PathBuf,
    },
    #[error("Registry document '{path}' is not a JSON object")]
    NotAnObject { path: PathBuf },
    #[error("Rule '{key}' must be an object or a file name, found {kind}")]
    InvalidValue { key: String, kind: &'static str },
    #[error(transparent)]
    Selector(#[from] SelectorParseError),
    #[error("Inline table for rule '{key}': {error}")]
    InlineTable {
        key: String,
        error: serde_json::Error,
    },
}

/// Error loading loader configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading '{path:?}': {error}")]
    Io {
        error: std::io::Error,
        path: Option<PathBuf>,
    },
    #[error("Parse error in '{path}': {error}")]
    Parse {
        error: toml::de::Error,
        path: PathBuf,
    },
}
