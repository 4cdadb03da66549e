use crate::loader::DirLoader;
use crate::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// JSON document for a single loot table, tagged by `type`
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TableDocument {
    Empty,
    Weighted(WeightedConfig),
}

/// Configuration for a weighted table
#[derive(Debug, Deserialize)]
pub struct WeightedConfig {
    #[serde(default)]
    pub rolls: Vec<RollConfig>,
    #[serde(default)]
    pub entries: Vec<EntryConfig>,
}

/// Weighted roll count option
#[derive(Debug, Deserialize)]
pub struct RollConfig {
    pub count: u32,
    pub weight: u32,
}

/// Configuration for a single entry in a weighted table
#[derive(Debug, Deserialize)]
pub struct EntryConfig {
    #[serde(rename = "type")]
    pub entry_type: String,
    #[serde(default)]
    pub weight: u32,
    #[serde(default)]
    pub rarity_bonus: u32,
    #[serde(default)]
    pub min_level: Option<u32>,
    #[serde(default)]
    pub max_level: Option<u32>,

    // Item-specific fields
    #[serde(default)]
    pub item_id: Option<u32>,
    #[serde(default)]
    pub count: Option<CountConfig>,
}

/// Count can be a single value or a range [min, max]
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CountConfig {
    Single(u32),
    Range([u32; 2]),
}

impl CountConfig {
    pub fn min(&self) -> u32 {
        match self {
            CountConfig::Single(v) => *v,
            CountConfig::Range([min, _]) => *min,
        }
    }

    pub fn max(&self) -> u32 {
        match self {
            CountConfig::Single(v) => *v,
            CountConfig::Range([_, max]) => *max,
        }
    }
}

/// What a registry build does when a rule key or inline table is malformed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Discard every rule in the document and return an empty registry
    #[default]
    DiscardAll,
    /// Drop only the offending rule and keep the rest
    SkipEntry,
}

/// Where registry and table files live, and how load failures are handled
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Root directory that registry names are resolved against
    pub root: PathBuf,
    /// Subdirectory of `root` holding referenced table files
    pub table_dir: String,
    pub on_error: FailurePolicy,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("data"),
            table_dir: "loot".to_string(),
            on_error: FailurePolicy::default(),
        }
    }
}

impl LoaderConfig {
    /// Load loader configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            error: e,
            path: Some(path.to_path_buf()),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            error: e,
            path: path.to_path_buf(),
        })
    }

    /// Parse loader configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            error: e,
            path: PathBuf::from("<string>"),
        })
    }

    /// A filesystem loader rooted at `root`
    pub fn loader(&self) -> DirLoader {
        DirLoader::new(&self.root)
    }

    /// Path of a referenced table file, relative to the loader root
    pub fn table_path(&self, name: &str) -> PathBuf {
        Path::new(&self.table_dir).join(name)
    }
}
