use crate::config::LoaderConfig;
use crate::table::LootTable;
use crate::LoadError;
use std::collections::HashMap;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::error;

/// Source of registry and table documents, addressed by relative path
pub trait ResourceLoader: Send + Sync {
    /// Open a resource for reading. The returned reader is dropped by the caller
    /// on every path, so implementations may hold handles inside it.
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>>;
}

/// Reads resources from a directory on disk
#[derive(Debug, Clone)]
pub struct DirLoader {
    root: PathBuf,
}

impl DirLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ResourceLoader for DirLoader {
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>> {
        let file = std::fs::File::open(self.root.join(path))?;
        Ok(Box::new(io::BufReader::new(file)))
    }
}

/// Serves resources from memory, for embedded data and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    files: HashMap<PathBuf, Vec<u8>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a resource
    pub fn insert(&mut self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), content.into());
    }

    /// Builder form of [`MemoryLoader::insert`]
    pub fn with(mut self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> Self {
        self.insert(path, content);
        self
    }
}

impl ResourceLoader for MemoryLoader {
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>> {
        match self.files.get(path) {
            Some(bytes) => Ok(Box::new(bytes.as_slice())),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no resource at '{}'", path.display()),
            )),
        }
    }
}

/// Read and parse a JSON document through the loader
pub(crate) fn read_json<T: serde::de::DeserializeOwned>(
    loader: &dyn ResourceLoader,
    path: &Path,
) -> Result<T, LoadError> {
    let reader = loader.open(path).map_err(|e| LoadError::Io {
        error: e,
        path: path.to_path_buf(),
    })?;

    serde_json::from_reader(reader).map_err(|e| LoadError::Json {
        error: e,
        path: path.to_path_buf(),
    })
}

/// Load a referenced table file from the configured table directory
pub fn try_load_table(
    loader: &dyn ResourceLoader,
    name: &str,
    config: &LoaderConfig,
) -> Result<Arc<LootTable>, LoadError> {
    let table: LootTable = read_json(loader, &config.table_path(name))?;
    Ok(table.into_shared())
}

/// Load a referenced table file, falling back to the shared empty table on any failure
pub fn load_table(loader: &dyn ResourceLoader, name: &str, config: &LoaderConfig) -> Arc<LootTable> {
    match try_load_table(loader, name, config) {
        Ok(table) => table,
        Err(e) => {
            error!(resource = name, error = %e, "Unable to load loot table");
            LootTable::empty()
        }
    }
}
