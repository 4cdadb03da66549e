use crate::config::{FailurePolicy, LoaderConfig};
use crate::loader::{load_table, read_json, ResourceLoader};
use crate::selector::Selector;
use crate::table::LootTable;
use crate::LoadError;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error};

/// One selector and the table it resolves to
#[derive(Debug, Clone)]
pub struct Rule {
    selector: Selector,
    table: Arc<LootTable>,
}

impl Rule {
    /// Selector this rule matches against
    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Table returned when the selector matches
    pub fn table(&self) -> &Arc<LootTable> {
        &self.table
    }
}

/// Ordered (selector, table) rules loaded from one JSON document.
///
/// Rules keep the key order of the document and the first matching rule wins,
/// so overlapping selectors resolve to whichever appears first. A registry is
/// never mutated after it is built; [`LootRegistry::reload`] returns a new one.
#[derive(Debug, Clone)]
pub struct LootRegistry {
    name: String,
    rules: Vec<Rule>,
}

impl LootRegistry {
    /// A registry with no rules; every lookup yields the empty table
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
        }
    }

    /// Load a registry with the default configuration
    pub fn load(loader: &dyn ResourceLoader, name: &str) -> Self {
        Self::load_with(loader, name, &LoaderConfig::default())
    }

    /// Load a registry, returning an empty one if the document cannot be used
    pub fn load_with(loader: &dyn ResourceLoader, name: &str, config: &LoaderConfig) -> Self {
        match Self::try_load(loader, name, config) {
            Ok(registry) => registry,
            Err(e) => {
                error!(registry = name, error = %e, "Unable to load loot registry");
                Self::empty(name)
            }
        }
    }

    /// Load a registry, surfacing the error that would have discarded it
    pub fn try_load(
        loader: &dyn ResourceLoader,
        name: &str,
        config: &LoaderConfig,
    ) -> Result<Self, LoadError> {
        let document: Value = read_json(loader, Path::new(name))?;
        Self::from_value(name, document, loader, config)
    }

    /// Build a registry from an in-memory JSON document
    pub fn from_json_str(
        name: &str,
        json: &str,
        loader: &dyn ResourceLoader,
        config: &LoaderConfig,
    ) -> Result<Self, LoadError> {
        let document: Value = serde_json::from_str(json).map_err(|e| LoadError::Json {
            error: e,
            path: name.into(),
        })?;
        Self::from_value(name, document, loader, config)
    }

    fn from_value(
        name: &str,
        document: Value,
        loader: &dyn ResourceLoader,
        config: &LoaderConfig,
    ) -> Result<Self, LoadError> {
        let Value::Object(map) = document else {
            return Err(LoadError::NotAnObject { path: name.into() });
        };

        let mut rules = Vec::with_capacity(map.len());
        for (key, value) in map {
            match build_rule(&key, value, loader, config) {
                Ok(rule) => rules.push(rule),
                Err(e) => match config.on_error {
                    FailurePolicy::DiscardAll => return Err(e),
                    FailurePolicy::SkipEntry => {
                        error!(registry = name, key = %key, error = %e, "Skipping loot rule");
                    }
                },
            }
        }

        debug!(registry = name, rules = rules.len(), "Loaded loot registry");
        Ok(Self {
            name: name.to_string(),
            rules,
        })
    }

    /// Load this registry's document again as a new instance
    pub fn reload(&self, loader: &dyn ResourceLoader, config: &LoaderConfig) -> Self {
        Self::load_with(loader, &self.name, config)
    }

    /// Resolve a matcher to the table of the first rule that matches it
    pub fn get(&self, matcher: u32) -> Arc<LootTable> {
        match self.rules.iter().find(|r| r.selector.matches(matcher)) {
            Some(rule) => rule.table.clone(),
            None => {
                debug!(registry = %self.name, matcher, "No loot rule matched");
                LootTable::empty()
            }
        }
    }

    /// Resource name the registry was loaded from
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rules in document order
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the registry has no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Turn one document entry into a rule. The key is parsed before the value is
/// looked at, so a bad key never triggers a table file read.
fn build_rule(
    key: &str,
    value: Value,
    loader: &dyn ResourceLoader,
    config: &LoaderConfig,
) -> Result<Rule, LoadError> {
    let selector = Selector::parse(key)?;

    let table = match value {
        Value::Object(_) => LootTable::deserialize(value)
            .map_err(|e| LoadError::InlineTable {
                key: key.to_string(),
                error: e,
            })?
            .into_shared(),
        // Referenced files degrade to the empty table on their own
        Value::String(file) => load_table(loader, &file, config),
        other => {
            return Err(LoadError::InvalidValue {
                key: key.to_string(),
                kind: json_kind(&other),
            })
        }
    };

    Ok(Rule { selector, table })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
