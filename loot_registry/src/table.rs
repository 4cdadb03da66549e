use crate::config::{CountConfig, EntryConfig, TableDocument, WeightedConfig};
use crate::drop::{Drop, LootContext};
use rand::Rng;
use serde::Deserialize;
use std::sync::{Arc, OnceLock};
use thiserror::Error;

/// Shared fallback returned when no rule matches or a load fails
static EMPTY_TABLE: OnceLock<Arc<LootTable>> = OnceLock::new();

/// Error validating a table document after it has been deserialized
#[derive(Debug, Error)]
pub enum TableError {
    #[error("Invalid entry type: {0}")]
    InvalidEntryType(String),
    #[error("Item entry is missing 'item_id'")]
    MissingItemId,
    #[error("Count range [{min}, {max}] has min above max")]
    ReversedCount { min: u32, max: u32 },
}

/// A loot table a registry rule resolves to
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "TableDocument")]
pub enum LootTable {
    /// Always produces nothing
    Empty,
    Weighted(WeightedTable),
}

impl LootTable {
    /// The process-wide empty table. Every call returns the same allocation.
    pub fn empty() -> Arc<LootTable> {
        EMPTY_TABLE
            .get_or_init(|| Arc::new(LootTable::Empty))
            .clone()
    }

    /// Wrap for sharing, folding `Empty` onto the shared instance
    pub fn into_shared(self) -> Arc<LootTable> {
        match self {
            LootTable::Empty => LootTable::empty(),
            table => Arc::new(table),
        }
    }

    /// Produce drops for the given context
    pub fn produce<R: Rng>(&self, ctx: &LootContext, rng: &mut R) -> Vec<Drop> {
        match self {
            LootTable::Empty => Vec::new(),
            LootTable::Weighted(table) => table.produce(ctx, rng),
        }
    }
}

impl TryFrom<TableDocument> for LootTable {
    type Error = TableError;

    fn try_from(doc: TableDocument) -> Result<Self, Self::Error> {
        match doc {
            TableDocument::Empty => Ok(LootTable::Empty),
            TableDocument::Weighted(config) => {
                WeightedTable::from_config(config).map(LootTable::Weighted)
            }
        }
    }
}

/// A table with weighted roll counts and weighted entries
#[derive(Debug, Clone)]
pub struct WeightedTable {
    rolls: Vec<RollOption>,
    entries: Vec<Entry>,
}

#[derive(Debug, Clone)]
struct RollOption {
    count: u32,
    weight: u32,
}

#[derive(Debug, Clone)]
struct Entry {
    kind: EntryKind,
    weight: u32,
    rarity_bonus: u32,
    min_level: Option<u32>,
    max_level: Option<u32>,
}

#[derive(Debug, Clone)]
enum EntryKind {
    NoDrop,
    Item { item_id: u32, count: CountRange },
}

#[derive(Debug, Clone, Copy)]
struct CountRange {
    min: u32,
    max: u32,
}

impl WeightedTable {
    fn from_config(config: WeightedConfig) -> Result<Self, TableError> {
        let rolls = if config.rolls.is_empty() {
            // Default to 1 roll if none specified
            vec![RollOption {
                count: 1,
                weight: 1,
            }]
        } else {
            config
                .rolls
                .into_iter()
                .map(|r| RollOption {
                    count: r.count,
                    weight: r.weight,
                })
                .collect()
        };

        let entries = config
            .entries
            .into_iter()
            .map(Entry::from_config)
            .collect::<Result<_, _>>()?;

        Ok(WeightedTable { rolls, entries })
    }

    /// Number of entries in the table
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn produce<R: Rng>(&self, ctx: &LootContext, rng: &mut R) -> Vec<Drop> {
        let base_rolls = self.select_roll_count(rng);
        let roll_count = apply_quantity_mult(base_rolls, ctx.quantity_mult, rng);

        // Level doesn't change between rolls
        let valid_entries: Vec<&Entry> = self
            .entries
            .iter()
            .filter(|e| e.level_valid(ctx.level))
            .collect();

        let weights: Vec<f64> = valid_entries
            .iter()
            .map(|e| e.weight as f64 + e.rarity_bonus as f64 * ctx.rarity_mult)
            .collect();

        let total_weight: f64 = weights.iter().sum();
        if valid_entries.is_empty() || total_weight <= 0.0 {
            return Vec::new();
        }

        let mut drops = Vec::new();
        for _ in 0..roll_count {
            let mut roll = rng.gen::<f64>() * total_weight;
            let mut selected_idx = valid_entries.len() - 1;
            for (i, &w) in weights.iter().enumerate() {
                roll -= w;
                if roll <= 0.0 {
                    selected_idx = i;
                    break;
                }
            }

            match valid_entries[selected_idx].kind {
                EntryKind::NoDrop => continue,
                EntryKind::Item { item_id, count } => {
                    let base_count = rng.gen_range(count.min..=count.max);
                    let final_count = apply_quantity_mult(base_count, ctx.quantity_mult, rng);
                    if final_count > 0 {
                        drops.push(Drop {
                            item_id,
                            count: final_count,
                        });
                    }
                }
            }
        }

        drops
    }

    fn select_roll_count<R: Rng>(&self, rng: &mut R) -> u32 {
        // Summed in u64; the u32 weights can overflow a u32 total
        let total_weight: u64 = self.rolls.iter().map(|r| r.weight as u64).sum();
        if total_weight == 0 {
            return 1;
        }

        let mut roll = rng.gen_range(0..total_weight);
        for option in &self.rolls {
            let weight = option.weight as u64;
            if roll < weight {
                return option.count;
            }
            roll -= weight;
        }

        self.rolls.last().map(|r| r.count).unwrap_or(1)
    }
}

impl Entry {
    fn from_config(config: EntryConfig) -> Result<Self, TableError> {
        let kind = match config.entry_type.as_str() {
            "no_drop" => EntryKind::NoDrop,
            "item" => {
                let item_id = config.item_id.ok_or(TableError::MissingItemId)?;
                let count = config.count.unwrap_or(CountConfig::Single(1));
                let (min, max) = (count.min(), count.max());
                if min > max {
                    return Err(TableError::ReversedCount { min, max });
                }
                EntryKind::Item {
                    item_id,
                    count: CountRange { min, max },
                }
            }
            _ => return Err(TableError::InvalidEntryType(config.entry_type)),
        };

        Ok(Entry {
            kind,
            weight: config.weight,
            rarity_bonus: config.rarity_bonus,
            min_level: config.min_level,
            max_level: config.max_level,
        })
    }

    fn level_valid(&self, level: u32) -> bool {
        self.min_level.map_or(true, |min| level >= min)
            && self.max_level.map_or(true, |max| level <= max)
    }
}

/// Apply quantity multiplier with fractional chance for extra
fn apply_quantity_mult<R: Rng>(base: u32, mult: f64, rng: &mut R) -> u32 {
    let scaled = (base as f64 * mult).clamp(0.0, u32::MAX as f64);
    let guaranteed = scaled.floor() as u32;
    let fraction = scaled.fract();

    if rng.gen::<f64>() < fraction {
        guaranteed.saturating_add(1)
    } else {
        guaranteed
    }
}
