use serde::{Deserialize, Serialize};

/// A single reward produced by a loot table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Drop {
    pub item_id: u32,
    pub count: u32,
}

/// Runtime inputs a table is queried with
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LootContext {
    /// Level of the source (monster, chest, ...) used for entry filtering
    pub level: u32,
    /// Scales `rarity_bonus` weights
    pub rarity_mult: f64,
    /// Scales roll counts and item counts, with fractional chance for one extra
    pub quantity_mult: f64,
}

impl Default for LootContext {
    fn default() -> Self {
        Self {
            level: 1,
            rarity_mult: 1.0,
            quantity_mult: 1.0,
        }
    }
}

impl LootContext {
    pub fn with_level(level: u32) -> Self {
        Self {
            level,
            ..Self::default()
        }
    }
}
