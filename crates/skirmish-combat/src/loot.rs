//! Loot dropped by dying enemies

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use skirmish_scene::Entity;

/// Items an entity may drop when it dies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LootTable {
    pub items: Vec<String>,
    /// Probability (0.0-1.0) that anything drops at all
    pub drop_chance: f32,
}

impl Default for LootTable {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            drop_chance: 0.3,
        }
    }
}

impl LootTable {
    pub fn new(items: impl IntoIterator<Item = impl Into<String>>, drop_chance: f32) -> Self {
        Self {
            items: items.into_iter().map(Into::into).collect(),
            drop_chance: drop_chance.clamp(0.0, 1.0),
        }
    }

    /// Roll once. Returns the dropped item, if any.
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        if self.items.is_empty() {
            return None;
        }
        if rng.gen::<f32>() >= self.drop_chance {
            return None;
        }
        self.items.choose(rng).map(String::as_str)
    }
}

/// An item lying in the arena
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LootDrop {
    pub item: String,
    /// The entity that dropped it
    pub dropped_by: Entity,
}
