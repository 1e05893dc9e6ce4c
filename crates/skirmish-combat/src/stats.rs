//! Health, armor and resistances of a damageable entity

use serde::{Deserialize, Serialize};

use crate::damage::{DamageType, DAMAGE_TYPE_COUNT};

/// Resistances are percentages clamped to this magnitude
pub const MAX_RESISTANCE: f32 = 100.0;

/// Combat stats owned by a hurtbox
///
/// Deserialized values go through the same repairs as [`EntityStats::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StatsRecord")]
pub struct EntityStats {
    /// Current health points, always within 0..=max_health
    health: f32,
    /// Maximum health points (> 0)
    max_health: f32,
    /// Physical mitigation rating (>= 0)
    pub armor: f32,
    /// Per-type resistance percent (indexed by DamageType::index())
    resistances: [f32; DAMAGE_TYPE_COUNT],
}

/// Stats as written in a settings or template file
#[derive(Deserialize)]
struct StatsRecord {
    max_health: f32,
    /// Missing means full health
    #[serde(default)]
    health: Option<f32>,
    #[serde(default)]
    armor: f32,
    #[serde(default)]
    resistances: [f32; DAMAGE_TYPE_COUNT],
}

impl From<StatsRecord> for EntityStats {
    fn from(record: StatsRecord) -> Self {
        let mut stats = Self::new(record.max_health, record.armor);
        if let Some(health) = record.health {
            stats = stats.with_health(health);
        }
        for &damage_type in DamageType::all() {
            stats.set_resistance(damage_type, record.resistances[damage_type.index()]);
        }
        stats
    }
}

impl Default for EntityStats {
    fn default() -> Self {
        Self::new(100.0, 0.0)
    }
}

impl EntityStats {
    /// Create new stats with full health
    pub fn new(max_health: f32, armor: f32) -> Self {
        let max_health = if max_health > 0.0 { max_health } else { 1.0 };
        Self {
            health: max_health,
            max_health,
            armor: armor.max(0.0),
            resistances: [0.0; DAMAGE_TYPE_COUNT],
        }
    }

    /// Builder-style resistance setter
    pub fn with_resistance(mut self, damage_type: DamageType, percent: f32) -> Self {
        self.set_resistance(damage_type, percent);
        self
    }

    /// Start at a given health instead of full (clamped)
    pub fn with_health(mut self, health: f32) -> Self {
        self.health = health.clamp(0.0, self.max_health);
        self
    }

    pub fn health(&self) -> f32 {
        self.health
    }

    pub fn max_health(&self) -> f32 {
        self.max_health
    }

    pub fn resistance(&self, damage_type: DamageType) -> f32 {
        self.resistances[damage_type.index()]
    }

    pub fn set_resistance(&mut self, damage_type: DamageType, percent: f32) {
        self.resistances[damage_type.index()] = percent.clamp(-MAX_RESISTANCE, MAX_RESISTANCE);
    }

    /// Whether this entity is alive
    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    /// Health as a 0.0-1.0 fraction
    pub fn health_fraction(&self) -> f32 {
        (self.health / self.max_health).clamp(0.0, 1.0)
    }

    /// Scale `damage` by this entity's resistance to `damage_type`.
    /// Negative resistance amplifies.
    pub fn apply_resistance(&self, damage: f32, damage_type: DamageType) -> f32 {
        damage * (1.0 - self.resistance(damage_type) / 100.0)
    }

    /// Subtract already-mitigated damage. Health never drops below zero.
    pub fn take_damage(&mut self, amount: f32) {
        self.health = (self.health - amount.max(0.0)).clamp(0.0, self.max_health);
    }

    /// Heal by a flat amount. Health never exceeds max_health.
    pub fn heal(&mut self, amount: f32) {
        self.health = (self.health + amount.max(0.0)).clamp(0.0, self.max_health);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_stats_default() {
        let stats = EntityStats::default();
        assert!(stats.is_alive());
        assert_eq!(stats.health_fraction(), 1.0);
    }

    #[test]
    fn test_invalid_max_health_is_repaired() {
        let stats = EntityStats::new(0.0, -3.0);
        assert!(stats.max_health() > 0.0);
        assert_eq!(stats.armor, 0.0);
    }

    #[test]
    fn test_take_damage_clamps_at_zero() {
        let mut stats = EntityStats::new(10.0, 0.0);
        stats.take_damage(15.0);
        assert_eq!(stats.health(), 0.0);
        assert!(!stats.is_alive());
    }

    #[test]
    fn test_negative_damage_does_not_heal() {
        let mut stats = EntityStats::new(10.0, 0.0).with_health(5.0);
        stats.take_damage(-20.0);
        assert_eq!(stats.health(), 5.0);
    }

    #[test]
    fn test_heal_caps_at_max() {
        let mut stats = EntityStats::new(100.0, 0.0).with_health(50.0);
        stats.heal(30.0);
        assert_eq!(stats.health(), 80.0);
        stats.heal(100.0);
        assert_eq!(stats.health(), 100.0);
        stats.heal(-10.0);
        assert_eq!(stats.health(), 100.0);
    }

    #[test]
    fn test_apply_resistance() {
        let stats = EntityStats::default()
            .with_resistance(DamageType::Fire, 25.0)
            .with_resistance(DamageType::Cold, -50.0);
        assert_eq!(stats.apply_resistance(100.0, DamageType::Fire), 75.0);
        assert_eq!(stats.apply_resistance(100.0, DamageType::Cold), 150.0);
        assert_eq!(stats.apply_resistance(100.0, DamageType::Chaos), 100.0);
    }

    #[test]
    fn test_resistance_is_clamped() {
        let stats = EntityStats::default().with_resistance(DamageType::Lightning, 250.0);
        assert_eq!(stats.resistance(DamageType::Lightning), MAX_RESISTANCE);
        assert_eq!(stats.apply_resistance(40.0, DamageType::Lightning), 0.0);
    }

    #[test]
    fn test_deserialize_repairs_bad_values() {
        let stats: EntityStats = serde_json::from_str(
            r#"{ "max_health": -5.0, "health": 40.0, "armor": -2.0,
                 "resistances": [0.0, 300.0, 0.0, 0.0, 0.0] }"#,
        )
        .unwrap();
        assert_eq!(stats.max_health(), 1.0);
        assert_eq!(stats.health(), 1.0);
        assert_eq!(stats.armor, 0.0);
        assert_eq!(stats.resistance(DamageType::Fire), MAX_RESISTANCE);
        assert_eq!(stats.health_fraction(), 1.0);

        let partial: EntityStats = serde_json::from_str(r#"{ "max_health": 80.0 }"#).unwrap();
        assert_eq!(partial.health(), 80.0);
    }

    #[test]
    fn test_serialized_stats_load_back_unchanged() {
        let stats = EntityStats::new(60.0, 4.0)
            .with_health(25.0)
            .with_resistance(DamageType::Cold, -20.0);
        let text = serde_json::to_string(&stats).unwrap();
        let back: EntityStats = serde_json::from_str(&text).unwrap();
        assert_eq!(back, stats);
    }
}
