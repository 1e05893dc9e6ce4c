//! Damage types and the per-hit damage description
//!
//! 5 damage types: Physical is mitigated by armor, the four elemental types
//! (Fire, Cold, Lightning, Chaos) by per-type resistances.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use skirmish_scene::Entity;

/// The damage types a hit can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DamageType {
    #[default]
    Physical,
    Fire,
    Cold,
    Lightning,
    Chaos,
}

/// Total number of damage types (for array indexing)
pub const DAMAGE_TYPE_COUNT: usize = 5;

impl DamageType {
    /// Array index for this type (for per-type damage and resistance arrays)
    pub fn index(self) -> usize {
        match self {
            Self::Physical => 0,
            Self::Fire => 1,
            Self::Cold => 2,
            Self::Lightning => 3,
            Self::Chaos => 4,
        }
    }

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            Self::Physical => "Physical",
            Self::Fire => "Fire",
            Self::Cold => "Cold",
            Self::Lightning => "Lightning",
            Self::Chaos => "Chaos",
        }
    }

    /// Whether this type is reduced by resistances rather than armor
    pub fn is_elemental(self) -> bool {
        self != Self::Physical
    }

    /// All damage types, in index order
    pub fn all() -> &'static [DamageType] {
        &[
            Self::Physical,
            Self::Fire,
            Self::Cold,
            Self::Lightning,
            Self::Chaos,
        ]
    }
}

/// Raw per-type damage amounts carried by an attack. Amounts are never negative.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DamageComposition {
    amounts: [f32; DAMAGE_TYPE_COUNT],
}

impl DamageComposition {
    /// A composition with a single non-zero component
    pub fn single(damage_type: DamageType, amount: f32) -> Self {
        Self::default().with(damage_type, amount)
    }

    /// Pure physical damage
    pub fn physical(amount: f32) -> Self {
        Self::single(DamageType::Physical, amount)
    }

    /// Set one component, clamping negatives to zero
    pub fn with(mut self, damage_type: DamageType, amount: f32) -> Self {
        self.set(damage_type, amount);
        self
    }

    pub fn set(&mut self, damage_type: DamageType, amount: f32) {
        self.amounts[damage_type.index()] = amount.max(0.0);
    }

    pub fn get(&self, damage_type: DamageType) -> f32 {
        self.amounts[damage_type.index()]
    }

    /// Unmitigated sum of all components
    pub fn total(&self) -> f32 {
        self.amounts.iter().sum()
    }

    pub fn is_zero(&self) -> bool {
        self.amounts.iter().all(|a| *a == 0.0)
    }
}

/// Default critical multiplier for hits that don't set one
pub const DEFAULT_CRITICAL_MULTIPLIER: f32 = 1.5;

/// One damage event: who dealt it, what it is made of and where it landed.
///
/// Built with the consuming `with_*` methods by whoever emits the hit and only
/// read afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct DamageInfo {
    source: Option<Entity>,
    damage: DamageComposition,
    is_critical: bool,
    critical_multiplier: f32,
    ignore_armor: bool,
    hit_point: Vec2,
    hit_direction: Vec2,
}

impl DamageInfo {
    /// A zero-damage hit from `source` (`None` for environmental damage)
    pub fn new(source: Option<Entity>) -> Self {
        Self {
            source,
            damage: DamageComposition::default(),
            is_critical: false,
            critical_multiplier: DEFAULT_CRITICAL_MULTIPLIER,
            ignore_armor: false,
            hit_point: Vec2::ZERO,
            hit_direction: Vec2::ZERO,
        }
    }

    pub fn with_damage(mut self, damage: DamageComposition) -> Self {
        self.damage = damage;
        self
    }

    pub fn with_component(mut self, damage_type: DamageType, amount: f32) -> Self {
        self.damage.set(damage_type, amount);
        self
    }

    /// Mark the hit critical. Multipliers below 1 are raised to 1.
    pub fn with_critical(mut self, is_critical: bool, multiplier: f32) -> Self {
        self.is_critical = is_critical;
        self.critical_multiplier = multiplier.max(1.0);
        self
    }

    pub fn ignoring_armor(mut self, ignore_armor: bool) -> Self {
        self.ignore_armor = ignore_armor;
        self
    }

    /// Contact point and direction. A zero direction stays zero.
    pub fn at(mut self, hit_point: Vec2, hit_direction: Vec2) -> Self {
        self.hit_point = hit_point;
        self.hit_direction = hit_direction.normalize_or_zero();
        self
    }

    pub fn source(&self) -> Option<Entity> {
        self.source
    }

    pub fn damage(&self) -> &DamageComposition {
        &self.damage
    }

    pub fn amount(&self, damage_type: DamageType) -> f32 {
        self.damage.get(damage_type)
    }

    pub fn is_critical(&self) -> bool {
        self.is_critical
    }

    pub fn critical_multiplier(&self) -> f32 {
        self.critical_multiplier
    }

    pub fn ignores_armor(&self) -> bool {
        self.ignore_armor
    }

    pub fn hit_point(&self) -> Vec2 {
        self.hit_point
    }

    pub fn hit_direction(&self) -> Vec2 {
        self.hit_direction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damage_type_count() {
        assert_eq!(DamageType::all().len(), DAMAGE_TYPE_COUNT);
    }

    #[test]
    fn test_damage_type_indices_unique() {
        let mut indices: Vec<usize> = DamageType::all().iter().map(|t| t.index()).collect();
        indices.sort();
        indices.dedup();
        assert_eq!(indices.len(), DAMAGE_TYPE_COUNT);
    }

    #[test]
    fn test_only_physical_is_not_elemental() {
        let elemental: Vec<_> = DamageType::all()
            .iter()
            .filter(|t| !t.is_elemental())
            .collect();
        assert_eq!(elemental, vec![&DamageType::Physical]);
    }

    #[test]
    fn test_composition_clamps_negative() {
        let c = DamageComposition::physical(-4.0).with(DamageType::Fire, 3.0);
        assert_eq!(c.get(DamageType::Physical), 0.0);
        assert_eq!(c.total(), 3.0);
        assert!(!c.is_zero());
        assert!(DamageComposition::default().is_zero());
    }

    #[test]
    fn test_damage_info_defaults() {
        let info = DamageInfo::new(None);
        assert_eq!(info.source(), None);
        assert!(info.damage().is_zero());
        assert!(!info.is_critical());
        assert_eq!(info.critical_multiplier(), DEFAULT_CRITICAL_MULTIPLIER);
        assert!(!info.ignores_armor());
    }

    #[test]
    fn test_damage_info_builders() {
        let source = Entity::from_raw(3, 1);
        let info = DamageInfo::new(Some(source))
            .with_component(DamageType::Cold, 7.0)
            .with_critical(true, 0.5)
            .at(Vec2::new(1.0, 1.0), Vec2::new(0.0, 4.0));
        assert_eq!(info.source(), Some(source));
        assert_eq!(info.amount(DamageType::Cold), 7.0);
        // Multiplier is floored at 1
        assert_eq!(info.critical_multiplier(), 1.0);
        assert_eq!(info.hit_direction(), Vec2::Y);
    }
}
