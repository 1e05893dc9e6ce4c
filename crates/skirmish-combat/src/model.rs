//! Damage mitigation pipeline
//!
//! Pipeline: physical -> armor reduction (capped at 90%)
//!           elemental -> per-type resistance
//!           -> sum -> crit multiplier -> floor at 1.0
//!
//! No rounding is applied anywhere; callers get full f32 precision.

use crate::damage::{DamageInfo, DamageType, DAMAGE_TYPE_COUNT};
use crate::stats::EntityStats;

/// Armor weight against the incoming physical hit in the reduction formula
pub const ARMOR_DAMAGE_FACTOR: f32 = 10.0;
/// Upper bound on the fraction of physical damage armor can remove
pub const MAX_ARMOR_REDUCTION: f32 = 0.9;
/// Every resolved hit deals at least this much
pub const MIN_DAMAGE: f32 = 1.0;

/// Per-stage result of a damage computation
#[derive(Debug, Clone, PartialEq)]
pub struct DamageBreakdown {
    /// Fraction of physical damage removed by armor
    pub armor_reduction: f32,
    /// Per-type damage after mitigation (indexed by DamageType::index())
    pub mitigated: [f32; DAMAGE_TYPE_COUNT],
    /// Sum of mitigated components, before crit
    pub mitigated_total: f32,
    /// Whether the crit multiplier was applied
    pub critical: bool,
    /// Damage actually dealt
    pub final_amount: f32,
}

/// Fraction of a physical hit removed by `armor`.
///
/// `armor / (armor + 10 * damage)`, capped at 90%. No armor or no damage
/// means no reduction.
pub fn armor_reduction(armor: f32, physical_damage: f32) -> f32 {
    if armor <= 0.0 || physical_damage <= 0.0 {
        return 0.0;
    }
    (armor / (armor + ARMOR_DAMAGE_FACTOR * physical_damage)).min(MAX_ARMOR_REDUCTION)
}

/// Run the full pipeline and keep every intermediate value
pub fn compute_damage(info: &DamageInfo, stats: &EntityStats) -> DamageBreakdown {
    let mut mitigated = [0.0; DAMAGE_TYPE_COUNT];

    let physical = info.amount(DamageType::Physical);
    let reduction = if info.ignores_armor() {
        0.0
    } else {
        armor_reduction(stats.armor, physical)
    };
    if physical > 0.0 {
        mitigated[DamageType::Physical.index()] = physical * (1.0 - reduction);
    }

    for &damage_type in DamageType::all().iter().filter(|t| t.is_elemental()) {
        let raw = info.amount(damage_type);
        if raw > 0.0 {
            mitigated[damage_type.index()] = stats.apply_resistance(raw, damage_type);
        }
    }

    let mitigated_total: f32 = mitigated.iter().sum();

    // Crit scales the post-mitigation total.
    let critical = info.is_critical();
    let scaled = if critical {
        mitigated_total * info.critical_multiplier()
    } else {
        mitigated_total
    };

    DamageBreakdown {
        armor_reduction: reduction,
        mitigated,
        mitigated_total,
        critical,
        final_amount: scaled.max(MIN_DAMAGE),
    }
}

/// Final damage `info` deals to a target with `stats`
pub fn compute_final_damage(info: &DamageInfo, stats: &EntityStats) -> f32 {
    compute_damage(info, stats).final_amount
}
