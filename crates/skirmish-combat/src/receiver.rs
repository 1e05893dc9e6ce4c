//! Damage receivers and how a hit finds one in the scene hierarchy

use skirmish_scene::{Entity, Scene};

use crate::config::CombatConfig;
use crate::damage::DamageInfo;
use crate::events::{CombatEventBus, FeedbackCue};
use crate::hurtbox::Hurtbox;
use crate::scheduler::Scheduler;

/// Everything a receiver may touch while resolving a hit
pub struct CombatContext<'a> {
    pub bus: &'a CombatEventBus,
    pub scheduler: &'a mut Scheduler,
    pub cues: &'a mut Vec<FeedbackCue>,
    pub config: &'a CombatConfig,
    /// Current simulation time in seconds
    pub now: f64,
}

/// What a `take_damage` call did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamageOutcome {
    /// Receiver was dead or inert; nothing changed
    Ignored,
    /// Health dropped by `amount` and the receiver survived
    Damaged { amount: f32, health: f32 },
    /// This hit killed the receiver
    Killed { amount: f32 },
}

impl DamageOutcome {
    pub fn amount(&self) -> f32 {
        match self {
            Self::Ignored => 0.0,
            Self::Damaged { amount, .. } | Self::Killed { amount } => *amount,
        }
    }

    pub fn is_kill(&self) -> bool {
        matches!(self, Self::Killed { .. })
    }
}

/// Capability of anything that can be hit
pub trait Damageable {
    fn is_alive(&self) -> bool;
    fn current_health(&self) -> f32;
    fn max_health(&self) -> f32;
    fn take_damage(&mut self, info: &DamageInfo, ctx: &mut CombatContext<'_>) -> DamageOutcome;
    /// Returns whether health changed
    fn heal(&mut self, amount: f32, ctx: &mut CombatContext<'_>) -> bool;
}

/// Find the entity holding the damage receiver for `node`.
///
/// Looks at `node` itself, then its ancestors nearest first, then its
/// descendants depth-first. The first match wins.
pub fn find_receiver(scene: &Scene, node: Entity) -> Option<Entity> {
    if !scene.is_alive(node) {
        return None;
    }
    std::iter::once(node)
        .chain(scene.ancestors(node))
        .chain(scene.descendants(node))
        .find(|&entity| scene.has::<Hurtbox>(entity))
}

/// Like [`find_receiver`], but hands back the receiver itself
pub fn resolve_receiver(scene: &mut Scene, node: Entity) -> Option<(Entity, &mut dyn Damageable)> {
    let entity = find_receiver(scene, node)?;
    let receiver = scene.get_mut::<Hurtbox>(entity)?;
    Some((entity, receiver as &mut dyn Damageable))
}
