//! Attack volumes: activation windows, target screening and per-window dedup

use std::collections::HashSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use skirmish_scene::{Entity, LayerMask, Scene};

use crate::damage::{DamageComposition, DamageInfo, DEFAULT_CRITICAL_MULTIPLIER};
use crate::receiver::DamageOutcome;
use crate::scheduler::{ScheduledAction, Scheduler, TaskId};

/// Optional same-side exclusion applied after the owner check
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AllyFilter {
    /// Hit anything that passes the layer and owner checks
    #[default]
    HitAll,
    /// Skip candidates on the owner's side of `tag`: both carry it or neither does
    SkipSameTag(String),
}

/// Why an overlap did not turn into a hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The overlapping entity has no hitbox (or was destroyed)
    NoHitbox,
    Inactive,
    Inert,
    LayerMismatch,
    /// The candidate is the owner or part of the owner's hierarchy
    Owner,
    Ally,
    AlreadyHit,
    NoReceiver,
}

/// Outcome of one overlap notification
#[derive(Debug, Clone, PartialEq)]
pub enum HitResult {
    Hit {
        hitbox: Entity,
        candidate: Entity,
        receiver: Entity,
        outcome: DamageOutcome,
    },
    Rejected(Rejection),
}

impl HitResult {
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit { .. })
    }
}

/// Damage-dealing volume of an attack.
///
/// Configuration is public; the activation state is only changed through
/// [`crate::CombatWorld::activate_hitbox`] and friends.
#[derive(Debug, Clone)]
pub struct Hitbox {
    pub target_layers: LayerMask,
    pub damage: DamageComposition,
    pub is_critical: bool,
    pub critical_multiplier: f32,
    pub ignore_armor: bool,
    /// Seconds the window stays open; 0 keeps it open until deactivated
    pub active_duration: f32,
    pub destroy_on_hit: bool,
    pub destroy_on_deactivate: bool,
    pub ally_filter: AllyFilter,

    entity: Option<Entity>,
    owner: Option<Entity>,
    active: bool,
    activated_at: f64,
    already_hit: HashSet<Entity>,
    /// Auto-deactivates of every window opened since the last close
    auto_deactivate: Vec<TaskId>,
    inert: bool,
}

impl Default for Hitbox {
    fn default() -> Self {
        Self {
            target_layers: LayerMask::NONE,
            damage: DamageComposition::physical(10.0),
            is_critical: false,
            critical_multiplier: DEFAULT_CRITICAL_MULTIPLIER,
            ignore_armor: false,
            active_duration: 0.2,
            destroy_on_hit: true,
            destroy_on_deactivate: true,
            ally_filter: AllyFilter::HitAll,
            entity: None,
            owner: None,
            active: false,
            activated_at: 0.0,
            already_hit: HashSet::new(),
            auto_deactivate: Vec::new(),
            inert: false,
        }
    }
}

impl Hitbox {
    pub fn new(damage: DamageComposition, target_layers: LayerMask) -> Self {
        Self {
            damage,
            target_layers,
            ..Default::default()
        }
    }

    pub fn with_critical(mut self, is_critical: bool, multiplier: f32) -> Self {
        self.is_critical = is_critical;
        self.critical_multiplier = multiplier.max(1.0);
        self
    }

    pub fn with_active_duration(mut self, seconds: f32) -> Self {
        self.active_duration = seconds.max(0.0);
        self
    }

    pub fn with_destroy_on_hit(mut self, destroy_on_hit: bool) -> Self {
        self.destroy_on_hit = destroy_on_hit;
        self
    }

    pub fn with_destroy_on_deactivate(mut self, destroy: bool) -> Self {
        self.destroy_on_deactivate = destroy;
        self
    }

    pub fn with_ally_filter(mut self, filter: AllyFilter) -> Self {
        self.ally_filter = filter;
        self
    }

    pub(crate) fn bind(&mut self, entity: Entity) {
        self.entity = Some(entity);
    }

    pub(crate) fn set_inert(&mut self, inert: bool) {
        self.inert = inert;
    }

    pub fn owner(&self) -> Option<Entity> {
        self.owner
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_inert(&self) -> bool {
        self.inert
    }

    /// Clock time of the latest activation
    pub fn activated_at(&self) -> f64 {
        self.activated_at
    }

    pub fn has_hit(&self, candidate: Entity) -> bool {
        self.already_hit.contains(&candidate)
    }

    /// Number of targets hit in the current window
    pub fn hit_count(&self) -> usize {
        self.already_hit.len()
    }

    /// Open a new window for `owner`. Deadlines and self-destruction
    /// scheduled by earlier activations keep running; only closing the
    /// window or destroying the hitbox cancels them.
    pub(crate) fn activate(&mut self, owner: Entity, now: f64, scheduler: &mut Scheduler) -> bool {
        let Some(entity) = self.entity else {
            return false;
        };
        if self.inert {
            return false;
        }
        self.owner = Some(owner);
        self.already_hit.clear();
        self.active = true;
        self.activated_at = now;

        if self.active_duration > 0.0 {
            self.auto_deactivate.push(scheduler.schedule(
                entity,
                now + f64::from(self.active_duration),
                ScheduledAction::DeactivateHitbox(entity),
            ));
        }
        true
    }

    /// Close the window. Returns false if it was not open.
    pub(crate) fn deactivate(
        &mut self,
        now: f64,
        destroy_delay: f32,
        scheduler: &mut Scheduler,
    ) -> bool {
        if !self.active {
            return false;
        }
        self.active = false;
        for id in self.auto_deactivate.drain(..) {
            scheduler.cancel(id);
        }
        if let (true, Some(entity)) = (self.destroy_on_deactivate, self.entity) {
            scheduler.schedule(
                entity,
                now + f64::from(destroy_delay),
                ScheduledAction::DestroyEntity(entity),
            );
        }
        true
    }

    /// The auto-deactivate task fired; it no longer needs cancelling
    pub(crate) fn clear_auto_deactivate(&mut self, id: TaskId) {
        self.auto_deactivate.retain(|pending| *pending != id);
    }

    /// Decide whether `candidate` may be hit by this window
    pub fn screen(&self, scene: &Scene, candidate: Entity) -> Result<(), Rejection> {
        if self.inert {
            return Err(Rejection::Inert);
        }
        if !self.active {
            return Err(Rejection::Inactive);
        }
        if !self.target_layers.contains(scene.layer(candidate)) {
            return Err(Rejection::LayerMismatch);
        }
        if let Some(owner) = self.owner {
            if candidate == owner || scene.is_descendant_of(candidate, owner) {
                return Err(Rejection::Owner);
            }
            if let AllyFilter::SkipSameTag(tag) = &self.ally_filter {
                if scene.has_tag(owner, tag) == scene.has_tag(candidate, tag) {
                    return Err(Rejection::Ally);
                }
            }
        }
        if self.already_hit.contains(&candidate) {
            return Err(Rejection::AlreadyHit);
        }
        Ok(())
    }

    /// Damage description for a hit landing at `hit_point`, travelling from
    /// `origin` toward `target`
    pub fn damage_info(&self, origin: Vec2, target: Vec2, hit_point: Vec2) -> DamageInfo {
        DamageInfo::new(self.owner)
            .with_damage(self.damage)
            .with_critical(self.is_critical, self.critical_multiplier)
            .ignoring_armor(self.ignore_armor)
            .at(hit_point, target - origin)
    }

    pub(crate) fn record_hit(&mut self, candidate: Entity) {
        self.already_hit.insert(candidate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::damage::DamageType;
    use skirmish_scene::Layer;

    const ENEMY: Layer = Layer::from_index(3);

    fn setup() -> (Scene, Scheduler, Entity, Entity, Entity) {
        let mut scene = Scene::new();
        let attacker = scene.spawn("attacker");
        let weapon = scene.spawn_child(attacker, "weapon");
        let goblin = scene.spawn("goblin");
        scene.set_layer(goblin, ENEMY);
        scene.set_layer(weapon, ENEMY);
        (scene, Scheduler::new(), attacker, weapon, goblin)
    }

    fn bound_hitbox(scene: &mut Scene) -> (Entity, Hitbox) {
        let entity = scene.spawn("hitbox");
        let mut hitbox = Hitbox::new(DamageComposition::physical(10.0), LayerMask::from(ENEMY));
        hitbox.bind(entity);
        (entity, hitbox)
    }

    #[test]
    fn test_defaults() {
        let hitbox = Hitbox::default();
        assert_eq!(hitbox.damage.get(DamageType::Physical), 10.0);
        assert!(!hitbox.is_critical);
        assert_eq!(hitbox.critical_multiplier, 1.5);
        assert_eq!(hitbox.active_duration, 0.2);
        assert!(hitbox.destroy_on_hit);
        assert!(!hitbox.is_active());
    }

    #[test]
    fn test_inactive_rejects_everything() {
        let (mut scene, _, _, _, goblin) = setup();
        let (_, hitbox) = bound_hitbox(&mut scene);
        assert_eq!(hitbox.screen(&scene, goblin), Err(Rejection::Inactive));
    }

    #[test]
    fn test_activation_schedules_auto_deactivate() {
        let (mut scene, mut scheduler, attacker, _, _) = setup();
        let (entity, mut hitbox) = bound_hitbox(&mut scene);
        assert!(hitbox.activate(attacker, 1.0, &mut scheduler));
        assert_eq!(hitbox.owner(), Some(attacker));

        let due = scheduler.drain_due(1.2);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].action, ScheduledAction::DeactivateHitbox(entity));
    }

    #[test]
    fn test_reactivation_keeps_first_deadline() {
        let (mut scene, mut scheduler, attacker, _, goblin) = setup();
        let (entity, mut hitbox) = bound_hitbox(&mut scene);
        hitbox.activate(attacker, 0.0, &mut scheduler);
        hitbox.record_hit(goblin);

        hitbox.activate(attacker, 0.15, &mut scheduler);
        assert_eq!(scheduler.len(), 2);
        assert_eq!(hitbox.hit_count(), 0);
        assert_eq!(hitbox.screen(&scene, goblin), Ok(()));

        let due = scheduler.drain_due(0.2);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].action, ScheduledAction::DeactivateHitbox(entity));
    }

    #[test]
    fn test_deactivate_cancels_every_pending_deadline() {
        let (mut scene, mut scheduler, attacker, _, _) = setup();
        let (_, hitbox) = bound_hitbox(&mut scene);
        let mut hitbox = hitbox.with_destroy_on_deactivate(false);
        hitbox.activate(attacker, 0.0, &mut scheduler);
        hitbox.activate(attacker, 0.1, &mut scheduler);

        assert!(hitbox.deactivate(0.12, 0.1, &mut scheduler));
        assert!(scheduler.is_empty());
        assert!(!hitbox.is_active());
    }

    #[test]
    fn test_zero_duration_stays_open() {
        let (mut scene, mut scheduler, attacker, _, _) = setup();
        let (_, hitbox) = bound_hitbox(&mut scene);
        let mut hitbox = hitbox.with_active_duration(0.0);
        hitbox.activate(attacker, 0.0, &mut scheduler);
        assert!(scheduler.is_empty());
        assert!(hitbox.is_active());
    }

    #[test]
    fn test_owner_and_descendants_rejected() {
        let (mut scene, mut scheduler, attacker, weapon, goblin) = setup();
        scene.set_layer(attacker, ENEMY);
        let (_, mut hitbox) = bound_hitbox(&mut scene);
        hitbox.activate(attacker, 0.0, &mut scheduler);

        assert_eq!(hitbox.screen(&scene, attacker), Err(Rejection::Owner));
        assert_eq!(hitbox.screen(&scene, weapon), Err(Rejection::Owner));
        assert_eq!(hitbox.screen(&scene, goblin), Ok(()));
    }

    #[test]
    fn test_layer_mask_filters() {
        let (mut scene, mut scheduler, attacker, _, _) = setup();
        let crate_box = scene.spawn("crate");
        let (_, mut hitbox) = bound_hitbox(&mut scene);
        hitbox.activate(attacker, 0.0, &mut scheduler);
        assert_eq!(hitbox.screen(&scene, crate_box), Err(Rejection::LayerMismatch));
    }

    #[test]
    fn test_dedup_within_window() {
        let (mut scene, mut scheduler, attacker, _, goblin) = setup();
        let (_, mut hitbox) = bound_hitbox(&mut scene);
        hitbox.activate(attacker, 0.0, &mut scheduler);
        hitbox.record_hit(goblin);
        assert_eq!(hitbox.screen(&scene, goblin), Err(Rejection::AlreadyHit));
    }

    #[test]
    fn test_ally_filter_hook() {
        let (mut scene, mut scheduler, attacker, _, goblin) = setup();
        let other_goblin = scene.spawn("goblin 2");
        scene.set_layer(other_goblin, ENEMY);
        scene.add_tag(attacker, "Enemy");
        scene.add_tag(goblin, "Enemy");

        let (_, hitbox) = bound_hitbox(&mut scene);
        let mut hitbox = hitbox.with_ally_filter(AllyFilter::SkipSameTag("Enemy".into()));
        hitbox.activate(attacker, 0.0, &mut scheduler);
        assert_eq!(hitbox.screen(&scene, goblin), Err(Rejection::Ally));
        assert_eq!(hitbox.screen(&scene, other_goblin), Ok(()));

        // Default is permissive
        hitbox.ally_filter = AllyFilter::default();
        assert_eq!(hitbox.screen(&scene, goblin), Ok(()));
    }

    #[test]
    fn test_deactivate_schedules_self_destruction() {
        let (mut scene, mut scheduler, attacker, _, _) = setup();
        let (entity, mut hitbox) = bound_hitbox(&mut scene);
        hitbox.activate(attacker, 0.0, &mut scheduler);
        assert!(hitbox.deactivate(0.05, 0.1, &mut scheduler));
        assert!(!hitbox.deactivate(0.05, 0.1, &mut scheduler));

        let due = scheduler.drain_due(1.0);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].action, ScheduledAction::DestroyEntity(entity));
    }

    #[test]
    fn test_damage_info_carries_configuration() {
        let (mut scene, mut scheduler, attacker, _, _) = setup();
        let (_, hitbox) = bound_hitbox(&mut scene);
        let mut hitbox = hitbox.with_critical(true, 2.0);
        hitbox.ignore_armor = true;
        hitbox.activate(attacker, 0.0, &mut scheduler);

        let info = hitbox.damage_info(Vec2::ZERO, Vec2::new(3.0, 0.0), Vec2::new(2.5, 0.0));
        assert_eq!(info.source(), Some(attacker));
        assert!(info.is_critical());
        assert_eq!(info.critical_multiplier(), 2.0);
        assert!(info.ignores_armor());
        assert_eq!(info.hit_direction(), Vec2::X);
        assert_eq!(info.hit_point(), Vec2::new(2.5, 0.0));
    }
}
