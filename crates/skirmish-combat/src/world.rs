//! The combat world: scene, timers, overlap dispatch and death side effects

use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use skirmish_physics::{Collider, OverlapTracker, Volume};
use skirmish_scene::{Entity, Scene};
use tracing::{debug, error, info, warn};

use crate::attack::AttackSpawner;
use crate::config::CombatConfig;
use crate::damage::DamageInfo;
use crate::enemy::{self, EnemyBrain};
use crate::error::CombatError;
use crate::events::{CombatEventBus, FeedbackCue};
use crate::hitbox::{HitResult, Hitbox, Rejection};
use crate::hurtbox::Hurtbox;
use crate::loot::{LootDrop, LootTable};
use crate::receiver::{find_receiver, resolve_receiver, CombatContext, DamageOutcome};
use crate::scheduler::{ScheduledAction, Scheduler};
use crate::tags;

/// Owns the scene and everything needed to resolve combat in it.
///
/// Driven by an external fixed-step loop through [`CombatWorld::step`].
pub struct CombatWorld {
    scene: Scene,
    scheduler: Scheduler,
    bus: CombatEventBus,
    tracker: OverlapTracker<Entity>,
    config: CombatConfig,
    now: f64,
    cues: Vec<FeedbackCue>,
    rng: StdRng,
}

impl CombatWorld {
    /// A world publishing on the process-wide bus
    pub fn new(config: CombatConfig) -> Self {
        Self::with_bus(config, CombatEventBus::global().clone())
    }

    /// A world publishing on `bus`
    pub fn with_bus(config: CombatConfig, bus: CombatEventBus) -> Self {
        Self {
            scene: Scene::new(),
            scheduler: Scheduler::new(),
            bus,
            tracker: OverlapTracker::new(),
            config,
            now: 0.0,
            cues: Vec::new(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Make loot rolls reproducible
    pub fn seeded(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn bus(&self) -> &CombatEventBus {
        &self.bus
    }

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Simulation clock in seconds
    pub fn now(&self) -> f64 {
        self.now
    }

    // ---- Setup ----

    /// Attach `hitbox` to `entity`. The hitbox collider starts disabled until
    /// the hitbox is activated. Without a collider the hitbox is attached
    /// inert and an error is returned.
    pub fn attach_hitbox(&mut self, entity: Entity, mut hitbox: Hitbox) -> Result<(), CombatError> {
        hitbox.bind(entity);
        let result = match self.scene.get_mut::<Collider>(entity) {
            Some(collider) => {
                collider.enabled = false;
                Ok(())
            }
            None => {
                hitbox.set_inert(true);
                Err(self.misconfigured(entity, "Hitbox"))
            }
        };
        self.scene.insert(entity, hitbox);
        result
    }

    /// Attach `hurtbox` to `entity`. Without a collider the hurtbox is
    /// attached inert and an error is returned.
    pub fn attach_hurtbox(&mut self, entity: Entity, mut hurtbox: Hurtbox) -> Result<(), CombatError> {
        hurtbox.bind(entity);
        let result = if self.scene.has::<Collider>(entity) {
            Ok(())
        } else {
            hurtbox.set_inert(true);
            Err(self.misconfigured(entity, "Hurtbox"))
        };
        self.scene.insert(entity, hurtbox);
        result
    }

    fn misconfigured(&self, entity: Entity, component: &'static str) -> CombatError {
        let err = CombatError::MisconfiguredComponent {
            entity,
            label: self.scene.label(entity),
            component,
        };
        error!("{err}");
        err
    }

    // ---- Hitbox lifecycle ----

    /// Open a hit window on `hitbox` owned by `attacker`
    pub fn activate_hitbox(&mut self, hitbox: Entity, attacker: Entity) -> bool {
        let Some(component) = self.scene.get_mut::<Hitbox>(hitbox) else {
            return false;
        };
        if !component.activate(attacker, self.now, &mut self.scheduler) {
            warn!(hitbox = %hitbox, "inert hitbox cannot be activated");
            return false;
        }
        if let Some(collider) = self.scene.get_mut::<Collider>(hitbox) {
            collider.enabled = true;
        }
        // A fresh window re-reports anything already touching
        self.tracker.forget(hitbox);
        debug!(hitbox = %hitbox, %attacker, "hitbox activated");
        true
    }

    /// Close the hit window on `hitbox`
    pub fn deactivate_hitbox(&mut self, hitbox: Entity) -> bool {
        let Some(component) = self.scene.get_mut::<Hitbox>(hitbox) else {
            return false;
        };
        let closed = component.deactivate(
            self.now,
            self.config.deactivate_destroy_delay,
            &mut self.scheduler,
        );
        if closed {
            if let Some(collider) = self.scene.get_mut::<Collider>(hitbox) {
                collider.enabled = false;
            }
            debug!(hitbox = %hitbox, "hitbox deactivated");
        }
        closed
    }

    // ---- Hit resolution ----

    /// Handle one overlap-begin notification between `hitbox` and `candidate`
    pub fn on_overlap(&mut self, hitbox: Entity, candidate: Entity) -> HitResult {
        let Some(component) = self.scene.get::<Hitbox>(hitbox) else {
            return HitResult::Rejected(Rejection::NoHitbox);
        };
        if let Err(rejection) = component.screen(&self.scene, candidate) {
            debug!(hitbox = %hitbox, %candidate, ?rejection, "overlap rejected");
            return HitResult::Rejected(rejection);
        }

        let origin = self.world_center(hitbox);
        let target = self.world_center(candidate);
        let hit_point = self
            .scene
            .get::<Collider>(candidate)
            .map(|collider| collider.closest_point(self.scene.position(candidate), origin))
            .unwrap_or(target);
        let info = component.damage_info(origin, target, hit_point);
        let destroy_on_hit = component.destroy_on_hit;

        let Some((receiver, outcome)) = self.deal(candidate, &info) else {
            return HitResult::Rejected(Rejection::NoReceiver);
        };

        if let Some(component) = self.scene.get_mut::<Hitbox>(hitbox) {
            component.record_hit(candidate);
        }
        if destroy_on_hit {
            self.deactivate_hitbox(hitbox);
        }

        HitResult::Hit {
            hitbox,
            candidate,
            receiver,
            outcome,
        }
    }

    /// Apply a caller-built hit to whatever receiver `target` resolves to
    pub fn apply_damage(&mut self, target: Entity, info: &DamageInfo) -> Option<DamageOutcome> {
        self.deal(target, info).map(|(_, outcome)| outcome)
    }

    /// Heal the receiver `target` resolves to. Returns whether health changed.
    pub fn heal(&mut self, target: Entity, amount: f32) -> bool {
        let Some((_, receiver)) = resolve_receiver(&mut self.scene, target) else {
            return false;
        };
        let mut ctx = CombatContext {
            bus: &self.bus,
            scheduler: &mut self.scheduler,
            cues: &mut self.cues,
            config: &self.config,
            now: self.now,
        };
        receiver.heal(amount, &mut ctx)
    }

    fn deal(&mut self, node: Entity, info: &DamageInfo) -> Option<(Entity, DamageOutcome)> {
        let Some((receiver, damageable)) = resolve_receiver(&mut self.scene, node) else {
            let err = CombatError::NoReceiverFound {
                candidate: node,
                label: self.scene.label(node),
            };
            warn!("{err}");
            return None;
        };
        let mut ctx = CombatContext {
            bus: &self.bus,
            scheduler: &mut self.scheduler,
            cues: &mut self.cues,
            config: &self.config,
            now: self.now,
        };
        let outcome = damageable.take_damage(info, &mut ctx);
        if outcome.is_kill() {
            self.handle_death(receiver);
        }
        Some((receiver, outcome))
    }

    fn world_center(&self, entity: Entity) -> Vec2 {
        let position = self.scene.position(entity);
        self.scene
            .get::<Collider>(entity)
            .map_or(position, |collider| collider.center(position))
    }

    /// Side effects of a receiver dying: stop it being hit, stop its AI, drop loot
    fn handle_death(&mut self, receiver: Entity) {
        let owner = self
            .scene
            .get::<Hurtbox>(receiver)
            .and_then(Hurtbox::owner)
            .unwrap_or(receiver);

        if let Some(collider) = self.scene.get_mut::<Collider>(receiver) {
            collider.enabled = false;
        }
        for entity in [receiver, owner] {
            if let Some(brain) = self.scene.get_mut::<EnemyBrain>(entity) {
                brain.enabled = false;
            }
        }

        let table = self
            .scene
            .get::<LootTable>(owner)
            .or_else(|| self.scene.get::<LootTable>(receiver))
            .cloned();
        if let Some(table) = table {
            self.drop_loot(owner, &table);
        }
    }

    fn drop_loot(&mut self, dropped_by: Entity, table: &LootTable) {
        let Some(item) = table.roll(&mut self.rng).map(str::to_owned) else {
            return;
        };
        let position = self.scene.position(dropped_by);
        let drop = self.scene.spawn(format!("Loot({item})"));
        self.scene.set_position(drop, position);
        self.scene.add_tag(drop, tags::LOOT);
        self.scene.insert(
            drop,
            LootDrop {
                item: item.clone(),
                dropped_by,
            },
        );
        info!(%dropped_by, %item, "loot dropped");
        self.cues.push(FeedbackCue::Loot {
            drop,
            item,
            position,
        });
    }

    // ---- Teardown ----

    /// Despawn `entity` and its subtree, cancelling everything they had pending
    pub fn destroy(&mut self, entity: Entity) -> Vec<Entity> {
        let removed = self.scene.despawn(entity);
        for &gone in &removed {
            self.scheduler.cancel_owned_by(gone);
            self.tracker.forget(gone);
        }
        if !removed.is_empty() {
            debug!(%entity, count = removed.len(), "destroyed");
        }
        removed
    }

    // ---- Driving ----

    /// Attack with the [`AttackSpawner`] carried by `attacker`
    pub fn attack(&mut self, attacker: Entity, direction: Vec2) -> Option<Entity> {
        let spawner = self.scene.get::<AttackSpawner>(attacker)?.clone();
        spawner.perform_attack(self, attacker, direction)
    }

    /// Advance the clock by `delta` seconds.
    ///
    /// Order: due timers, enemy brains, then overlap dispatch. Returns the
    /// result of every overlap-begin pair processed this step.
    pub fn step(&mut self, delta: f32) -> Vec<HitResult> {
        self.now += f64::from(delta.max(0.0));
        self.run_due_tasks();

        for entity in self.scene.entities_with::<EnemyBrain>() {
            enemy::think(self, entity, delta);
        }

        self.dispatch_overlaps()
    }

    fn run_due_tasks(&mut self) {
        for task in self.scheduler.drain_due(self.now) {
            match task.action {
                ScheduledAction::DeactivateHitbox(hitbox) => {
                    if let Some(component) = self.scene.get_mut::<Hitbox>(hitbox) {
                        component.clear_auto_deactivate(task.id);
                    }
                    self.deactivate_hitbox(hitbox);
                }
                ScheduledAction::DestroyEntity(entity) => {
                    self.destroy(entity);
                }
                ScheduledAction::EndFlash(entity) => {
                    if let Some(hurtbox) = self.scene.get_mut::<Hurtbox>(entity) {
                        hurtbox.end_flash();
                    }
                }
            }
        }
    }

    fn dispatch_overlaps(&mut self) -> Vec<HitResult> {
        let volume = |entity: Entity| {
            self.scene
                .get::<Collider>(entity)
                .map(|collider| Volume::new(entity, self.scene.position(entity), *collider))
        };
        let sensors: Vec<_> = self
            .scene
            .entities_with::<Hitbox>()
            .into_iter()
            .filter_map(volume)
            .collect();
        let bodies: Vec<_> = self
            .scene
            .entities_with::<Collider>()
            .into_iter()
            .filter(|entity| !self.scene.has::<Hitbox>(*entity))
            .filter_map(volume)
            .collect();

        let began = self.tracker.update(&sensors, &bodies);
        began
            .into_iter()
            .map(|(hitbox, candidate)| self.on_overlap(hitbox, candidate))
            .collect()
    }

    /// Queued presentation cues, oldest first
    pub fn drain_cues(&mut self) -> Vec<FeedbackCue> {
        std::mem::take(&mut self.cues)
    }

    /// Report setup problems: combat components without colliders and
    /// enemies with no reachable damage receiver
    pub fn validate(&self) -> Vec<CombatError> {
        let mut problems = Vec::new();
        for entity in self.scene.entities_with::<Hitbox>() {
            if !self.scene.has::<Collider>(entity) {
                problems.push(CombatError::MisconfiguredComponent {
                    entity,
                    label: self.scene.label(entity),
                    component: "Hitbox",
                });
            }
        }
        for entity in self.scene.entities_with::<Hurtbox>() {
            if !self.scene.has::<Collider>(entity) {
                problems.push(CombatError::MisconfiguredComponent {
                    entity,
                    label: self.scene.label(entity),
                    component: "Hurtbox",
                });
            }
        }
        for entity in self.scene.find_tagged(tags::ENEMY) {
            if find_receiver(&self.scene, entity).is_none() {
                problems.push(CombatError::NoReceiverFound {
                    candidate: entity,
                    label: self.scene.label(entity),
                });
            }
        }
        for problem in &problems {
            warn!("{problem}");
        }
        problems
    }
}

impl std::fmt::Debug for CombatWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombatWorld")
            .field("now", &self.now)
            .field("entities", &self.scene.entity_count())
            .field("pending_tasks", &self.scheduler.len())
            .finish()
    }
}
