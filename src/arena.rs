//! Headless arena fight: one player against a ring of enemies

use std::sync::Arc;

use anyhow::Result;
use glam::Vec2;
use parking_lot::Mutex;
use serde::Serialize;
use skirmish_combat::{
    layers, tags, AttackSpawner, CombatEvent, CombatEventBus, CombatWorld, DamageType,
    Damageable, EnemyBrain, EntityStats, FeedbackCue, HitboxTemplate, Hurtbox, LootTable,
};
use skirmish_core::StepClock;
use skirmish_physics::Collider;
use skirmish_scene::Entity;
use tracing::{info, warn};

use crate::settings::SimSettings;

/// Event totals seen on the bus during a run
#[derive(Debug, Clone, Default, Serialize)]
pub struct EventTally {
    pub damage_received: u32,
    pub health_changed: u32,
    pub deaths: u32,
    pub total_damage: f32,
}

impl EventTally {
    fn record(&mut self, event: &CombatEvent) {
        match event {
            CombatEvent::DamageReceived { amount, .. } => {
                self.damage_received += 1;
                self.total_damage += amount;
            }
            CombatEvent::HealthChanged { .. } => self.health_changed += 1,
            CombatEvent::EntityDied { .. } => self.deaths += 1,
        }
    }
}

/// Summary printed at the end of a run
#[derive(Debug, Clone, Serialize)]
pub struct ArenaReport {
    pub seconds: f64,
    pub steps: u64,
    pub hits: u32,
    pub player_alive: bool,
    pub player_health: f32,
    pub enemies_left: usize,
    pub loot: Vec<String>,
    pub events: EventTally,
}

struct Arena {
    world: CombatWorld,
    player: Entity,
    enemies: Vec<Entity>,
    swing_timer: f32,
}

/// Run the fight on the process-wide event bus
pub fn run(settings: &SimSettings) -> Result<ArenaReport> {
    run_with_bus(settings, CombatEventBus::global().clone())
}

/// Run the fight publishing on `bus`
pub fn run_with_bus(settings: &SimSettings, bus: CombatEventBus) -> Result<ArenaReport> {
    let tally = Arc::new(Mutex::new(EventTally::default()));
    let sink = Arc::clone(&tally);
    let _subscription = bus.subscribe(move |event| sink.lock().record(event));

    let mut world = CombatWorld::with_bus(settings.combat.clone(), bus);
    if let Some(seed) = settings.arena.seed {
        world = world.seeded(seed);
    }
    let mut arena = Arena::build(world, settings)?;

    for problem in arena.world.validate() {
        warn!("arena setup: {problem}");
    }

    if !settings.time.is_runnable() {
        anyhow::bail!("time settings must all be positive");
    }
    let mut clock = StepClock::new(settings.time.clone());
    let frame = clock.step_seconds();
    let mut hits = 0;
    let mut loot = Vec::new();

    while clock.elapsed() < f64::from(settings.arena.duration) {
        for _ in 0..clock.advance(frame) {
            let delta = clock.step_seconds();
            arena.player_turn(settings, delta);
            let results = arena.world.step(delta);
            hits += results.iter().filter(|r| r.is_hit()).count() as u32;
        }

        for cue in arena.world.drain_cues() {
            if let FeedbackCue::Loot { item, .. } = cue {
                loot.push(item);
            }
        }

        if arena.is_over() {
            break;
        }
    }

    let scene = arena.world.scene();
    let player_health = scene
        .get::<Hurtbox>(arena.player)
        .map(|hurtbox| hurtbox.current_health())
        .unwrap_or(0.0);
    let report = ArenaReport {
        seconds: arena.world.now(),
        steps: clock.steps(),
        hits,
        player_alive: player_health > 0.0,
        player_health,
        enemies_left: arena.living_enemies().len(),
        loot,
        events: tally.lock().clone(),
    };
    info!(
        seconds = report.seconds,
        hits = report.hits,
        deaths = report.events.deaths,
        "arena finished"
    );
    Ok(report)
}

impl Arena {
    fn build(mut world: CombatWorld, settings: &SimSettings) -> Result<Self> {
        let arena = &settings.arena;

        let player = world.scene_mut().spawn("Player");
        {
            let scene = world.scene_mut();
            scene.add_tag(player, tags::PLAYER);
            scene.set_layer(player, layers::PLAYER);
            scene.insert(player, Collider::circle(0.5));
            scene.insert(
                player,
                AttackSpawner {
                    base_damage: arena.player_damage,
                    damage_type: DamageType::Physical,
                    template: Some(HitboxTemplate {
                        name: "PlayerSwing".into(),
                        collider: Collider::circle(arena.player_attack_radius),
                        ..Default::default()
                    }),
                    ..Default::default()
                },
            );
        }
        world.attach_hurtbox(
            player,
            Hurtbox::new(EntityStats::new(arena.player_health, arena.player_armor)),
        )?;

        let mut enemies = Vec::new();
        for index in 0..arena.enemy_count {
            let angle = index as f32 / arena.enemy_count.max(1) as f32 * std::f32::consts::TAU;
            let position = Vec2::from_angle(angle) * arena.spawn_radius;

            let scene = world.scene_mut();
            let goblin = scene.spawn(format!("Goblin {}", index + 1));
            scene.add_tag(goblin, tags::ENEMY);
            scene.set_layer(goblin, layers::ENEMY);
            scene.set_position(goblin, position);
            scene.insert(goblin, EnemyBrain::default());
            scene.insert(
                goblin,
                LootTable::new(arena.loot_items.iter().cloned(), arena.loot_chance),
            );

            // The body carries the receiver; hits resolve up to the goblin
            let body = scene.spawn_child(goblin, "Body");
            scene.set_layer(body, layers::ENEMY_HURTBOX);
            scene.insert(body, Collider::circle(0.5));
            let stats = EntityStats::new(arena.enemy_health, arena.enemy_armor)
                .with_resistance(DamageType::Fire, arena.enemy_fire_resistance);
            world.attach_hurtbox(body, Hurtbox::new(stats).with_owner(goblin))?;

            enemies.push(goblin);
        }
        info!(enemies = enemies.len(), "arena ready");

        Ok(Self {
            world,
            player,
            enemies,
            swing_timer: 0.0,
        })
    }

    fn living_enemies(&self) -> Vec<Entity> {
        let scene = self.world.scene();
        self.enemies
            .iter()
            .copied()
            .filter(|enemy| {
                scene
                    .descendants(*enemy)
                    .into_iter()
                    .any(|part| scene.get::<Hurtbox>(part).is_some_and(|h| h.is_alive()))
            })
            .collect()
    }

    fn is_over(&self) -> bool {
        !self.world.scene().is_alive(self.player) || self.living_enemies().is_empty()
    }

    /// Swing at the nearest living enemy once it is within reach
    fn player_turn(&mut self, settings: &SimSettings, delta: f32) {
        self.swing_timer = (self.swing_timer - delta).max(0.0);
        let scene = self.world.scene();
        let alive = scene
            .get::<Hurtbox>(self.player)
            .is_some_and(|hurtbox| hurtbox.is_alive());
        if !alive || self.swing_timer > 0.0 {
            return;
        }

        let origin = scene.position(self.player);
        let nearest = self
            .living_enemies()
            .into_iter()
            .map(|enemy| scene.position(enemy) - origin)
            .min_by(|a, b| a.length().total_cmp(&b.length()));
        let Some(offset) = nearest else {
            return;
        };
        if offset.length() > settings.arena.player_reach {
            return;
        }

        if self.world.attack(self.player, offset).is_some() {
            self.swing_timer = settings.arena.player_attack_interval;
        }
    }
}
