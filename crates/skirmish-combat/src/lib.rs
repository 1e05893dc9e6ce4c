//! Skirmish Combat - hitbox/hurtbox combat resolution
//!
//! Attack volumes ([`Hitbox`]) open short activation windows; when the
//! overlap tracker reports a newly touching pair the hitbox screens the
//! candidate, resolves its damage receiver through the scene hierarchy and
//! hands it a [`DamageInfo`]. Receivers ([`Hurtbox`]) run the mitigation
//! pipeline, mutate their [`EntityStats`] and announce what happened on the
//! [`CombatEventBus`]. Everything deferred (window expiry, damage flash,
//! delayed destruction) lives in the [`Scheduler`] and is cancelled with
//! the entity that owns it.

pub mod attack;
pub mod config;
pub mod damage;
pub mod enemy;
pub mod error;
pub mod events;
pub mod hitbox;
pub mod hurtbox;
pub mod loot;
pub mod model;
pub mod receiver;
pub mod scheduler;
pub mod stats;
pub mod world;

pub use attack::{AttackSpawner, HitboxTemplate};
pub use config::CombatConfig;
pub use damage::{DamageComposition, DamageInfo, DamageType};
pub use enemy::{BrainAction, EnemyBrain};
pub use error::CombatError;
pub use events::{CombatEvent, CombatEventBus, FeedbackCue, Subscription};
pub use hitbox::{AllyFilter, HitResult, Hitbox, Rejection};
pub use hurtbox::{Hurtbox, LifeState};
pub use loot::{LootDrop, LootTable};
pub use model::{compute_damage, compute_final_damage, DamageBreakdown};
pub use receiver::{find_receiver, resolve_receiver, CombatContext, DamageOutcome, Damageable};
pub use scheduler::{ScheduledAction, Scheduler, TaskId};
pub use stats::EntityStats;
pub use world::CombatWorld;

/// Collision layers used by the two sides of a fight
pub mod layers {
    use skirmish_scene::Layer;

    pub const PLAYER: Layer = Layer::from_index(8);
    pub const PLAYER_HURTBOX: Layer = Layer::from_index(9);
    pub const ENEMY: Layer = Layer::from_index(10);
    pub const ENEMY_HURTBOX: Layer = Layer::from_index(11);
}

/// Scene tags the combat core looks up
pub mod tags {
    pub const PLAYER: &str = "Player";
    pub const ENEMY: &str = "Enemy";
    pub const LOOT: &str = "Loot";
}
