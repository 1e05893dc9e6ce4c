//! Spawning attack hitboxes in front of an attacker

use glam::Vec2;
use skirmish_core::direction_or;
use skirmish_physics::Collider;
use skirmish_scene::{Entity, LayerMask};
use tracing::{debug, error};

use crate::damage::{DamageComposition, DamageType};
use crate::error::CombatError;
use crate::hitbox::Hitbox;
use crate::layers;
use crate::world::CombatWorld;

/// Blueprint for the hitbox entity an attack spawns
#[derive(Debug, Clone)]
pub struct HitboxTemplate {
    pub name: String,
    pub collider: Collider,
    pub hitbox: Hitbox,
}

impl Default for HitboxTemplate {
    fn default() -> Self {
        Self {
            name: "AttackHitbox".into(),
            collider: Collider::circle(0.5),
            hitbox: Hitbox::default(),
        }
    }
}

/// Turns an attack request into an activated hitbox
#[derive(Debug, Clone)]
pub struct AttackSpawner {
    /// Without a template every attack is skipped
    pub template: Option<HitboxTemplate>,
    pub base_damage: f32,
    pub damage_type: DamageType,
    pub target_layers: LayerMask,
    /// Distance from the attacker to the spawned hitbox
    pub offset: f32,
}

impl Default for AttackSpawner {
    fn default() -> Self {
        Self {
            template: Some(HitboxTemplate::default()),
            base_damage: 20.0,
            damage_type: DamageType::Physical,
            target_layers: LayerMask::of(&[layers::ENEMY, layers::ENEMY_HURTBOX]),
            offset: 0.3,
        }
    }
}

impl AttackSpawner {
    /// Spawner used by enemy brains: hits the player side
    pub fn hostile(base_damage: f32, offset: f32) -> Self {
        Self {
            base_damage,
            target_layers: LayerMask::of(&[layers::PLAYER, layers::PLAYER_HURTBOX]),
            offset,
            ..Default::default()
        }
    }

    pub fn with_template(mut self, template: Option<HitboxTemplate>) -> Self {
        self.template = template;
        self
    }

    /// Spawn and activate a hitbox at `attacker + direction * offset`.
    ///
    /// A zero direction attacks to the right. Returns the hitbox entity, or
    /// `None` when there is no template or the attacker is gone.
    pub fn perform_attack(
        &self,
        world: &mut CombatWorld,
        attacker: Entity,
        direction: Vec2,
    ) -> Option<Entity> {
        let Some(template) = &self.template else {
            let err = CombatError::InvalidPrefabReference {
                attacker,
                label: world.scene().label(attacker),
            };
            error!("{err}");
            return None;
        };
        if !world.scene().is_alive(attacker) {
            return None;
        }

        let direction = direction_or(direction, Vec2::X);
        let position = world.scene().position(attacker) + direction * self.offset;

        let scene = world.scene_mut();
        let entity = scene.spawn(template.name.clone());
        scene.set_position(entity, position);
        scene.insert(entity, template.collider);

        let mut hitbox = template.hitbox.clone();
        hitbox.damage = DamageComposition::single(self.damage_type, self.base_damage);
        hitbox.target_layers = self.target_layers;

        world.attach_hitbox(entity, hitbox).ok()?;
        world.activate_hitbox(entity, attacker);
        debug!(%attacker, hitbox = %entity, ?position, "attack spawned");
        Some(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::CombatEventBus;
    use crate::CombatConfig;

    fn world() -> CombatWorld {
        CombatWorld::with_bus(CombatConfig::default(), CombatEventBus::new())
    }

    #[test]
    fn test_spawns_active_hitbox_in_front() {
        let mut world = world();
        let player = world.scene_mut().spawn("player");
        world.scene_mut().set_position(player, Vec2::new(1.0, 1.0));

        let spawner = AttackSpawner::default();
        let hitbox = spawner
            .perform_attack(&mut world, player, Vec2::new(0.0, 2.0))
            .unwrap();

        let position = world.scene().position(hitbox);
        assert!((position - Vec2::new(1.0, 1.3)).length() < 1e-6);
        let hitbox = world.scene().get::<Hitbox>(hitbox).unwrap();
        assert!(hitbox.is_active());
        assert_eq!(hitbox.owner(), Some(player));
        assert_eq!(hitbox.damage.get(DamageType::Physical), 20.0);
        assert!(hitbox.target_layers.contains(layers::ENEMY));
    }

    #[test]
    fn test_zero_direction_attacks_right() {
        let mut world = world();
        let player = world.scene_mut().spawn("player");
        let hitbox = AttackSpawner::default()
            .perform_attack(&mut world, player, Vec2::ZERO)
            .unwrap();
        assert!((world.scene().position(hitbox) - Vec2::new(0.3, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_missing_template_is_a_no_op() {
        let mut world = world();
        let player = world.scene_mut().spawn("player");
        let before = world.scene().entity_count();

        let spawner = AttackSpawner::default().with_template(None);
        assert!(spawner.perform_attack(&mut world, player, Vec2::X).is_none());
        assert_eq!(world.scene().entity_count(), before);
    }

    #[test]
    fn test_hostile_spawner_targets_player_layers() {
        let spawner = AttackSpawner::hostile(15.0, 0.75);
        assert!(spawner.target_layers.contains(layers::PLAYER));
        assert!(spawner.target_layers.contains(layers::PLAYER_HURTBOX));
        assert!(!spawner.target_layers.contains(layers::ENEMY));
    }
}
