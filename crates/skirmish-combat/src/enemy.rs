//! Chase-and-strike enemy behaviour

use glam::Vec2;
use skirmish_core::direction_or;
use skirmish_scene::Entity;

use crate::attack::AttackSpawner;
use crate::tags;
use crate::world::CombatWorld;

/// What a brain wants to do this step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BrainAction {
    Idle,
    /// Move with this velocity
    Chase(Vec2),
    /// Strike in this direction
    Attack(Vec2),
    /// In range, waiting on the cooldown
    Hold,
}

/// Enemy AI component. Disabled when its owner dies.
#[derive(Debug, Clone)]
pub struct EnemyBrain {
    pub move_speed: f32,
    pub attack_range: f32,
    /// Seconds between attacks
    pub attack_cooldown: f32,
    pub detection_range: f32,
    /// Chased entity; found by the player tag when unset
    pub target: Option<Entity>,
    pub enabled: bool,
    pub spawner: AttackSpawner,
    attack_timer: f32,
}

impl Default for EnemyBrain {
    fn default() -> Self {
        Self {
            move_speed: 2.0,
            attack_range: 1.5,
            attack_cooldown: 2.0,
            detection_range: 5.0,
            target: None,
            enabled: true,
            spawner: AttackSpawner::hostile(15.0, 0.75),
            attack_timer: 0.0,
        }
    }
}

impl EnemyBrain {
    /// Seconds left until the next attack is allowed
    pub fn cooldown_remaining(&self) -> f32 {
        self.attack_timer
    }

    /// Advance the cooldown by `delta` and pick an action
    pub fn decide(&mut self, position: Vec2, target: Option<Vec2>, delta: f32) -> BrainAction {
        self.attack_timer = (self.attack_timer - delta).max(0.0);
        if !self.enabled {
            return BrainAction::Idle;
        }
        let Some(target) = target else {
            return BrainAction::Idle;
        };

        let offset = target - position;
        let distance = offset.length();
        if distance > self.detection_range {
            return BrainAction::Idle;
        }

        let direction = direction_or(offset, Vec2::X);
        if distance <= self.attack_range {
            if self.attack_timer <= 0.0 {
                self.attack_timer = self.attack_cooldown;
                BrainAction::Attack(direction)
            } else {
                BrainAction::Hold
            }
        } else {
            BrainAction::Chase(direction * self.move_speed)
        }
    }
}

/// Run one step of the brain on `entity`
pub(crate) fn think(world: &mut CombatWorld, entity: Entity, delta: f32) -> BrainAction {
    let scene = world.scene();
    let Some(brain) = scene.get::<EnemyBrain>(entity) else {
        return BrainAction::Idle;
    };
    let target = brain
        .target
        .filter(|target| scene.is_alive(*target))
        .or_else(|| scene.find_tagged(tags::PLAYER).into_iter().next());
    let position = scene.position(entity);
    let target_position = target.map(|target| scene.position(target));

    let Some(brain) = world.scene_mut().get_mut::<EnemyBrain>(entity) else {
        return BrainAction::Idle;
    };
    brain.target = target;
    let action = brain.decide(position, target_position, delta);

    match action {
        BrainAction::Chase(velocity) => world.scene_mut().translate(entity, velocity * delta),
        BrainAction::Attack(direction) => {
            let mut spawner = brain.spawner.clone();
            spawner.offset = brain.attack_range * 0.5;
            spawner.perform_attack(world, entity, direction);
        }
        BrainAction::Idle | BrainAction::Hold => {}
    }
    action
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_without_target_or_out_of_range() {
        let mut brain = EnemyBrain::default();
        assert_eq!(brain.decide(Vec2::ZERO, None, 0.1), BrainAction::Idle);
        assert_eq!(
            brain.decide(Vec2::ZERO, Some(Vec2::new(10.0, 0.0)), 0.1),
            BrainAction::Idle
        );
    }

    #[test]
    fn test_chases_inside_detection_range() {
        let mut brain = EnemyBrain::default();
        let action = brain.decide(Vec2::ZERO, Some(Vec2::new(0.0, 4.0)), 0.1);
        assert_eq!(action, BrainAction::Chase(Vec2::new(0.0, 2.0)));
    }

    #[test]
    fn test_attacks_then_holds_for_cooldown() {
        let mut brain = EnemyBrain::default();
        let target = Some(Vec2::new(1.0, 0.0));
        assert_eq!(brain.cooldown_remaining(), 0.0);
        assert_eq!(
            brain.decide(Vec2::ZERO, target, 0.1),
            BrainAction::Attack(Vec2::X)
        );
        assert_eq!(brain.cooldown_remaining(), 2.0);
        assert_eq!(brain.decide(Vec2::ZERO, target, 1.0), BrainAction::Hold);
        assert_eq!(brain.decide(Vec2::ZERO, target, 0.5), BrainAction::Hold);
        assert_eq!(brain.cooldown_remaining(), 0.5);
        assert_eq!(
            brain.decide(Vec2::ZERO, target, 0.5),
            BrainAction::Attack(Vec2::X)
        );
        assert_eq!(brain.cooldown_remaining(), 2.0);
    }

    #[test]
    fn test_disabled_brain_does_nothing() {
        let mut brain = EnemyBrain {
            enabled: false,
            ..Default::default()
        };
        assert_eq!(
            brain.decide(Vec2::ZERO, Some(Vec2::new(1.0, 0.0)), 0.1),
            BrainAction::Idle
        );
    }
}
