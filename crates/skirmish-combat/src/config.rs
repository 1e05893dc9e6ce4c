use serde::{Deserialize, Serialize};
use skirmish_core::Color;

/// Tunables of the combat core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Seconds the damage tint stays on a hurt receiver
    pub flash_duration: f32,
    /// Tint applied while flashing
    pub flash_color: Color,
    /// Seconds between death and destruction of the dead entity's owner
    pub death_destroy_delay: f32,
    /// Seconds between hitbox deactivation and its self-destruction
    pub deactivate_destroy_delay: f32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            flash_duration: 0.1,
            flash_color: Color::RED,
            death_destroy_delay: 2.0,
            deactivate_destroy_delay: 0.1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CombatConfig::default();
        assert_eq!(config.flash_duration, 0.1);
        assert_eq!(config.flash_color, Color::RED);
        assert_eq!(config.death_destroy_delay, 2.0);
        assert_eq!(config.deactivate_destroy_delay, 0.1);
    }
}
