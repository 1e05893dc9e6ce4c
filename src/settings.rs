//! Simulation settings with persistence
//!
//! Settings are read from `~/.config/skirmish/settings.toml`

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use skirmish_combat::CombatConfig;
use skirmish_core::TimeConfig;
use tracing::{info, warn};

/// All simulation settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimSettings {
    pub combat: CombatConfig,
    pub time: TimeConfig,
    pub arena: ArenaSettings,
}

impl SimSettings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("skirmish"))
    }

    /// Get the settings file path
    fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.toml"))
    }

    /// Load settings from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            warn!("Could not determine config directory");
            return Self::default();
        };

        if !path.exists() {
            info!("No settings file found, using defaults");
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(settings) => {
                info!("Loaded settings from {:?}", path);
                settings
            }
            Err(e) => {
                warn!("{:#}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Load settings from an explicit file
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse settings {:?}", path))
    }

    /// Save settings to disk
    pub fn save(&self) -> anyhow::Result<()> {
        let Some(dir) = Self::config_dir() else {
            anyhow::bail!("Could not determine config directory");
        };

        let path = dir.join("settings.toml");

        // Create config directory if it doesn't exist
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        info!("Saved settings to {:?}", path);
        Ok(())
    }
}

/// Layout and balance of the arena fight
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaSettings {
    /// Number of enemies placed around the player
    pub enemy_count: u32,
    /// Distance from the player at which enemies spawn
    pub spawn_radius: f32,
    /// Simulated seconds before the fight is called off
    pub duration: f32,
    /// Seed for loot rolls; random when absent
    pub seed: Option<u64>,
    pub player_health: f32,
    pub player_armor: f32,
    /// Seconds between player swings
    pub player_attack_interval: f32,
    /// Player swings only when an enemy is this close
    pub player_reach: f32,
    /// Radius of the player's attack hitbox
    pub player_attack_radius: f32,
    pub player_damage: f32,
    pub enemy_health: f32,
    pub enemy_armor: f32,
    /// Fire resistance percent of every enemy
    pub enemy_fire_resistance: f32,
    pub loot_items: Vec<String>,
    pub loot_chance: f32,
}

impl Default for ArenaSettings {
    fn default() -> Self {
        Self {
            enemy_count: 3,
            spawn_radius: 4.0,
            duration: 30.0,
            seed: None,
            player_health: 150.0,
            player_armor: 10.0,
            player_attack_interval: 0.5,
            player_reach: 1.8,
            player_attack_radius: 0.9,
            player_damage: 20.0,
            enemy_health: 50.0,
            enemy_armor: 5.0,
            enemy_fire_resistance: 25.0,
            loot_items: vec!["Coin".into(), "Potion".into(), "Rusty Sword".into()],
            loot_chance: 0.3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings: SimSettings = toml::from_str(
            r#"
            [arena]
            enemy_count = 5
            seed = 11

            [combat]
            death_destroy_delay = 1.0
            "#,
        )
        .unwrap();
        assert_eq!(settings.arena.enemy_count, 5);
        assert_eq!(settings.arena.seed, Some(11));
        assert_eq!(settings.arena.spawn_radius, 4.0);
        assert_eq!(settings.combat.death_destroy_delay, 1.0);
        assert_eq!(settings.combat.flash_duration, 0.1);
        assert_eq!(settings.time.fixed_timestep, 1.0 / 60.0);
    }

    #[test]
    fn test_round_trips_through_toml() {
        let settings = SimSettings::default();
        let text = toml::to_string_pretty(&settings).unwrap();
        let back: SimSettings = toml::from_str(&text).unwrap();
        assert_eq!(back.combat, settings.combat);
        assert_eq!(back.arena.loot_items, settings.arena.loot_items);
    }

    #[test]
    fn test_load_from_missing_file_is_an_error() {
        let err = SimSettings::load_from(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to read settings file"));
    }
}
