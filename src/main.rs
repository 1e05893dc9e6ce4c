//! Skirmish - headless arena for the hitbox/hurtbox combat core
//!
//! Loads settings, runs one fixed-step fight and prints a JSON summary.
//! Pass a path to a settings file to override the one in the config dir.

mod arena;
mod settings;

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::settings::SimSettings;

fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")?;

    info!("Starting Skirmish arena...");

    let settings = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => SimSettings::load_from(&path)?,
        None => SimSettings::load(),
    };

    let report = arena::run(&settings).context("Arena run failed")?;
    let summary = serde_json::to_string_pretty(&report).context("Failed to encode summary")?;
    println!("{summary}");
    Ok(())
}
