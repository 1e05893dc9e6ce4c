//! Fixed-step clock for the combat loop
//!
//! Frames arrive with whatever delta the host measured; combat only ever
//! advances in whole steps of `TimeConfig::fixed_timestep`.

use serde::{Deserialize, Serialize};

/// How frame time is turned into simulation steps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    /// Simulated seconds per real second
    pub time_scale: f32,
    /// Length of one combat step in seconds
    pub fixed_timestep: f32,
    /// Longest frame accepted; longer frames are cut to this
    pub max_delta_time: f32,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            fixed_timestep: 1.0 / 60.0,
            max_delta_time: 0.25,
        }
    }
}

impl TimeConfig {
    /// Whether a clock with this config can make progress
    pub fn is_runnable(&self) -> bool {
        self.time_scale > 0.0 && self.fixed_timestep > 0.0 && self.max_delta_time > 0.0
    }
}

/// Splits frame deltas into fixed combat steps.
#[derive(Debug, Clone)]
pub struct StepClock {
    config: TimeConfig,
    /// Simulated seconds fed in so far, including the unstepped remainder
    elapsed: f64,
    frames: u64,
    steps: u64,
    paused: bool,
    remainder: f32,
}

impl Default for StepClock {
    fn default() -> Self {
        Self::new(TimeConfig::default())
    }
}

impl StepClock {
    pub fn new(config: TimeConfig) -> Self {
        Self {
            config,
            elapsed: 0.0,
            frames: 0,
            steps: 0,
            paused: false,
            remainder: 0.0,
        }
    }

    pub fn config(&self) -> &TimeConfig {
        &self.config
    }

    /// Feed one frame of `raw_delta` real seconds and return how many fixed
    /// steps are now due. A paused clock counts the frame but never steps.
    pub fn advance(&mut self, raw_delta: f32) -> u32 {
        self.frames += 1;
        if self.paused || self.config.fixed_timestep <= 0.0 {
            return 0;
        }

        let scaled = raw_delta.clamp(0.0, self.config.max_delta_time) * self.config.time_scale;
        self.elapsed += f64::from(scaled);
        self.remainder += scaled;

        let step = self.config.fixed_timestep;
        let mut due = 0;
        while self.remainder >= step {
            self.remainder -= step;
            due += 1;
        }
        self.steps += u64::from(due);
        due
    }

    /// Seconds covered by one step
    pub fn step_seconds(&self) -> f32 {
        self.config.fixed_timestep
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Steps handed out so far
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// 0.0 freezes the fight, 2.0 runs it at double speed
    pub fn set_time_scale(&mut self, scale: f32) {
        self.config.time_scale = scale.max(0.0);
    }
}
