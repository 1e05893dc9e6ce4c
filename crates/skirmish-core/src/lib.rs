//! Skirmish Core - primitives shared by the combat crates
//!
//! - glam `Vec2` re-export
//! - [`Color`] tints for presentation-facing state such as damage flashes
//! - [`StepClock`], which turns frame deltas into fixed combat steps

pub mod time;
pub mod types;

pub use glam::Vec2;
pub use time::{StepClock, TimeConfig};
pub use types::{direction_or, Color};
