//! Skirmish Physics - minimal 2D spatial queries
//!
//! Provides trigger-style collision volumes and overlap-begin notifications.
//! There is no rigid body simulation here: the combat core only needs to know
//! when a hitbox starts touching something and where the closest contact
//! point lies.

mod collider;
mod overlap;

pub use collider::{Collider, Shape};
pub use overlap::{OverlapTracker, Volume};
