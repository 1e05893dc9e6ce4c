//! Skirmish Scene - entity identity, hierarchy and component storage
//!
//! A small scene store derived from a sparse-set ECS. Entities are generational
//! handles, so a stale handle kept by a hitbox or a timer never aliases a
//! recycled slot. On top of component storage the scene tracks the things the
//! combat core asks about: names, layers, tags, 2D positions and the
//! parent/child hierarchy.

mod entity;
mod layer;
mod scene;
mod storage;

pub use entity::Entity;
pub use layer::{Layer, LayerMask};
pub use scene::Scene;
