use std::collections::HashSet;
use std::hash::Hash;

use glam::Vec2;

use crate::collider::Collider;

/// A collider placed in the world for one overlap pass.
#[derive(Debug, Clone, Copy)]
pub struct Volume<K> {
    pub key: K,
    pub position: Vec2,
    pub collider: Collider,
}

impl<K> Volume<K> {
    pub fn new(key: K, position: Vec2, collider: Collider) -> Self {
        Self {
            key,
            position,
            collider,
        }
    }
}

/// Tracks which sensor/body pairs are touching and reports only the pairs
/// that started touching since the previous pass.
///
/// A pair that separates (or whose collider is disabled) and then touches
/// again is reported again.
#[derive(Debug)]
pub struct OverlapTracker<K> {
    touching: HashSet<(K, K)>,
}

impl<K: Copy + Eq + Hash> OverlapTracker<K> {
    pub fn new() -> Self {
        Self {
            touching: HashSet::new(),
        }
    }

    /// Run one overlap pass.
    ///
    /// Returns `(sensor, body)` pairs that began touching, ordered by sensor
    /// then body input order. A volume never overlaps itself.
    pub fn update(&mut self, sensors: &[Volume<K>], bodies: &[Volume<K>]) -> Vec<(K, K)> {
        let mut now_touching = HashSet::new();
        let mut began = Vec::new();

        for sensor in sensors.iter().filter(|v| v.collider.enabled) {
            for body in bodies.iter().filter(|v| v.collider.enabled) {
                if sensor.key == body.key {
                    continue;
                }
                if !sensor
                    .collider
                    .overlaps(sensor.position, &body.collider, body.position)
                {
                    continue;
                }
                let pair = (sensor.key, body.key);
                if !self.touching.contains(&pair) {
                    began.push(pair);
                }
                now_touching.insert(pair);
            }
        }

        self.touching = now_touching;
        began
    }

    /// Drop every pair involving `key`, e.g. after its entity is destroyed.
    pub fn forget(&mut self, key: K) {
        self.touching.retain(|(a, b)| *a != key && *b != key);
    }

    pub fn is_touching(&self, sensor: K, body: K) -> bool {
        self.touching.contains(&(sensor, body))
    }

    /// Number of pairs currently touching.
    pub fn len(&self) -> usize {
        self.touching.len()
    }

    pub fn is_empty(&self) -> bool {
        self.touching.is_empty()
    }
}

impl<K: Copy + Eq + Hash> Default for OverlapTracker<K> {
    fn default() -> Self {
        Self::new()
    }
}
