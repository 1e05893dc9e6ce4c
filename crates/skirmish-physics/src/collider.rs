use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Shape of a collision volume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Circle {
        radius: f32,
    },
    /// Axis-aligned box described by its half extents.
    Box {
        half_extents: Vec2,
    },
}

impl Default for Shape {
    fn default() -> Self {
        Self::Circle { radius: 0.5 }
    }
}

/// A trigger volume attached to an entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    pub shape: Shape,
    /// Offset from the owning entity's position
    #[serde(default)]
    pub offset: Vec2,
    /// Disabled colliders never report overlaps
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Default for Collider {
    fn default() -> Self {
        Self::new(Shape::default())
    }
}

impl Collider {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            offset: Vec2::ZERO,
            enabled: true,
        }
    }

    pub fn circle(radius: f32) -> Self {
        Self::new(Shape::Circle { radius })
    }

    pub fn rect(width: f32, height: f32) -> Self {
        Self::new(Shape::Box {
            half_extents: Vec2::new(width, height) * 0.5,
        })
    }

    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    /// World-space center for an entity at `position`.
    pub fn center(&self, position: Vec2) -> Vec2 {
        position + self.offset
    }

    /// Closest point on (or inside) this volume to `point`.
    ///
    /// Points already inside the volume are returned unchanged.
    pub fn closest_point(&self, position: Vec2, point: Vec2) -> Vec2 {
        let center = self.center(position);
        match self.shape {
            Shape::Circle { radius } => {
                let delta = point - center;
                if delta.length_squared() <= radius * radius {
                    point
                } else {
                    center + delta.normalize() * radius
                }
            }
            Shape::Box { half_extents } => {
                point.clamp(center - half_extents, center + half_extents)
            }
        }
    }

    /// Whether this volume at `position` intersects `other` at `other_position`.
    /// Touching boundaries count as overlapping.
    pub fn overlaps(&self, position: Vec2, other: &Collider, other_position: Vec2) -> bool {
        let a = self.center(position);
        let b = other.center(other_position);
        match (self.shape, other.shape) {
            (Shape::Circle { radius: ra }, Shape::Circle { radius: rb }) => {
                a.distance_squared(b) <= (ra + rb) * (ra + rb)
            }
            (Shape::Box { half_extents: ha }, Shape::Box { half_extents: hb }) => {
                let gap = (a - b).abs();
                gap.x <= ha.x + hb.x && gap.y <= ha.y + hb.y
            }
            (Shape::Circle { radius }, Shape::Box { .. }) => {
                let nearest = other.closest_point(other_position, a);
                nearest.distance_squared(a) <= radius * radius
            }
            (Shape::Box { .. }, Shape::Circle { radius }) => {
                let nearest = self.closest_point(position, b);
                nearest.distance_squared(b) <= radius * radius
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_closest_point() {
        let c = Collider::circle(1.0);
        let p = c.closest_point(Vec2::ZERO, Vec2::new(3.0, 0.0));
        assert!((p - Vec2::new(1.0, 0.0)).length() < 1e-6);
        // Inside points are returned as-is
        let inside = Vec2::new(0.2, 0.3);
        assert_eq!(c.closest_point(Vec2::ZERO, inside), inside);
    }

    #[test]
    fn test_box_closest_point_with_offset() {
        let c = Collider::rect(2.0, 2.0).with_offset(Vec2::new(5.0, 0.0));
        let p = c.closest_point(Vec2::ZERO, Vec2::ZERO);
        assert_eq!(p, Vec2::new(4.0, 0.0));
    }

    #[test]
    fn test_circle_circle_overlap() {
        let a = Collider::circle(1.0);
        let b = Collider::circle(0.5);
        assert!(a.overlaps(Vec2::ZERO, &b, Vec2::new(1.5, 0.0)));
        assert!(!a.overlaps(Vec2::ZERO, &b, Vec2::new(1.6, 0.0)));
    }

    #[test]
    fn test_box_box_overlap() {
        let a = Collider::rect(2.0, 2.0);
        let b = Collider::rect(2.0, 2.0);
        assert!(a.overlaps(Vec2::ZERO, &b, Vec2::new(1.9, 1.9)));
        assert!(!a.overlaps(Vec2::ZERO, &b, Vec2::new(2.1, 0.0)));
    }

    #[test]
    fn test_mixed_overlap_is_symmetric() {
        let circle = Collider::circle(0.5);
        let rect = Collider::rect(2.0, 2.0);
        let near = Vec2::new(1.4, 0.0);
        let far = Vec2::new(1.6, 0.0);
        assert!(circle.overlaps(near, &rect, Vec2::ZERO));
        assert!(rect.overlaps(Vec2::ZERO, &circle, near));
        assert!(!circle.overlaps(far, &rect, Vec2::ZERO));
        assert!(!rect.overlaps(Vec2::ZERO, &circle, far));
    }
}
