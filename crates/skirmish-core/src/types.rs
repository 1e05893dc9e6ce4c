//! Small value types shared across the combat crates

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Linear RGBA tint, each channel in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::opaque(1.0, 1.0, 1.0);
    pub const RED: Color = Color::opaque(1.0, 0.0, 0.0);

    pub const fn opaque(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Blend toward `other`; `t` is clamped so the result stays in range.
    pub fn mix(self, other: Color, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let blend = |from: f32, to: f32| from + (to - from) * t;
        Self {
            r: blend(self.r, other.r),
            g: blend(self.g, other.g),
            b: blend(self.b, other.b),
            a: blend(self.a, other.a),
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Unit vector along `v`, or `fallback` when `v` is zero or not finite.
pub fn direction_or(v: Vec2, fallback: Vec2) -> Vec2 {
    v.try_normalize().unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mix_is_clamped() {
        let pink = Color::WHITE.mix(Color::RED, 0.5);
        assert_eq!(pink, Color::opaque(1.0, 0.5, 0.5));
        assert_eq!(Color::WHITE.mix(Color::RED, 4.0), Color::RED);
        assert_eq!(Color::RED.with_alpha(-1.0).a, 0.0);
    }

    #[test]
    fn test_direction_or_fallback() {
        assert_eq!(direction_or(Vec2::ZERO, Vec2::X), Vec2::X);
        assert_eq!(direction_or(Vec2::new(f32::NAN, 1.0), Vec2::Y), Vec2::Y);
        let d = direction_or(Vec2::new(0.0, 3.0), Vec2::X);
        assert!((d - Vec2::Y).length() < 1e-6);
    }
}
