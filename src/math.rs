//! Toroidal position arithmetic.
//!
//! The play field wraps on both axes, so "where is this body" and "how far
//! apart are these two points" need wrap-aware helpers. Everything else uses
//! plain [`Vec2`] operations.

use bevy::prelude::*;

/// Normalise a position into `[0, width) × [0, height)`.
///
/// `rem_euclid` keeps the result non-negative for negative inputs, so a body
/// drifting past the left edge lands just inside the right edge.
pub fn wrap_position(pos: Vec2, width: f32, height: f32) -> Vec2 {
    Vec2::new(pos.x.rem_euclid(width), pos.y.rem_euclid(height))
}

/// Shortest displacement from `from` to `to` on the torus.
///
/// Each component is folded into `[-half, half]`, so the returned vector
/// always points "the short way around", possibly across a wrap seam.
pub fn torus_delta(from: Vec2, to: Vec2, width: f32, height: f32) -> Vec2 {
    let mut d = to - from;
    if d.x > width * 0.5 {
        d.x -= width;
    } else if d.x < -width * 0.5 {
        d.x += width;
    }
    if d.y > height * 0.5 {
        d.y -= height;
    } else if d.y < -height * 0.5 {
        d.y += height;
    }
    d
}

/// Squared shortest-path distance between two points on the torus.
pub fn torus_dist_sq(a: Vec2, b: Vec2, width: f32, height: f32) -> f32 {
    torus_delta(a, b, width, height).length_squared()
}
