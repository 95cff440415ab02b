//! Static hit-circle shapes for asteroid collision footprints.
//!
//! Every asteroid kind/size pair maps to an ordered list of local-space
//! circles: an offset (as a fraction of the body's bounding radius) plus a
//! relative radius. The tables are immutable and shared; bodies never own
//! shape data. World-space circles are projected on demand into a
//! caller-owned scratch buffer so the hot path allocates nothing per frame.

use crate::asteroid::AsteroidKind;
use bevy::prelude::*;

/// One local-space collision circle: offset and radius as fractions of the
/// body's bounding radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitCircle {
    pub offset: Vec2,
    pub radius: f32,
}

/// A projected circle in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldCircle {
    pub center: Vec2,
    pub radius: f32,
}

const fn circle(ox: f32, oy: f32, r: f32) -> HitCircle {
    HitCircle {
        offset: Vec2::new(ox, oy),
        radius: r,
    }
}

/// Size tier used when a lookup falls all the way through the fallback chain.
const DEFAULT_SIZE: u32 = 3;

// Lumpy three-lobe rock: the default large silhouette.
const NORMAL_LARGE: [HitCircle; 3] = [
    circle(0.0, 0.0, 0.78),
    circle(0.42, 0.18, 0.48),
    circle(-0.38, -0.30, 0.52),
];

// Two overlapping lobes read as an irregular medium rock.
const NORMAL_MEDIUM: [HitCircle; 2] = [circle(0.0, 0.0, 0.82), circle(0.35, -0.25, 0.50)];

// Small rocks are near-circular; one slightly shrunk circle is enough.
const NORMAL_SMALL: [HitCircle; 1] = [circle(0.0, 0.0, 0.95)];

// Dense rocks are compact: a single fat circle regardless of rotation.
const DENSE_LARGE: [HitCircle; 1] = [circle(0.0, 0.0, 0.90)];

// Fast rocks are elongated along their local x axis.
const FAST_MEDIUM: [HitCircle; 3] = [
    circle(0.45, 0.0, 0.55),
    circle(-0.45, 0.0, 0.55),
    circle(0.0, 0.0, 0.60),
];

// Splitters are a loose cluster of four lobes around a core, so bullets can
// visibly clip an outer lobe.
const SPLITTER_LARGE: [HitCircle; 5] = [
    circle(0.0, 0.0, 0.55),
    circle(0.40, 0.40, 0.45),
    circle(-0.40, 0.40, 0.45),
    circle(-0.40, -0.40, 0.45),
    circle(0.40, -0.40, 0.45),
];

/// Exact table lookup; `None` for combinations without a bespoke shape.
fn registered(kind: AsteroidKind, size: u32) -> Option<&'static [HitCircle]> {
    match (kind, size) {
        (AsteroidKind::Normal, 1) => Some(&NORMAL_SMALL),
        (AsteroidKind::Normal, 2) => Some(&NORMAL_MEDIUM),
        (AsteroidKind::Normal, 3) => Some(&NORMAL_LARGE),
        (AsteroidKind::Dense, 3) => Some(&DENSE_LARGE),
        (AsteroidKind::Fast, 2) => Some(&FAST_MEDIUM),
        (AsteroidKind::Splitter, 3) => Some(&SPLITTER_LARGE),
        _ => None,
    }
}

/// Hit-circle list for a kind/size pair. Total by construction: falls back
/// to the default kind at the same size, then to the default kind at the
/// default size, so callers never handle a missing shape.
pub fn hit_circles(kind: AsteroidKind, size: u32) -> &'static [HitCircle] {
    registered(kind, size)
        .or_else(|| registered(AsteroidKind::Normal, size))
        .or_else(|| registered(AsteroidKind::Normal, DEFAULT_SIZE))
        .unwrap_or(&NORMAL_LARGE)
}

/// Project a body's hit circles into world space.
///
/// Offsets are rotated by the body's current rotation, scaled (offset and
/// radius alike) by `radius`, and translated to `pos`. Results are written
/// into `out`, which is cleared first. The buffer belongs to the caller and
/// is reused across frames.
pub fn world_hit_circles(
    pos: Vec2,
    rotation: Quat,
    radius: f32,
    kind: AsteroidKind,
    size: u32,
    out: &mut Vec<WorldCircle>,
) {
    out.clear();
    for hc in hit_circles(kind, size) {
        let offset = rotation.mul_vec3((hc.offset * radius).extend(0.0)).truncate();
        out.push(WorldCircle {
            center: pos + offset,
            radius: hc.radius * radius,
        });
    }
}
