//! Narrow-phase contact tests over multi-circle bodies.
//!
//! The broad phase only proves two bounding circles overlap; the functions
//! here decide whether any actual hit circles touch, and if so where. Both
//! tests are pure functions over world-space circle lists so they can be
//! exercised without an ECS world.

use crate::shape::WorldCircle;
use bevy::prelude::*;

/// A confirmed body-body contact: unit normal pointing from body A toward
/// body B, and how deep the two circles interpenetrate along it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub normal: Vec2,
    pub penetration: f32,
}

/// Squared-length threshold under which two centers count as coincident.
const COINCIDENT_EPS_SQ: f32 = 1e-8;

/// Normal from `from` toward `to`, falling back to the body centers and then
/// to a fixed axis when the points coincide. Never returns a zero vector, so
/// the solver never divides by zero.
fn contact_normal(from: Vec2, to: Vec2, a_center: Vec2, b_center: Vec2) -> Vec2 {
    let d = to - from;
    if d.length_squared() > COINCIDENT_EPS_SQ {
        return d.normalize();
    }
    let centers = b_center - a_center;
    if centers.length_squared() > COINCIDENT_EPS_SQ {
        return centers.normalize();
    }
    Vec2::X
}

/// Deepest-point contact between two bodies' world hit-circle sets.
///
/// Tests every circle pair and keeps the one with maximum penetration as the
/// single representative contact for the body pair. If a candidate already
/// penetrates deeper than `accept_frac` of its pair's combined radius it is
/// accepted immediately without scanning the rest: a deep contact like that
/// dominates the resolution regardless of what the remaining pairs show.
///
/// Returns `None` when no circles overlap.
pub fn deepest_contact(
    a_circles: &[WorldCircle],
    b_circles: &[WorldCircle],
    a_center: Vec2,
    b_center: Vec2,
    accept_frac: f32,
) -> Option<Contact> {
    let mut best: Option<Contact> = None;

    for ca in a_circles {
        for cb in b_circles {
            let combined = ca.radius + cb.radius;
            let dist_sq = ca.center.distance_squared(cb.center);
            if dist_sq > combined * combined {
                continue;
            }
            let dist = dist_sq.sqrt();
            let penetration = combined - dist;
            if best.map_or(true, |b| penetration > b.penetration) {
                let normal = contact_normal(ca.center, cb.center, a_center, b_center);
                let contact = Contact {
                    normal,
                    penetration,
                };
                if penetration > accept_frac * combined {
                    return Some(contact);
                }
                best = Some(contact);
            }
        }
    }
    best
}

/// Closest-circle projectile test.
///
/// Returns the minimum squared center distance among the body's circles that
/// pass the sum-of-radii overlap test against the point-like projectile, or
/// `f32::INFINITY` when none do. Callers compare candidates across bodies
/// and keep the smallest value, so the closest hit wins.
pub fn closest_hit_dist_sq(point: Vec2, point_radius: f32, circles: &[WorldCircle]) -> f32 {
    let mut best = f32::INFINITY;
    for c in circles {
        let combined = c.radius + point_radius;
        let dist_sq = point.distance_squared(c.center);
        if dist_sq <= combined * combined && dist_sq < best {
            best = dist_sq;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circle(x: f32, y: f32, r: f32) -> WorldCircle {
        WorldCircle {
            center: Vec2::new(x, y),
            radius: r,
        }
    }

    // ── deepest_contact ───────────────────────────────────────────────────────

    #[test]
    fn separated_circles_produce_no_contact() {
        let a = [circle(0.0, 0.0, 5.0)];
        let b = [circle(20.0, 0.0, 5.0)];
        assert!(deepest_contact(&a, &b, Vec2::ZERO, Vec2::new(20.0, 0.0), 0.4).is_none());
    }

    #[test]
    fn overlapping_circles_report_normal_and_penetration() {
        // Radii 5 + 5, centers 8 apart → penetration 2 along +x.
        let a = [circle(0.0, 0.0, 5.0)];
        let b = [circle(8.0, 0.0, 5.0)];
        let contact =
            deepest_contact(&a, &b, Vec2::ZERO, Vec2::new(8.0, 0.0), 0.4).expect("overlap");
        assert!((contact.penetration - 2.0).abs() < 1e-5);
        assert!((contact.normal - Vec2::X).length() < 1e-5);
    }

    #[test]
    fn deepest_pair_wins_among_multiple_overlaps() {
        // Second pair overlaps much deeper; its normal points along -y.
        let a = [circle(0.0, 0.0, 5.0), circle(0.0, -10.0, 5.0)];
        let b = [circle(9.0, 0.0, 5.0), circle(0.0, -12.0, 5.0)];
        let contact = deepest_contact(&a, &b, Vec2::ZERO, Vec2::ZERO, 1.1).expect("overlap");
        assert!((contact.penetration - 8.0).abs() < 1e-4);
        assert!((contact.normal - Vec2::NEG_Y).length() < 1e-4);
    }

    #[test]
    fn coincident_circle_centers_fall_back_to_body_centers() {
        let a = [circle(3.0, 3.0, 4.0)];
        let b = [circle(3.0, 3.0, 4.0)];
        let contact = deepest_contact(&a, &b, Vec2::ZERO, Vec2::new(10.0, 0.0), 0.4)
            .expect("coincident circles must still contact");
        assert!((contact.normal - Vec2::X).length() < 1e-5);
        assert!((contact.penetration - 8.0).abs() < 1e-5);
    }

    #[test]
    fn fully_coincident_everything_defaults_to_fixed_axis() {
        let a = [circle(0.0, 0.0, 2.0)];
        let b = [circle(0.0, 0.0, 3.0)];
        let contact = deepest_contact(&a, &b, Vec2::ZERO, Vec2::ZERO, 0.4).expect("contact");
        assert_eq!(contact.normal, Vec2::X);
    }

    #[test]
    fn early_accept_returns_first_deep_candidate() {
        // First pair penetrates 60% of combined radius, past the 40%
        // threshold, so the scan must stop there even though a later pair
        // would be deeper still.
        let a = [circle(0.0, 0.0, 5.0), circle(0.0, 0.0, 10.0)];
        let b = [circle(4.0, 0.0, 5.0)];
        let contact = deepest_contact(&a, &b, Vec2::ZERO, Vec2::new(4.0, 0.0), 0.4).unwrap();
        assert!((contact.penetration - 6.0).abs() < 1e-5, "first deep pair, not the deepest");
    }

    #[test]
    fn normals_are_unit_length() {
        let a = [circle(0.0, 0.0, 5.0)];
        let b = [circle(3.0, 4.0, 5.0)];
        let contact = deepest_contact(&a, &b, Vec2::ZERO, Vec2::new(3.0, 4.0), 0.4).unwrap();
        assert!((contact.normal.length() - 1.0).abs() < 1e-5);
    }

    // ── closest_hit_dist_sq ───────────────────────────────────────────────────

    #[test]
    fn miss_reports_infinite_distance() {
        let circles = [circle(50.0, 0.0, 5.0)];
        assert_eq!(
            closest_hit_dist_sq(Vec2::ZERO, 2.0, &circles),
            f32::INFINITY
        );
    }

    #[test]
    fn hit_reports_squared_center_distance() {
        let circles = [circle(3.0, 0.0, 5.0)];
        let d = closest_hit_dist_sq(Vec2::ZERO, 2.0, &circles);
        assert!((d - 9.0).abs() < 1e-5);
    }

    #[test]
    fn closest_of_several_circles_wins() {
        let circles = [circle(6.0, 0.0, 5.0), circle(2.0, 0.0, 5.0)];
        let d = closest_hit_dist_sq(Vec2::ZERO, 2.0, &circles);
        assert!((d - 4.0).abs() < 1e-5);
    }

    #[test]
    fn dead_center_hit_reports_zero() {
        let circles = [circle(0.0, 0.0, 5.0)];
        assert_eq!(closest_hit_dist_sq(Vec2::ZERO, 2.0, &circles), 0.0);
    }
}
