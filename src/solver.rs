//! Iterative impulse solver for asteroid–asteroid contacts.
//!
//! Each tick the solver snapshots every live body into a scratch buffer,
//! runs a fixed number of sequential passes over spatial-hash candidate
//! pairs (impulse + friction + positional correction per confirmed contact),
//! then writes positions and velocities back to the ECS. Keeping the solve
//! on a plain buffer keeps ownership explicit: nothing on the entities is
//! mutated while a pass is in flight, and later passes see the corrections
//! applied by earlier ones.

use crate::asteroid::{Asteroid, AsteroidKind, CollisionRadius, Health};
use crate::config::SimConfig;
use crate::contact::{deepest_contact, Contact};
use crate::math::wrap_position;
use crate::shape::{world_hit_circles, WorldCircle};
use crate::simulation::{SimulationStats, Velocity};
use crate::spatial_hash::SpatialHash;
use bevy::prelude::*;
use std::collections::HashMap;

/// Per-tick snapshot of one live body, used as solver scratch state.
#[derive(Debug, Clone, Copy)]
pub struct SolverBody {
    pub entity: Entity,
    pub pos: Vec2,
    pub rotation: Quat,
    pub vel: Vec2,
    pub radius: f32,
    /// 1 / (radius² × kind mass multiplier). Radii are validated positive at
    /// construction, so this never divides by zero.
    pub inv_mass: f32,
    pub kind: AsteroidKind,
    pub size: u32,
}

/// Contact-response constants, extracted once per tick from [`SimConfig`].
#[derive(Debug, Clone, Copy)]
pub struct ContactParams {
    pub restitution: f32,
    pub friction: f32,
    pub correction_percent: f32,
    pub correction_slop: f32,
}

impl ContactParams {
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            restitution: config.restitution,
            friction: config.friction,
            correction_percent: config.correction_percent,
            correction_slop: config.correction_slop,
        }
    }
}

/// Resolve one confirmed contact between two bodies.
///
/// Applies a restitution impulse and a Coulomb-clamped friction impulse when
/// the pair is closing along the normal (a separating pair keeps its
/// velocities), then always applies positional correction: the penetration
/// beyond the slop band is pushed out by `correction_percent`, distributed by
/// inverse mass so the heavier body moves less.
pub fn resolve_contact(
    a: &mut SolverBody,
    b: &mut SolverBody,
    contact: &Contact,
    params: &ContactParams,
) {
    let inv_mass_sum = a.inv_mass + b.inv_mass;
    if inv_mass_sum <= 0.0 {
        return;
    }
    let n = contact.normal;

    let rv = b.vel - a.vel;
    let vel_along_normal = rv.dot(n);
    if vel_along_normal < 0.0 {
        // Normal impulse with restitution.
        let j = -(1.0 + params.restitution) * vel_along_normal / inv_mass_sum;
        let impulse = n * j;
        a.vel -= impulse * a.inv_mass;
        b.vel += impulse * b.inv_mass;

        // Friction against the post-impulse tangential relative velocity,
        // clamped to the Coulomb limit ±μ·j.
        let rv = b.vel - a.vel;
        let tangent = rv - n * rv.dot(n);
        if tangent.length_squared() > 1e-12 {
            let t = tangent.normalize();
            let jt = (-rv.dot(t) / inv_mass_sum).clamp(-params.friction * j, params.friction * j);
            let friction_impulse = t * jt;
            a.vel -= friction_impulse * a.inv_mass;
            b.vel += friction_impulse * b.inv_mass;
        }
    }

    // Positional correction runs even for separating pairs so resting
    // overlap drains away instead of accumulating.
    let depth = (contact.penetration - params.correction_slop).max(0.0);
    if depth > 0.0 {
        let correction = n * (depth * params.correction_percent / inv_mass_sum);
        a.pos -= correction * a.inv_mass;
        b.pos += correction * b.inv_mass;
    }
}

/// Borrow two distinct scratch bodies mutably. Caller guarantees `i < j`.
fn pair_mut(bodies: &mut [SolverBody], i: usize, j: usize) -> (&mut SolverBody, &mut SolverBody) {
    debug_assert!(i < j);
    let (head, tail) = bodies.split_at_mut(j);
    (&mut head[i], &mut tail[0])
}

/// Body-body collision resolution for one tick.
///
/// Runs `solver_iterations` sequential passes. Per pass, each body queries
/// the spatial hash around itself; every unordered candidate pair is
/// considered once (skipped when the candidate's scratch index is not above
/// the current one), pre-filtered by a whole-body bounding-circle test, and
/// confirmed by the deepest-contact search before resolution. The distinct
/// contact count is recorded on the first pass only.
pub fn asteroid_collision_system(
    config: Res<SimConfig>,
    mut hash: ResMut<SpatialHash>,
    mut stats: ResMut<SimulationStats>,
    mut query: Query<(
        Entity,
        &mut Transform,
        &mut Velocity,
        &Asteroid,
        &CollisionRadius,
        &Health,
    )>,
) {
    // Snapshot live bodies into solver scratch.
    let mut bodies: Vec<SolverBody> = Vec::new();
    let mut index_of: HashMap<Entity, usize> = HashMap::new();
    for (entity, transform, velocity, asteroid, radius, health) in query.iter() {
        if health.dead {
            continue;
        }
        index_of.insert(entity, bodies.len());
        bodies.push(SolverBody {
            entity,
            pos: transform.translation.truncate(),
            rotation: transform.rotation,
            vel: velocity.linvel,
            radius: radius.0,
            inv_mass: 1.0 / (radius.0 * radius.0 * asteroid.kind.mass_mul()),
            kind: asteroid.kind,
            size: asteroid.size,
        });
    }

    stats.collisions = 0;
    let params = ContactParams::from_config(&config);

    // Query and projection buffers reused across every pair in the tick.
    let mut candidates: Vec<Entity> = Vec::new();
    let mut circles_a: Vec<WorldCircle> = Vec::new();
    let mut circles_b: Vec<WorldCircle> = Vec::new();

    for pass in 0..config.solver_iterations {
        for i in 0..bodies.len() {
            hash.query(
                bodies[i].pos.x,
                bodies[i].pos.y,
                bodies[i].radius,
                &mut candidates,
            );
            for &other in &candidates {
                let Some(&j) = index_of.get(&other) else {
                    continue;
                };
                // Each unordered pair exactly once.
                if j <= i {
                    continue;
                }

                // Whole-body bounding circles first; the circle-pair scan is
                // O(circles²) and most candidates fail here.
                let rsum = bodies[i].radius + bodies[j].radius;
                if bodies[i].pos.distance_squared(bodies[j].pos) > rsum * rsum {
                    continue;
                }

                world_hit_circles(
                    bodies[i].pos,
                    bodies[i].rotation,
                    bodies[i].radius,
                    bodies[i].kind,
                    bodies[i].size,
                    &mut circles_a,
                );
                world_hit_circles(
                    bodies[j].pos,
                    bodies[j].rotation,
                    bodies[j].radius,
                    bodies[j].kind,
                    bodies[j].size,
                    &mut circles_b,
                );
                let Some(contact) = deepest_contact(
                    &circles_a,
                    &circles_b,
                    bodies[i].pos,
                    bodies[j].pos,
                    config.deep_contact_accept_frac,
                ) else {
                    continue;
                };

                // "Distinct contacts this frame", not impulse applications.
                if pass == 0 {
                    stats.collisions += 1;
                }

                let (a, b) = pair_mut(&mut bodies, i, j);
                resolve_contact(a, b, &contact, &params);
            }
        }
    }

    // Write corrected state back and collect diagnostics over live bodies.
    let mut max_speed_sq = 0.0_f32;
    let mut kinetic_energy = 0.0_f32;
    for body in &bodies {
        let speed_sq = body.vel.length_squared();
        max_speed_sq = max_speed_sq.max(speed_sq);
        kinetic_energy += 0.5 * speed_sq / body.inv_mass;

        if let Ok((_, mut transform, mut velocity, _, _, _)) = query.get_mut(body.entity) {
            let wrapped = wrap_position(body.pos, config.world_width, config.world_height);
            transform.translation.x = wrapped.x;
            transform.translation.y = wrapped.y;
            velocity.linvel = body.vel;
        }
    }
    stats.max_speed = max_speed_sq.sqrt();
    stats.kinetic_energy = kinetic_energy;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_body(x: f32, y: f32, vx: f32, vy: f32, radius: f32) -> SolverBody {
        let mut world = World::new();
        SolverBody {
            entity: world.spawn_empty().id(),
            pos: Vec2::new(x, y),
            rotation: Quat::IDENTITY,
            vel: Vec2::new(vx, vy),
            radius,
            inv_mass: 1.0 / (radius * radius),
            kind: AsteroidKind::Normal,
            size: 1,
        }
    }

    fn head_on_contact() -> Contact {
        Contact {
            normal: Vec2::X,
            penetration: 2.0,
        }
    }

    // ── Impulse response ──────────────────────────────────────────────────────

    #[test]
    fn elastic_equal_mass_pair_exchanges_normal_velocities() {
        let mut a = test_body(0.0, 0.0, 50.0, 0.0, 5.0);
        let mut b = test_body(8.0, 0.0, -50.0, 0.0, 5.0);
        let params = ContactParams {
            restitution: 1.0,
            friction: 0.0,
            correction_percent: 0.0,
            correction_slop: 0.0,
        };
        resolve_contact(&mut a, &mut b, &head_on_contact(), &params);

        assert!((a.vel.x - -50.0).abs() < 1e-3, "a should bounce to -50, got {}", a.vel.x);
        assert!((b.vel.x - 50.0).abs() < 1e-3, "b should bounce to +50, got {}", b.vel.x);
        // Momentum along the normal is conserved (equal masses, sum was 0).
        let momentum = a.vel.x / a.inv_mass + b.vel.x / b.inv_mass;
        assert!(momentum.abs() < 1e-3);
    }

    #[test]
    fn default_restitution_scales_rebound_speed() {
        let mut a = test_body(0.0, 0.0, 100.0, 0.0, 20.0);
        let mut b = test_body(30.0, 0.0, -100.0, 0.0, 20.0);
        let params = ContactParams {
            restitution: 0.22,
            friction: 0.26,
            correction_percent: 0.5,
            correction_slop: 0.8,
        };
        let contact = Contact {
            normal: Vec2::X,
            penetration: 10.0,
        };
        resolve_contact(&mut a, &mut b, &contact, &params);

        // Equal masses, head-on: each body rebounds at e × its approach speed.
        assert!((a.vel.x - -22.0).abs() < 1e-2, "got {}", a.vel.x);
        assert!((b.vel.x - 22.0).abs() < 1e-2, "got {}", b.vel.x);
    }

    #[test]
    fn separating_pair_keeps_velocities_but_still_corrects() {
        let mut a = test_body(0.0, 0.0, -10.0, 0.0, 5.0);
        let mut b = test_body(8.0, 0.0, 10.0, 0.0, 5.0);
        let params = ContactParams {
            restitution: 0.22,
            friction: 0.26,
            correction_percent: 0.5,
            correction_slop: 0.0,
        };
        resolve_contact(&mut a, &mut b, &head_on_contact(), &params);

        assert_eq!(a.vel, Vec2::new(-10.0, 0.0));
        assert_eq!(b.vel, Vec2::new(10.0, 0.0));
        assert!(a.pos.x < 0.0, "a must be pushed left");
        assert!(b.pos.x > 8.0, "b must be pushed right");
    }

    #[test]
    fn heavier_body_recoils_less() {
        let mut a = test_body(0.0, 0.0, 50.0, 0.0, 5.0); // light
        let mut b = test_body(8.0, 0.0, 0.0, 0.0, 20.0); // 16× heavier
        let params = ContactParams {
            restitution: 0.5,
            friction: 0.0,
            correction_percent: 0.0,
            correction_slop: 0.0,
        };
        resolve_contact(&mut a, &mut b, &head_on_contact(), &params);

        let delta_a = (a.vel.x - 50.0).abs();
        let delta_b = b.vel.x.abs();
        assert!(delta_a > delta_b, "light body must change speed more");
        assert!(b.vel.x > 0.0, "heavy body is pushed forward");
    }

    #[test]
    fn friction_damps_tangential_motion_without_reversing_it() {
        // Closing along x, sliding along y.
        let mut a = test_body(0.0, 0.0, 50.0, 30.0, 5.0);
        let mut b = test_body(8.0, 0.0, -50.0, 0.0, 5.0);
        let params = ContactParams {
            restitution: 0.0,
            friction: 0.26,
            correction_percent: 0.0,
            correction_slop: 0.0,
        };
        resolve_contact(&mut a, &mut b, &head_on_contact(), &params);

        let rel_tangent_before = 30.0;
        let rel_tangent_after = a.vel.y - b.vel.y;
        assert!(rel_tangent_after < rel_tangent_before, "friction must slow the slide");
        assert!(rel_tangent_after > 0.0, "clamped friction must not reverse the slide");
    }

    // ── Positional correction ─────────────────────────────────────────────────

    #[test]
    fn correction_removes_percent_of_over_slop_penetration() {
        let mut a = test_body(0.0, 0.0, 0.0, 0.0, 10.0);
        let mut b = test_body(10.0, 0.0, 0.0, 0.0, 10.0);
        let params = ContactParams {
            restitution: 0.22,
            friction: 0.26,
            correction_percent: 0.5,
            correction_slop: 0.8,
        };
        let penetration = 10.0;
        let contact = Contact {
            normal: Vec2::X,
            penetration,
        };
        resolve_contact(&mut a, &mut b, &contact, &params);

        let separation_gain = (b.pos.x - a.pos.x) - 10.0;
        let expected = (penetration - params.correction_slop) * params.correction_percent;
        assert!(
            (separation_gain - expected).abs() < 1e-4,
            "expected +{expected}, got +{separation_gain}"
        );
        // Residual over-slop penetration shrinks by exactly (1 - percent).
        let residual = (penetration - separation_gain) - params.correction_slop;
        let expected_residual = (penetration - params.correction_slop)
            * (1.0 - params.correction_percent);
        assert!((residual - expected_residual).abs() < 1e-4);
    }

    #[test]
    fn correction_is_exact_with_zero_slop() {
        let mut a = test_body(0.0, 0.0, 0.0, 0.0, 10.0);
        let mut b = test_body(14.0, 0.0, 0.0, 0.0, 10.0);
        let params = ContactParams {
            restitution: 0.0,
            friction: 0.0,
            correction_percent: 0.5,
            correction_slop: 0.0,
        };
        let contact = Contact {
            normal: Vec2::X,
            penetration: 6.0,
        };
        resolve_contact(&mut a, &mut b, &contact, &params);
        // Post-correction penetration = pen × (1 - percent).
        let post_pen = 20.0 - (b.pos.x - a.pos.x);
        assert!((post_pen - 3.0).abs() < 1e-4, "got {post_pen}");
    }

    #[test]
    fn repeated_correction_passes_monotonically_reduce_penetration() {
        let mut a = test_body(0.0, 0.0, 0.0, 0.0, 10.0);
        let mut b = test_body(10.0, 0.0, 0.0, 0.0, 10.0);
        let params = ContactParams {
            restitution: 0.22,
            friction: 0.26,
            correction_percent: 0.5,
            correction_slop: 0.8,
        };
        let mut last_pen = 10.0_f32;
        for _ in 0..6 {
            let pen = 20.0 - (b.pos.x - a.pos.x);
            let contact = Contact {
                normal: Vec2::X,
                penetration: pen,
            };
            resolve_contact(&mut a, &mut b, &contact, &params);
            let new_pen = 20.0 - (b.pos.x - a.pos.x);
            assert!(new_pen <= last_pen + 1e-5, "penetration must never grow");
            last_pen = new_pen;
        }
        // Converges down to the slop band, not past it.
        assert!(last_pen >= params.correction_slop - 1e-3);
        assert!(last_pen < 2.0);
    }

    #[test]
    fn penetration_within_slop_is_left_alone() {
        let mut a = test_body(0.0, 0.0, 0.0, 0.0, 5.0);
        let mut b = test_body(9.5, 0.0, 0.0, 0.0, 5.0);
        let params = ContactParams {
            restitution: 0.22,
            friction: 0.26,
            correction_percent: 0.5,
            correction_slop: 0.8,
        };
        let contact = Contact {
            normal: Vec2::X,
            penetration: 0.5,
        };
        resolve_contact(&mut a, &mut b, &contact, &params);
        assert_eq!(a.pos.x, 0.0);
        assert_eq!(b.pos.x, 9.5);
    }
}
