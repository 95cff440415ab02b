//! Projectile state and bullet–asteroid resolution.
//!
//! Projectiles are near point-like, fast, and single-use: the first confirmed
//! hit kills them, lifetime expiry kills them, and an expiry without a hit
//! breaks the score streak. Resolution is a single pass per tick (no
//! iteration): among all candidates overlapping the projectile, the body with
//! the smallest narrow-phase distance takes the hit.

use crate::asteroid::{
    spawn_split_children, Asteroid, AsteroidDestroyed, CollisionRadius, Health,
};
use crate::config::SimConfig;
use crate::contact::closest_hit_dist_sq;
use crate::effects::{EffectKind, EffectRequest};
use crate::math::wrap_position;
use crate::score::{destruction_value, Score};
use crate::shape::{world_hit_circles, WorldCircle};
use crate::simulation::{SimulationStats, Velocity};
use crate::spatial_hash::SpatialHash;
use bevy::prelude::*;

/// Per-projectile state.
#[derive(Component, Debug, Clone, Copy)]
pub struct Projectile {
    /// Collision radius (u); near point-like.
    pub radius: f32,
    /// Seconds since this projectile was fired.
    pub age: f32,
    /// Set when the projectile has hit something, so expiry is not a miss.
    pub was_hit: bool,
    /// Authoritative removal flag, raised on hit or expiry.
    pub dead: bool,
}

impl Projectile {
    pub fn new(radius: f32) -> Self {
        Self {
            radius,
            age: 0.0,
            was_hit: false,
            dead: false,
        }
    }
}

/// Spawn a projectile travelling at `vel` from `pos`.
pub fn spawn_projectile(
    commands: &mut Commands,
    config: &SimConfig,
    pos: Vec2,
    vel: Vec2,
) -> Entity {
    commands
        .spawn((
            Transform::from_translation(pos.extend(0.0)),
            Projectile::new(config.projectile_radius),
            Velocity {
                linvel: vel,
                angvel: 0.0,
            },
        ))
        .id()
}

/// Advance live projectiles, wrap them onto the torus, and expire the old
/// ones. An expiry without a recorded hit resets the combo streak.
pub fn integrate_projectiles_system(
    time: Res<Time>,
    config: Res<SimConfig>,
    mut score: ResMut<Score>,
    mut query: Query<(&mut Transform, &Velocity, &mut Projectile)>,
) {
    let dt = time.delta_secs();
    for (mut transform, velocity, mut projectile) in query.iter_mut() {
        if projectile.dead {
            continue;
        }
        projectile.age += dt;
        if projectile.age >= config.projectile_lifetime {
            projectile.dead = true;
            if !projectile.was_hit {
                score.streak = 0;
            }
            continue;
        }
        let pos = transform.translation.truncate() + velocity.linvel * dt;
        let wrapped = wrap_position(pos, config.world_width, config.world_height);
        transform.translation.x = wrapped.x;
        transform.translation.y = wrapped.y;
    }
}

/// Bullet–asteroid resolution: one pass per tick.
///
/// For each live projectile the spatial hash bounds the candidate set; every
/// candidate passing the bounding-circle test is measured with the
/// closest-circle narrow phase, and the minimum distance wins (ties resolve
/// by iteration order). The winner takes one hit point; destruction pays out
/// score, splits the body, and requests a debris burst, while a surviving
/// target gets a small spark burst.
#[allow(clippy::too_many_arguments)]
pub fn projectile_hit_system(
    mut commands: Commands,
    config: Res<SimConfig>,
    mut hash: ResMut<SpatialHash>,
    mut stats: ResMut<SimulationStats>,
    mut score: ResMut<Score>,
    mut projectiles: Query<(&Transform, &mut Projectile)>,
    mut asteroids: Query<(
        &Transform,
        &Velocity,
        &Asteroid,
        &CollisionRadius,
        &mut Health,
    )>,
    mut destroyed: MessageWriter<AsteroidDestroyed>,
    mut effects: MessageWriter<EffectRequest>,
) {
    let mut candidates: Vec<Entity> = Vec::new();
    let mut circles: Vec<WorldCircle> = Vec::new();

    for (transform, mut projectile) in projectiles.iter_mut() {
        if projectile.dead {
            continue;
        }
        let pos = transform.translation.truncate();
        hash.query(pos.x, pos.y, projectile.radius, &mut candidates);

        // Closest narrow-phase hit wins, not the first one found.
        let mut best: Option<(Entity, f32)> = None;
        for &candidate in &candidates {
            let Ok((a_transform, _, asteroid, radius, health)) = asteroids.get(candidate)
            else {
                continue;
            };
            if health.dead {
                continue;
            }
            let a_pos = a_transform.translation.truncate();
            let rsum = radius.0 + projectile.radius;
            if pos.distance_squared(a_pos) > rsum * rsum {
                continue;
            }
            world_hit_circles(
                a_pos,
                a_transform.rotation,
                radius.0,
                asteroid.kind,
                asteroid.size,
                &mut circles,
            );
            let dist_sq = closest_hit_dist_sq(pos, projectile.radius, &circles);
            if dist_sq.is_finite() && best.map_or(true, |(_, d)| dist_sq < d) {
                best = Some((candidate, dist_sq));
            }
        }

        let Some((target, _)) = best else {
            continue;
        };

        projectile.dead = true;
        projectile.was_hit = true;
        score.hits += 1;
        score.streak += 1;

        let Ok((a_transform, velocity, asteroid, _, mut health)) = asteroids.get_mut(target)
        else {
            continue;
        };
        let a_pos = a_transform.translation.truncate();
        health.hp -= 1;

        if health.hp <= 0 {
            health.dead = true;
            let value = destruction_value(
                config.score_base,
                asteroid.size,
                asteroid.kind,
                score.multiplier(),
            );
            score.points += value;
            score.destroyed += 1;
            stats.destroyed_total += 1;
            destroyed.write(AsteroidDestroyed {
                pos: a_pos,
                kind: asteroid.kind,
                size: asteroid.size,
                score_value: value,
            });
            let children = spawn_split_children(
                &mut commands,
                &config,
                a_pos,
                velocity.linvel,
                asteroid.kind,
                asteroid.size,
            );
            effects.write(EffectRequest {
                kind: EffectKind::Debris,
                pos: a_pos,
                base_vel: velocity.linvel,
                count: 6 + 2 * asteroid.size + 2 * children,
            });
        } else {
            effects.write(EffectRequest {
                kind: EffectKind::Spark,
                pos: a_pos,
                base_vel: velocity.linvel,
                count: 4,
            });
        }
    }
}
