//! Simulation plugin, tick ordering, and shared motion state.
//!
//! The whole tick is one chained `Update` pass: budget preparation,
//! integration, broad-phase rebuild, body-body solve, bullet resolution, ship
//! contact, effect realisation, and cleanup run strictly in order. Later
//! stages depend on the state written by earlier ones, so nothing here may be
//! reordered or parallelised.

use crate::asteroid::{Asteroid, AsteroidDestroyed, Health};
use crate::config::SimConfig;
use crate::effects::{budget_prepare_system, effect_spawn_system, EffectBudget, EffectRequest};
use crate::math::wrap_position;
use crate::particles::{init_particle_pool, particle_update_system, ParticlePool};
use crate::projectile::{integrate_projectiles_system, projectile_hit_system, Projectile};
use crate::score::Score;
use crate::ship::{ship_contact_system, ShipHit};
use crate::solver::asteroid_collision_system;
use crate::spatial_hash::{rebuild_spatial_hash_system, SpatialHash};
use bevy::prelude::*;

/// Linear and angular velocity of a simulated body.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Velocity {
    /// World-space linear velocity (units/s).
    pub linvel: Vec2,
    /// Angular velocity (rad/s), positive = counter-clockwise.
    pub angvel: f32,
}

/// Per-tick diagnostic counters for observability overlays.
///
/// Constructed once at plugin init and updated in place, never lazily
/// materialised mid-algorithm.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct SimulationStats {
    /// Distinct body pairs resolved this tick (counted on the first solver
    /// pass only).
    pub collisions: u32,
    /// Fastest live body speed (u/s) after resolution.
    pub max_speed: f32,
    /// Total kinetic energy over live bodies, with mass = radius².
    pub kinetic_energy: f32,
    /// Spatial hash rebuilds since startup (one per tick).
    pub hash_rebuilds: u64,
    /// Asteroids destroyed since startup.
    pub destroyed_total: u64,
}

pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimConfig>()
            .init_resource::<SpatialHash>()
            .init_resource::<SimulationStats>()
            .init_resource::<EffectBudget>()
            .init_resource::<ParticlePool>()
            .init_resource::<Score>()
            .add_message::<AsteroidDestroyed>()
            .add_message::<EffectRequest>()
            .add_message::<ShipHit>()
            .add_systems(Startup, init_particle_pool)
            .add_systems(
                Update,
                (
                    budget_prepare_system,
                    integrate_asteroids_system,
                    integrate_projectiles_system,
                    rebuild_spatial_hash_system,
                    asteroid_collision_system,
                    projectile_hit_system,
                    ship_contact_system,
                    effect_spawn_system,
                    particle_update_system,
                    dead_cleanup_system,
                )
                    .chain(),
            );
    }
}

/// Advance every live asteroid by its velocity and spin, wrapping positions
/// back onto the torus.
pub fn integrate_asteroids_system(
    time: Res<Time>,
    config: Res<SimConfig>,
    mut query: Query<(&mut Transform, &Velocity, &Health), With<Asteroid>>,
) {
    let dt = time.delta_secs();
    for (mut transform, velocity, health) in query.iter_mut() {
        if health.dead {
            continue;
        }
        let pos = transform.translation.truncate() + velocity.linvel * dt;
        let wrapped = wrap_position(pos, config.world_width, config.world_height);
        transform.translation.x = wrapped.x;
        transform.translation.y = wrapped.y;
        transform.rotate_z(velocity.angvel * dt);
    }
}

/// Remove entities whose `dead` flag was raised earlier in the tick.
///
/// Runs last so every other system this tick saw a consistent live set; the
/// flag, not the despawn, is the authoritative removal signal.
pub fn dead_cleanup_system(
    mut commands: Commands,
    asteroids: Query<(Entity, &Health), With<Asteroid>>,
    projectiles: Query<(Entity, &Projectile)>,
) {
    for (entity, health) in asteroids.iter() {
        if health.dead {
            commands.entity(entity).despawn();
        }
    }
    for (entity, projectile) in projectiles.iter() {
        if projectile.dead {
            commands.entity(entity).despawn();
        }
    }
}
