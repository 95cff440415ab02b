//! Pooled effect particles.
//!
//! Particle entities are allocated once at startup and cycled through a free
//! list instead of being spawned and despawned per burst: effect churn under
//! load must never show up as allocator pressure. Pooled state implements the
//! explicit [`Poolable`] capability: `reset` re-arms a lease, `release` hands
//! it back.

use crate::config::SimConfig;
use bevy::prelude::*;

/// Capability for pool-managed state: re-initialise on acquire, deactivate on
/// release. Implemented explicitly by each poolable component; the pool
/// never guesses at a reset convention.
pub trait Poolable {
    type SpawnArgs;
    fn reset(&mut self, args: &Self::SpawnArgs);
    fn release(&mut self);
}

/// Short-lived effect particle state.
///
/// Inactive particles stay spawned but are skipped by the update system and
/// listed in the pool's free list.
#[derive(Component, Debug, Clone, Copy)]
pub struct Particle {
    /// World-space velocity (units/s).
    pub velocity: Vec2,
    /// Time alive so far (s).
    pub age: f32,
    /// Total lifetime (s); released back to the pool when `age >= lifetime`.
    pub lifetime: f32,
    /// Whether this particle currently represents a live effect.
    pub active: bool,
}

impl Particle {
    pub fn inactive() -> Self {
        Self {
            velocity: Vec2::ZERO,
            age: 0.0,
            lifetime: 0.0,
            active: false,
        }
    }
}

/// Parameters applied when a pooled particle is leased out.
#[derive(Debug, Clone, Copy)]
pub struct ParticleSpawnArgs {
    pub velocity: Vec2,
    pub lifetime: f32,
}

impl Poolable for Particle {
    type SpawnArgs = ParticleSpawnArgs;

    fn reset(&mut self, args: &ParticleSpawnArgs) {
        self.velocity = args.velocity;
        self.lifetime = args.lifetime;
        self.age = 0.0;
        self.active = true;
    }

    fn release(&mut self) {
        self.active = false;
        self.velocity = Vec2::ZERO;
    }
}

/// Fixed-capacity pool of pre-spawned particle entities.
#[derive(Resource, Debug, Clone, Default)]
pub struct ParticlePool {
    free: Vec<Entity>,
    capacity: u32,
}

impl ParticlePool {
    /// Particles currently available for lease.
    pub fn free_count(&self) -> u32 {
        self.free.len() as u32
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Lease one particle entity, or `None` when the pool is exhausted.
    pub fn acquire(&mut self) -> Option<Entity> {
        self.free.pop()
    }

    /// Return a leased entity to the free list.
    pub fn release(&mut self, entity: Entity) {
        self.free.push(entity);
    }
}

/// Startup system: pre-spawn the whole particle pool in inactive state.
pub fn init_particle_pool(
    mut commands: Commands,
    config: Res<SimConfig>,
    mut pool: ResMut<ParticlePool>,
) {
    pool.capacity = config.particle_pool_capacity;
    pool.free.reserve(config.particle_pool_capacity as usize);
    for _ in 0..config.particle_pool_capacity {
        let entity = commands
            .spawn((Transform::default(), Particle::inactive()))
            .id();
        pool.free.push(entity);
    }
}

/// Advance active particles and release the expired ones back to the pool.
pub fn particle_update_system(
    time: Res<Time>,
    mut pool: ResMut<ParticlePool>,
    mut query: Query<(Entity, &mut Transform, &mut Particle)>,
) {
    let dt = time.delta_secs();
    for (entity, mut transform, mut particle) in query.iter_mut() {
        if !particle.active {
            continue;
        }
        particle.age += dt;
        if particle.age >= particle.lifetime {
            particle.release();
            pool.release(entity);
            continue;
        }
        transform.translation.x += particle.velocity.x * dt;
        transform.translation.y += particle.velocity.y * dt;
    }
}
