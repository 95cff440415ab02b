//! Asteroid components, kind parameters, spawning, and splitting.
//!
//! An asteroid is an entity with a [`Transform`] (position + rotation), a
//! [`Velocity`](crate::simulation::Velocity), an [`Asteroid`] tag carrying its
//! kind and size tier, a [`Health`] counter, and a derived bounding
//! [`CollisionRadius`]. `Health::dead` is the only authoritative removal
//! signal: every system checks it before using a body, and the cleanup system
//! despawns flagged entities at the end of the tick.

use crate::config::SimConfig;
use crate::math::torus_dist_sq;
use crate::simulation::Velocity;
use bevy::prelude::*;
use rand::Rng;

/// Closed set of asteroid variants. Each kind selects a hit-circle shape, a
/// mass multiplier, a spawn-speed multiplier, a score multiplier, and a split
/// rule; see the methods below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AsteroidKind {
    Normal,
    Dense,
    Fast,
    Splitter,
}

impl AsteroidKind {
    /// Multiplier applied on top of the radius² mass proxy.
    /// `Normal` is exactly 1.0, so the default kind's mass is literally radius².
    pub fn mass_mul(self) -> f32 {
        match self {
            AsteroidKind::Normal => 1.0,
            AsteroidKind::Dense => 1.8,
            AsteroidKind::Fast => 0.8,
            AsteroidKind::Splitter => 1.0,
        }
    }

    /// Multiplier on the initial speed rolled at spawn time.
    pub fn speed_mul(self) -> f32 {
        match self {
            AsteroidKind::Normal => 1.0,
            AsteroidKind::Dense => 0.75,
            AsteroidKind::Fast => 1.8,
            AsteroidKind::Splitter => 1.0,
        }
    }

    /// Multiplier on the destruction score value.
    pub fn score_mul(self) -> f32 {
        match self {
            AsteroidKind::Normal => 1.0,
            AsteroidKind::Dense => 1.5,
            AsteroidKind::Fast => 1.25,
            AsteroidKind::Splitter => 0.75,
        }
    }

    /// How many children a destroyed asteroid of this kind yields
    /// (before the size-1 floor is applied).
    pub fn split_count(self) -> u32 {
        match self {
            AsteroidKind::Normal => 2,
            AsteroidKind::Dense => 0,
            AsteroidKind::Fast => 1,
            AsteroidKind::Splitter => 3,
        }
    }

    /// Hit points for a fresh asteroid of this kind at the given size tier.
    pub fn hp_for(self, size: u32) -> i32 {
        let base = size.max(1) as i32;
        match self {
            AsteroidKind::Dense => base + 1,
            _ => base,
        }
    }
}

/// Tag component carrying an asteroid's variant and size tier (1..=3).
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Asteroid {
    pub kind: AsteroidKind,
    pub size: u32,
}

/// Remaining hit points and the authoritative removal flag.
///
/// `dead` flips to `true` exactly when `hp` reaches 0 (or when an external
/// rule retires the body); nothing else may despawn an asteroid.
#[derive(Component, Debug, Clone, Copy)]
pub struct Health {
    pub hp: i32,
    pub dead: bool,
}

/// Bounding-circle radius (world units) used by the broad phase. Derived
/// from size tier at spawn; the hit-circle shape always fits inside it.
#[derive(Component, Debug, Clone, Copy)]
pub struct CollisionRadius(pub f32);

/// Message emitted when an asteroid is destroyed, for the score / audio /
/// VFX collaborators outside this core.
#[derive(Message, Debug, Clone, Copy)]
pub struct AsteroidDestroyed {
    pub pos: Vec2,
    pub kind: AsteroidKind,
    pub size: u32,
    pub score_value: u32,
}

/// Bounding radius for a size tier: the unit radius doubled per tier.
/// Size 1 → 1×, size 2 → 2×, size 3 → 4×.
pub fn radius_for_size(unit_radius: f32, size: u32) -> f32 {
    unit_radius * (1u32 << (size.max(1) - 1)) as f32
}

/// Spawn one asteroid with explicit kinematics. Returns the new entity.
pub fn spawn_asteroid(
    commands: &mut Commands,
    config: &SimConfig,
    pos: Vec2,
    vel: Vec2,
    angvel: f32,
    kind: AsteroidKind,
    size: u32,
) -> Entity {
    let radius = radius_for_size(config.asteroid_unit_radius, size);
    commands
        .spawn((
            Transform::from_translation(pos.extend(0.0)),
            Asteroid { kind, size },
            Health {
                hp: kind.hp_for(size),
                dead: false,
            },
            CollisionRadius(radius),
            Velocity {
                linvel: vel,
                angvel,
            },
        ))
        .id()
}

/// Combine an inherited parent velocity with a radial kick into a child
/// velocity, honouring the energy-loss factor and the hard speed cap.
pub fn split_child_velocity(
    parent_vel: Vec2,
    kick_dir: Vec2,
    kick_speed: f32,
    energy_loss: f32,
    max_child_speed: f32,
) -> Vec2 {
    let vel = parent_vel * energy_loss + kick_dir * kick_speed;
    if vel.length_squared() > max_child_speed * max_child_speed {
        vel.normalize_or_zero() * max_child_speed
    } else {
        vel
    }
}

/// Spawn the split children of a destroyed asteroid at its last position.
///
/// Children are one size tier smaller and radiate outward on evenly spaced
/// directions with a random phase and a little angular jitter. Returns how
/// many children were created (0 for size-1 parents and non-splitting kinds).
pub fn spawn_split_children(
    commands: &mut Commands,
    config: &SimConfig,
    pos: Vec2,
    parent_vel: Vec2,
    kind: AsteroidKind,
    parent_size: u32,
) -> u32 {
    let count = kind.split_count();
    if count == 0 || parent_size <= 1 {
        return 0;
    }

    let child_size = parent_size - 1;
    let mut rng = rand::thread_rng();
    let phase = rng.gen_range(0.0..std::f32::consts::TAU);

    for i in 0..count {
        let angle = phase
            + std::f32::consts::TAU * i as f32 / count as f32
            + rng.gen_range(-0.3..0.3);
        let dir = Vec2::new(angle.cos(), angle.sin());
        let kick = config.split_kick_speed * rng.gen_range(0.75..1.0);
        let vel = split_child_velocity(
            parent_vel,
            dir,
            kick,
            config.split_energy_loss,
            config.max_child_speed,
        );
        let angvel = rng.gen_range(
            -config.asteroid_initial_angvel_range..config.asteroid_initial_angvel_range,
        );
        spawn_asteroid(commands, config, pos, vel, angvel, kind, child_size);
    }
    count
}

/// Spawn a demo field of `count` asteroids with randomised kinds, sizes, and
/// kinematics, keeping a toroidal clearance bubble around `ship_pos`.
pub fn spawn_asteroid_field(
    commands: &mut Commands,
    config: &SimConfig,
    count: usize,
    ship_pos: Vec2,
) {
    let mut rng = rand::thread_rng();
    let mut spawned = 0;

    while spawned < count {
        let pos = Vec2::new(
            rng.gen_range(0.0..config.world_width),
            rng.gen_range(0.0..config.world_height),
        );
        // Shortest-path distance so a spot just across the wrap seam still
        // counts as crowding the ship.
        let buffer = config.spawn_buffer_radius;
        if torus_dist_sq(pos, ship_pos, config.world_width, config.world_height)
            < buffer * buffer
        {
            continue;
        }

        let kind = match rng.gen_range(0..6) {
            0 => AsteroidKind::Dense,
            1 => AsteroidKind::Fast,
            2 => AsteroidKind::Splitter,
            _ => AsteroidKind::Normal,
        };
        let size = rng.gen_range(1..=config.asteroid_max_size);
        let speed = rng
            .gen_range(config.asteroid_initial_speed_min..config.asteroid_initial_speed_max)
            * kind.speed_mul();
        let heading = rng.gen_range(0.0..std::f32::consts::TAU);
        let vel = Vec2::new(heading.cos(), heading.sin()) * speed;
        let angvel = rng.gen_range(
            -config.asteroid_initial_angvel_range..config.asteroid_initial_angvel_range,
        );

        spawn_asteroid(commands, config, pos, vel, angvel, kind, size);
        spawned += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Kind tables ───────────────────────────────────────────────────────────

    #[test]
    fn normal_mass_multiplier_is_exactly_one() {
        assert_eq!(AsteroidKind::Normal.mass_mul(), 1.0);
    }

    #[test]
    fn split_counts_never_exceed_three() {
        for kind in [
            AsteroidKind::Normal,
            AsteroidKind::Dense,
            AsteroidKind::Fast,
            AsteroidKind::Splitter,
        ] {
            assert!(kind.split_count() <= 3);
        }
    }

    #[test]
    fn dense_asteroids_take_an_extra_hit() {
        assert_eq!(AsteroidKind::Dense.hp_for(2), 3);
        assert_eq!(AsteroidKind::Normal.hp_for(2), 2);
    }

    #[test]
    fn radius_doubles_per_size_tier() {
        assert_eq!(radius_for_size(10.0, 1), 10.0);
        assert_eq!(radius_for_size(10.0, 2), 20.0);
        assert_eq!(radius_for_size(10.0, 3), 40.0);
    }

    // ── Split velocity bound ──────────────────────────────────────────────────

    #[test]
    fn child_speed_never_exceeds_cap() {
        let parent = Vec2::new(500.0, 0.0);
        let vel = split_child_velocity(parent, Vec2::X, 55.0, 0.7, 220.0);
        assert!(vel.length() <= 220.0 + 1e-3);
    }

    #[test]
    fn child_speed_bounded_by_parent_energy_plus_kick() {
        let parent = Vec2::new(80.0, 60.0); // speed 100
        let vel = split_child_velocity(parent, Vec2::new(0.6, 0.8), 55.0, 0.7, 220.0);
        // |v_child| ≤ energy_loss × |v_parent| + kick.
        assert!(vel.length() <= 0.7 * 100.0 + 55.0 + 1e-3);
    }

    #[test]
    fn repeated_splits_never_grow_speed_without_bound() {
        // Chain a size-3 parent down to size 1, always kicking straight along
        // the current velocity (the worst case). Speed must stay capped.
        let cap = 220.0;
        let mut vel = Vec2::new(400.0, 0.0);
        for _ in 0..10 {
            let dir = vel.normalize_or_zero();
            vel = split_child_velocity(vel, dir, 55.0, 0.7, cap);
            assert!(vel.length() <= cap + 1e-3);
        }
        // Fixed point of v ← 0.7 v + 55 is below the cap, so speeds settle.
        assert!(vel.length() <= cap + 1e-3);
    }

    #[test]
    fn zero_parent_velocity_gets_pure_kick() {
        let vel = split_child_velocity(Vec2::ZERO, Vec2::Y, 40.0, 0.7, 220.0);
        assert!((vel - Vec2::new(0.0, 40.0)).length() < 1e-5);
    }

    // ── Spawning through a world ──────────────────────────────────────────────

    #[test]
    fn spawned_asteroid_carries_derived_components() {
        let mut world = World::new();
        let config = SimConfig::default();
        let entity = {
            let mut commands = world.commands();
            spawn_asteroid(
                &mut commands,
                &config,
                Vec2::new(10.0, 20.0),
                Vec2::new(1.0, 0.0),
                0.5,
                AsteroidKind::Splitter,
                3,
            )
        };
        world.flush();
        let asteroid = world.get::<Asteroid>(entity).unwrap();
        assert_eq!(asteroid.size, 3);
        let radius = world.get::<CollisionRadius>(entity).unwrap();
        assert_eq!(radius.0, radius_for_size(config.asteroid_unit_radius, 3));
        let health = world.get::<Health>(entity).unwrap();
        assert!(!health.dead);
        assert_eq!(health.hp, 3);
    }

    #[test]
    fn split_children_match_kind_count_and_shrink_one_tier() {
        let mut world = World::new();
        let config = SimConfig::default();
        {
            let mut commands = world.commands();
            let n = spawn_split_children(
                &mut commands,
                &config,
                Vec2::new(100.0, 100.0),
                Vec2::new(30.0, 0.0),
                AsteroidKind::Splitter,
                3,
            );
            assert_eq!(n, 3);
        }
        world.flush();
        let mut sizes = Vec::new();
        let mut query = world.query::<&Asteroid>();
        for asteroid in query.iter(&world) {
            sizes.push(asteroid.size);
        }
        assert_eq!(sizes, vec![2, 2, 2]);
    }

    #[test]
    fn size_one_parent_yields_no_children() {
        let mut world = World::new();
        let config = SimConfig::default();
        let mut commands = world.commands();
        let n = spawn_split_children(
            &mut commands,
            &config,
            Vec2::ZERO,
            Vec2::ZERO,
            AsteroidKind::Normal,
            1,
        );
        assert_eq!(n, 0);
    }
}
