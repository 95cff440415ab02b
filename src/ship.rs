//! Player ship contact detection.
//!
//! The ship is a circular body steered entirely by the caller: input,
//! damage, death, and respawn all live outside this core. What the core owns
//! is the contact test: each tick the ship is checked against nearby
//! asteroids with the same deepest-contact narrow phase as body-body pairs,
//! and a confirmed hit while vulnerable is reported as a [`ShipHit`] message.

use crate::asteroid::{Asteroid, CollisionRadius, Health};
use crate::config::SimConfig;
use crate::contact::deepest_contact;
use crate::shape::{world_hit_circles, WorldCircle};
use crate::simulation::Velocity;
use crate::spatial_hash::SpatialHash;
use bevy::prelude::*;

/// Player ship body.
#[derive(Component, Debug, Clone, Copy)]
pub struct Ship {
    /// Collision radius (u) of the hull circle.
    pub radius: f32,
    /// Seconds of contact immunity remaining; decremented each tick.
    pub inv_timer: f32,
}

impl Ship {
    pub fn new(radius: f32) -> Self {
        Self {
            radius,
            inv_timer: 0.0,
        }
    }
}

/// Message emitted when an asteroid touches a vulnerable ship. The caller
/// decides what a hit means (damage, lost life, screen shake).
#[derive(Message, Debug, Clone, Copy)]
pub struct ShipHit {
    pub pos: Vec2,
    /// Contact normal pointing from the ship toward the asteroid.
    pub normal: Vec2,
    /// Magnitude of the relative velocity at impact (u/s).
    pub impact_speed: f32,
}

/// Spawn the ship at `pos` with the configured hull radius.
pub fn spawn_ship(commands: &mut Commands, config: &SimConfig, pos: Vec2) -> Entity {
    commands
        .spawn((
            Transform::from_translation(pos.extend(0.0)),
            Ship::new(config.ship_radius),
            Velocity::default(),
        ))
        .id()
}

/// Test the ship against nearby asteroids and report at most one hit per
/// invulnerability window.
pub fn ship_contact_system(
    time: Res<Time>,
    config: Res<SimConfig>,
    mut hash: ResMut<SpatialHash>,
    mut ships: Query<(&Transform, &Velocity, &mut Ship)>,
    asteroids: Query<
        (&Transform, &Velocity, &Asteroid, &CollisionRadius, &Health),
        Without<Ship>,
    >,
    mut hits: MessageWriter<ShipHit>,
) {
    let dt = time.delta_secs();
    let mut candidates: Vec<Entity> = Vec::new();
    let mut circles: Vec<WorldCircle> = Vec::new();

    for (transform, ship_vel, mut ship) in ships.iter_mut() {
        ship.inv_timer = (ship.inv_timer - dt).max(0.0);
        if ship.inv_timer > 0.0 {
            continue;
        }
        let pos = transform.translation.truncate();
        let hull = [WorldCircle {
            center: pos,
            radius: ship.radius,
        }];
        hash.query(pos.x, pos.y, ship.radius, &mut candidates);

        for &candidate in &candidates {
            let Ok((a_transform, a_vel, asteroid, radius, health)) = asteroids.get(candidate)
            else {
                continue;
            };
            if health.dead {
                continue;
            }
            let a_pos = a_transform.translation.truncate();
            let rsum = radius.0 + ship.radius;
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
            let Some(contact) = deepest_contact(
                &hull,
                &circles,
                pos,
                a_pos,
                config.deep_contact_accept_frac,
            ) else {
                continue;
            };

            hits.write(ShipHit {
                pos,
                normal: contact.normal,
                impact_speed: (a_vel.linvel - ship_vel.linvel).length(),
            });
            ship.inv_timer = config.ship_hit_invuln_secs;
            break;
        }
    }
}
