//! Runtime simulation configuration loaded from `assets/physics.toml`.
//!
//! [`SimConfig`] is a Bevy [`Resource`] that mirrors every constant in
//! [`crate::constants`]. At startup, [`load_sim_config`] reads
//! `assets/physics.toml` and overwrites the defaults with any values present
//! in the file. Missing keys fall back to the compile-time defaults, so a
//! minimal TOML can override just the constants you care about.
//!
//! ## Usage in systems
//!
//! Add `config: Res<SimConfig>` to any system parameter list and read values
//! with `config.restitution`, `config.hash_cell_size`, etc.

use crate::constants::*;
use crate::error::{
    validate_cell_size, validate_correction_percent, validate_friction, validate_max_size_tier,
    validate_radius, validate_restitution, validate_solver_iterations, SimResult,
};
use bevy::log::{info, warn};
use bevy::prelude::*;
use serde::Deserialize;

/// Runtime-tunable physics and simulation configuration.
///
/// All fields default to the corresponding compile-time constant from
/// `src/constants.rs`. Override any subset by setting the value in
/// `assets/physics.toml`.
#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    // ── World Bounds ─────────────────────────────────────────────────────────
    pub world_width: f32,
    pub world_height: f32,
    pub spawn_buffer_radius: f32,

    // ── Collision Response ───────────────────────────────────────────────────
    pub restitution: f32,
    pub friction: f32,
    pub correction_percent: f32,
    pub correction_slop: f32,
    pub solver_iterations: u32,
    pub deep_contact_accept_frac: f32,

    // ── Spatial Hash ─────────────────────────────────────────────────────────
    pub hash_cell_size: f32,

    // ── Asteroid Geometry & Mass ─────────────────────────────────────────────
    pub asteroid_unit_radius: f32,
    pub asteroid_max_size: u32,
    pub asteroid_initial_speed_min: f32,
    pub asteroid_initial_speed_max: f32,
    pub asteroid_initial_angvel_range: f32,

    // ── Splitting ────────────────────────────────────────────────────────────
    pub split_energy_loss: f32,
    pub split_kick_speed: f32,
    pub max_child_speed: f32,

    // ── Projectiles ──────────────────────────────────────────────────────────
    pub projectile_radius: f32,
    pub projectile_lifetime: f32,

    // ── Ship ─────────────────────────────────────────────────────────────────
    pub ship_radius: f32,
    pub ship_hit_invuln_secs: f32,

    // ── Scoring ──────────────────────────────────────────────────────────────
    pub score_base: u32,

    // ── Frame Effect Budget ──────────────────────────────────────────────────
    pub target_fps: f32,
    pub fps_smoothing: f32,
    pub budget_min_scale: f32,
    pub frame_effect_cap: u32,
    pub particle_pool_capacity: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            // World Bounds
            world_width: WORLD_WIDTH,
            world_height: WORLD_HEIGHT,
            spawn_buffer_radius: SPAWN_BUFFER_RADIUS,
            // Collision Response
            restitution: RESTITUTION,
            friction: FRICTION,
            correction_percent: CORRECTION_PERCENT,
            correction_slop: CORRECTION_SLOP,
            solver_iterations: SOLVER_ITERATIONS,
            deep_contact_accept_frac: DEEP_CONTACT_ACCEPT_FRAC,
            // Spatial Hash
            hash_cell_size: HASH_CELL_SIZE,
            // Asteroid Geometry & Mass
            asteroid_unit_radius: ASTEROID_UNIT_RADIUS,
            asteroid_max_size: ASTEROID_MAX_SIZE,
            asteroid_initial_speed_min: ASTEROID_INITIAL_SPEED_MIN,
            asteroid_initial_speed_max: ASTEROID_INITIAL_SPEED_MAX,
            asteroid_initial_angvel_range: ASTEROID_INITIAL_ANGVEL_RANGE,
            // Splitting
            split_energy_loss: SPLIT_ENERGY_LOSS,
            split_kick_speed: SPLIT_KICK_SPEED,
            max_child_speed: MAX_CHILD_SPEED,
            // Projectiles
            projectile_radius: PROJECTILE_RADIUS,
            projectile_lifetime: PROJECTILE_LIFETIME,
            // Ship
            ship_radius: SHIP_RADIUS,
            ship_hit_invuln_secs: SHIP_HIT_INVULN_SECS,
            // Scoring
            score_base: SCORE_BASE,
            // Frame Effect Budget
            target_fps: TARGET_FPS,
            fps_smoothing: FPS_SMOOTHING,
            budget_min_scale: BUDGET_MIN_SCALE,
            frame_effect_cap: FRAME_EFFECT_CAP,
            particle_pool_capacity: PARTICLE_POOL_CAPACITY,
        }
    }
}

impl SimConfig {
    /// Check every constant whose misconfiguration would destabilise the
    /// solver. Returns the first violation found.
    pub fn validate(&self) -> SimResult<()> {
        validate_restitution(self.restitution)?;
        validate_friction(self.friction)?;
        validate_correction_percent(self.correction_percent)?;
        validate_cell_size(self.hash_cell_size)?;
        validate_solver_iterations(self.solver_iterations)?;
        validate_max_size_tier(self.asteroid_max_size)?;
        validate_radius(self.asteroid_unit_radius)?;
        validate_radius(self.projectile_radius)?;
        validate_radius(self.ship_radius)?;
        Ok(())
    }
}

/// Startup system: attempt to load `assets/physics.toml` and overwrite the
/// `SimConfig` resource with any values present in the file.
///
/// Missing keys retain their compiled defaults. A parse error or a value that
/// fails validation logs a warning and keeps the defaults; a missing file is
/// not an error at all.
pub fn load_sim_config(mut config: ResMut<SimConfig>) {
    let path = "assets/physics.toml";
    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str::<SimConfig>(&contents) {
            Ok(loaded) => match loaded.validate() {
                Ok(()) => {
                    *config = loaded;
                    info!("loaded simulation config from {path}");
                }
                Err(e) => {
                    warn!("rejected {path}: {e}; using defaults");
                }
            },
            Err(e) => {
                warn!("failed to parse {path}: {e}; using defaults");
            }
        },
        Err(_) => {
            info!("no {path} found; using compiled defaults");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_validation() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_toml_overrides_only_named_keys() {
        let cfg: SimConfig = toml::from_str("restitution = 0.5\nsolver_iterations = 8").unwrap();
        assert_eq!(cfg.restitution, 0.5);
        assert_eq!(cfg.solver_iterations, 8);
        // Untouched keys keep their compiled defaults.
        assert_eq!(cfg.friction, FRICTION);
        assert_eq!(cfg.hash_cell_size, HASH_CELL_SIZE);
    }

    #[test]
    fn out_of_range_restitution_fails_validation() {
        let cfg: SimConfig = toml::from_str("restitution = 1.8").unwrap();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_cell_size_fails_validation() {
        let cfg: SimConfig = toml::from_str("hash_cell_size = 0.0").unwrap();
        assert!(cfg.validate().is_err());
    }
}
