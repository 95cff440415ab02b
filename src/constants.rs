//! Centralised physics and simulation constants.
//!
//! All tuneable values live here so they can be found, reasoned-about, and
//! modified in one place without source-diving across multiple modules.
//! Every constant has a matching field on [`crate::config::SimConfig`], so any
//! of them can be overridden at startup from `assets/physics.toml`.

// ── World Bounds ──────────────────────────────────────────────────────────────

/// Width of the toroidal play field (world units).
///
/// Positions wrap modulo this value: an asteroid leaving the right edge
/// re-enters on the left at the same speed.
pub const WORLD_WIDTH: f32 = 1600.0;

/// Height of the toroidal play field (world units).
pub const WORLD_HEIGHT: f32 = 1200.0;

/// Radius around the ship kept clear when a field of asteroids is spawned.
///
/// Measured with toroidal (shortest-path) distance so a spawn position just
/// across the wrap seam still counts as "near the ship".
pub const SPAWN_BUFFER_RADIUS: f32 = 140.0;

// ── Physics: Collision Response ───────────────────────────────────────────────

/// Restitution coefficient for asteroid–asteroid impacts.
/// 0.0 = perfectly inelastic; 1.0 = perfectly elastic.
///
/// At 0.22 colliding rocks visibly bounce but shed most of their closing
/// speed, which keeps dense waves from turning into a pinball machine.
pub const RESTITUTION: f32 = 0.22;

/// Coulomb friction coefficient for the tangential impulse.
///
/// The friction impulse is clamped to ±`FRICTION` × the normal impulse.
pub const FRICTION: f32 = 0.26;

/// Fraction of the residual penetration removed per solver pass.
///
/// Partial correction (rather than 1.0) avoids overshoot and the energy
/// injection that comes with it. Tested range: 0.2–0.8.
pub const CORRECTION_PERCENT: f32 = 0.5;

/// Penetration depth (world units) tolerated without positional correction.
///
/// Below this overlap the bodies are left alone, which prevents resting
/// contacts from jittering. Tested range: 0.1–2.0.
pub const CORRECTION_SLOP: f32 = 0.8;

/// Number of sequential impulse passes per tick.
///
/// More passes stabilise stacked / simultaneous contacts at a linear CPU
/// cost. 4 is enough for the population sizes this game reaches (tens).
pub const SOLVER_ITERATIONS: u32 = 4;

/// Early-accept threshold for the deepest-contact search, as a fraction of
/// the contacting circle pair's combined radius.
///
/// Once a candidate overlaps this deeply the scan stops: a contact that deep
/// dominates the resolution anyway. Heuristic, not a correctness requirement.
pub const DEEP_CONTACT_ACCEPT_FRAC: f32 = 0.4;

// ── Spatial Hash ──────────────────────────────────────────────────────────────

/// World-space size of each spatial hash cell.
///
/// Chosen near a typical body diameter (a size-2 asteroid spans 40 u) so that
/// buckets stay small without a body overlapping many cells. Cell coordinates
/// use floor division and may go negative; the grid is unbounded.
pub const HASH_CELL_SIZE: f32 = 48.0;

// ── Asteroid Geometry & Mass ──────────────────────────────────────────────────

/// Bounding radius (world units) of a size-1 asteroid.
///
/// Each size tier doubles the radius: size 1 → 10 u, size 2 → 20 u,
/// size 3 → 40 u. Mass is derived as radius² (area proxy), so one tier up is
/// four times heavier.
pub const ASTEROID_UNIT_RADIUS: f32 = 10.0;

/// Largest asteroid size tier spawned by waves.
pub const ASTEROID_MAX_SIZE: u32 = 3;

/// Initial speed range (u/s) for freshly spawned field asteroids.
pub const ASTEROID_INITIAL_SPEED_MIN: f32 = 20.0;
pub const ASTEROID_INITIAL_SPEED_MAX: f32 = 70.0;

/// Initial angular velocity range (rad/s), symmetric about zero.
pub const ASTEROID_INITIAL_ANGVEL_RANGE: f32 = 1.5;

// ── Asteroid Splitting ────────────────────────────────────────────────────────

/// Fraction of the parent's velocity inherited by each split child.
///
/// Below 1.0 every split generation bleeds energy, so chain-splitting a
/// large rock can never build up runaway speeds.
pub const SPLIT_ENERGY_LOSS: f32 = 0.7;

/// Magnitude (u/s) of the radial kick added to each split child.
pub const SPLIT_KICK_SPEED: f32 = 55.0;

/// Hard cap (u/s) on a split child's resulting speed, applied after the
/// inherited velocity and radial kick are combined.
pub const MAX_CHILD_SPEED: f32 = 220.0;

// ── Projectiles ───────────────────────────────────────────────────────────────

/// Collision radius (u) of a projectile. Near point-like by design.
pub const PROJECTILE_RADIUS: f32 = 2.0;

/// Seconds after which an unspent projectile dies (and counts as a miss).
pub const PROJECTILE_LIFETIME: f32 = 1.4;

// ── Ship ──────────────────────────────────────────────────────────────────────

/// Collision radius (u) of the player ship.
pub const SHIP_RADIUS: f32 = 12.0;

/// Seconds of contact immunity granted after each reported ship hit.
/// Prevents one sustained graze from emitting a hit message every tick.
pub const SHIP_HIT_INVULN_SECS: f32 = 1.0;

// ── Scoring ───────────────────────────────────────────────────────────────────

/// Base score for destroying a size-1 asteroid of the default kind at ×1 combo.
pub const SCORE_BASE: u32 = 100;

// ── Frame Effect Budget ───────────────────────────────────────────────────────

/// Frame rate the effect budget treats as "full speed".
pub const TARGET_FPS: f32 = 60.0;

/// Weight of the newest sample in the exponential moving average of FPS.
/// Small values smooth over single slow frames; large values react faster.
pub const FPS_SMOOTHING: f32 = 0.08;

/// Floor on the budget scale factor when the smoothed FPS is far below
/// target. Even a struggling frame still gets about a third of the normal
/// effects so hits never look completely dry.
pub const BUDGET_MIN_SCALE: f32 = 0.35;

/// Maximum effect particles spawnable in a single tick at full frame rate.
pub const FRAME_EFFECT_CAP: u32 = 96;

/// Total pooled particle entities created at startup. The per-tick budget is
/// additionally capped by how many of these are currently free.
pub const PARTICLE_POOL_CAPACITY: u32 = 512;
