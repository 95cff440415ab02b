//! Simulation-specific error types.
//!
//! Degenerate numerical cases inside a tick (coincident centers, unregistered
//! shape lookups, over-requested budgets) are handled by policy in their
//! respective modules and never surface as errors. What *is* an error is a
//! misconfigured constant: those are caught at construction/load time by the
//! validation helpers below, before they can destabilise the solver.

use std::fmt;

/// Top-level error enum for the rockfield simulation.
#[derive(Debug)]
pub enum SimError {
    /// A configuration constant is outside its safe operating range.
    UnsafeConstant {
        /// Name of the constant (for logging).
        name: &'static str,
        /// The value that was rejected.
        value: f32,
        /// Human-readable description of the safe range.
        safe_range: &'static str,
    },

    /// A body would be constructed with a non-positive collision radius.
    /// Disallowed because mass is derived as radius² and the solver divides
    /// by it.
    ZeroRadiusBody {
        /// Radius that was requested.
        radius: f32,
    },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::UnsafeConstant {
                name,
                value,
                safe_range,
            } => write!(
                f,
                "constant '{}' = {} is outside safe range {}",
                name, value, safe_range
            ),
            SimError::ZeroRadiusBody { radius } => {
                write!(f, "body radius must be positive, got {}", radius)
            }
        }
    }
}

impl std::error::Error for SimError {}

/// Convenience alias: a `Result` using `SimError` as the error type.
pub type SimResult<T> = Result<T, SimError>;

// ── Validation helpers ────────────────────────────────────────────────────────

/// Restitution outside `[0, 1]` either drains contacts instantly or injects
/// energy on every bounce.
pub fn validate_restitution(value: f32) -> SimResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SimError::UnsafeConstant {
            name: "restitution",
            value,
            safe_range: "[0.0, 1.0]",
        })
    }
}

/// Friction must be non-negative; the Coulomb clamp makes values above ~2
/// pointless but not unsafe.
pub fn validate_friction(value: f32) -> SimResult<()> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(SimError::UnsafeConstant {
            name: "friction",
            value,
            safe_range: "[0.0, ∞)",
        })
    }
}

/// Correction percent above 1.0 overshoots and pumps energy into stacks.
pub fn validate_correction_percent(value: f32) -> SimResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SimError::UnsafeConstant {
            name: "correction_percent",
            value,
            safe_range: "[0.0, 1.0]",
        })
    }
}

/// A non-positive cell size makes the cell index division meaningless.
pub fn validate_cell_size(value: f32) -> SimResult<()> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(SimError::UnsafeConstant {
            name: "hash_cell_size",
            value,
            safe_range: "(0.0, ∞)",
        })
    }
}

/// Zero iterations means no collision response at all; more than 32 is a
/// config typo, not a tuning choice.
pub fn validate_solver_iterations(value: u32) -> SimResult<()> {
    if (1..=32).contains(&value) {
        Ok(())
    } else {
        Err(SimError::UnsafeConstant {
            name: "solver_iterations",
            value: value as f32,
            safe_range: "[1, 32]",
        })
    }
}

/// Body radii must be strictly positive (mass = radius²).
pub fn validate_radius(value: f32) -> SimResult<()> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(SimError::ZeroRadiusBody { radius: value })
    }
}

/// Size tiers double the bounding radius each step, so anything past 8 is a
/// config typo rather than a playable asteroid.
pub fn validate_max_size_tier(value: u32) -> SimResult<()> {
    if (1..=8).contains(&value) {
        Ok(())
    } else {
        Err(SimError::UnsafeConstant {
            name: "asteroid_max_size",
            value: value as f32,
            safe_range: "[1, 8]",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restitution_bounds_are_inclusive() {
        assert!(validate_restitution(0.0).is_ok());
        assert!(validate_restitution(1.0).is_ok());
        assert!(validate_restitution(1.01).is_err());
        assert!(validate_restitution(-0.1).is_err());
    }

    #[test]
    fn zero_radius_is_rejected() {
        assert!(validate_radius(0.0).is_err());
        assert!(validate_radius(-3.0).is_err());
        assert!(validate_radius(0.5).is_ok());
    }

    #[test]
    fn solver_iterations_range() {
        assert!(validate_solver_iterations(0).is_err());
        assert!(validate_solver_iterations(4).is_ok());
        assert!(validate_solver_iterations(33).is_err());
    }

    #[test]
    fn error_display_names_the_constant() {
        let err = validate_cell_size(-1.0).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("hash_cell_size"), "got: {msg}");
    }
}
