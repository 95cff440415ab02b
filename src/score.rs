//! Score bookkeeping with a streak-driven combo multiplier.

use crate::asteroid::AsteroidKind;
use bevy::prelude::*;

/// Maps a hit streak to the active score multiplier.
///
/// | Streak | Multiplier |
/// |--------|------------|
/// | 0–4    | ×1         |
/// | 5–9    | ×2         |
/// | 10–19  | ×3         |
/// | 20–39  | ×4         |
/// | 40+    | ×5         |
pub fn streak_to_multiplier(streak: u32) -> u32 {
    match streak {
        0..=4 => 1,
        5..=9 => 2,
        10..=19 => 3,
        20..=39 => 4,
        _ => 5,
    }
}

/// Tracks the run's gameplay score.
///
/// - `hits`: raw projectile–asteroid contacts.
/// - `destroyed`: asteroids fully eliminated.
/// - `streak`: consecutive hits without a miss; a projectile expiring unspent
///   resets it.
/// - `points`: accumulated score with multipliers applied.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct Score {
    pub hits: u32,
    pub destroyed: u32,
    pub streak: u32,
    pub points: u32,
}

impl Score {
    /// Active scoring multiplier derived from the current streak.
    #[inline]
    pub fn multiplier(&self) -> u32 {
        streak_to_multiplier(self.streak)
    }
}

/// Score value of destroying one asteroid: base × size × kind multiplier ×
/// combo multiplier, rounded to the nearest point.
pub fn destruction_value(base: u32, size: u32, kind: AsteroidKind, combo: u32) -> u32 {
    (base as f32 * size as f32 * kind.score_mul() * combo as f32).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiplier_steps_match_table() {
        assert_eq!(streak_to_multiplier(0), 1);
        assert_eq!(streak_to_multiplier(4), 1);
        assert_eq!(streak_to_multiplier(5), 2);
        assert_eq!(streak_to_multiplier(19), 3);
        assert_eq!(streak_to_multiplier(40), 5);
    }

    #[test]
    fn destruction_value_scales_with_all_factors() {
        // 100 × size 3 × Normal (1.0) × combo 2 = 600.
        assert_eq!(destruction_value(100, 3, AsteroidKind::Normal, 2), 600);
        // Splitter multiplier 0.75 rounds: 100 × 1 × 0.75 × 1 = 75.
        assert_eq!(destruction_value(100, 1, AsteroidKind::Splitter, 1), 75);
        // Dense 1.5: 100 × 2 × 1.5 × 3 = 900.
        assert_eq!(destruction_value(100, 2, AsteroidKind::Dense, 3), 900);
    }
}
