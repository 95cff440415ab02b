//! Adaptive per-tick effect spawn budget.
//!
//! Cosmetic spawning (sparks, debris dust) is throttled by a smoothed
//! frame-rate estimate so that effects degrade gracefully under load instead
//! of compounding a slow frame with extra churn. The budget is recomputed
//! once per tick before any spawn requests are serviced; requests over budget
//! are silently truncated, never errors.

use crate::config::SimConfig;
use crate::particles::{Particle, ParticlePool, ParticleSpawnArgs, Poolable};
use bevy::prelude::*;
use rand::Rng;

/// Kind of effect burst requested at a hit site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    /// Small feedback burst when a projectile chips a surviving asteroid.
    Spark,
    /// Larger dust burst when an asteroid is destroyed.
    Debris,
}

/// A request to realise an effect burst, emitted by the resolution systems
/// and serviced by [`effect_spawn_system`] after the budget gate.
#[derive(Message, Debug, Clone, Copy)]
pub struct EffectRequest {
    pub kind: EffectKind,
    pub pos: Vec2,
    /// Source body velocity, partially inherited by the burst.
    pub base_vel: Vec2,
    pub count: u32,
}

/// Frame-local spawn budget driven by an FPS moving average.
#[derive(Resource, Debug, Clone)]
pub struct EffectBudget {
    /// Exponential moving average of instantaneous frames per second.
    pub fps_ema: f32,
    /// Spawns still permitted this tick.
    pub remaining: u32,
}

impl Default for EffectBudget {
    fn default() -> Self {
        Self {
            fps_ema: crate::constants::TARGET_FPS,
            remaining: crate::constants::FRAME_EFFECT_CAP,
        }
    }
}

impl EffectBudget {
    /// Recompute the tick's budget from the frame delta and the particle
    /// pool's free capacity.
    ///
    /// A non-positive `dt` (first frame, paused clock) resets the estimate
    /// and grants the full fixed cap. Otherwise the FPS average moves toward
    /// the new sample, and the cap is scaled by how far the average sits
    /// below target, floored at `budget_min_scale`.
    pub fn prepare_frame(&mut self, dt: f32, pool_free: u32, config: &SimConfig) {
        if dt <= 0.0 {
            self.fps_ema = config.target_fps;
            self.remaining = config.frame_effect_cap.min(pool_free);
            return;
        }
        let sample = 1.0 / dt;
        self.fps_ema += (sample - self.fps_ema) * config.fps_smoothing;
        let scale = (self.fps_ema / config.target_fps).clamp(config.budget_min_scale, 1.0);
        let scaled_cap = (config.frame_effect_cap as f32 * scale) as u32;
        self.remaining = scaled_cap.min(pool_free);
    }

    /// Deduct and return the permitted share of `requested` spawns:
    /// `min(requested, remaining)`, never negative, never over the request.
    pub fn spawn_capped(&mut self, requested: u32) -> u32 {
        let granted = requested.min(self.remaining);
        self.remaining -= granted;
        granted
    }
}

/// Recompute the effect budget at the top of every tick.
pub fn budget_prepare_system(
    time: Res<Time>,
    config: Res<SimConfig>,
    pool: Res<ParticlePool>,
    mut budget: ResMut<EffectBudget>,
) {
    budget.prepare_frame(time.delta_secs(), pool.free_count(), &config);
}

/// Service queued effect requests through the budget gate, leasing pooled
/// particles for every granted spawn.
pub fn effect_spawn_system(
    mut budget: ResMut<EffectBudget>,
    mut pool: ResMut<ParticlePool>,
    mut requests: MessageReader<EffectRequest>,
    mut particles: Query<(&mut Transform, &mut Particle)>,
) {
    let mut rng = rand::thread_rng();

    for request in requests.read() {
        let granted = budget.spawn_capped(request.count);
        for _ in 0..granted {
            let Some(entity) = pool.acquire() else {
                return;
            };
            let Ok((mut transform, mut particle)) = particles.get_mut(entity) else {
                continue;
            };

            let (speed_min, speed_max, life_min, life_max, inherit) = match request.kind {
                EffectKind::Spark => (60.0, 160.0, 0.20, 0.40, 0.3),
                EffectKind::Debris => (30.0, 100.0, 0.25, 0.55, 0.4),
            };
            let angle = rng.gen_range(0.0..std::f32::consts::TAU);
            let speed = rng.gen_range(speed_min..speed_max);
            let velocity =
                Vec2::new(angle.cos(), angle.sin()) * speed + request.base_vel * inherit;
            let lifetime = rng.gen_range(life_min..life_max);

            particle.reset(&ParticleSpawnArgs { velocity, lifetime });
            let offset = Vec2::new(rng.gen_range(-3.0..3.0), rng.gen_range(-3.0..3.0));
            transform.translation = (request.pos + offset).extend(0.0);
        }
    }
}
