use bevy::app::ScheduleRunnerPlugin;
use bevy::log::{info, LogPlugin};
use bevy::prelude::*;
use std::env;
use std::time::Duration;

use rockfield::asteroid::spawn_asteroid_field;
use rockfield::config::{self, SimConfig};
use rockfield::score::Score;
use rockfield::ship::spawn_ship;
use rockfield::simulation::{SimulationPlugin, SimulationStats};

/// Frames remaining before a scripted run exits (set via `ROCKFIELD_FRAMES`).
#[derive(Resource)]
struct FrameBudget {
    remaining: u64,
}

/// Startup system: a ship in the middle of the field and a demo wave of
/// asteroids around it.
fn spawn_demo_world(mut commands: Commands, config: Res<SimConfig>) {
    let center = Vec2::new(config.world_width * 0.5, config.world_height * 0.5);
    spawn_ship(&mut commands, &config, center);
    spawn_asteroid_field(&mut commands, &config, 24, center);
}

/// Log the diagnostic counters once a second.
fn stats_log_system(stats: Res<SimulationStats>, score: Res<Score>, mut frame: Local<u64>) {
    *frame += 1;
    if *frame % 60 == 0 {
        info!(
            "tick {}: contacts={} max_speed={:.1} ke={:.0} destroyed={} points={}",
            *frame,
            stats.collisions,
            stats.max_speed,
            stats.kinetic_energy,
            stats.destroyed_total,
            score.points
        );
    }
}

/// Exit cleanly once the scripted frame budget is spent.
fn frame_budget_system(mut budget: ResMut<FrameBudget>, mut exit: MessageWriter<AppExit>) {
    if budget.remaining == 0 {
        exit.write(AppExit::Success);
        return;
    }
    budget.remaining -= 1;
}

fn main() {
    // Headless driver: fixed 60 Hz schedule runner, no window or renderer.
    let frame_cap = env::var("ROCKFIELD_FRAMES")
        .ok()
        .and_then(|v| v.parse::<u64>().ok());

    let mut app = App::new();
    app.add_plugins(
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
            1.0 / 60.0,
        ))),
    )
    .add_plugins(LogPlugin::default())
    // Insert SimConfig with compiled defaults; load_sim_config overwrites it
    // from assets/physics.toml (if present) in the Startup schedule.
    .insert_resource(SimConfig::default())
    .add_plugins(SimulationPlugin)
    .add_systems(
        Startup,
        (
            config::load_sim_config,
            spawn_demo_world.after(config::load_sim_config),
        ),
    )
    .add_systems(Update, stats_log_system);

    if let Some(frames) = frame_cap {
        app.insert_resource(FrameBudget { remaining: frames });
        app.add_systems(Update, frame_budget_system);
    }

    app.run();
}
