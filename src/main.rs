use bevy::prelude::*;

use bevy::app::ScheduleRunnerPlugin;
use std::time::Duration;

use bulwark::game::simulation::{HeroInput, MatchOutcome, StartMatchCommand};
use bulwark::game::GamePlugin;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use std::fs;
use std::path::PathBuf;

fn setup_file_logging() -> String {
    // Create logs directory if it doesn't exist
    let log_dir = PathBuf::from("logs");
    if !log_dir.exists() {
        fs::create_dir_all(&log_dir).expect("Failed to create logs directory");
    }

    // Clean up old log files, keeping only the last 25
    cleanup_old_logs(&log_dir, 25);

    // Generate timestamped filename
    let now = chrono::Local::now();
    let log_filename = format!("bulwark_{}.log", now.format("%Y%m%d_%H%M%S"));
    let log_file_path = log_dir.join(&log_filename);
    let log_path_str = log_file_path.to_string_lossy().to_string();

    // Create file appender with timestamped filename
    let file_appender = RollingFileAppender::new(
        Rotation::NEVER, // Don't rotate during a single run
        &log_dir,
        &log_filename,
    );

    // Create a formatting layer for the file
    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false); // No ANSI colors in file

    // Create a formatting layer for stdout (minimal)
    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("bevy_ecs=info,bulwark=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    log_path_str
}

fn cleanup_old_logs(log_dir: &PathBuf, keep_count: usize) {
    if let Ok(entries) = fs::read_dir(log_dir) {
        let mut log_files: Vec<_> = entries
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map(|s| s.starts_with("bulwark") && s.ends_with(".log"))
                    .unwrap_or(false)
            })
            .collect();

        // Sort by modified time (oldest first)
        log_files.sort_by_key(|e| e.metadata().ok().and_then(|m| m.modified().ok()));

        // Delete oldest files if we exceed keep_count
        if log_files.len() > keep_count {
            for file in log_files.iter().take(log_files.len() - keep_count) {
                let _ = fs::remove_file(file.path());
            }
        }
    }
}

/// Queues a match at the difficulty given on the command line (default 1).
fn queue_start(mut starts: MessageWriter<StartMatchCommand>) {
    let difficulty = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(1);
    starts.write(StartMatchCommand { difficulty });
}

/// Headless autopilot: march the hero straight at the enemy castle,
/// swinging the whole way.
fn drive_hero(mut input: ResMut<HeroInput>) {
    input.move_dir = Vec2::new(0.0, -1.0);
    input.attacking = true;
}

fn exit_on_outcome(outcome: Res<MatchOutcome>, mut exit: MessageWriter<AppExit>) {
    if outcome.0.is_some() {
        exit.write(AppExit::Success);
    }
}

fn main() {
    // Set up file logging and get the log file path
    let log_file = setup_file_logging();

    println!("Bulwark - logging to {log_file}");

    App::new()
        .add_plugins(
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
                1.0 / 60.0,
            ))),
        )
        .add_plugins(GamePlugin)
        .add_systems(Startup, queue_start)
        .add_systems(Update, (drive_hero, exit_on_outcome))
        .run();
}
