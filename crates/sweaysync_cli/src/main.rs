//! CLI entry point.
//!
//! # Responsibility
//! - Wire config, logging, store, health sink and repository together.
//! - Offer quick local checks: `ping`, `list`, `seed`.

use chrono::Utc;
use clap::{Parser, Subcommand};
use std::process::ExitCode;
use sweaysync_core::db::{open_db, open_db_in_memory};
use sweaysync_core::{
    CoreConfig, CreateWorkoutRequest, HealthSink, JsonlHealthSink, NoopHealthSink, SketchBlob,
    SqliteWorkoutStore, WorkoutCategory, WorkoutRepository, WorkoutStore,
};

const PREVIEW_WORKOUT_COUNT: usize = 5;

#[derive(Parser)]
#[command(name = "sweaysync")]
#[command(about = "SweaySync workout store probe", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Command {
    /// Print core liveness and version
    #[default]
    Ping,
    /// Print stored workouts, newest first
    List,
    /// Insert preview workouts, then list
    Seed,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli.command.unwrap_or_default()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("sweaysync: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<(), String> {
    if command == Command::Ping {
        println!("sweaysync_core ping={}", sweaysync_core::ping());
        println!("sweaysync_core version={}", sweaysync_core::core_version());
        return Ok(());
    }

    let config = CoreConfig::from_env().map_err(|err| err.to_string())?;
    config.start_logging()?;

    let mut conn = match config.db_path.as_ref() {
        Some(path) => open_db(path),
        None => open_db_in_memory(),
    }
    .map_err(|err| err.to_string())?;
    let store = SqliteWorkoutStore::try_new(&mut conn).map_err(|err| err.to_string())?;

    let sink: Box<dyn HealthSink> = match config.health_export_path.as_ref() {
        Some(path) => {
            let sink = JsonlHealthSink::spawn(path).map_err(|err| err.to_string())?;
            println!("health export: {}", sink.path().display());
            Box::new(sink)
        }
        None => Box::new(NoopHealthSink),
    };

    let mut repo = WorkoutRepository::new(store, sink);
    if command == Command::Seed {
        seed_preview_workouts(&mut repo);
    }
    print_workouts(&repo);
    Ok(())
}

/// Inserts the preview rows used for UI previews.
fn seed_preview_workouts<S: WorkoutStore, H: HealthSink>(repo: &mut WorkoutRepository<S, H>) {
    let now = Utc::now();
    for index in 0..PREVIEW_WORKOUT_COUNT {
        let request = CreateWorkoutRequest {
            name: format!("Preview Workout {index}"),
            category: WorkoutCategory::Strength,
            sets: 3,
            reps: 10,
            rest_seconds: 30,
            scheduled_at: now,
            exercises: Vec::new(),
            sketch: None,
        };
        if let Err(err) = repo.create(request) {
            eprintln!("sweaysync: seeding stopped: {err}");
            return;
        }
    }
}

fn print_workouts<S: WorkoutStore, H: HealthSink>(repo: &WorkoutRepository<S, H>) {
    if repo.workouts().is_empty() {
        println!("no workouts");
        return;
    }
    for workout in repo.workouts() {
        println!(
            "{}  {:<12} {}x{}  rest={}s  exercises={}  sketch={}  {}",
            workout.scheduled_at.format("%Y-%m-%d"),
            workout.category.label(),
            workout.sets,
            workout.reps,
            workout.rest_seconds,
            workout.exercises.len(),
            sketch_label(workout.sketch.as_ref()),
            workout.name
        );
    }
}

fn sketch_label(sketch: Option<&SketchBlob>) -> String {
    match sketch {
        None => "none".to_string(),
        Some(sketch) if sketch.is_empty() => "blank".to_string(),
        Some(sketch) => format!("{}B", sketch.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::{sketch_label, Cli, Command};
    use clap::Parser;
    use sweaysync_core::SketchBlob;

    fn parse(args: &[&str]) -> Result<Option<Command>, clap::Error> {
        Cli::try_parse_from(args).map(|cli| cli.command)
    }

    #[test]
    fn bare_invocation_defaults_to_ping() {
        assert_eq!(parse(&["sweaysync"]).unwrap().unwrap_or_default(), Command::Ping);
    }

    #[test]
    fn subcommands_parse() {
        assert_eq!(parse(&["sweaysync", "list"]).unwrap(), Some(Command::List));
        assert_eq!(parse(&["sweaysync", "seed"]).unwrap(), Some(Command::Seed));
    }

    #[test]
    fn unknown_subcommand_is_rejected() {
        assert!(parse(&["sweaysync", "bogus"]).is_err());
    }

    #[test]
    fn sketch_label_distinguishes_missing_blank_and_drawn() {
        assert_eq!(sketch_label(None), "none");
        assert_eq!(sketch_label(Some(&SketchBlob::empty())), "blank");
        assert_eq!(sketch_label(Some(&SketchBlob::new(vec![1, 2]))), "2B");
    }
}
