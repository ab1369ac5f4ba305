//! Core domain logic for SweaySync.
//! Workout planning data, its persistence and the health mirror live here;
//! UI layers consume `WorkoutRepository`.

pub mod config;
pub mod db;
pub mod health;
pub mod logging;
pub mod model;
pub mod repo;
pub mod store;

pub use config::{ConfigError, CoreConfig};
pub use health::{
    HealthSink, JsonlHealthSink, NoopHealthSink, SinkCallback, SinkError, SinkResult,
    WorkoutSummary,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::draft::{CreateWorkoutRequest, DraftError, DraftId, ExerciseDraft, WorkoutDraft};
pub use model::sketch::SketchBlob;
pub use model::workout::{
    Exercise, ExerciseEdit, ExerciseId, Workout, WorkoutCategory, WorkoutEdit, WorkoutId,
};
pub use repo::workout_repo::{
    ExerciseEditor, RepoError, RepoResult, SubscriptionId, WorkoutListener, WorkoutRepository,
};
pub use store::{
    ExerciseOrder, SqliteWorkoutStore, StoreError, StoreResult, WorkoutSort, WorkoutStore,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
