//! Entity store contract for the workout graph.
//!
//! # Responsibility
//! - Define the minimal transactional store the workout repository needs.
//! - Keep SQL details inside `store::sqlite`.
//!
//! # Invariants
//! - Every mutating call is exactly one commit: it either applies fully or
//!   leaves persisted state unchanged.
//! - Deleting a workout removes its exercises in the same commit.
//! - Workout listings carry their exercises in insertion order.

use crate::db::DbError;
use crate::model::workout::{
    Exercise, ExerciseEdit, ExerciseId, Workout, WorkoutEdit, WorkoutId,
};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod sqlite;

pub use sqlite::SqliteWorkoutStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure raised by load/commit/delete against the entity store.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    WorkoutNotFound(WorkoutId),
    ExerciseNotFound(ExerciseId),
    /// Persisted or submitted data cannot be mapped to the model.
    InvalidData(String),
    /// Connection schema is missing a table the store depends on.
    MissingRequiredTable(&'static str),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::WorkoutNotFound(id) => write!(f, "workout not found: {id}"),
            Self::ExerciseNotFound(id) => write!(f, "exercise not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid workout data: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "workout store requires table `{table}`")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Sort applied to workout listings. Ties always fall back to insertion order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WorkoutSort {
    /// Most recent scheduled date first.
    #[default]
    ScheduledDesc,
    ScheduledAsc,
}

/// Order applied to the exercises of one workout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExerciseOrder {
    #[default]
    Insertion,
    /// Case-insensitive name, then insertion order.
    Name,
}

/// Transactional store for workouts and their exercises.
pub trait WorkoutStore {
    /// Loads every workout with its exercises attached.
    fn load_workouts(&self, sort: WorkoutSort) -> StoreResult<Vec<Workout>>;
    /// Loads the exercises owned by one workout. Unknown ids yield an empty list.
    fn load_exercises(
        &self,
        workout_id: WorkoutId,
        order: ExerciseOrder,
    ) -> StoreResult<Vec<Exercise>>;
    fn get_workout(&self, id: WorkoutId) -> StoreResult<Option<Workout>>;
    fn get_exercise(&self, id: ExerciseId) -> StoreResult<Option<Exercise>>;
    /// Inserts a workout and all of its exercises in one commit.
    fn insert_workout(&mut self, workout: &Workout) -> StoreResult<()>;
    /// Rewrites name, category and rest interval only.
    fn update_workout(&mut self, id: WorkoutId, edit: &WorkoutEdit) -> StoreResult<()>;
    /// Deletes a workout and cascades to its exercises in one commit.
    fn delete_workout(&mut self, id: WorkoutId) -> StoreResult<()>;
    /// Rewrites name, sets and reps of one exercise. The owner never changes.
    fn update_exercise(&mut self, id: ExerciseId, edit: &ExerciseEdit) -> StoreResult<()>;
    fn delete_exercise(&mut self, id: ExerciseId) -> StoreResult<()>;
}
