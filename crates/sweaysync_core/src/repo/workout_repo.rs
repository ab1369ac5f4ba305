//! Workout repository: the single owner of the workout list.
//!
//! # Responsibility
//! - Create, update and delete workouts (with their exercises) through an
//!   injected `WorkoutStore`.
//! - Keep an ordered in-memory copy of all workouts and publish it to
//!   subscribers.
//! - Mirror each created workout to the injected `HealthSink`.
//!
//! # Invariants
//! - The cached list only changes after a successful commit.
//! - Workout-level mutations reload the full list; exercise edits patch the
//!   cached parent in place without a reload.
//! - Failures are logged where they happen and returned as `RepoError`;
//!   ignoring the result leaves callers on the previous state.
//! - Health sink outcomes are logged only; they never reach the caller.

use crate::health::{HealthSink, WorkoutSummary};
use crate::logging::error_text;
use crate::model::draft::CreateWorkoutRequest;
use crate::model::workout::{
    Exercise, ExerciseEdit, ExerciseId, Workout, WorkoutEdit, WorkoutId,
};
use crate::store::{ExerciseOrder, StoreError, WorkoutSort, WorkoutStore};
use chrono::{NaiveDate, TimeZone};
use log::{debug, error, info, warn};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type RepoResult<T> = Result<T, RepoError>;

/// Error returned by repository operations.
#[derive(Debug)]
pub enum RepoError {
    Store(StoreError),
    WorkoutNotFound(WorkoutId),
    ExerciseNotFound(ExerciseId),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::WorkoutNotFound(id) => write!(f, "workout not found: {id}"),
            Self::ExerciseNotFound(id) => write!(f, "exercise not found: {id}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::WorkoutNotFound(_) | Self::ExerciseNotFound(_) => None,
        }
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::WorkoutNotFound(id) => Self::WorkoutNotFound(id),
            StoreError::ExerciseNotFound(id) => Self::ExerciseNotFound(id),
            other => Self::Store(other),
        }
    }
}

/// Callback receiving the current workout list after every change.
pub type WorkoutListener = Box<dyn FnMut(&[Workout])>;

/// Handle returned by `WorkoutRepository::subscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

/// Workout CRUD over an injected store and health sink.
pub struct WorkoutRepository<S, H> {
    store: S,
    sink: H,
    workouts: Vec<Workout>,
    listeners: BTreeMap<SubscriptionId, WorkoutListener>,
    next_subscription: u64,
}

impl<S: WorkoutStore, H: HealthSink> WorkoutRepository<S, H> {
    /// Builds the repository and performs the initial load.
    ///
    /// A failed initial load is logged and leaves the list empty.
    pub fn new(store: S, sink: H) -> Self {
        let mut repo = Self {
            store,
            sink,
            workouts: Vec::new(),
            listeners: BTreeMap::new(),
            next_subscription: 0,
        };
        let _ = repo.list();
        repo
    }

    /// Current list, newest scheduled date first.
    pub fn workouts(&self) -> &[Workout] {
        &self.workouts
    }

    pub fn workout(&self, id: WorkoutId) -> Option<&Workout> {
        self.workouts.iter().find(|workout| workout.id == id)
    }

    /// Cached workouts scheduled on `day` as seen in `zone`, in list order.
    pub fn workouts_on<Tz: TimeZone>(&self, day: NaiveDate, zone: &Tz) -> Vec<&Workout> {
        self.workouts
            .iter()
            .filter(|workout| workout.scheduled_day(zone) == day)
            .collect()
    }

    /// Queries the store directly for one workout's exercises.
    pub fn exercises_of(
        &self,
        workout_id: WorkoutId,
        order: ExerciseOrder,
    ) -> RepoResult<Vec<Exercise>> {
        self.store
            .load_exercises(workout_id, order)
            .map_err(|err| {
                error!(
                    "event=exercise_list module=repo status=error workout_id={} error={}",
                    workout_id,
                    error_text(&err)
                );
                err.into()
            })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn sink(&self) -> &H {
        &self.sink
    }

    /// Registers a listener called after each list refresh or in-place patch.
    pub fn subscribe(&mut self, listener: impl FnMut(&[Workout]) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.insert(id, Box::new(listener));
        id
    }

    /// Returns `false` when `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    /// Reloads all workouts from the store, newest scheduled date first.
    ///
    /// On failure the previous list is kept.
    pub fn list(&mut self) -> RepoResult<&[Workout]> {
        let started_at = Instant::now();
        match self.store.load_workouts(WorkoutSort::ScheduledDesc) {
            Ok(workouts) => {
                self.workouts = workouts;
                debug!(
                    "event=workout_list module=repo status=ok count={} duration_ms={}",
                    self.workouts.len(),
                    started_at.elapsed().as_millis()
                );
                self.notify();
                Ok(&self.workouts)
            }
            Err(err) => {
                error!(
                    "event=workout_list module=repo status=error kept_count={} duration_ms={} error={}",
                    self.workouts.len(),
                    started_at.elapsed().as_millis(),
                    error_text(&err)
                );
                Err(err.into())
            }
        }
    }

    /// Persists a new workout with one exercise per draft, in one commit.
    ///
    /// # Side effects
    /// - Reloads the list after the commit.
    /// - Sends a placeholder summary to the health sink; its outcome is
    ///   only logged.
    pub fn create(&mut self, request: CreateWorkoutRequest) -> RepoResult<WorkoutId> {
        let started_at = Instant::now();
        let workout = build_workout(request);

        if let Err(err) = self.store.insert_workout(&workout) {
            error!(
                "event=workout_create module=repo status=error workout_id={} duration_ms={} error={}",
                workout.id,
                started_at.elapsed().as_millis(),
                error_text(&err)
            );
            return Err(err.into());
        }

        info!(
            "event=workout_create module=repo status=ok workout_id={} exercise_count={} has_sketch={} duration_ms={}",
            workout.id,
            workout.exercises.len(),
            workout.sketch.is_some(),
            started_at.elapsed().as_millis()
        );

        let _ = self.list();
        self.mirror_to_health(&workout);
        Ok(workout.id)
    }

    /// Changes name, category and rest interval of one workout.
    pub fn update(&mut self, id: WorkoutId, edit: WorkoutEdit) -> RepoResult<()> {
        let started_at = Instant::now();
        if let Err(err) = self.store.update_workout(id, &edit) {
            error!(
                "event=workout_update module=repo status=error workout_id={} duration_ms={} error={}",
                id,
                started_at.elapsed().as_millis(),
                error_text(&err)
            );
            return Err(err.into());
        }

        info!(
            "event=workout_update module=repo status=ok workout_id={} duration_ms={}",
            id,
            started_at.elapsed().as_millis()
        );
        let _ = self.list();
        Ok(())
    }

    /// Deletes one workout together with all of its exercises.
    pub fn delete(&mut self, id: WorkoutId) -> RepoResult<()> {
        let started_at = Instant::now();
        if let Err(err) = self.store.delete_workout(id) {
            error!(
                "event=workout_delete module=repo status=error workout_id={} duration_ms={} error={}",
                id,
                started_at.elapsed().as_millis(),
                error_text(&err)
            );
            return Err(err.into());
        }

        info!(
            "event=workout_delete module=repo status=ok workout_id={} duration_ms={}",
            id,
            started_at.elapsed().as_millis()
        );
        let _ = self.list();
        Ok(())
    }

    /// Narrow surface for editing individual exercises.
    pub fn exercise_editor(&mut self) -> ExerciseEditor<'_, S, H> {
        ExerciseEditor { repo: self }
    }

    fn update_exercise(&mut self, id: ExerciseId, edit: ExerciseEdit) -> RepoResult<()> {
        if let Err(err) = self.store.update_exercise(id, &edit) {
            error!(
                "event=exercise_update module=repo status=error exercise_id={} error={}",
                id,
                error_text(&err)
            );
            return Err(err.into());
        }

        let patched = match self
            .workouts
            .iter_mut()
            .find_map(|workout| workout.exercise_mut(id))
        {
            Some(exercise) => {
                exercise.apply_edit(&edit);
                true
            }
            None => false,
        };

        info!(
            "event=exercise_update module=repo status=ok exercise_id={} cached={}",
            id, patched
        );
        if patched {
            self.notify();
        }
        Ok(())
    }

    fn delete_exercise(&mut self, id: ExerciseId) -> RepoResult<()> {
        if let Err(err) = self.store.delete_exercise(id) {
            error!(
                "event=exercise_delete module=repo status=error exercise_id={} error={}",
                id,
                error_text(&err)
            );
            return Err(err.into());
        }

        let mut removed = false;
        for workout in &mut self.workouts {
            if let Some(index) = workout.exercises.iter().position(|e| e.id == id) {
                workout.exercises.remove(index);
                removed = true;
                break;
            }
        }

        info!(
            "event=exercise_delete module=repo status=ok exercise_id={} cached={}",
            id, removed
        );
        if removed {
            self.notify();
        }
        Ok(())
    }

    fn mirror_to_health(&self, workout: &Workout) {
        let workout_id = workout.id;
        self.sink.record_workout(
            WorkoutSummary::placeholder(workout.scheduled_at),
            Box::new(move |outcome| match outcome {
                Ok(()) => info!(
                    "event=health_sink_write module=repo status=ok workout_id={}",
                    workout_id
                ),
                Err(err) => warn!(
                    "event=health_sink_write module=repo status=error workout_id={} error={}",
                    workout_id,
                    error_text(&err)
                ),
            }),
        );
    }

    fn notify(&mut self) {
        let workouts = &self.workouts;
        for listener in self.listeners.values_mut() {
            listener(workouts);
        }
    }
}

/// Exercise-only edit surface borrowed from a `WorkoutRepository`.
///
/// Edits commit immediately and patch the cached parent workout instead of
/// reloading the list.
pub struct ExerciseEditor<'repo, S, H> {
    repo: &'repo mut WorkoutRepository<S, H>,
}

impl<S: WorkoutStore, H: HealthSink> ExerciseEditor<'_, S, H> {
    /// Replaces name, sets and reps of one exercise.
    pub fn update(&mut self, id: ExerciseId, edit: ExerciseEdit) -> RepoResult<()> {
        self.repo.update_exercise(id, edit)
    }

    pub fn delete(&mut self, id: ExerciseId) -> RepoResult<()> {
        self.repo.delete_exercise(id)
    }
}

fn build_workout(request: CreateWorkoutRequest) -> Workout {
    let mut workout = Workout::new(request.name, request.category, request.scheduled_at);
    workout.sets = request.sets;
    workout.reps = request.reps;
    workout.rest_seconds = request.rest_seconds;
    workout.sketch = request.sketch;
    for draft in request.exercises {
        workout.add_exercise(draft.name, draft.sets, draft.reps);
    }
    workout
}
