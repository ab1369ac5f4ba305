//! Transient workout composition before commit.
//!
//! # Responsibility
//! - Hold exercise drafts while a new workout is being planned.
//! - Produce the request consumed by `WorkoutRepository::create`.
//!
//! # Invariants
//! - Drafts are never written to the store directly.
//! - `DraftId` values are unique within one `WorkoutDraft` only.
//! - Draft order is preserved; duplicate name/sets/reps are allowed.

use crate::model::sketch::SketchBlob;
use crate::model::workout::WorkoutCategory;
use chrono::{DateTime, Utc};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const DEFAULT_PLANNED_SETS: u32 = 3;
pub const DEFAULT_PLANNED_REPS: u32 = 10;
pub const DEFAULT_REST_SECONDS: u32 = 30;

/// Exercise values captured before the owning workout exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExerciseDraft {
    pub name: String,
    pub sets: u32,
    pub reps: u32,
}

impl ExerciseDraft {
    pub fn new(name: impl Into<String>, sets: u32, reps: u32) -> Self {
        Self {
            name: name.into(),
            sets,
            reps,
        }
    }
}

/// Ephemeral handle for removing one draft from a `WorkoutDraft`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DraftId(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    /// Exercise name is empty after trimming whitespace.
    BlankExerciseName,
}

impl Display for DraftError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankExerciseName => write!(f, "exercise name cannot be blank"),
        }
    }
}

impl Error for DraftError {}

/// Everything `WorkoutRepository::create` needs for one new workout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateWorkoutRequest {
    pub name: String,
    pub category: WorkoutCategory,
    pub sets: u32,
    pub reps: u32,
    pub rest_seconds: u32,
    pub scheduled_at: DateTime<Utc>,
    /// Materialized in this order as owned exercises.
    pub exercises: Vec<ExerciseDraft>,
    pub sketch: Option<SketchBlob>,
}

/// Planner state for a workout that has not been saved yet.
#[derive(Debug, Clone)]
pub struct WorkoutDraft {
    pub name: String,
    pub category: WorkoutCategory,
    pub sets: u32,
    pub reps: u32,
    pub rest_seconds: u32,
    pub scheduled_at: DateTime<Utc>,
    pub sketch: Option<SketchBlob>,
    exercises: Vec<(DraftId, ExerciseDraft)>,
    next_id: u64,
}

impl WorkoutDraft {
    /// Starts a draft with the planner defaults: Strength, 3x10, 30 s rest.
    pub fn new(scheduled_at: DateTime<Utc>) -> Self {
        Self {
            name: String::new(),
            category: WorkoutCategory::Strength,
            sets: DEFAULT_PLANNED_SETS,
            reps: DEFAULT_PLANNED_REPS,
            rest_seconds: DEFAULT_REST_SECONDS,
            scheduled_at,
            sketch: None,
            exercises: Vec::new(),
            next_id: 0,
        }
    }

    /// Appends one exercise draft.
    ///
    /// # Errors
    /// - `DraftError::BlankExerciseName` when `name` is whitespace only.
    pub fn add_exercise(
        &mut self,
        name: impl Into<String>,
        sets: u32,
        reps: u32,
    ) -> Result<DraftId, DraftError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DraftError::BlankExerciseName);
        }

        let id = DraftId(self.next_id);
        self.next_id += 1;
        self.exercises.push((id, ExerciseDraft::new(name, sets, reps)));
        Ok(id)
    }

    /// Removes one draft. Returns `false` when the id is unknown.
    pub fn remove_exercise(&mut self, id: DraftId) -> bool {
        match self.exercises.iter().position(|(draft_id, _)| *draft_id == id) {
            Some(index) => {
                self.exercises.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn exercises(&self) -> impl Iterator<Item = (DraftId, &ExerciseDraft)> {
        self.exercises.iter().map(|(id, draft)| (*id, draft))
    }

    pub fn exercise_count(&self) -> usize {
        self.exercises.len()
    }

    pub fn set_sketch(&mut self, sketch: SketchBlob) {
        self.sketch = Some(sketch);
    }

    pub fn clear_sketch(&mut self) {
        self.sketch = None;
    }

    pub fn into_request(self) -> CreateWorkoutRequest {
        CreateWorkoutRequest {
            name: self.name,
            category: self.category,
            sets: self.sets,
            reps: self.reps,
            rest_seconds: self.rest_seconds,
            scheduled_at: self.scheduled_at,
            exercises: self.exercises.into_iter().map(|(_, draft)| draft).collect(),
            sketch: self.sketch,
        }
    }
}
