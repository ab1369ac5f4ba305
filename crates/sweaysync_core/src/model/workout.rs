//! Workout aggregate and its exercises.
//!
//! # Responsibility
//! - Define the persisted shape of one planned training session.
//! - Define the child exercise records owned by a workout.
//!
//! # Invariants
//! - `Workout::id` and `Exercise::id` are stable and never reused.
//! - Every exercise has exactly one owning workout; the back-reference is
//!   read-only outside this crate.
//! - `sets`/`reps`/`rest_seconds` on a workout are snapshot values and are
//!   independent from its exercises.
//! - `scheduled_at` is kept at millisecond precision, matching storage.

use crate::model::sketch::SketchBlob;
use chrono::{DateTime, NaiveDate, SubsecRound, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable workout identifier.
pub type WorkoutId = Uuid;

/// Stable exercise identifier.
pub type ExerciseId = Uuid;

/// Training category shown by the planner.
///
/// The planner offers four fixed labels; anything else is kept verbatim as
/// `Custom`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WorkoutCategory {
    #[default]
    Strength,
    Cardio,
    Flexibility,
    Hiit,
    Custom(String),
}

impl WorkoutCategory {
    /// Labels offered by the planner, in display order.
    pub const PRESETS: [WorkoutCategory; 4] = [
        WorkoutCategory::Strength,
        WorkoutCategory::Cardio,
        WorkoutCategory::Flexibility,
        WorkoutCategory::Hiit,
    ];

    /// Maps a stored/display label back to a category.
    ///
    /// Known labels match exactly (case-sensitive); any other text becomes
    /// `Custom` without trimming.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Strength" => Self::Strength,
            "Cardio" => Self::Cardio,
            "Flexibility" => Self::Flexibility,
            "HIIT" => Self::Hiit,
            other => Self::Custom(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Strength => "Strength",
            Self::Cardio => "Cardio",
            Self::Flexibility => "Flexibility",
            Self::Hiit => "HIIT",
            Self::Custom(value) => value.as_str(),
        }
    }

    pub fn is_preset(&self) -> bool {
        !matches!(self, Self::Custom(_))
    }
}

impl Display for WorkoutCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl From<&str> for WorkoutCategory {
    fn from(value: &str) -> Self {
        Self::from_label(value)
    }
}

impl From<String> for WorkoutCategory {
    fn from(value: String) -> Self {
        Self::from_label(value.as_str())
    }
}

impl From<WorkoutCategory> for String {
    fn from(value: WorkoutCategory) -> Self {
        match value {
            WorkoutCategory::Custom(text) => text,
            preset => preset.label().to_string(),
        }
    }
}

/// One planned training session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workout {
    pub id: WorkoutId,
    /// Free text; may be empty.
    pub name: String,
    pub category: WorkoutCategory,
    pub sets: u32,
    pub reps: u32,
    pub rest_seconds: u32,
    /// Scheduled date, stored as an instant.
    pub scheduled_at: DateTime<Utc>,
    pub sketch: Option<SketchBlob>,
    /// Owned exercises in insertion order.
    pub exercises: Vec<Exercise>,
}

impl Workout {
    /// Creates a workout with a generated id and no exercises.
    pub fn new(
        name: impl Into<String>,
        category: WorkoutCategory,
        scheduled_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            category,
            sets: 0,
            reps: 0,
            rest_seconds: 0,
            scheduled_at: normalize_instant(scheduled_at),
            sketch: None,
            exercises: Vec::new(),
        }
    }

    /// Appends a new exercise owned by this workout and returns its id.
    pub fn add_exercise(&mut self, name: impl Into<String>, sets: u32, reps: u32) -> ExerciseId {
        let exercise = Exercise::new(self.id, name, sets, reps);
        let id = exercise.id;
        self.exercises.push(exercise);
        id
    }

    /// Calendar day of `scheduled_at` as seen in `zone`.
    pub fn scheduled_day<Tz: TimeZone>(&self, zone: &Tz) -> NaiveDate {
        self.scheduled_at.with_timezone(zone).date_naive()
    }

    pub fn exercise(&self, id: ExerciseId) -> Option<&Exercise> {
        self.exercises.iter().find(|exercise| exercise.id == id)
    }

    pub(crate) fn exercise_mut(&mut self, id: ExerciseId) -> Option<&mut Exercise> {
        self.exercises.iter_mut().find(|exercise| exercise.id == id)
    }
}

/// One movement inside a workout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: ExerciseId,
    workout_id: WorkoutId,
    pub name: String,
    pub sets: u32,
    pub reps: u32,
}

impl Exercise {
    pub(crate) fn new(workout_id: WorkoutId, name: impl Into<String>, sets: u32, reps: u32) -> Self {
        Self::with_id(Uuid::new_v4(), workout_id, name, sets, reps)
    }

    /// Rebuilds a persisted exercise.
    pub(crate) fn with_id(
        id: ExerciseId,
        workout_id: WorkoutId,
        name: impl Into<String>,
        sets: u32,
        reps: u32,
    ) -> Self {
        Self {
            id,
            workout_id,
            name: name.into(),
            sets,
            reps,
        }
    }

    /// Owning workout.
    pub fn workout_id(&self) -> WorkoutId {
        self.workout_id
    }

    pub(crate) fn apply_edit(&mut self, edit: &ExerciseEdit) {
        self.name = edit.name.clone();
        self.sets = edit.sets;
        self.reps = edit.reps;
    }
}

/// Descriptive fields that may change after a workout is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkoutEdit {
    pub name: String,
    pub category: WorkoutCategory,
    pub rest_seconds: u32,
}

/// Full exercise edit; the three fields always change together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExerciseEdit {
    pub name: String,
    pub sets: u32,
    pub reps: u32,
}

/// Truncates an instant to the millisecond precision used by storage.
pub fn normalize_instant(value: DateTime<Utc>) -> DateTime<Utc> {
    value.trunc_subsecs(3)
}

#[cfg(test)]
mod tests {
    use super::{normalize_instant, Workout, WorkoutCategory};
    use chrono::{FixedOffset, NaiveDate, TimeZone, Utc};

    #[test]
    fn category_labels_round_trip() {
        for preset in WorkoutCategory::PRESETS {
            assert_eq!(WorkoutCategory::from_label(preset.label()), preset);
            assert!(preset.is_preset());
        }
        assert_eq!(WorkoutCategory::from_label("HIIT"), WorkoutCategory::Hiit);
    }

    #[test]
    fn unknown_category_is_kept_verbatim() {
        let category = WorkoutCategory::from_label(" yoga ");
        assert_eq!(category, WorkoutCategory::Custom(" yoga ".to_string()));
        assert_eq!(category.label(), " yoga ");
        assert!(!category.is_preset());

        // Case matters: only exact preset labels map to presets.
        assert_eq!(
            WorkoutCategory::from_label("hiit"),
            WorkoutCategory::Custom("hiit".to_string())
        );
    }

    #[test]
    fn category_serializes_as_label() {
        let json = serde_json::to_string(&WorkoutCategory::Hiit).unwrap();
        assert_eq!(json, "\"HIIT\"");
        let parsed: WorkoutCategory = serde_json::from_str("\"Mobility\"").unwrap();
        assert_eq!(parsed, WorkoutCategory::Custom("Mobility".to_string()));
    }

    #[test]
    fn new_workout_truncates_to_millis_and_owns_added_exercises() {
        let at = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
        let mut workout = Workout::new("Push", WorkoutCategory::Strength, at);
        assert_eq!(workout.scheduled_at, normalize_instant(at));
        assert_eq!(workout.scheduled_at.timestamp_subsec_nanos(), 123_000_000);

        let id = workout.add_exercise("Bench", 5, 5);
        let exercise = workout.exercise(id).unwrap();
        assert_eq!(exercise.workout_id(), workout.id);
        assert_eq!(exercise.name, "Bench");
    }

    #[test]
    fn scheduled_day_depends_on_zone() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 23, 30, 0).unwrap();
        let workout = Workout::new("Late", WorkoutCategory::Cardio, at);
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();

        assert_eq!(
            workout.scheduled_day(&Utc),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
        assert_eq!(
            workout.scheduled_day(&plus_two),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
        );
    }
}
