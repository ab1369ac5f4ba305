//! SQLite implementation of the workout store.
//!
//! # Responsibility
//! - Map `Workout`/`Exercise` to the `workouts`/`exercises` tables.
//! - Run each mutation inside its own transaction.
//!
//! # Invariants
//! - Listing order is `scheduled_at` then `seq ASC`, so same-date workouts
//!   come back in insertion order.
//! - Read paths reject invalid persisted rows instead of masking them.

use crate::model::sketch::SketchBlob;
use crate::model::workout::{
    Exercise, ExerciseEdit, ExerciseId, Workout, WorkoutCategory, WorkoutEdit, WorkoutId,
};
use crate::store::{ExerciseOrder, StoreError, StoreResult, WorkoutSort, WorkoutStore};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::collections::HashMap;
use uuid::Uuid;

const WORKOUT_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    category,
    sets,
    reps,
    rest_seconds,
    scheduled_at,
    sketch
FROM workouts";

const EXERCISE_SELECT_SQL: &str = "SELECT
    uuid,
    workout_uuid,
    name,
    sets,
    reps
FROM exercises";

/// SQLite-backed workout store over a migrated connection.
pub struct SqliteWorkoutStore<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteWorkoutStore<'conn> {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    ///
    /// # Errors
    /// - `StoreError::MissingRequiredTable` when migrations were not applied.
    pub fn try_new(conn: &'conn mut Connection) -> StoreResult<Self> {
        for table in ["workouts", "exercises"] {
            if !table_exists(conn, table)? {
                return Err(StoreError::MissingRequiredTable(table));
            }
        }
        Ok(Self { conn })
    }

    /// Read access to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &*self.conn
    }
}

impl WorkoutStore for SqliteWorkoutStore<'_> {
    fn load_workouts(&self, sort: WorkoutSort) -> StoreResult<Vec<Workout>> {
        let direction = match sort {
            WorkoutSort::ScheduledDesc => "DESC",
            WorkoutSort::ScheduledAsc => "ASC",
        };
        let mut stmt = self.conn.prepare(&format!(
            "{WORKOUT_SELECT_SQL} ORDER BY scheduled_at {direction}, seq ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut workouts = Vec::new();
        while let Some(row) = rows.next()? {
            workouts.push(parse_workout_row(row)?);
        }

        let mut owned = load_all_exercises(self.connection())?;
        for workout in &mut workouts {
            workout.exercises = owned.remove(&workout.id).unwrap_or_default();
        }

        Ok(workouts)
    }

    fn load_exercises(
        &self,
        workout_id: WorkoutId,
        order: ExerciseOrder,
    ) -> StoreResult<Vec<Exercise>> {
        load_exercises_for(self.connection(), workout_id, order)
    }

    fn get_workout(&self, id: WorkoutId) -> StoreResult<Option<Workout>> {
        let mut workout = self
            .conn
            .query_row(
                &format!("{WORKOUT_SELECT_SQL} WHERE uuid = ?1;"),
                [id.to_string()],
                |row| Ok(parse_workout_row(row)),
            )
            .optional()?
            .transpose()?;

        if let Some(workout) = workout.as_mut() {
            workout.exercises =
                load_exercises_for(self.connection(), id, ExerciseOrder::Insertion)?;
        }
        Ok(workout)
    }

    fn get_exercise(&self, id: ExerciseId) -> StoreResult<Option<Exercise>> {
        let exercise = self
            .conn
            .query_row(
                &format!("{EXERCISE_SELECT_SQL} WHERE uuid = ?1;"),
                [id.to_string()],
                |row| Ok(parse_exercise_row(row)),
            )
            .optional()?
            .transpose()?;
        Ok(exercise)
    }

    fn insert_workout(&mut self, workout: &Workout) -> StoreResult<()> {
        if let Some(stray) = workout
            .exercises
            .iter()
            .find(|exercise| exercise.workout_id() != workout.id)
        {
            return Err(StoreError::InvalidData(format!(
                "exercise {} is owned by workout {}, not {}",
                stray.id,
                stray.workout_id(),
                workout.id
            )));
        }

        let workout_uuid = workout.id.to_string();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        tx.execute(
            "INSERT INTO workouts (
                uuid,
                name,
                category,
                sets,
                reps,
                rest_seconds,
                scheduled_at,
                sketch
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                workout_uuid.as_str(),
                workout.name.as_str(),
                workout.category.label(),
                workout.sets,
                workout.reps,
                workout.rest_seconds,
                workout.scheduled_at.timestamp_millis(),
                workout.sketch.as_ref().map(SketchBlob::as_bytes),
            ],
        )?;

        for exercise in &workout.exercises {
            tx.execute(
                "INSERT INTO exercises (uuid, workout_uuid, name, sets, reps)
                 VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    exercise.id.to_string(),
                    workout_uuid.as_str(),
                    exercise.name.as_str(),
                    exercise.sets,
                    exercise.reps,
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    fn update_workout(&mut self, id: WorkoutId, edit: &WorkoutEdit) -> StoreResult<()> {
        let changed = self.conn.execute(
            "UPDATE workouts
             SET
                name = ?2,
                category = ?3,
                rest_seconds = ?4,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![
                id.to_string(),
                edit.name.as_str(),
                edit.category.label(),
                edit.rest_seconds,
            ],
        )?;

        if changed == 0 {
            return Err(StoreError::WorkoutNotFound(id));
        }
        Ok(())
    }

    fn delete_workout(&mut self, id: WorkoutId) -> StoreResult<()> {
        let workout_uuid = id.to_string();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        tx.execute(
            "DELETE FROM exercises WHERE workout_uuid = ?1;",
            [workout_uuid.as_str()],
        )?;
        let changed = tx.execute(
            "DELETE FROM workouts WHERE uuid = ?1;",
            [workout_uuid.as_str()],
        )?;
        if changed == 0 {
            // Dropping `tx` rolls back the exercise delete.
            return Err(StoreError::WorkoutNotFound(id));
        }

        tx.commit()?;
        Ok(())
    }

    fn update_exercise(&mut self, id: ExerciseId, edit: &ExerciseEdit) -> StoreResult<()> {
        let changed = self.conn.execute(
            "UPDATE exercises
             SET
                name = ?2,
                sets = ?3,
                reps = ?4,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![id.to_string(), edit.name.as_str(), edit.sets, edit.reps],
        )?;

        if changed == 0 {
            return Err(StoreError::ExerciseNotFound(id));
        }
        Ok(())
    }

    fn delete_exercise(&mut self, id: ExerciseId) -> StoreResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM exercises WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(StoreError::ExerciseNotFound(id));
        }
        Ok(())
    }
}

fn load_exercises_for(
    conn: &Connection,
    workout_id: WorkoutId,
    order: ExerciseOrder,
) -> StoreResult<Vec<Exercise>> {
    let order_by = match order {
        ExerciseOrder::Insertion => "seq ASC",
        ExerciseOrder::Name => "name COLLATE NOCASE ASC, seq ASC",
    };
    let mut stmt = conn.prepare(&format!(
        "{EXERCISE_SELECT_SQL} WHERE workout_uuid = ?1 ORDER BY {order_by};"
    ))?;
    let mut rows = stmt.query([workout_id.to_string()])?;
    let mut exercises = Vec::new();
    while let Some(row) = rows.next()? {
        exercises.push(parse_exercise_row(row)?);
    }
    Ok(exercises)
}

fn load_all_exercises(conn: &Connection) -> StoreResult<HashMap<WorkoutId, Vec<Exercise>>> {
    let mut stmt = conn.prepare(&format!("{EXERCISE_SELECT_SQL} ORDER BY seq ASC;"))?;
    let mut rows = stmt.query([])?;
    let mut grouped: HashMap<WorkoutId, Vec<Exercise>> = HashMap::new();
    while let Some(row) = rows.next()? {
        let exercise = parse_exercise_row(row)?;
        grouped
            .entry(exercise.workout_id())
            .or_default()
            .push(exercise);
    }
    Ok(grouped)
}

fn parse_workout_row(row: &Row<'_>) -> StoreResult<Workout> {
    let uuid_text: String = row.get("uuid")?;
    let scheduled_ms: i64 = row.get("scheduled_at")?;
    let scheduled_at = DateTime::<Utc>::from_timestamp_millis(scheduled_ms).ok_or_else(|| {
        StoreError::InvalidData(format!(
            "invalid timestamp `{scheduled_ms}` in workouts.scheduled_at"
        ))
    })?;
    let category: String = row.get("category")?;

    Ok(Workout {
        id: parse_uuid(&uuid_text, "workouts.uuid")?,
        name: row.get("name")?,
        category: WorkoutCategory::from(category),
        sets: row.get("sets")?,
        reps: row.get("reps")?,
        rest_seconds: row.get("rest_seconds")?,
        scheduled_at,
        sketch: row.get::<_, Option<Vec<u8>>>("sketch")?.map(SketchBlob::from),
        exercises: Vec::new(),
    })
}

fn parse_exercise_row(row: &Row<'_>) -> StoreResult<Exercise> {
    let uuid_text: String = row.get("uuid")?;
    let owner_text: String = row.get("workout_uuid")?;
    let name: String = row.get("name")?;

    Ok(Exercise::with_id(
        parse_uuid(&uuid_text, "exercises.uuid")?,
        parse_uuid(&owner_text, "exercises.workout_uuid")?,
        name,
        row.get("sets")?,
        row.get("reps")?,
    ))
}

fn parse_uuid(value: &str, column: &str) -> StoreResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| StoreError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
