// ABOUTME: SQL store backend over sqlx for the hosted relational database
// ABOUTME: Performs the exercise join client-side since the store exposes no join operator
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQL store backend
//!
//! Three tables mirror the hosted schema: `exercises`, `workouts`, and
//! `workout_exercises` with a JSON `sets` column and an integer
//! `exercise_order` sort key. Writes rely on the store's per-row
//! semantics; there is no optimistic concurrency, last writer wins.

use super::WorkoutStore;
use crate::errors::{StorageError, StorageResult};
use crate::models::{Exercise, ExerciseWithSets, Set, Workout, WorkoutExercise};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::collections::{HashMap, HashSet};
use std::str::FromStr;

/// SQL store backend holding an injected connection pool
#[derive(Clone)]
pub struct SqlStore {
    pool: SqlitePool,
}

impl SqlStore {
    /// Connect to the database at `database_url` and run migrations.
    ///
    /// The pool is capped at one connection: the store serves a
    /// single-user session, and this also keeps `sqlite::memory:`
    /// databases on a single connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed, the connection
    /// fails, or migration fails.
    pub async fn new(database_url: &str) -> StorageResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| StorageError::unavailable(format!("parse {database_url}: {e}")))?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::unavailable(format!("connect {database_url}: {e}")))?;

        let store = Self::from_pool(pool);
        store.migrate().await?;
        Ok(store)
    }

    /// Wrap an existing pool (test doubles, shared pools).
    #[must_use]
    pub const fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create missing tables. Idempotent; existing tables and rows are
    /// left untouched (no schema migration tooling).
    ///
    /// # Errors
    ///
    /// Returns an error if a DDL statement fails.
    pub async fn migrate(&self) -> StorageResult<()> {
        let statements = [
            r"
            CREATE TABLE IF NOT EXISTS exercises (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                image_url TEXT
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS workouts (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS workout_exercises (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                workout_id TEXT NOT NULL,
                exercise_id TEXT NOT NULL,
                sets TEXT NOT NULL DEFAULT '[]',
                exercise_order INTEGER NOT NULL DEFAULT 0
            )
            ",
        ];
        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| StorageError::unavailable(format!("migrate schema: {e}")))?;
        }
        Ok(())
    }

    async fn workout_exists(&self, workout_id: &str) -> StorageResult<bool> {
        let row = sqlx::query("SELECT 1 FROM workouts WHERE id = $1")
            .bind(workout_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::unavailable(format!("check workout exists: {e}")))?;
        Ok(row.is_some())
    }
}

fn row_to_exercise(row: &SqliteRow) -> StorageResult<Exercise> {
    Ok(Exercise {
        id: get_column(row, "id")?,
        name: get_column(row, "name")?,
        description: get_column(row, "description")?,
        image_url: row
            .try_get("image_url")
            .map_err(|e| StorageError::unavailable(format!("decode exercise row: {e}")))?,
    })
}

fn row_to_workout_exercise(row: &SqliteRow) -> StorageResult<WorkoutExercise> {
    let sets_json: String = get_column(row, "sets")?;
    let sets: Vec<Set> = serde_json::from_str(&sets_json)
        .map_err(|e| StorageError::serialization(format!("decode sets column: {e}")))?;
    let order: i64 = row
        .try_get("exercise_order")
        .map_err(|e| StorageError::unavailable(format!("decode workout exercise row: {e}")))?;
    Ok(WorkoutExercise {
        exercise_id: get_column(row, "exercise_id")?,
        sets,
        order,
    })
}

fn get_column(row: &SqliteRow, column: &str) -> StorageResult<String> {
    row.try_get(column)
        .map_err(|e| StorageError::unavailable(format!("decode column {column}: {e}")))
}

fn encode_sets(sets: &[Set]) -> StorageResult<String> {
    serde_json::to_string(sets)
        .map_err(|e| StorageError::serialization(format!("encode sets column: {e}")))
}

fn map_insert_error(e: &sqlx::Error, id: &str, context: &str) -> StorageError {
    if e.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
    {
        StorageError::duplicate_id(id)
    } else {
        StorageError::unavailable(format!("{context}: {e}"))
    }
}

#[async_trait]
impl WorkoutStore for SqlStore {
    async fn list_exercises(&self) -> StorageResult<Vec<Exercise>> {
        let rows = sqlx::query(
            r"
            SELECT id, name, description, image_url
            FROM exercises
            ORDER BY name ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::unavailable(format!("list exercises: {e}")))?;

        rows.iter().map(row_to_exercise).collect()
    }

    async fn get_exercise(&self, id: &str) -> StorageResult<Option<Exercise>> {
        let row = sqlx::query(
            r"
            SELECT id, name, description, image_url
            FROM exercises
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::unavailable(format!("get exercise: {e}")))?;

        row.map(|r| row_to_exercise(&r)).transpose()
    }

    async fn create_exercise(&self, exercise: &Exercise) -> StorageResult<()> {
        sqlx::query(
            r"
            INSERT INTO exercises (id, name, description, image_url)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(&exercise.id)
        .bind(&exercise.name)
        .bind(&exercise.description)
        .bind(&exercise.image_url)
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_error(&e, &exercise.id, "create exercise"))?;
        Ok(())
    }

    async fn update_exercise(&self, exercise: &Exercise) -> StorageResult<()> {
        // Missing id matches zero rows, which is the documented no-op
        sqlx::query(
            r"
            UPDATE exercises
            SET name = $2, description = $3, image_url = $4
            WHERE id = $1
            ",
        )
        .bind(&exercise.id)
        .bind(&exercise.name)
        .bind(&exercise.description)
        .bind(&exercise.image_url)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::unavailable(format!("update exercise: {e}")))?;
        Ok(())
    }

    async fn delete_exercise(&self, id: &str) -> StorageResult<()> {
        sqlx::query("DELETE FROM exercises WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::unavailable(format!("delete exercise: {e}")))?;
        Ok(())
    }

    async fn list_workouts(&self) -> StorageResult<Vec<Workout>> {
        let headers = sqlx::query("SELECT id, name FROM workouts ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::unavailable(format!("list workouts: {e}")))?;

        // One fetch of the whole join table, grouped in memory; the store
        // exposes no join operator to the client
        let rows = sqlx::query(
            r"
            SELECT workout_id, exercise_id, sets, exercise_order
            FROM workout_exercises
            ORDER BY workout_id, exercise_order ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::unavailable(format!("list workout exercises: {e}")))?;

        let mut grouped: HashMap<String, Vec<WorkoutExercise>> = HashMap::new();
        for row in &rows {
            let workout_id: String = get_column(row, "workout_id")?;
            grouped
                .entry(workout_id)
                .or_default()
                .push(row_to_workout_exercise(row)?);
        }

        headers
            .iter()
            .map(|header| {
                let id: String = get_column(header, "id")?;
                let exercises = grouped.remove(&id).unwrap_or_default();
                Ok(Workout {
                    id,
                    name: get_column(header, "name")?,
                    exercises,
                })
            })
            .collect()
    }

    async fn get_workout(&self, id: &str) -> StorageResult<Option<Workout>> {
        let Some(header) = sqlx::query("SELECT id, name FROM workouts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::unavailable(format!("get workout: {e}")))?
        else {
            return Ok(None);
        };

        let rows = sqlx::query(
            r"
            SELECT workout_id, exercise_id, sets, exercise_order
            FROM workout_exercises
            WHERE workout_id = $1
            ORDER BY exercise_order ASC
            ",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::unavailable(format!("get workout exercises: {e}")))?;

        let exercises = rows
            .iter()
            .map(row_to_workout_exercise)
            .collect::<StorageResult<Vec<_>>>()?;

        Ok(Some(Workout {
            id: get_column(&header, "id")?,
            name: get_column(&header, "name")?,
            exercises,
        }))
    }

    async fn create_workout(&self, workout: &Workout) -> StorageResult<()> {
        sqlx::query("INSERT INTO workouts (id, name) VALUES ($1, $2)")
            .bind(&workout.id)
            .bind(&workout.name)
            .execute(&self.pool)
            .await
            .map_err(|e| map_insert_error(&e, &workout.id, "create workout"))?;

        // Row inserts after the header are not rolled back on failure;
        // the first error is surfaced to the caller
        for entry in &workout.exercises {
            sqlx::query(
                r"
                INSERT INTO workout_exercises (workout_id, exercise_id, sets, exercise_order)
                VALUES ($1, $2, $3, $4)
                ",
            )
            .bind(&workout.id)
            .bind(&entry.exercise_id)
            .bind(encode_sets(&entry.sets)?)
            .bind(entry.order)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::unavailable(format!("create workout exercise row: {e}")))?;
        }
        Ok(())
    }

    async fn delete_workout(&self, id: &str) -> StorageResult<()> {
        // Exercise rows first, then the header; both are no-ops on missing
        // rows so a repeat call can finish a half-completed delete
        sqlx::query("DELETE FROM workout_exercises WHERE workout_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::unavailable(format!("delete workout exercise rows: {e}")))?;

        sqlx::query("DELETE FROM workouts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::unavailable(format!("delete workout: {e}")))?;
        Ok(())
    }

    async fn upsert_workout_exercises(
        &self,
        workout_id: &str,
        entries: &[ExerciseWithSets],
    ) -> StorageResult<()> {
        if !self.workout_exists(workout_id).await? {
            return Err(StorageError::not_found("workout", workout_id));
        }

        let existing_rows =
            sqlx::query("SELECT exercise_id FROM workout_exercises WHERE workout_id = $1")
                .bind(workout_id)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    StorageError::unavailable(format!("list existing workout exercises: {e}"))
                })?;
        let existing: HashSet<String> = existing_rows
            .iter()
            .map(|row| get_column(row, "exercise_id"))
            .collect::<StorageResult<_>>()?;

        for (position, entry) in entries.iter().enumerate() {
            let order = position as i64;
            let sets = encode_sets(&entry.sets)?;
            if existing.contains(&entry.id) {
                sqlx::query(
                    r"
                    UPDATE workout_exercises
                    SET sets = $3, exercise_order = $4
                    WHERE workout_id = $1 AND exercise_id = $2
                    ",
                )
                .bind(workout_id)
                .bind(&entry.id)
                .bind(&sets)
                .bind(order)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    StorageError::unavailable(format!("update workout exercise row: {e}"))
                })?;
            } else {
                sqlx::query(
                    r"
                    INSERT INTO workout_exercises (workout_id, exercise_id, sets, exercise_order)
                    VALUES ($1, $2, $3, $4)
                    ",
                )
                .bind(workout_id)
                .bind(&entry.id)
                .bind(&sets)
                .bind(order)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    StorageError::unavailable(format!("insert workout exercise row: {e}"))
                })?;
            }
        }
        Ok(())
    }

    async fn add_exercises_to_workout(
        &self,
        workout_id: &str,
        exercise_ids: &[String],
    ) -> StorageResult<()> {
        if !self.workout_exists(workout_id).await? {
            return Err(StorageError::not_found("workout", workout_id));
        }

        let row = sqlx::query(
            r"
            SELECT COALESCE(MAX(exercise_order) + 1, 0) AS next_order
            FROM workout_exercises
            WHERE workout_id = $1
            ",
        )
        .bind(workout_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StorageError::unavailable(format!("read max exercise order: {e}")))?;
        let mut next_order: i64 = row
            .try_get("next_order")
            .map_err(|e| StorageError::unavailable(format!("decode max exercise order: {e}")))?;

        // Appends blindly: deduplication against rows already in the
        // workout is the caller's responsibility
        for exercise_id in exercise_ids {
            sqlx::query(
                r"
                INSERT INTO workout_exercises (workout_id, exercise_id, sets, exercise_order)
                VALUES ($1, $2, '[]', $3)
                ",
            )
            .bind(workout_id)
            .bind(exercise_id)
            .bind(next_order)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::unavailable(format!("append workout exercise row: {e}")))?;
            next_order += 1;
        }
        Ok(())
    }

    async fn list_exercise_ids_in_workout(
        &self,
        workout_id: &str,
    ) -> StorageResult<HashSet<String>> {
        let rows = sqlx::query("SELECT exercise_id FROM workout_exercises WHERE workout_id = $1")
            .bind(workout_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::unavailable(format!("list exercise ids: {e}")))?;

        rows.iter()
            .map(|row| get_column(row, "exercise_id"))
            .collect()
    }

    async fn remove_exercise_from_workout(
        &self,
        workout_id: &str,
        exercise_id: &str,
    ) -> StorageResult<()> {
        sqlx::query("DELETE FROM workout_exercises WHERE workout_id = $1 AND exercise_id = $2")
            .bind(workout_id)
            .bind(exercise_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                StorageError::unavailable(format!("remove exercise from workout: {e}"))
            })?;
        Ok(())
    }
}
