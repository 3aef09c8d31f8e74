// ABOUTME: On-device blob store backend persisting whole collections as JSON files
// ABOUTME: Read-whole/mutate/write-whole semantics under fixed keys "exercises" and "workouts"
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON blob store backend
//!
//! Each collection lives as one JSON document under a fixed key
//! (`<dir>/exercises.json`, `<dir>/workouts.json`). Every mutation reads
//! the whole blob, mutates it in memory, and writes the whole blob back as
//! one uninterrupted step, serialized by an in-process lock. There is no
//! partial-write atomicity across the two blobs; this is a documented
//! limitation of the blob-as-database model, not hidden behavior.

use super::WorkoutStore;
use crate::errors::{StorageError, StorageResult};
use crate::models::{Exercise, ExerciseWithSets, Workout, WorkoutExercise};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

/// Fixed blob key for the exercise catalog
const EXERCISES_KEY: &str = "exercises";
/// Fixed blob key for the workouts collection
const WORKOUTS_KEY: &str = "workouts";

/// Blob store backend rooted at a directory
#[derive(Clone)]
pub struct LocalStore {
    dir: PathBuf,
    // Serializes read-modify-write cycles within this process
    write_lock: Arc<Mutex<()>>,
}

impl LocalStore {
    /// Create a blob store rooted at `dir`. The directory is created
    /// lazily on first write; a missing directory reads as an empty store.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    fn blob_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    async fn read_blob<T: DeserializeOwned>(&self, key: &str) -> StorageResult<Vec<T>> {
        let path = self.blob_path(key);
        match fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| StorageError::serialization(format!("decode {key} blob: {e}"))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(StorageError::unavailable(format!("read {key} blob: {e}"))),
        }
    }

    async fn write_blob<T: Serialize>(&self, key: &str, items: &[T]) -> StorageResult<()> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| StorageError::unavailable(format!("create store dir: {e}")))?;
        let bytes = serde_json::to_vec(items)
            .map_err(|e| StorageError::serialization(format!("encode {key} blob: {e}")))?;
        fs::write(self.blob_path(key), bytes)
            .await
            .map_err(|e| StorageError::unavailable(format!("write {key} blob: {e}")))
    }
}

#[async_trait]
impl WorkoutStore for LocalStore {
    async fn list_exercises(&self) -> StorageResult<Vec<Exercise>> {
        let mut exercises: Vec<Exercise> = self.read_blob(EXERCISES_KEY).await?;
        exercises.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(exercises)
    }

    async fn get_exercise(&self, id: &str) -> StorageResult<Option<Exercise>> {
        let exercises: Vec<Exercise> = self.read_blob(EXERCISES_KEY).await?;
        Ok(exercises.into_iter().find(|e| e.id == id))
    }

    async fn create_exercise(&self, exercise: &Exercise) -> StorageResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut exercises: Vec<Exercise> = self.read_blob(EXERCISES_KEY).await?;
        if exercises.iter().any(|e| e.id == exercise.id) {
            return Err(StorageError::duplicate_id(&exercise.id));
        }
        exercises.push(exercise.clone());
        self.write_blob(EXERCISES_KEY, &exercises).await
    }

    async fn update_exercise(&self, exercise: &Exercise) -> StorageResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut exercises: Vec<Exercise> = self.read_blob(EXERCISES_KEY).await?;
        let Some(existing) = exercises.iter_mut().find(|e| e.id == exercise.id) else {
            debug!("update_exercise: id {} absent, no-op", exercise.id);
            return Ok(());
        };
        *existing = exercise.clone();
        self.write_blob(EXERCISES_KEY, &exercises).await
    }

    async fn delete_exercise(&self, id: &str) -> StorageResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut exercises: Vec<Exercise> = self.read_blob(EXERCISES_KEY).await?;
        let before = exercises.len();
        exercises.retain(|e| e.id != id);
        if exercises.len() == before {
            return Ok(());
        }
        self.write_blob(EXERCISES_KEY, &exercises).await
    }

    async fn list_workouts(&self) -> StorageResult<Vec<Workout>> {
        let mut workouts: Vec<Workout> = self.read_blob(WORKOUTS_KEY).await?;
        workouts.sort_by(|a, b| a.id.cmp(&b.id));
        for workout in &mut workouts {
            workout.exercises.sort_by_key(|we| we.order);
        }
        Ok(workouts)
    }

    async fn get_workout(&self, id: &str) -> StorageResult<Option<Workout>> {
        let workouts: Vec<Workout> = self.read_blob(WORKOUTS_KEY).await?;
        Ok(workouts.into_iter().find(|w| w.id == id).map(|mut w| {
            w.exercises.sort_by_key(|we| we.order);
            w
        }))
    }

    async fn create_workout(&self, workout: &Workout) -> StorageResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut workouts: Vec<Workout> = self.read_blob(WORKOUTS_KEY).await?;
        if workouts.iter().any(|w| w.id == workout.id) {
            return Err(StorageError::duplicate_id(&workout.id));
        }
        workouts.push(workout.clone());
        self.write_blob(WORKOUTS_KEY, &workouts).await
    }

    async fn delete_workout(&self, id: &str) -> StorageResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut workouts: Vec<Workout> = self.read_blob(WORKOUTS_KEY).await?;
        let before = workouts.len();
        workouts.retain(|w| w.id != id);
        if workouts.len() == before {
            return Ok(());
        }
        self.write_blob(WORKOUTS_KEY, &workouts).await
    }

    async fn upsert_workout_exercises(
        &self,
        workout_id: &str,
        entries: &[ExerciseWithSets],
    ) -> StorageResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut workouts: Vec<Workout> = self.read_blob(WORKOUTS_KEY).await?;
        let Some(workout) = workouts.iter_mut().find(|w| w.id == workout_id) else {
            return Err(StorageError::not_found("workout", workout_id));
        };

        for (position, entry) in entries.iter().enumerate() {
            let order = position as i64;
            match workout
                .exercises
                .iter_mut()
                .find(|we| we.exercise_id == entry.id)
            {
                Some(existing) => {
                    existing.sets = entry.sets.clone();
                    existing.order = order;
                }
                None => workout.exercises.push(WorkoutExercise {
                    exercise_id: entry.id.clone(),
                    sets: entry.sets.clone(),
                    order,
                }),
            }
        }

        self.write_blob(WORKOUTS_KEY, &workouts).await
    }

    async fn add_exercises_to_workout(
        &self,
        workout_id: &str,
        exercise_ids: &[String],
    ) -> StorageResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut workouts: Vec<Workout> = self.read_blob(WORKOUTS_KEY).await?;
        let Some(workout) = workouts.iter_mut().find(|w| w.id == workout_id) else {
            return Err(StorageError::not_found("workout", workout_id));
        };

        let mut next_order = workout
            .exercises
            .iter()
            .map(|we| we.order)
            .max()
            .map_or(0, |max| max + 1);
        for exercise_id in exercise_ids {
            workout.exercises.push(WorkoutExercise {
                exercise_id: exercise_id.clone(),
                sets: Vec::new(),
                order: next_order,
            });
            next_order += 1;
        }

        self.write_blob(WORKOUTS_KEY, &workouts).await
    }

    async fn list_exercise_ids_in_workout(
        &self,
        workout_id: &str,
    ) -> StorageResult<HashSet<String>> {
        let workouts: Vec<Workout> = self.read_blob(WORKOUTS_KEY).await?;
        Ok(workouts
            .iter()
            .find(|w| w.id == workout_id)
            .map(|w| {
                w.exercises
                    .iter()
                    .map(|we| we.exercise_id.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn remove_exercise_from_workout(
        &self,
        workout_id: &str,
        exercise_id: &str,
    ) -> StorageResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut workouts: Vec<Workout> = self.read_blob(WORKOUTS_KEY).await?;
        let Some(workout) = workouts.iter_mut().find(|w| w.id == workout_id) else {
            return Ok(());
        };
        let before = workout.exercises.len();
        workout.exercises.retain(|we| we.exercise_id != exercise_id);
        if workout.exercises.len() == before {
            return Ok(());
        }
        self.write_blob(WORKOUTS_KEY, &workouts).await
    }
}
