// ABOUTME: Persistence abstraction for the workout tracking core
// ABOUTME: One trait, two interchangeable backends (JSON blob store and SQL store)
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::errors::StorageResult;
use crate::models::{Exercise, ExerciseWithSets, Workout};
use async_trait::async_trait;
use std::collections::HashSet;

pub mod factory;
pub mod local;
pub mod sql;

pub use factory::{detect_store_kind, Store, StoreKind};
pub use local::LocalStore;
pub use sql::SqlStore;

/// Core persistence trait.
///
/// Both backends implement this trait and must be behaviorally
/// indistinguishable from the caller's perspective, apart from latency and
/// the stronger failure modes of a remote store. Exercise joins and order
/// sorting are performed by the store, not left to callers.
#[async_trait]
pub trait WorkoutStore: Send + Sync {
    // ================================
    // Exercise Catalog
    // ================================

    /// List all exercises sorted by name ascending; an empty store yields
    /// an empty list, never an error
    async fn list_exercises(&self) -> StorageResult<Vec<Exercise>>;

    /// Get an exercise by id; `None` when absent
    async fn get_exercise(&self, id: &str) -> StorageResult<Option<Exercise>>;

    /// Append a new exercise; fails with `DuplicateId` when the id is
    /// already present
    async fn create_exercise(&self, exercise: &Exercise) -> StorageResult<()>;

    /// Replace the exercise with a matching id; no-op when absent
    /// (updates never create rows)
    async fn update_exercise(&self, exercise: &Exercise) -> StorageResult<()>;

    /// Remove the exercise with a matching id; no-op when absent. Does not
    /// cascade into workouts - dangling references are filtered lazily at
    /// reconcile time
    async fn delete_exercise(&self, id: &str) -> StorageResult<()>;

    // ================================
    // Workouts
    // ================================

    /// List all workouts with their exercise rows fully populated, sorted
    /// ascending by order key
    async fn list_workouts(&self) -> StorageResult<Vec<Workout>>;

    /// Get a workout by id with the same join/order contract as
    /// `list_workouts`; `None` when absent
    async fn get_workout(&self, id: &str) -> StorageResult<Option<Workout>>;

    /// Insert a workout header and all of its exercise rows. On partial
    /// failure the first error is returned and already-inserted rows are
    /// not rolled back
    async fn create_workout(&self, workout: &Workout) -> StorageResult<()>;

    /// Delete a workout's exercise rows, then its header. Both steps are
    /// idempotent so a repeat call can finish a half-completed delete
    async fn delete_workout(&self, id: &str) -> StorageResult<()>;

    // ================================
    // Workout Exercise Rows
    // ================================

    /// For each entry, update the row matched by `(workout_id,
    /// exercise_id)` if it exists, else insert; writes `sets` and `order =
    /// position in the supplied sequence`. Rows absent from the input are
    /// left untouched - this operation never deletes
    async fn upsert_workout_exercises(
        &self,
        workout_id: &str,
        entries: &[ExerciseWithSets],
    ) -> StorageResult<()>;

    /// Append rows with empty sets and `order` continuing from
    /// `max(existing) + 1`. Does not deduplicate against rows already in
    /// the workout; callers pre-filter via `list_exercise_ids_in_workout`
    async fn add_exercises_to_workout(
        &self,
        workout_id: &str,
        exercise_ids: &[String],
    ) -> StorageResult<()>;

    /// Set of exercise ids currently referenced by a workout; empty when
    /// the workout is absent
    async fn list_exercise_ids_in_workout(&self, workout_id: &str)
        -> StorageResult<HashSet<String>>;

    /// Delete the single matching row; no-op when absent
    async fn remove_exercise_from_workout(
        &self,
        workout_id: &str,
        exercise_id: &str,
    ) -> StorageResult<()>;
}
