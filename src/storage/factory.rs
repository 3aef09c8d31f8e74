// ABOUTME: Store factory and backend selection for the persistence layer
// ABOUTME: Detects the backend from the store URL and delegates trait calls to it
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Store factory for creating persistence backends
//!
//! Backend selection happens once, at composition time, based on the store
//! URL; callers hold a [`Store`] and never branch on the backend
//! themselves.

use super::local::LocalStore;
use super::sql::SqlStore;
use super::WorkoutStore;
use crate::config::StorageConfig;
use crate::errors::{StorageError, StorageResult};
use crate::models::{Exercise, ExerciseWithSets, Workout};
use async_trait::async_trait;
use std::collections::HashSet;
use tracing::{debug, info};

/// Supported storage backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    /// On-device whole-collection JSON blobs
    Local,
    /// SQL store (hosted relational backend)
    Sql,
}

/// Store instance wrapper that delegates to the selected backend
#[derive(Clone)]
pub enum Store {
    /// JSON blob store
    Local(LocalStore),
    /// SQL store
    Sql(SqlStore),
}

impl Store {
    /// Get a descriptive string for the current backend
    #[must_use]
    pub const fn backend_info(&self) -> &'static str {
        match self {
            Self::Local(_) => "JSON blob store (on-device)",
            Self::Sql(_) => "SQL store (hosted)",
        }
    }

    /// Get the backend kind enum
    #[must_use]
    pub const fn kind(&self) -> StoreKind {
        match self {
            Self::Local(_) => StoreKind::Local,
            Self::Sql(_) => StoreKind::Sql,
        }
    }

    /// Create a new store based on the URL.
    ///
    /// `local:path/to/dir` selects the blob store rooted at that
    /// directory; `sqlite:...` selects the SQL store.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL format is unsupported or the backend
    /// cannot be opened.
    pub async fn new(url: &str) -> StorageResult<Self> {
        debug!("detecting store backend from URL: {url}");
        let kind = detect_store_kind(url)?;
        info!("initializing {kind:?} store backend");

        match kind {
            StoreKind::Local => {
                let dir = url.trim_start_matches("local:");
                Ok(Self::Local(LocalStore::new(dir)))
            }
            StoreKind::Sql => {
                let store = SqlStore::new(url).await?;
                Ok(Self::Sql(store))
            }
        }
    }

    /// Create a new store from environment-driven configuration.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Store::new`].
    pub async fn from_config(config: &StorageConfig) -> StorageResult<Self> {
        Self::new(&config.url).await
    }
}

/// Detect the backend kind from a store URL.
///
/// # Errors
///
/// Returns an error when the URL matches neither `local:` nor `sqlite:`.
pub fn detect_store_kind(url: &str) -> StorageResult<StoreKind> {
    if url.starts_with("local:") {
        Ok(StoreKind::Local)
    } else if url.starts_with("sqlite:") {
        Ok(StoreKind::Sql)
    } else {
        Err(StorageError::unavailable(format!(
            "unsupported store URL: {url} (expected local:path/to/dir or sqlite:path/to/db.sqlite)"
        )))
    }
}

// Delegate every trait operation to the selected backend
#[async_trait]
impl WorkoutStore for Store {
    async fn list_exercises(&self) -> StorageResult<Vec<Exercise>> {
        match self {
            Self::Local(store) => store.list_exercises().await,
            Self::Sql(store) => store.list_exercises().await,
        }
    }

    async fn get_exercise(&self, id: &str) -> StorageResult<Option<Exercise>> {
        match self {
            Self::Local(store) => store.get_exercise(id).await,
            Self::Sql(store) => store.get_exercise(id).await,
        }
    }

    async fn create_exercise(&self, exercise: &Exercise) -> StorageResult<()> {
        match self {
            Self::Local(store) => store.create_exercise(exercise).await,
            Self::Sql(store) => store.create_exercise(exercise).await,
        }
    }

    async fn update_exercise(&self, exercise: &Exercise) -> StorageResult<()> {
        match self {
            Self::Local(store) => store.update_exercise(exercise).await,
            Self::Sql(store) => store.update_exercise(exercise).await,
        }
    }

    async fn delete_exercise(&self, id: &str) -> StorageResult<()> {
        match self {
            Self::Local(store) => store.delete_exercise(id).await,
            Self::Sql(store) => store.delete_exercise(id).await,
        }
    }

    async fn list_workouts(&self) -> StorageResult<Vec<Workout>> {
        match self {
            Self::Local(store) => store.list_workouts().await,
            Self::Sql(store) => store.list_workouts().await,
        }
    }

    async fn get_workout(&self, id: &str) -> StorageResult<Option<Workout>> {
        match self {
            Self::Local(store) => store.get_workout(id).await,
            Self::Sql(store) => store.get_workout(id).await,
        }
    }

    async fn create_workout(&self, workout: &Workout) -> StorageResult<()> {
        match self {
            Self::Local(store) => store.create_workout(workout).await,
            Self::Sql(store) => store.create_workout(workout).await,
        }
    }

    async fn delete_workout(&self, id: &str) -> StorageResult<()> {
        match self {
            Self::Local(store) => store.delete_workout(id).await,
            Self::Sql(store) => store.delete_workout(id).await,
        }
    }

    async fn upsert_workout_exercises(
        &self,
        workout_id: &str,
        entries: &[ExerciseWithSets],
    ) -> StorageResult<()> {
        match self {
            Self::Local(store) => store.upsert_workout_exercises(workout_id, entries).await,
            Self::Sql(store) => store.upsert_workout_exercises(workout_id, entries).await,
        }
    }

    async fn add_exercises_to_workout(
        &self,
        workout_id: &str,
        exercise_ids: &[String],
    ) -> StorageResult<()> {
        match self {
            Self::Local(store) => store.add_exercises_to_workout(workout_id, exercise_ids).await,
            Self::Sql(store) => store.add_exercises_to_workout(workout_id, exercise_ids).await,
        }
    }

    async fn list_exercise_ids_in_workout(
        &self,
        workout_id: &str,
    ) -> StorageResult<HashSet<String>> {
        match self {
            Self::Local(store) => store.list_exercise_ids_in_workout(workout_id).await,
            Self::Sql(store) => store.list_exercise_ids_in_workout(workout_id).await,
        }
    }

    async fn remove_exercise_from_workout(
        &self,
        workout_id: &str,
        exercise_id: &str,
    ) -> StorageResult<()> {
        match self {
            Self::Local(store) => {
                store
                    .remove_exercise_from_workout(workout_id, exercise_id)
                    .await
            }
            Self::Sql(store) => {
                store
                    .remove_exercise_from_workout(workout_id, exercise_id)
                    .await
            }
        }
    }
}
