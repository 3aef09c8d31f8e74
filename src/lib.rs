// ABOUTME: Main library entry point for the liftlog workout tracking core
// ABOUTME: Exercise catalog, workout composition, and per-set logging over pluggable storage
//
// SPDX-License-Identifier: MIT OR Apache-2.0

#![deny(unsafe_code)]

//! # liftlog
//!
//! Storage and reconciliation core for a workout tracking application:
//! users define exercises, compose workouts from them, and record per-set
//! performance data (repetitions, weight) while training.
//!
//! ## Architecture
//!
//! - **Models**: `Exercise`, `Workout`, `WorkoutExercise`, `Set`, and the
//!   derived `ExerciseWithSets` view model
//! - **Storage**: one [`storage::WorkoutStore`] trait with two
//!   interchangeable backends - an on-device JSON blob store and a SQL
//!   store - selected at composition time via [`storage::Store`]
//! - **Reconcile**: joins a workout's exercise references against the
//!   live catalog, silently dropping dangling references
//! - **Session**: in-memory staging of set edits and reorders with
//!   commit/discard semantics
//!
//! ## Example
//!
//! ```rust,no_run
//! use liftlog::config::StorageConfig;
//! use liftlog::errors::StorageResult;
//! use liftlog::reconcile::reconcile_workout_view;
//! use liftlog::storage::{Store, WorkoutStore};
//!
//! #[tokio::main]
//! async fn main() -> StorageResult<()> {
//!     let config = StorageConfig::from_env();
//!     let store = Store::new(&config.url).await?;
//!
//!     let catalog = store.list_exercises().await?;
//!     if let Some(workout) = store.get_workout("1700000000000000").await? {
//!         let view = reconcile_workout_view(&workout, &catalog);
//!         println!("{} exercises in {}", view.len(), workout.name);
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod errors;
pub mod logging;
pub mod models;
pub mod reconcile;
pub mod session;
pub mod storage;

pub use errors::{StorageError, StorageResult};
pub use models::{Exercise, ExerciseWithSets, Set, Workout, WorkoutExercise};
pub use reconcile::reconcile_workout_view;
pub use session::{EditSession, SessionState, SetField};
pub use storage::{LocalStore, SqlStore, Store, StoreKind, WorkoutStore};
