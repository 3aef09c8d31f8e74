// ABOUTME: End-to-end tests for the edit session against real store backends
// ABOUTME: Commit-then-reload equivalence, discard semantics, and failure handling
//
// SPDX-License-Identifier: MIT OR Apache-2.0

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use async_trait::async_trait;
use liftlog::models::{Exercise, ExerciseWithSets, Set, Workout, WorkoutExercise};
use liftlog::reconcile::reconcile_workout_view;
use liftlog::session::{EditSession, SessionState, SetField};
use liftlog::storage::{Store, WorkoutStore};
use liftlog::{StorageError, StorageResult};
use std::collections::HashSet;

fn exercise(id: &str, name: &str) -> Exercise {
    Exercise {
        id: id.to_owned(),
        name: name.to_owned(),
        description: String::new(),
        image_url: None,
    }
}

async fn seed(store: &Store) {
    store.create_exercise(&exercise("a", "Squat")).await.unwrap();
    store.create_exercise(&exercise("b", "Bench")).await.unwrap();
    store
        .create_workout(&Workout {
            id: "w1".to_owned(),
            name: "Push".to_owned(),
            exercises: vec![
                WorkoutExercise {
                    exercise_id: "b".to_owned(),
                    sets: vec![Set {
                        reps: "10".to_owned(),
                        kgs: None,
                    }],
                    order: 0,
                },
                WorkoutExercise {
                    exercise_id: "a".to_owned(),
                    sets: Vec::new(),
                    order: 1,
                },
            ],
        })
        .await
        .unwrap();
}

async fn load_view(store: &Store) -> Vec<ExerciseWithSets> {
    let catalog = store.list_exercises().await.unwrap();
    let workout = store.get_workout("w1").await.unwrap().unwrap();
    reconcile_workout_view(&workout, &catalog)
}

async fn sql_store() -> Store {
    Store::new("sqlite::memory:").await.unwrap()
}

#[tokio::test]
async fn test_commit_then_reload_equivalence() {
    let store = sql_store().await;
    seed(&store).await;

    let view = load_view(&store).await;
    let mut session = EditSession::new("w1", view);
    session.begin_edit();
    session.commit(&store).await.unwrap();
    assert_eq!(session.state(), SessionState::Viewing);

    let reloaded = load_view(&store).await;
    assert_eq!(reloaded.len(), 2);
    assert_eq!(reloaded[0].id, "b");
    assert_eq!(reloaded[0].sets[0].reps, "10");
    assert_eq!(reloaded[1].id, "a");
    assert!(reloaded[1].sets.is_empty());
    assert_eq!(session.view(), reloaded.as_slice());
}

#[tokio::test]
async fn test_commit_persists_reorder_and_set_edits() {
    let store = sql_store().await;
    seed(&store).await;

    let view = load_view(&store).await;
    let mut session = EditSession::new("w1", view.clone());
    session.begin_edit();

    // Drag "a" to the front, add a set to it, tweak the existing set on "b"
    session.reorder(vec![view[1].clone(), view[0].clone()]);
    session.add_set("a");
    session.update_set("a", 0, SetField::Reps, "5");
    session.update_set("a", 0, SetField::Kgs, "100");
    session.update_set("b", 0, SetField::Reps, "12");
    session.commit(&store).await.unwrap();

    let reloaded = load_view(&store).await;
    assert_eq!(reloaded[0].id, "a");
    assert_eq!(reloaded[0].order, 0);
    assert_eq!(reloaded[0].sets[0].reps, "5");
    assert_eq!(reloaded[0].sets[0].kgs.as_deref(), Some("100"));
    assert_eq!(reloaded[1].id, "b");
    assert_eq!(reloaded[1].order, 1);
    assert_eq!(reloaded[1].sets[0].reps, "12");
}

#[tokio::test]
async fn test_discard_leaves_storage_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::new(&format!("local:{}", dir.path().display()))
        .await
        .unwrap();
    seed(&store).await;

    let before = store.get_workout("w1").await.unwrap().unwrap();

    let mut session = EditSession::new("w1", load_view(&store).await);
    session.begin_edit();
    let mut reversed: Vec<ExerciseWithSets> = session.view().to_vec();
    reversed.reverse();
    session.reorder(reversed);
    session.add_set("a");
    session.add_set("b");
    session.discard();

    let after = store.get_workout("w1").await.unwrap().unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_commit_works_against_local_backend_too() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::new(&format!("local:{}", dir.path().display()))
        .await
        .unwrap();
    seed(&store).await;

    let view = load_view(&store).await;
    let mut session = EditSession::new("w1", view.clone());
    session.begin_edit();
    session.reorder(vec![view[1].clone(), view[0].clone()]);
    session.commit(&store).await.unwrap();

    let reloaded = load_view(&store).await;
    assert_eq!(reloaded[0].id, "a");
    assert_eq!(reloaded[1].id, "b");
    assert_eq!(session.view(), reloaded.as_slice());
}

/// Store stub whose upsert always fails, for commit failure paths.
struct FailingStore;

#[async_trait]
impl WorkoutStore for FailingStore {
    async fn list_exercises(&self) -> StorageResult<Vec<Exercise>> {
        Ok(Vec::new())
    }

    async fn get_exercise(&self, _id: &str) -> StorageResult<Option<Exercise>> {
        Ok(None)
    }

    async fn create_exercise(&self, _exercise: &Exercise) -> StorageResult<()> {
        Ok(())
    }

    async fn update_exercise(&self, _exercise: &Exercise) -> StorageResult<()> {
        Ok(())
    }

    async fn delete_exercise(&self, _id: &str) -> StorageResult<()> {
        Ok(())
    }

    async fn list_workouts(&self) -> StorageResult<Vec<Workout>> {
        Ok(Vec::new())
    }

    async fn get_workout(&self, _id: &str) -> StorageResult<Option<Workout>> {
        Ok(None)
    }

    async fn create_workout(&self, _workout: &Workout) -> StorageResult<()> {
        Ok(())
    }

    async fn delete_workout(&self, _id: &str) -> StorageResult<()> {
        Ok(())
    }

    async fn upsert_workout_exercises(
        &self,
        _workout_id: &str,
        _entries: &[ExerciseWithSets],
    ) -> StorageResult<()> {
        Err(StorageError::unavailable("network down"))
    }

    async fn add_exercises_to_workout(
        &self,
        _workout_id: &str,
        _exercise_ids: &[String],
    ) -> StorageResult<()> {
        Ok(())
    }

    async fn list_exercise_ids_in_workout(
        &self,
        _workout_id: &str,
    ) -> StorageResult<HashSet<String>> {
        Ok(HashSet::new())
    }

    async fn remove_exercise_from_workout(
        &self,
        _workout_id: &str,
        _exercise_id: &str,
    ) -> StorageResult<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_failed_commit_keeps_session_editing_with_edits_intact() {
    let mut session = EditSession::new(
        "w1",
        vec![ExerciseWithSets {
            id: "a".to_owned(),
            name: "Squat".to_owned(),
            description: String::new(),
            image_url: None,
            sets: Vec::new(),
            order: 0,
        }],
    );
    session.begin_edit();
    session.add_set("a");
    session.update_set("a", 0, SetField::Reps, "5");

    let err = session.commit(&FailingStore).await.unwrap_err();
    assert!(matches!(err, StorageError::Unavailable { .. }));

    // Still editing, edits not lost
    assert_eq!(session.state(), SessionState::Editing);
    assert_eq!(session.view()[0].sets[0].reps, "5");

    // A later retry against a working store is possible; discard also
    // still works
    session.discard();
    assert_eq!(session.state(), SessionState::Viewing);
    assert!(session.view()[0].sets.is_empty());
}
