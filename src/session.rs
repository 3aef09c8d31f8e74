// ABOUTME: Edit-session state machine staging set edits and reorders before commit
// ABOUTME: Viewing/Editing states with commit-or-discard semantics and a single-flight save guard
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Edit-session state
//!
//! A single-screen-scoped state machine over the reconciled
//! [`ExerciseWithSets`] view. All edits stage in memory; storage is only
//! touched by [`EditSession::commit`], so navigating away and calling
//! [`EditSession::discard`] leaves persisted state byte-for-byte
//! untouched.

use crate::errors::StorageResult;
use crate::models::{normalize_order, ExerciseWithSets, Set};
use crate::storage::WorkoutStore;
use tracing::{debug, warn};

/// Which mode the session is in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Read-only; the committed view is shown
    Viewing,
    /// A working copy is being edited
    Editing,
}

/// Scalar field of a [`Set`] targeted by an edit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetField {
    /// Repetition count
    Reps,
    /// Weight in kilograms
    Kgs,
}

/// In-memory staging of edits to one workout's exercise view.
///
/// Transient: holds no state across app restarts. Construct from the last
/// reconciled view, edit in Editing state, then [`commit`](Self::commit)
/// or [`discard`](Self::discard).
#[derive(Debug, Clone)]
pub struct EditSession {
    workout_id: String,
    committed: Vec<ExerciseWithSets>,
    working: Vec<ExerciseWithSets>,
    state: SessionState,
    // Single-flight guard keyed by this session's workout: a Save while a
    // commit is pending is ignored
    commit_in_flight: bool,
}

impl EditSession {
    /// Create a session in Viewing state over a reconciled view.
    #[must_use]
    pub fn new(workout_id: impl Into<String>, view: Vec<ExerciseWithSets>) -> Self {
        Self {
            workout_id: workout_id.into(),
            committed: view,
            working: Vec::new(),
            state: SessionState::Viewing,
            commit_in_flight: false,
        }
    }

    /// Id of the workout this session edits
    #[must_use]
    pub fn workout_id(&self) -> &str {
        &self.workout_id
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// The sequence a screen should render right now: the working copy
    /// while Editing, the committed view otherwise.
    #[must_use]
    pub fn view(&self) -> &[ExerciseWithSets] {
        match self.state {
            SessionState::Viewing => &self.committed,
            SessionState::Editing => &self.working,
        }
    }

    /// Enter Editing; the working copy derives from the last committed
    /// view. No-op when already Editing.
    pub fn begin_edit(&mut self) {
        if self.state == SessionState::Viewing {
            self.working = self.committed.clone();
            self.state = SessionState::Editing;
        }
    }

    /// Replace the working sequence wholesale (drag-reorder produces a
    /// full permutation). No-op outside Editing.
    pub fn reorder(&mut self, new_sequence: Vec<ExerciseWithSets>) {
        if self.state == SessionState::Editing {
            self.working = new_sequence;
        }
    }

    /// Replace one scalar field of one set. Unknown exercise ids and
    /// out-of-bounds set indexes are no-ops.
    pub fn update_set(&mut self, exercise_id: &str, set_index: usize, field: SetField, value: &str) {
        if self.state != SessionState::Editing {
            return;
        }
        let Some(exercise) = self.working.iter_mut().find(|e| e.id == exercise_id) else {
            return;
        };
        let Some(set) = exercise.sets.get_mut(set_index) else {
            debug!("update_set: index {set_index} out of bounds for {exercise_id}, no-op");
            return;
        };
        match field {
            SetField::Reps => set.reps = value.to_owned(),
            SetField::Kgs => set.kgs = Some(value.to_owned()),
        }
    }

    /// Append an empty set to an exercise. No-op outside Editing or for
    /// unknown exercise ids.
    pub fn add_set(&mut self, exercise_id: &str) {
        if self.state != SessionState::Editing {
            return;
        }
        if let Some(exercise) = self.working.iter_mut().find(|e| e.id == exercise_id) {
            exercise.sets.push(Set::default());
        }
    }

    /// Remove the last set of an exercise; no-op when the exercise has no
    /// sets (never underflows).
    pub fn remove_set(&mut self, exercise_id: &str) {
        if self.state != SessionState::Editing {
            return;
        }
        if let Some(exercise) = self.working.iter_mut().find(|e| e.id == exercise_id) {
            exercise.sets.pop();
        }
    }

    /// Normalize the working order keys and push the sequence through the
    /// store, then transition to Viewing.
    ///
    /// On store failure the session stays in Editing with all edits
    /// intact and the error is surfaced. A commit already in flight for
    /// this workout causes this call to be ignored.
    ///
    /// # Errors
    ///
    /// Propagates the store error from `upsert_workout_exercises`.
    pub async fn commit<S>(&mut self, store: &S) -> StorageResult<()>
    where
        S: WorkoutStore + ?Sized,
    {
        if self.state != SessionState::Editing {
            return Ok(());
        }
        if self.commit_in_flight {
            debug!(
                "commit already in flight for workout {}, ignoring save",
                self.workout_id
            );
            return Ok(());
        }

        self.commit_in_flight = true;
        let normalized = normalize_order(&self.working);
        let result = store
            .upsert_workout_exercises(&self.workout_id, &normalized)
            .await;
        self.commit_in_flight = false;

        match result {
            Ok(()) => {
                self.committed = normalized;
                self.working = Vec::new();
                self.state = SessionState::Viewing;
                Ok(())
            }
            Err(e) => {
                warn!("commit failed for workout {}: {e}", self.workout_id);
                Err(e)
            }
        }
    }

    /// Throw the working sequence away and return to Viewing without
    /// touching the store. The next `begin_edit` re-derives from the last
    /// committed view.
    pub fn discard(&mut self) {
        if self.state == SessionState::Editing {
            self.working = Vec::new();
            self.state = SessionState::Viewing;
        }
    }
}
