// ABOUTME: Reconciliation engine joining workout exercise references against the catalog
// ABOUTME: Drops dangling references and attaches per-set data, preserving stored order
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::models::{Exercise, ExerciseWithSets, Workout};

/// Merge a workout's ordered exercise references with the live exercise
/// catalog into the renderable view.
///
/// References whose exercise has been deleted from the catalog are dropped
/// silently - never surfaced to the caller, and never deleted from storage
/// by this step. Output order equals input order; no re-sort happens here
/// (stores return exercises already sorted ascending by order key).
///
/// Pure and deterministic: identical inputs always yield the identical
/// output sequence.
#[must_use]
pub fn reconcile_workout_view(workout: &Workout, catalog: &[Exercise]) -> Vec<ExerciseWithSets> {
    workout
        .exercises
        .iter()
        .filter_map(|entry| {
            catalog
                .iter()
                .find(|exercise| exercise.id == entry.exercise_id)
                .map(|exercise| ExerciseWithSets {
                    id: exercise.id.clone(),
                    name: exercise.name.clone(),
                    description: exercise.description.clone(),
                    image_url: exercise.image_url.clone(),
                    sets: entry.sets.clone(),
                    order: entry.order,
                })
        })
        .collect()
}
