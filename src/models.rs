// ABOUTME: Entity model for exercises, workouts, and per-set training data
// ABOUTME: Pure data definitions plus order normalization and reference validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// A named, reusable movement definition owned by the exercise catalog.
///
/// Workouts reference exercises by id and never own them; deleting an
/// exercise leaves any referencing workout rows in place (see
/// [`crate::reconcile`] for how dangling references are filtered).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    /// Unique, stable identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Free-form description
    pub description: String,
    /// Opaque image reference, stored verbatim and never inspected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// One recorded unit of repetitions (and optional weight) for an exercise
/// within a workout.
///
/// Both fields are free-form numeric-as-text. The core performs no numeric
/// validation; consumers may hold non-numeric input and it is persisted
/// verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Set {
    /// Repetition count as entered by the user
    pub reps: String,
    /// Weight in kilograms as entered by the user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kgs: Option<String>,
}

/// A workout's reference to a catalog exercise, with its recorded sets and
/// workout-scoped sort key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutExercise {
    /// Id of the referenced catalog [`Exercise`]
    pub exercise_id: String,
    /// Ordered list of recorded sets; position is the set number
    #[serde(default)]
    pub sets: Vec<Set>,
    /// Dense sort key, unique and monotonic within one workout's exercise
    /// list (not globally unique)
    #[serde(default)]
    pub order: i64,
}

/// A named, ordered collection of exercises with per-exercise set data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workout {
    /// Unique identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Exercise references sorted ascending by `order` when loaded through
    /// a store
    #[serde(default)]
    pub exercises: Vec<WorkoutExercise>,
}

/// Reconciled view model joining one exercise's display fields with the
/// sets and order recorded for it in a workout.
///
/// Reconstructed on every load and never persisted as such; the stored
/// `workout_exercises` rows remain the source of truth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseWithSets {
    /// Id of the catalog exercise
    pub id: String,
    /// Display name from the catalog
    pub name: String,
    /// Description from the catalog
    pub description: String,
    /// Image reference from the catalog
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Recorded sets from the workout
    #[serde(default)]
    pub sets: Vec<Set>,
    /// Workout-scoped sort key from the workout
    #[serde(default)]
    pub order: i64,
}

/// Types carrying a workout-scoped order key.
pub trait OrderKeyed {
    /// Current order key
    fn order(&self) -> i64;
    /// Replace the order key
    fn set_order(&mut self, order: i64);
}

impl OrderKeyed for WorkoutExercise {
    fn order(&self) -> i64 {
        self.order
    }

    fn set_order(&mut self, order: i64) {
        self.order = order;
    }
}

impl OrderKeyed for ExerciseWithSets {
    fn order(&self) -> i64 {
        self.order
    }

    fn set_order(&mut self, order: i64) {
        self.order = order;
    }
}

/// Return a copy of `items` with `order` rewritten to `0..n-1` matching
/// sequence position.
///
/// Idempotent: applying twice yields the same result as once.
#[must_use]
pub fn normalize_order<T>(items: &[T]) -> Vec<T>
where
    T: OrderKeyed + Clone,
{
    items
        .iter()
        .enumerate()
        .map(|(position, item)| {
            let mut item = item.clone();
            item.set_order(position as i64);
            item
        })
        .collect()
}

/// Whether a workout exercise still references an existing catalog entry.
#[must_use]
pub fn is_valid_exercise_ref(workout_exercise: &WorkoutExercise, catalog: &[Exercise]) -> bool {
    catalog
        .iter()
        .any(|exercise| exercise.id == workout_exercise.exercise_id)
}

/// Generate a high-resolution timestamp id for a new entity.
///
/// Callers generate ids before calling the `create_*` store operations;
/// the stores reject collisions with
/// [`crate::errors::StorageError::DuplicateId`].
#[must_use]
pub fn generate_id() -> String {
    Utc::now().timestamp_micros().to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    fn entry(exercise_id: &str, order: i64) -> WorkoutExercise {
        WorkoutExercise {
            exercise_id: exercise_id.to_owned(),
            sets: Vec::new(),
            order,
        }
    }

    #[test]
    fn test_normalize_order_assigns_dense_keys() {
        let entries = vec![entry("a", 7), entry("b", 3), entry("c", 3)];
        let normalized = normalize_order(&entries);

        let orders: Vec<i64> = normalized.iter().map(|e| e.order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
        // Sequence position is preserved, only the keys are rewritten
        let ids: Vec<&str> = normalized.iter().map(|e| e.exercise_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_normalize_order_is_idempotent() {
        let entries = vec![entry("a", 5), entry("b", 1)];
        let once = normalize_order(&entries);
        let twice = normalize_order(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_normalize_order_empty() {
        let entries: Vec<WorkoutExercise> = Vec::new();
        assert!(normalize_order(&entries).is_empty());
    }

    #[test]
    fn test_is_valid_exercise_ref() {
        let catalog = vec![Exercise {
            id: "squat-1".to_owned(),
            name: "Squat".to_owned(),
            description: String::new(),
            image_url: None,
        }];

        assert!(is_valid_exercise_ref(&entry("squat-1", 0), &catalog));
        assert!(!is_valid_exercise_ref(&entry("deleted", 0), &catalog));
    }

    #[test]
    fn test_set_serialization_skips_absent_kgs() {
        let set = Set {
            reps: "10".to_owned(),
            kgs: None,
        };
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"{"reps":"10"}"#);

        let restored: Set = serde_json::from_str(&json).unwrap();
        assert_eq!(set, restored);
    }
}
