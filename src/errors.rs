// ABOUTME: Structured error types shared by both storage backends
// ABOUTME: Maps duplicate ids, missing parents, and store failures to one taxonomy
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use thiserror::Error;

/// Unified error type for persistence operations.
///
/// Reads of missing rows are not errors: they return `Ok(None)` (or an
/// empty collection). Deletes and updates of missing rows are silent
/// no-ops. Multi-row operations (`create_workout`, `delete_workout`,
/// `upsert_workout_exercises`) propagate the first underlying error with
/// no rollback; callers must treat such failures as possibly partially
/// persisted.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Create was called with an id that already exists.
    #[error("duplicate id: {id}")]
    DuplicateId {
        /// The colliding id
        id: String,
    },

    /// An operation required a parent row that does not exist, such as
    /// upserting exercise rows into a missing workout.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind ("exercise", "workout")
        entity: &'static str,
        /// The missing id
        id: String,
    },

    /// The underlying store could not be reached or the operation failed
    /// (I/O error, connection failure, query failure).
    #[error("storage unavailable: {context}")]
    Unavailable {
        /// Triggering operation and cause
        context: String,
    },

    /// A stored blob or column failed to encode or decode.
    #[error("serialization failed: {context}")]
    Serialization {
        /// Triggering operation and cause
        context: String,
    },
}

impl StorageError {
    /// Create with a colliding id
    pub fn duplicate_id(id: impl Into<String>) -> Self {
        Self::DuplicateId { id: id.into() }
    }

    /// Required parent row is missing
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Underlying store unreachable or operation failed
    pub fn unavailable(context: impl Into<String>) -> Self {
        Self::Unavailable {
            context: context.into(),
        }
    }

    /// Blob or column encode/decode failure
    pub fn serialization(context: impl Into<String>) -> Self {
        Self::Serialization {
            context: context.into(),
        }
    }
}

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
