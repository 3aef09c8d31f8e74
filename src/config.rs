// ABOUTME: Environment-driven configuration for selecting the storage backend
// ABOUTME: Single knob: the store URL consumed by the storage factory
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::env;
use tracing::debug;

/// Environment variable naming the store URL
pub const STORE_URL_ENV: &str = "LIFTLOG_STORE_URL";

/// Default store URL when the environment does not name one
pub const DEFAULT_STORE_URL: &str = "sqlite:liftlog.sqlite";

/// Storage configuration resolved from the environment.
///
/// Configuration is environment-only; there is no config file. The URL
/// format is owned by [`crate::storage::detect_store_kind`].
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Store URL (`local:path/to/dir` or `sqlite:path/to/db.sqlite`)
    pub url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_STORE_URL.into(),
        }
    }
}

impl StorageConfig {
    /// Resolve configuration from the environment, falling back to the
    /// default store URL.
    #[must_use]
    pub fn from_env() -> Self {
        let url = env::var(STORE_URL_ENV).unwrap_or_else(|_| DEFAULT_STORE_URL.to_owned());
        debug!("resolved store URL from environment: {url}");
        Self { url }
    }
}
