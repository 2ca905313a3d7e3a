//! # Errors
//!
//! Fatal failures of a sync run.
//!
//! Existence-check failures are not errors (they mean "not found") and
//! delete failures are recorded in the report instead of aborting.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    /// Invalid run configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Existing secrets could not be enumerated; nothing was changed
    #[error("Failed to list existing secrets under {scope}: {source:#}")]
    Listing {
        scope: String,
        #[source]
        source: anyhow::Error,
    },

    /// A missing secret could not be created
    #[error("Failed to create secret {name}: {source:#}")]
    Create {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    /// An existing secret could not be updated
    #[error("Failed to update secret {name}: {source:#}")]
    Update {
        name: String,
        #[source]
        source: anyhow::Error,
    },
}

impl SyncError {
    /// Name of the secret the failure is attributed to, if any
    #[must_use]
    pub fn secret_name(&self) -> Option<&str> {
        match self {
            SyncError::Create { name, .. } | SyncError::Update { name, .. } => Some(name),
            SyncError::Config(_) | SyncError::Listing { .. } => None,
        }
    }
}
