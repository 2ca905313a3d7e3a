//! # Provider Modules
//!
//! Secret store backends the sync can reconcile against.
//!
//! Each backend implements the [`SecretStore`] trait:
//! - `aws`: AWS Secrets Manager via the official SDK
//! - `memory`: in-process store used by tests and local experiments

use anyhow::Result;
use async_trait::async_trait;

/// Operations the reconciler needs from a secret store
///
/// Implementations return `anyhow` errors with context; the reconciler
/// decides which failures are fatal.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// List secret names under `scope` (e.g. `"appsecrets/"`)
    ///
    /// Must page through the complete result. May return names outside the
    /// scope; callers filter again.
    async fn list_secret_names(&self, scope: &str) -> Result<Vec<String>>;

    /// Whether a secret with this exact name exists
    ///
    /// Returns `Ok(false)` for "not found" and `Err` for any other failure
    /// of the check.
    async fn secret_exists(&self, secret_name: &str) -> Result<bool>;

    /// Create a new secret; fails if the name is already taken
    async fn create_secret(
        &self,
        secret_name: &str,
        secret_value: &str,
        description: &str,
    ) -> Result<()>;

    /// Replace the value of an existing secret; fails if it does not exist
    async fn update_secret(&self, secret_name: &str, secret_value: &str) -> Result<()>;

    /// Delete a secret immediately, without a recovery window
    async fn delete_secret(&self, secret_name: &str) -> Result<()>;
}

// Provider implementations
pub mod aws;
pub mod memory;

pub use aws::AwsSecretsManager;
pub use memory::{InMemorySecretStore, StoreCall, StoreOperation};
