//! Secrets Manager Sync Library
//!
//! Reconciles a prefixed namespace of AWS Secrets Manager secrets against the
//! `INPUT_*` variables a pipeline step receives.
//!
//! - [`input`] derives the desired set from the environment
//! - [`sync::list_existing`] lists what already exists under the prefix
//! - [`reconciler`] creates, updates and deletes until the two match
//! - [`provider`] holds the [`provider::SecretStore`] backends

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod input;
pub mod observability;
pub mod outcome;
pub mod provider;
pub mod reconciler;
pub mod sync;
pub mod types;

pub use error::SyncError;
pub use provider::SecretStore;
pub use types::{DesiredSecret, NamespacePrefix, RemainingSet};
