//! Common test utilities for sync integration tests
//!
//! Builds prefixes, desired sets and seeded in-memory stores.

#![allow(dead_code, reason = "not every test binary uses every helper")]

use secrets_manager_sync::input::{extract_desired_secrets, resolve_prefix};
use secrets_manager_sync::provider::InMemorySecretStore;
use secrets_manager_sync::{DesiredSecret, NamespacePrefix};

pub fn prefix(raw: &str) -> NamespacePrefix {
    resolve_prefix(Some(raw)).expect("valid test prefix")
}

/// Desired set from `INPUT_*` style environment pairs
pub fn desired_from_env(prefix: &NamespacePrefix, vars: &[(&str, &str)]) -> Vec<DesiredSecret> {
    extract_desired_secrets(vars.iter().copied(), prefix)
}

pub fn store_with(secrets: &[(&str, &str)]) -> InMemorySecretStore {
    InMemorySecretStore::with_secrets(secrets.iter().copied())
}
