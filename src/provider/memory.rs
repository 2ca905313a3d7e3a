//! # In-Memory Secret Store
//!
//! Ephemeral [`SecretStore`] used by tests.
//!
//! Behaves like an unfiltered `ListSecrets` (listing ignores the scope and
//! returns every name), enforces create/update/delete preconditions, records
//! every call in order, and can be told to fail specific operations.

use crate::provider::SecretStore;
use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Store operation, used for call recording and failure injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    List,
    Exists,
    Create,
    Update,
    Delete,
}

/// A recorded store call
///
/// For [`StoreOperation::List`] the `name` is the requested scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreCall {
    pub operation: StoreOperation,
    pub name: String,
}

/// A stored secret entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSecret {
    pub value: String,
    pub description: Option<String>,
}

/// Thread-safe in-memory secret store
#[derive(Clone, Debug, Default)]
pub struct InMemorySecretStore {
    secrets: Arc<RwLock<BTreeMap<String, StoredSecret>>>,
    calls: Arc<RwLock<Vec<StoreCall>>>,
    failures: Arc<RwLock<HashSet<(StoreOperation, String)>>>,
}

impl InMemorySecretStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with `(name, value)` pairs
    pub fn with_secrets<I, N, V>(secrets: I) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<String>,
    {
        let secrets = secrets
            .into_iter()
            .map(|(name, value)| {
                (
                    name.into(),
                    StoredSecret {
                        value: value.into(),
                        description: None,
                    },
                )
            })
            .collect();
        Self {
            secrets: Arc::new(RwLock::new(secrets)),
            ..Self::default()
        }
    }

    /// Make every future `operation` on `name` fail
    pub async fn fail_on(&self, operation: StoreOperation, name: impl Into<String>) {
        self.failures.write().await.insert((operation, name.into()));
    }

    /// All calls made so far, in order
    pub async fn calls(&self) -> Vec<StoreCall> {
        self.calls.read().await.clone()
    }

    /// Names targeted by a given operation, in call order
    pub async fn calls_for(&self, operation: StoreOperation) -> Vec<String> {
        self.calls
            .read()
            .await
            .iter()
            .filter(|call| call.operation == operation)
            .map(|call| call.name.clone())
            .collect()
    }

    pub async fn clear_calls(&self) {
        self.calls.write().await.clear();
    }

    /// Current contents as `name -> value`
    pub async fn snapshot(&self) -> BTreeMap<String, String> {
        self.secrets
            .read()
            .await
            .iter()
            .map(|(name, secret)| (name.clone(), secret.value.clone()))
            .collect()
    }

    pub async fn get(&self, name: &str) -> Option<StoredSecret> {
        self.secrets.read().await.get(name).cloned()
    }

    async fn record(&self, operation: StoreOperation, name: &str) -> Result<()> {
        self.calls.write().await.push(StoreCall {
            operation,
            name: name.to_string(),
        });
        if self
            .failures
            .read()
            .await
            .contains(&(operation, name.to_string()))
        {
            bail!("injected {operation:?} failure for {name}");
        }
        Ok(())
    }
}

#[async_trait]
impl SecretStore for InMemorySecretStore {
    async fn list_secret_names(&self, scope: &str) -> Result<Vec<String>> {
        self.record(StoreOperation::List, scope).await?;
        Ok(self.secrets.read().await.keys().cloned().collect())
    }

    async fn secret_exists(&self, secret_name: &str) -> Result<bool> {
        self.record(StoreOperation::Exists, secret_name).await?;
        Ok(self.secrets.read().await.contains_key(secret_name))
    }

    async fn create_secret(
        &self,
        secret_name: &str,
        secret_value: &str,
        description: &str,
    ) -> Result<()> {
        self.record(StoreOperation::Create, secret_name).await?;
        let mut secrets = self.secrets.write().await;
        if secrets.contains_key(secret_name) {
            bail!("ResourceExistsException: secret {secret_name} already exists");
        }
        secrets.insert(
            secret_name.to_string(),
            StoredSecret {
                value: secret_value.to_string(),
                description: Some(description.to_string()),
            },
        );
        debug!("  Created in-memory secret: {}", secret_name);
        Ok(())
    }

    async fn update_secret(&self, secret_name: &str, secret_value: &str) -> Result<()> {
        self.record(StoreOperation::Update, secret_name).await?;
        let mut secrets = self.secrets.write().await;
        let entry = secrets.get_mut(secret_name).ok_or_else(|| {
            anyhow!("ResourceNotFoundException: secret {secret_name} does not exist")
        })?;
        entry.value = secret_value.to_string();
        Ok(())
    }

    async fn delete_secret(&self, secret_name: &str) -> Result<()> {
        self.record(StoreOperation::Delete, secret_name).await?;
        self.secrets
            .write()
            .await
            .remove(secret_name)
            .map(|_| ())
            .ok_or_else(|| anyhow!("ResourceNotFoundException: secret {secret_name} does not exist"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_rejects_existing_name() {
        let store = InMemorySecretStore::with_secrets([("app/A", "1")]);
        let err = store.create_secret("app/A", "2", "desc").await.unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(store.snapshot().await["app/A"], "1");
    }

    #[tokio::test]
    async fn test_update_and_delete_require_existing_secret() {
        let store = InMemorySecretStore::new();
        assert!(store.update_secret("app/MISSING", "x").await.is_err());
        assert!(store.delete_secret("app/MISSING").await.is_err());
    }

    #[tokio::test]
    async fn test_injected_failure_is_recorded_and_returned() {
        let store = InMemorySecretStore::with_secrets([("app/A", "1")]);
        store.fail_on(StoreOperation::Delete, "app/A").await;

        assert!(store.delete_secret("app/A").await.is_err());
        assert_eq!(store.calls_for(StoreOperation::Delete).await, vec!["app/A"]);
        assert!(store.get("app/A").await.is_some());
    }

    #[tokio::test]
    async fn test_create_stores_description() {
        let store = InMemorySecretStore::new();
        store.create_secret("app/A", "1", "Synced").await.unwrap();
        let stored = store.get("app/A").await.unwrap();
        assert_eq!(stored.value, "1");
        assert_eq!(stored.description.as_deref(), Some("Synced"));
        assert!(store.secret_exists("app/A").await.unwrap());
    }
}
