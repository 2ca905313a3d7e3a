//! # Reconciler
//!
//! Converges the store to the desired set.
//!
//! ## Per-secret flow
//!
//! 1. Existence check. A failed check counts as "does not exist".
//! 2. Exists: update the value. On failure, apply [`UpdateFailurePolicy`].
//! 3. Missing: create it with the configured description. A create failure
//!    aborts the run before any further secret or any deletion is attempted.
//! 4. Created or updated: the name is removed from the [`RemainingSet`].
//!
//! ## Deletion
//!
//! Runs only after every desired secret succeeded. Each remaining name is
//! force-deleted; individual failures are logged and recorded, and the loop
//! carries on.

mod plan;

pub use plan::{plan, ReconcilePlan};

use crate::constants::DEFAULT_SECRET_DESCRIPTION;
use crate::error::SyncError;
use crate::provider::SecretStore;
use crate::types::{DesiredSecret, RemainingSet};
use std::str::FromStr;
use tracing::{error, info, info_span, warn, Instrument};

/// What to do when updating an existing secret fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UpdateFailurePolicy {
    /// Fail the run; later secrets and deletions are skipped
    #[default]
    Abort,
    /// Fall through to a create attempt, which normally fails because the
    /// secret exists and then aborts the run as a create failure
    CreateFallback,
}

impl UpdateFailurePolicy {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateFailurePolicy::Abort => "abort",
            UpdateFailurePolicy::CreateFallback => "create",
        }
    }
}

impl FromStr for UpdateFailurePolicy {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "abort" => Ok(UpdateFailurePolicy::Abort),
            "create" | "create-fallback" | "create_fallback" => {
                Ok(UpdateFailurePolicy::CreateFallback)
            }
            other => Err(SyncError::Config(format!(
                "unknown update failure policy {other:?} (expected \"abort\" or \"create\")"
            ))),
        }
    }
}

/// Reconciliation settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Description attached to newly created secrets
    pub description: String,
    pub update_failure_policy: UpdateFailurePolicy,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            description: DEFAULT_SECRET_DESCRIPTION.to_string(),
            update_failure_policy: UpdateFailurePolicy::default(),
        }
    }
}

/// Terminal state of a successfully processed desired secret
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretOutcome {
    Updated,
    Created,
    /// Update failed and the `CreateFallback` create succeeded
    CreatedAfterFailedUpdate,
}

/// A deletion that failed without aborting the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteFailure {
    pub name: String,
    pub message: String,
}

/// Result of a completed reconciliation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub created_after_failed_update: Vec<String>,
    pub deleted: Vec<String>,
    pub delete_failures: Vec<DeleteFailure>,
}

impl ReconcileReport {
    /// Number of desired secrets written
    #[must_use]
    pub fn synced(&self) -> usize {
        self.created.len() + self.updated.len() + self.created_after_failed_update.len()
    }

    #[must_use]
    pub fn has_delete_failures(&self) -> bool {
        !self.delete_failures.is_empty()
    }

    fn record(&mut self, name: &str, outcome: SecretOutcome) {
        let bucket = match outcome {
            SecretOutcome::Updated => &mut self.updated,
            SecretOutcome::Created => &mut self.created,
            SecretOutcome::CreatedAfterFailedUpdate => &mut self.created_after_failed_update,
        };
        bucket.push(name.to_string());
    }
}

/// Drives a [`SecretStore`] to match a desired set
pub struct Reconciler<'a> {
    store: &'a dyn SecretStore,
    options: ReconcileOptions,
}

impl std::fmt::Debug for Reconciler<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<'a> Reconciler<'a> {
    #[must_use]
    pub fn new(store: &'a dyn SecretStore, options: ReconcileOptions) -> Self {
        Self { store, options }
    }

    /// Apply the desired set, then delete whatever is left in `remaining`
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Create`] or [`SyncError::Update`] on the first
    /// fatal failure. Nothing after the failing secret is attempted and no
    /// deletions happen.
    pub async fn reconcile(
        &self,
        desired: &[DesiredSecret],
        mut remaining: RemainingSet,
    ) -> Result<ReconcileReport, SyncError> {
        let mut report = ReconcileReport::default();

        for secret in desired {
            let outcome = self.apply(secret).await?;
            report.record(secret.name(), outcome);
            remaining.consume(secret.name());
        }

        self.delete_orphans(remaining, &mut report).await;
        Ok(report)
    }

    /// Create or update one desired secret
    async fn apply(&self, secret: &DesiredSecret) -> Result<SecretOutcome, SyncError> {
        let name = secret.name();
        let span = info_span!("secret.reconcile", secret.name = name);

        async move {
            info!("Processing secret: {}", name);

            let exists = match self.store.secret_exists(name).await {
                Ok(exists) => exists,
                Err(e) => {
                    let reason = format!("{e:#}");
                    warn!(
                        secret_name = name,
                        error = %reason,
                        "Existence check failed, treating secret as missing"
                    );
                    false
                }
            };

            if !exists {
                info!("Creating new secret: {}", name);
                self.create(secret).await?;
                return Ok(SecretOutcome::Created);
            }

            info!("Updating existing secret: {}", name);
            match self.store.update_secret(name, secret.value()).await {
                Ok(()) => Ok(SecretOutcome::Updated),
                Err(e) => match self.options.update_failure_policy {
                    UpdateFailurePolicy::Abort => {
                        error!(secret_name = name, "Failed to update secret {}: {:#}", name, e);
                        Err(SyncError::Update {
                            name: name.to_string(),
                            source: e,
                        })
                    }
                    UpdateFailurePolicy::CreateFallback => {
                        let reason = format!("{e:#}");
                        warn!(
                            secret_name = name,
                            error = %reason,
                            "Update failed, attempting create instead"
                        );
                        self.create(secret).await?;
                        Ok(SecretOutcome::CreatedAfterFailedUpdate)
                    }
                },
            }
        }
        .instrument(span)
        .await
    }

    async fn create(&self, secret: &DesiredSecret) -> Result<(), SyncError> {
        let name = secret.name();
        self.store
            .create_secret(name, secret.value(), &self.options.description)
            .await
            .map_err(|e| {
                error!(secret_name = name, "Failed to create secret {}: {:#}", name, e);
                SyncError::Create {
                    name: name.to_string(),
                    source: e,
                }
            })
    }

    async fn delete_orphans(&self, remaining: RemainingSet, report: &mut ReconcileReport) {
        if remaining.is_empty() {
            return;
        }

        info!("Deleting {} unused secrets", remaining.len());

        for name in remaining.into_names() {
            info!("Deleting secret: {}", name);
            match self.store.delete_secret(&name).await {
                Ok(()) => report.deleted.push(name),
                Err(e) => {
                    error!(secret_name = %name, "Failed to delete secret {}: {:#}", name, e);
                    report.delete_failures.push(DeleteFailure {
                        name,
                        message: format!("{e:#}"),
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{InMemorySecretStore, StoreOperation};
    use crate::types::NamespacePrefix;

    fn app() -> NamespacePrefix {
        NamespacePrefix::parse(Some("app")).unwrap()
    }

    async fn remaining_from(store: &InMemorySecretStore) -> RemainingSet {
        RemainingSet::from_listing(&app(), store.snapshot().await.into_keys())
    }

    #[test]
    fn test_update_failure_policy_parsing() {
        assert_eq!("abort".parse::<UpdateFailurePolicy>().unwrap(), UpdateFailurePolicy::Abort);
        assert_eq!(
            " Create ".parse::<UpdateFailurePolicy>().unwrap(),
            UpdateFailurePolicy::CreateFallback
        );
        assert!("retry".parse::<UpdateFailurePolicy>().is_err());
        assert_eq!(UpdateFailurePolicy::default(), UpdateFailurePolicy::Abort);
    }

    #[tokio::test]
    async fn test_describe_failure_routes_to_create() {
        let store = InMemorySecretStore::new();
        store.fail_on(StoreOperation::Exists, "app/NEW").await;
        let reconciler = Reconciler::new(&store, ReconcileOptions::default());

        let report = reconciler
            .reconcile(&[DesiredSecret::new("app/NEW", "v")], RemainingSet::default())
            .await
            .unwrap();

        assert_eq!(report.created, vec!["app/NEW"]);
        assert_eq!(store.snapshot().await["app/NEW"], "v");
    }

    #[tokio::test]
    async fn test_update_failure_aborts_by_default() {
        let store =
            InMemorySecretStore::with_secrets([("app/A", "1"), ("app/B", "1"), ("app/OLD", "x")]);
        store.fail_on(StoreOperation::Update, "app/A").await;
        let remaining = remaining_from(&store).await;
        let reconciler = Reconciler::new(&store, ReconcileOptions::default());

        let err = reconciler
            .reconcile(
                &[DesiredSecret::new("app/A", "2"), DesiredSecret::new("app/B", "2")],
                remaining,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::Update { ref name, .. } if name == "app/A"));
        assert_eq!(store.calls_for(StoreOperation::Exists).await, vec!["app/A"]);
        assert!(store.calls_for(StoreOperation::Create).await.is_empty());
        assert!(store.calls_for(StoreOperation::Delete).await.is_empty());
    }

    #[tokio::test]
    async fn test_create_fallback_after_failed_update_surfaces_create_error() {
        let store = InMemorySecretStore::with_secrets([("app/A", "1")]);
        store.fail_on(StoreOperation::Update, "app/A").await;
        let options = ReconcileOptions {
            update_failure_policy: UpdateFailurePolicy::CreateFallback,
            ..ReconcileOptions::default()
        };
        let reconciler = Reconciler::new(&store, options);

        let err = reconciler
            .reconcile(&[DesiredSecret::new("app/A", "2")], remaining_from(&store).await)
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::Create { ref name, .. } if name == "app/A"));
        assert_eq!(store.calls_for(StoreOperation::Create).await, vec!["app/A"]);
        assert_eq!(store.snapshot().await["app/A"], "1");
    }

    #[tokio::test]
    async fn test_create_fallback_succeeds_when_secret_vanished() {
        // Existence check says yes, but the update hits a missing secret.
        let store = InMemorySecretStore::new();
        store.fail_on(StoreOperation::Update, "app/A").await;
        let always_exists = ExistsOverride { inner: &store };
        let options = ReconcileOptions {
            update_failure_policy: UpdateFailurePolicy::CreateFallback,
            ..ReconcileOptions::default()
        };
        let reconciler = Reconciler::new(&always_exists, options);

        let report = reconciler
            .reconcile(&[DesiredSecret::new("app/A", "2")], RemainingSet::default())
            .await
            .unwrap();

        assert_eq!(report.created_after_failed_update, vec!["app/A"]);
        assert_eq!(report.synced(), 1);
    }

    #[tokio::test]
    async fn test_delete_failures_are_reported_not_raised() {
        let store = InMemorySecretStore::with_secrets([("app/A", "1"), ("app/B", "1")]);
        store.fail_on(StoreOperation::Delete, "app/A").await;
        let reconciler = Reconciler::new(&store, ReconcileOptions::default());

        let report = reconciler
            .reconcile(&[], remaining_from(&store).await)
            .await
            .unwrap();

        assert_eq!(report.deleted, vec!["app/B"]);
        assert_eq!(report.delete_failures.len(), 1);
        assert_eq!(report.delete_failures[0].name, "app/A");
        assert!(report.has_delete_failures());
    }

    /// Store wrapper whose existence check always reports "exists"
    struct ExistsOverride<'a> {
        inner: &'a InMemorySecretStore,
    }

    #[async_trait::async_trait]
    impl SecretStore for ExistsOverride<'_> {
        async fn list_secret_names(&self, scope: &str) -> anyhow::Result<Vec<String>> {
            self.inner.list_secret_names(scope).await
        }

        async fn secret_exists(&self, _secret_name: &str) -> anyhow::Result<bool> {
            Ok(true)
        }

        async fn create_secret(
            &self,
            secret_name: &str,
            secret_value: &str,
            description: &str,
        ) -> anyhow::Result<()> {
            self.inner
                .create_secret(secret_name, secret_value, description)
                .await
        }

        async fn update_secret(&self, secret_name: &str, secret_value: &str) -> anyhow::Result<()> {
            self.inner.update_secret(secret_name, secret_value).await
        }

        async fn delete_secret(&self, secret_name: &str) -> anyhow::Result<()> {
            self.inner.delete_secret(secret_name).await
        }
    }
}
