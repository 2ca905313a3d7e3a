//! # Sync
//!
//! One reconciliation run: list what exists under the prefix, then either
//! reconcile the desired set against it or, in dry-run mode, log the plan.

use crate::error::SyncError;
use crate::provider::SecretStore;
use crate::reconciler::{plan, ReconcileOptions, ReconcilePlan, ReconcileReport, Reconciler};
use crate::types::{DesiredSecret, NamespacePrefix, RemainingSet};
use tracing::{info, info_span, Instrument};

/// Result of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Changes were applied to the store
    Applied(ReconcileReport),
    /// Dry run; the store was only listed
    Planned(ReconcilePlan),
}

/// List every existing secret under `prefix`
///
/// Names outside the prefix are dropped even if the store returns them.
///
/// # Errors
///
/// Returns [`SyncError::Listing`] if the store cannot be listed.
pub async fn list_existing(
    store: &dyn SecretStore,
    prefix: &NamespacePrefix,
) -> Result<RemainingSet, SyncError> {
    let scope = prefix.scope();
    let names = store
        .list_secret_names(&scope)
        .await
        .map_err(|source| SyncError::Listing {
            scope: scope.clone(),
            source,
        })?;

    let existing = RemainingSet::from_listing(prefix, names);
    info!(
        "Found {} existing secrets with prefix: {}",
        existing.len(),
        scope
    );
    Ok(existing)
}

/// Run one sync of `desired` against the store
///
/// # Errors
///
/// Returns the first fatal [`SyncError`]: a listing failure (nothing
/// changed), or a create/update failure (later secrets and all deletions
/// skipped). Delete failures are reported in [`ReconcileReport`] instead.
pub async fn run_sync(
    store: &dyn SecretStore,
    prefix: &NamespacePrefix,
    desired: &[DesiredSecret],
    options: ReconcileOptions,
    dry_run: bool,
) -> Result<SyncOutcome, SyncError> {
    let span = info_span!("secrets.sync", prefix = %prefix, dry_run = dry_run);

    async move {
        let existing = list_existing(store, prefix).await?;
        info!("Processing {} non-empty secrets", desired.len());

        if dry_run {
            let plan = plan(desired, &existing);
            plan.log();
            return Ok(SyncOutcome::Planned(plan));
        }

        let report = Reconciler::new(store, options)
            .reconcile(desired, existing)
            .await?;
        info!(
            created = report.created.len() + report.created_after_failed_update.len(),
            updated = report.updated.len(),
            deleted = report.deleted.len(),
            delete_failures = report.delete_failures.len(),
            "Reconciliation finished"
        );
        Ok(SyncOutcome::Applied(report))
    }
    .instrument(span)
    .await
}
