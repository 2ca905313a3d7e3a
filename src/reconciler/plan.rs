//! Dry-run planning.
//!
//! Predicts the reconciler's store calls from the listing alone, without
//! describing or mutating anything.

use crate::types::{DesiredSecret, RemainingSet};
use tracing::info;

/// Expected mutations for a desired set against a listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    pub to_create: Vec<String>,
    pub to_update: Vec<String>,
    pub to_delete: Vec<String>,
}

impl ReconcilePlan {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_update.is_empty() && self.to_delete.is_empty()
    }

    /// Log the plan, one line per intended operation
    pub fn log(&self) {
        for name in &self.to_update {
            info!(operation = "update", "[dry-run] Would update secret: {}", name);
        }
        for name in &self.to_create {
            info!(operation = "create", "[dry-run] Would create secret: {}", name);
        }
        for name in &self.to_delete {
            info!(operation = "delete", "[dry-run] Would delete secret: {}", name);
        }
        info!(
            "[dry-run] {} to create, {} to update, {} to delete",
            self.to_create.len(),
            self.to_update.len(),
            self.to_delete.len()
        );
    }
}

/// Compute the plan for `desired` against the existing names in `existing`
#[must_use]
pub fn plan(desired: &[DesiredSecret], existing: &RemainingSet) -> ReconcilePlan {
    let mut remaining = existing.clone();
    let mut plan = ReconcilePlan::default();

    for secret in desired {
        if remaining.consume(secret.name()) {
            plan.to_update.push(secret.name().to_string());
        } else if !existing.contains(secret.name()) {
            plan.to_create.push(secret.name().to_string());
        }
    }

    plan.to_delete = remaining.into_names();
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NamespacePrefix;

    #[test]
    fn test_plan_matches_example_scenario() {
        let prefix = NamespacePrefix::parse(Some("app")).unwrap();
        let existing = RemainingSet::from_listing(&prefix, ["app/OLD", "app/KEEP", "other/X"]);
        let desired = [
            DesiredSecret::new("app/KEEP", "v2"),
            DesiredSecret::new("app/NEW", "v3"),
        ];

        let plan = plan(&desired, &existing);

        assert_eq!(plan.to_update, vec!["app/KEEP"]);
        assert_eq!(plan.to_create, vec!["app/NEW"]);
        assert_eq!(plan.to_delete, vec!["app/OLD"]);
    }

    #[test]
    fn test_plan_is_empty_without_work() {
        let plan = plan(&[], &RemainingSet::default());
        assert!(plan.is_empty());
    }
}
