//! # Sync Configuration
//!
//! Run settings loaded from environment variables.
//!
//! `INPUT_*` names are reserved for secrets, so apart from `INPUT_PREFIX`
//! every setting here uses a `SECRETS_SYNC_*`, `LOG_*` or AWS variable.
//! Command-line flags (see [`crate::cli`]) override these values.

use crate::constants::{DEFAULT_SECRET_DESCRIPTION, PREFIX_INPUT_KEY};
use crate::error::SyncError;
use crate::provider::aws::AwsStoreConfig;
use crate::reconciler::{ReconcileOptions, UpdateFailurePolicy};
use crate::types::NamespacePrefix;

/// Run-level configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Raw namespace prefix input (`INPUT_PREFIX`), resolved by [`Self::namespace_prefix`]
    pub prefix: Option<String>,
    /// Description attached to created secrets
    pub description: String,
    /// Handling of update failures on existing secrets
    pub update_failure_policy: UpdateFailurePolicy,
    /// Log the plan instead of changing the store
    pub dry_run: bool,
    /// AWS region override
    pub region: Option<String>,
    /// Secrets Manager endpoint override
    pub endpoint_url: Option<String>,
    /// Log level (ERROR, WARN, INFO, DEBUG, TRACE)
    pub log_level: String,
    /// Log format (json, text)
    pub log_format: String,
    /// Enable color in text format logs
    pub log_enable_color: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            prefix: None,
            description: DEFAULT_SECRET_DESCRIPTION.to_string(),
            update_failure_policy: UpdateFailurePolicy::default(),
            dry_run: false,
            region: None,
            endpoint_url: None,
            log_level: "info".to_string(),
            log_format: "text".to_string(),
            log_enable_color: false,
        }
    }
}

impl SyncConfig {
    /// Load configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Config`] for an unrecognised update failure policy.
    pub fn from_env() -> Result<Self, SyncError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Config`] for an unrecognised update failure policy.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SyncError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let update_failure_policy = match non_empty("SECRETS_SYNC_UPDATE_FAILURE_POLICY") {
            Some(raw) => raw.parse()?,
            None => defaults.update_failure_policy,
        };

        Ok(Self {
            prefix: lookup(PREFIX_INPUT_KEY),
            description: non_empty("SECRETS_SYNC_DESCRIPTION").unwrap_or(defaults.description),
            update_failure_policy,
            dry_run: parse_bool(lookup("SECRETS_SYNC_DRY_RUN").as_deref(), defaults.dry_run),
            region: non_empty("SECRETS_SYNC_REGION"),
            endpoint_url: non_empty("SECRETS_SYNC_ENDPOINT_URL"),
            log_level: non_empty("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_format: non_empty("LOG_FORMAT").unwrap_or(defaults.log_format),
            log_enable_color: parse_bool(
                lookup("LOG_ENABLE_COLOR").as_deref(),
                defaults.log_enable_color,
            ),
        })
    }

    /// Resolve the namespace prefix this run owns
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Config`] if the prefix is only slashes.
    pub fn namespace_prefix(&self) -> Result<NamespacePrefix, SyncError> {
        NamespacePrefix::parse(self.prefix.as_deref())
    }

    #[must_use]
    pub fn reconcile_options(&self) -> ReconcileOptions {
        ReconcileOptions {
            description: self.description.clone(),
            update_failure_policy: self.update_failure_policy,
        }
    }

    #[must_use]
    pub fn aws_store_config(&self) -> AwsStoreConfig {
        AwsStoreConfig {
            region: self.region.clone(),
            endpoint_url: self.endpoint_url.clone(),
        }
    }

    #[must_use]
    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }
}

/// Parse a boolean flag value, falling back to `default` when unset
fn parse_bool(value: Option<&str>, default: bool) -> bool {
    value
        .map(|v| {
            let v_lower = v.trim().to_lowercase();
            v_lower == "true" || v_lower == "1" || v_lower == "yes" || v_lower == "on"
        })
        .unwrap_or(default)
}
