//! # Command-Line Interface
//!
//! Flags override the environment-derived [`SyncConfig`].
//!
//! ```bash
//! # Typical pipeline usage: everything comes from the environment
//! INPUT_PREFIX=myapp INPUT_DB_URL=... secrets-manager-sync
//!
//! # Preview changes against LocalStack
//! secrets-manager-sync --prefix myapp --endpoint-url http://localhost:4566 --dry-run
//! ```

use crate::config::SyncConfig;
use crate::reconciler::UpdateFailurePolicy;
use clap::{Parser, ValueEnum};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("BUILD_GIT_HASH"),
    ", built ",
    env!("BUILD_DATETIME"),
    ")"
);

/// Mirror INPUT_* environment variables into AWS Secrets Manager
#[derive(Parser, Debug)]
#[command(
    name = "secrets-manager-sync",
    version,
    long_version = LONG_VERSION,
    about = "Mirror INPUT_* environment variables into AWS Secrets Manager",
    long_about = None,
    after_help = "\
Every INPUT_<NAME> variable except INPUT_PREFIX is synced to <prefix>/<NAME>.
Secrets under <prefix>/ without a matching input are deleted without recovery."
)]
pub struct Cli {
    /// Namespace prefix (overrides INPUT_PREFIX, default: appsecrets)
    #[arg(long, value_name = "PREFIX")]
    pub prefix: Option<String>,

    /// AWS region (overrides SECRETS_SYNC_REGION and the SDK default chain)
    #[arg(long, value_name = "REGION")]
    pub region: Option<String>,

    /// Secrets Manager endpoint, e.g. http://localhost:4566 for LocalStack
    #[arg(long, value_name = "URL")]
    pub endpoint_url: Option<String>,

    /// Description for newly created secrets
    #[arg(long, value_name = "TEXT")]
    pub description: Option<String>,

    /// What to do when updating an existing secret fails
    #[arg(long, value_enum, value_name = "POLICY")]
    pub on_update_failure: Option<UpdateFailureArg>,

    /// List and log planned changes without modifying the store
    #[arg(long)]
    pub dry_run: bool,
}

/// CLI spelling of [`UpdateFailurePolicy`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UpdateFailureArg {
    /// Fail the run
    Abort,
    /// Attempt a create instead
    Create,
}

impl From<UpdateFailureArg> for UpdateFailurePolicy {
    fn from(arg: UpdateFailureArg) -> Self {
        match arg {
            UpdateFailureArg::Abort => UpdateFailurePolicy::Abort,
            UpdateFailureArg::Create => UpdateFailurePolicy::CreateFallback,
        }
    }
}

impl Cli {
    /// Apply command-line overrides on top of `config`
    #[must_use]
    pub fn apply_to(self, mut config: SyncConfig) -> SyncConfig {
        if let Some(prefix) = self.prefix {
            config.prefix = Some(prefix);
        }
        if let Some(region) = self.region {
            config.region = Some(region);
        }
        if let Some(endpoint_url) = self.endpoint_url {
            config.endpoint_url = Some(endpoint_url);
        }
        if let Some(description) = self.description {
            config.description = description;
        }
        if let Some(policy) = self.on_update_failure {
            config.update_failure_policy = policy.into();
        }
        config.dry_run |= self.dry_run;
        config
    }
}
