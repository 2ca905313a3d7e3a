//! # Secrets Manager Sync
//!
//! Pipeline step that makes `<prefix>/*` in AWS Secrets Manager mirror the
//! step's `INPUT_*` environment variables.
//!
//! ## Overview
//!
//! 1. **Resolve the prefix** from `INPUT_PREFIX` (default `appsecrets`)
//! 2. **List existing secrets** under `<prefix>/`
//! 3. **Create or update** one secret per non-empty `INPUT_<NAME>`
//! 4. **Delete** secrets under the prefix that no input asked for
//!
//! A failed listing, create or update fails the step. Failed deletions are
//! logged and skipped.

use anyhow::{Context, Result};
use clap::Parser;
use secrets_manager_sync::cli::Cli;
use secrets_manager_sync::config::SyncConfig;
use secrets_manager_sync::input::desired_from_process_env;
use secrets_manager_sync::observability::init_tracing;
use secrets_manager_sync::outcome::{report_failure, report_success};
use secrets_manager_sync::provider::AwsSecretsManager;
use secrets_manager_sync::sync::{run_sync, SyncOutcome};
use std::process::ExitCode;
use tracing::info;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match SyncConfig::from_env() {
        Ok(config) => cli.apply_to(config),
        Err(e) => {
            // Logging is not configured yet; fall back to defaults for the report.
            let _ = init_tracing(&SyncConfig::default());
            return report_failure(&anyhow::Error::from(e));
        }
    };

    if let Err(e) = init_tracing(&config) {
        eprintln!("{e:#}");
    }

    match run(&config).await {
        Ok(outcome) => report_success(&outcome),
        Err(e) => report_failure(&e),
    }
}

async fn run(config: &SyncConfig) -> Result<SyncOutcome> {
    // Configure rustls crypto provider before the SDK opens any connection.
    // Ignore the error: a provider may already be installed.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let prefix = config.namespace_prefix()?;
    info!("Secrets Manager sync - PREFIX: {}", prefix);
    info!(
        "Build info: version={}, datetime={}, git_hash={}",
        env!("CARGO_PKG_VERSION"),
        env!("BUILD_DATETIME"),
        env!("BUILD_GIT_HASH")
    );

    let store = AwsSecretsManager::new(&config.aws_store_config()).await;
    let desired = desired_from_process_env(&prefix);

    run_sync(
        &store,
        &prefix,
        &desired,
        config.reconcile_options(),
        config.dry_run,
    )
    .await
    .context("Secrets sync failed")
}
