//! # Run Outcome Reporting
//!
//! Reports the final pass/fail signal to the calling pipeline.
//!
//! Under GitHub Actions a failure is also emitted as an `::error::` workflow
//! command so it shows up as an annotation on the run.

use crate::sync::SyncOutcome;
use std::io::Write;
use std::process::ExitCode;
use tracing::{error, info, warn};

/// Whether the process is running inside a GitHub Actions job
#[must_use]
pub fn running_in_github_actions() -> bool {
    std::env::var("GITHUB_ACTIONS").is_ok_and(|v| v == "true")
}

/// Escape a message for use as workflow command data
#[must_use]
pub fn escape_command_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Render the `::error::` workflow command for a failure message
#[must_use]
pub fn error_command(message: &str) -> String {
    format!("::error::{}", escape_command_data(message))
}

/// Log a successful run and return the success exit code
pub fn report_success(outcome: &SyncOutcome) -> ExitCode {
    match outcome {
        SyncOutcome::Planned(plan) if plan.is_empty() => {
            info!("✅ Dry run complete, store already matches inputs");
        }
        SyncOutcome::Planned(_) => info!("✅ Dry run complete, no changes applied"),
        SyncOutcome::Applied(report) if report.has_delete_failures() => {
            warn!(
                "⚠️  Secrets synced, but {} unused secrets could not be deleted",
                report.delete_failures.len()
            );
        }
        SyncOutcome::Applied(_) => info!("✅ All secrets synced successfully"),
    }
    ExitCode::SUCCESS
}

/// Log a fatal failure, annotate the workflow run, and return the failure exit code
pub fn report_failure(err: &anyhow::Error) -> ExitCode {
    report_failure_to(err, running_in_github_actions(), &mut std::io::stdout().lock())
}

/// [`report_failure`] with the workflow-command sink made explicit
pub fn report_failure_to<W: Write>(
    err: &anyhow::Error,
    github_actions: bool,
    out: &mut W,
) -> ExitCode {
    let message = format!("{err:#}");
    error!("❌ Fatal error: {}", message);

    if github_actions {
        if let Err(e) = writeln!(out, "{}", error_command(&message)) {
            error!("Failed to write workflow error command: {}", e);
        }
    }

    ExitCode::FAILURE
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::reconciler::{DeleteFailure, ReconcilePlan, ReconcileReport};

    fn same_code(actual: ExitCode, expected: ExitCode) -> bool {
        format!("{actual:?}") == format!("{expected:?}")
    }

    #[test]
    fn test_success_outcomes_exit_zero() {
        let applied = SyncOutcome::Applied(ReconcileReport {
            created: vec!["app/NEW".to_string()],
            ..ReconcileReport::default()
        });
        assert!(same_code(report_success(&applied), ExitCode::SUCCESS));

        let planned = SyncOutcome::Planned(ReconcilePlan::default());
        assert!(same_code(report_success(&planned), ExitCode::SUCCESS));
    }

    #[test]
    fn test_delete_failures_still_exit_zero() {
        let outcome = SyncOutcome::Applied(ReconcileReport {
            delete_failures: vec![DeleteFailure {
                name: "app/OLD".to_string(),
                message: "AccessDenied".to_string(),
            }],
            ..ReconcileReport::default()
        });
        assert!(same_code(report_success(&outcome), ExitCode::SUCCESS));
    }

    #[test]
    fn test_failure_exits_one_and_annotates_under_actions() {
        let err = anyhow::anyhow!("AccessDenied").context("Failed to create secret app/A");
        let mut out = Vec::new();

        let code = report_failure_to(&err, true, &mut out);

        assert!(same_code(code, ExitCode::FAILURE));
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "::error::Failed to create secret app/A: AccessDenied\n"
        );
    }

    #[test]
    fn test_failure_outside_actions_writes_no_command() {
        let err = anyhow::anyhow!("listing failed");
        let mut out = Vec::new();

        let code = report_failure_to(&err, false, &mut out);

        assert!(same_code(code, ExitCode::FAILURE));
        assert!(out.is_empty());
    }

    #[test]
    fn test_escape_command_data() {
        assert_eq!(escape_command_data("100% done"), "100%25 done");
        assert_eq!(escape_command_data("line1\nline2\r"), "line1%0Aline2%0D");
        assert_eq!(escape_command_data("plain"), "plain");
    }

    #[test]
    fn test_error_command_format() {
        assert_eq!(
            error_command("Failed to create secret app/A:\nAccessDenied"),
            "::error::Failed to create secret app/A:%0AAccessDenied"
        );
    }
}
