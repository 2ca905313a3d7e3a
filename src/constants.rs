//! # Constants
//!
//! Shared constants used throughout the sync.
//!
//! Values read from the environment can be overridden via configuration
//! or command-line flags where applicable.

/// Marker that identifies pipeline inputs in the process environment
///
/// GitHub Actions exposes every `with:` input as `INPUT_<NAME>`.
pub const INPUT_MARKER: &str = "INPUT_";

/// Input that names the namespace prefix instead of a secret
pub const PREFIX_INPUT_KEY: &str = "INPUT_PREFIX";

/// Namespace prefix used when `INPUT_PREFIX` is unset or empty
pub const DEFAULT_PREFIX: &str = "appsecrets";

/// Description attached to every secret created by the sync
pub const DEFAULT_SECRET_DESCRIPTION: &str = "Synced from GitHub Secrets";

/// Page size requested from `ListSecrets` (service maximum is 100)
pub const LIST_SECRETS_PAGE_SIZE: i32 = 100;

/// Default tracing filter target
pub const DEFAULT_LOG_TARGET: &str = "secrets_manager_sync";
