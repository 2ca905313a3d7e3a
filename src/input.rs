//! # Input Extraction
//!
//! Derives the desired secret set from pipeline inputs in the process
//! environment.
//!
//! Every `INPUT_<NAME>` variable except `INPUT_PREFIX` becomes the secret
//! `"{prefix}/<NAME>"`. Inputs with an empty value are skipped; they neither
//! create a secret nor protect an existing one from deletion.

use crate::constants::{INPUT_MARKER, PREFIX_INPUT_KEY};
use crate::error::SyncError;
use crate::types::{DesiredSecret, NamespacePrefix};
use tracing::{info, warn};

/// Resolve the namespace prefix from the raw `INPUT_PREFIX` value
///
/// # Errors
///
/// Returns [`SyncError::Config`] if the value is only slashes.
pub fn resolve_prefix(raw: Option<&str>) -> Result<NamespacePrefix, SyncError> {
    NamespacePrefix::parse(raw)
}

/// Extract desired secrets from `(key, value)` environment pairs
///
/// Output order follows input iteration order.
pub fn extract_desired_secrets<I, K, V>(vars: I, prefix: &NamespacePrefix) -> Vec<DesiredSecret>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut desired = Vec::new();

    for (key, value) in vars {
        let key = key.as_ref();
        if key == PREFIX_INPUT_KEY {
            continue;
        }
        let Some(local_name) = key.strip_prefix(INPUT_MARKER) else {
            continue;
        };
        if local_name.is_empty() {
            warn!("Ignoring input variable {} with no secret name", key);
            continue;
        }

        let full_name = prefix.full_name(local_name);
        let value = value.as_ref();
        if value.is_empty() {
            info!("Skipping empty secret: {}", full_name);
            continue;
        }

        desired.push(DesiredSecret::new(full_name, value));
    }

    desired
}

/// Extract desired secrets from the live process environment
///
/// Variables whose name or value is not valid Unicode are skipped.
pub fn desired_from_process_env(prefix: &NamespacePrefix) -> Vec<DesiredSecret> {
    let vars = std::env::vars_os().filter_map(|(key, value)| {
        let key = key.into_string().ok()?;
        match value.into_string() {
            Ok(value) => Some((key, value)),
            Err(_) => {
                if key.starts_with(INPUT_MARKER) {
                    warn!("Skipping input {} with a non-UTF-8 value", key);
                }
                None
            }
        }
    });
    extract_desired_secrets(vars, prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefix(raw: &str) -> NamespacePrefix {
        resolve_prefix(Some(raw)).unwrap()
    }

    fn names(secrets: &[DesiredSecret]) -> Vec<&str> {
        secrets.iter().map(DesiredSecret::name).collect()
    }

    #[test]
    fn test_selects_only_input_variables() {
        let vars = [
            ("INPUT_DB_URL", "postgres://db"),
            ("PATH", "/usr/bin"),
            ("GITHUB_TOKEN", "ghs_x"),
            ("INPUT_API_KEY", "abc"),
        ];
        let desired = extract_desired_secrets(vars, &prefix("app"));
        assert_eq!(names(&desired), vec!["app/DB_URL", "app/API_KEY"]);
        assert_eq!(desired[0].value(), "postgres://db");
    }

    #[test]
    fn test_prefix_input_is_not_a_secret() {
        let vars = [("INPUT_PREFIX", "app"), ("INPUT_TOKEN", "t")];
        let desired = extract_desired_secrets(vars, &prefix("app"));
        assert_eq!(names(&desired), vec!["app/TOKEN"]);
    }

    #[test]
    fn test_empty_values_are_dropped() {
        let vars = [("INPUT_EMPTY", ""), ("INPUT_SET", "v")];
        let desired = extract_desired_secrets(vars, &prefix("app"));
        assert_eq!(names(&desired), vec!["app/SET"]);
    }

    #[test]
    fn test_bare_marker_is_ignored() {
        let desired = extract_desired_secrets([("INPUT_", "v")], &prefix("app"));
        assert!(desired.is_empty());
    }

    #[test]
    fn test_marker_is_case_sensitive() {
        let desired = extract_desired_secrets([("input_lower", "v")], &prefix("app"));
        assert!(desired.is_empty());
    }

    #[test]
    fn test_uses_stripped_prefix() {
        let desired = extract_desired_secrets([("INPUT_KEY", "v")], &prefix("/team/app"));
        assert_eq!(names(&desired), vec!["team/app/KEY"]);
    }
}
