//! # Types
//!
//! Core values that flow through a single sync run.

use crate::constants::DEFAULT_PREFIX;
use crate::error::SyncError;
use std::collections::HashSet;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Logical partition of the secret store owned by a run
///
/// Every secret this run touches is named `"{prefix}/{local_name}"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespacePrefix(String);

impl NamespacePrefix {
    /// Build a prefix from a raw input value
    ///
    /// Leading slashes are stripped; trailing ones are kept, so `"app/"`
    /// owns `app//*`. An unset or empty input falls back to [`DEFAULT_PREFIX`].
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Config`] if nothing is left after stripping
    /// (for example, the input was just `"/"`).
    pub fn parse(raw: Option<&str>) -> Result<Self, SyncError> {
        let raw = match raw {
            Some(value) if !value.is_empty() => value,
            _ => DEFAULT_PREFIX,
        };
        let trimmed = raw.trim_start_matches('/');
        if trimmed.is_empty() {
            return Err(SyncError::Config(format!(
                "namespace prefix {raw:?} is empty after stripping slashes"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Listing scope, always ending in `/`
    #[must_use]
    pub fn scope(&self) -> String {
        format!("{}/", self.0)
    }

    /// Full store name for a local secret name
    #[must_use]
    pub fn full_name(&self, local_name: &str) -> String {
        format!("{}/{}", self.0, local_name)
    }

    /// Whether a full store name falls inside this namespace
    #[must_use]
    pub fn contains(&self, full_name: &str) -> bool {
        full_name
            .strip_prefix(self.0.as_str())
            .is_some_and(|rest| rest.starts_with('/'))
    }
}

impl std::fmt::Display for NamespacePrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A secret the caller wants to exist, with its full store name
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct DesiredSecret {
    name: String,
    value: String,
}

impl DesiredSecret {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl std::fmt::Debug for DesiredSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DesiredSecret")
            .field("name", &self.name)
            .field("value", &"***")
            .finish()
    }
}

/// Existing secret names not yet claimed by a desired secret
///
/// Starts as the full listing (deduplicated, listing order kept) and shrinks
/// as desired secrets are created or updated. Whatever is left at the end of
/// the create/update phase is deleted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemainingSet {
    names: Vec<String>,
}

impl RemainingSet {
    /// Build from listed names, keeping only those inside `prefix`
    pub fn from_listing<I, S>(prefix: &NamespacePrefix, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let names = names
            .into_iter()
            .map(Into::into)
            .filter(|name: &String| prefix.contains(name) && seen.insert(name.clone()))
            .collect();
        Self { names }
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Remove an exact name, returning whether it was present
    pub fn consume(&mut self, name: &str) -> bool {
        let before = self.names.len();
        self.names.retain(|n| n != name);
        self.names.len() != before
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    #[must_use]
    pub fn into_names(self) -> Vec<String> {
        self.names
    }
}
