//! Environment variable provider.

use std::env;

use crate::key::KEY_DELIMITER;
use crate::macros::debug;

use super::{KeyValueStore, Provider, ProviderDetails};

/// Separator in variable names that stands for [`KEY_DELIMITER`].
///
/// `APP_DB__HOST` becomes `DB:HOST` under prefix `APP_`.
pub const ENV_NESTING_SEPARATOR: &str = "__";

/// Provider over a snapshot of environment variables.
///
/// Variables are read once, when the provider is created. With a prefix,
/// only variables starting with it (ignoring case) are kept and the prefix is
/// stripped. Without one the provider represents the whole process
/// environment, which reports hide by default.
#[derive(Clone, Debug)]
pub struct EnvProvider {
    prefix: Option<String>,
    store: KeyValueStore,
}

impl EnvProvider {
    /// Snapshots the whole process environment.
    pub fn new() -> Self {
        Self::snapshot(None)
    }

    /// Snapshots process variables starting with `prefix`.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self::snapshot(Some(prefix.into()))
    }

    /// Builds the provider from an explicit variable list instead of the
    /// process environment.
    ///
    /// # Example
    ///
    /// ```
    /// use confscope::provider::{EnvProvider, Provider};
    ///
    /// let provider = EnvProvider::from_vars(
    ///     Some("APP_".to_string()),
    ///     [("APP_DB__HOST", "localhost"), ("OTHER", "x")],
    /// );
    ///
    /// assert_eq!(provider.try_get("Db:Host").as_deref(), Some("localhost"));
    /// assert_eq!(provider.try_get("OTHER"), None);
    /// ```
    pub fn from_vars<K, V>(prefix: Option<String>, vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut store = KeyValueStore::new();

        for (name, value) in vars {
            if let Some(key) = Self::key_for(prefix.as_deref(), name.as_ref()) {
                store.insert(key, value);
            }
        }

        Self { prefix, store }
    }

    fn snapshot(prefix: Option<String>) -> Self {
        let mut skipped = 0usize;
        let vars = env::vars_os().filter_map(|(name, value)| {
            match (name.into_string(), value.into_string()) {
                (Ok(name), Ok(value)) => Some((name, value)),
                _ => {
                    skipped += 1;
                    None
                }
            }
        });

        let provider = Self::from_vars(prefix, vars.collect::<Vec<_>>());

        debug!(
            prefix = provider.prefix.as_deref().unwrap_or(""),
            keys = provider.store.len(),
            skipped_non_utf8 = skipped,
            "snapshotted environment variables"
        );

        provider
    }

    /// Maps a variable name to a configuration key, or `None` if it is
    /// filtered out by the prefix.
    fn key_for(prefix: Option<&str>, name: &str) -> Option<String> {
        let rest = match prefix.filter(|p| !p.is_empty()) {
            Some(prefix) => {
                let head = name.get(..prefix.len())?;
                if !head.eq_ignore_ascii_case(prefix) {
                    return None;
                }
                &name[prefix.len()..]
            }
            None => name,
        };

        if rest.is_empty() {
            return None;
        }

        Some(rest.replace(ENV_NESTING_SEPARATOR, &KEY_DELIMITER.to_string()))
    }

    /// The configured prefix, as given.
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// The captured variables.
    pub fn store(&self) -> &KeyValueStore {
        &self.store
    }
}

impl Default for EnvProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider for EnvProvider {
    fn kind_name(&self) -> &str {
        "EnvironmentVariablesProvider"
    }

    fn try_get(&self, key: &str) -> Option<String> {
        self.store.get(key).map(str::to_string)
    }

    fn child_keys(&self, parent: Option<&str>) -> Vec<String> {
        self.store.child_keys(parent)
    }

    fn details(&self) -> ProviderDetails<'_> {
        ProviderDetails::Environment {
            prefix: self.prefix.as_deref(),
        }
    }
}
