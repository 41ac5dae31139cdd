//! In-memory provider.

use super::{KeyValueStore, Provider, ProviderDetails};

/// Provider over a fixed set of key/value pairs.
///
/// # Example
///
/// ```
/// use confscope::provider::{MemoryProvider, Provider};
///
/// let provider = MemoryProvider::new()
///     .with("Environment", "Development")
///     .with("Db:Port", "5432");
///
/// assert_eq!(provider.try_get("db:port").as_deref(), Some("5432"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct MemoryProvider {
    store: KeyValueStore,
}

impl MemoryProvider {
    /// Creates an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a key/value pair.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.store.insert(key, value);

        self
    }

    /// Adds or replaces a key/value pair.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.store.insert(key, value);
    }

    /// The underlying store.
    pub fn store(&self) -> &KeyValueStore {
        &self.store
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MemoryProvider {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            store: iter.into_iter().collect(),
        }
    }
}

impl Provider for MemoryProvider {
    fn kind_name(&self) -> &str {
        "MemoryProvider"
    }

    fn try_get(&self, key: &str) -> Option<String> {
        self.store.get(key).map(str::to_string)
    }

    fn child_keys(&self, parent: Option<&str>) -> Vec<String> {
        self.store.child_keys(parent)
    }

    fn details(&self) -> ProviderDetails<'_> {
        ProviderDetails::Memory
    }
}
