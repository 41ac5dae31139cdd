//! Configuration providers.
//!
//! A [`Provider`] is one ordered source of key/value data. Providers report
//! what they are through [`ProviderDetails`], a closed set of kinds the
//! normalizer and the report dispatch on, instead of inspecting concrete types.
//!
//! | Provider | Kind |
//! |----------|------|
//! | [`MemoryProvider`] | [`ProviderDetails::Memory`] |
//! | [`EnvProvider`] | [`ProviderDetails::Environment`] |
//! | [`FileProvider`](crate::file::FileProvider) | [`ProviderDetails::File`] |
//! | [`ChainedProvider`] | [`ProviderDetails::Chained`] |

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashSet};
use std::fmt::{self, Debug, Formatter};

use crate::file::FileDetails;
use crate::key;

mod chained;
mod env;
mod memory;

pub use chained::ChainedProvider;
pub use env::{ENV_NESTING_SEPARATOR, EnvProvider};
pub use memory::MemoryProvider;

/// A source of configuration key/value pairs.
///
/// Implementations must be cheap to query; the report calls
/// [`try_get`](Self::try_get) once per provider for every key in the tree.
pub trait Provider: Debug + Send + Sync {
    /// Short type name shown in the provider table (e.g. `"JsonFileProvider"`).
    fn kind_name(&self) -> &str;

    /// Looks up a full key path. Absence is not an error.
    fn try_get(&self, key: &str) -> Option<String>;

    /// Immediate child segments below `parent` (`None` = root).
    fn child_keys(&self, parent: Option<&str>) -> Vec<String>;

    /// Kind-specific metadata.
    ///
    /// Defaults to [`ProviderDetails::Other`], which the report treats as an
    /// opaque provider.
    fn details(&self) -> ProviderDetails<'_> {
        ProviderDetails::Other
    }
}

/// What a provider is, with the metadata the report needs for its kind.
#[derive(Clone, Copy, Debug)]
pub enum ProviderDetails<'a> {
    /// Backed by a configuration file.
    File(&'a FileDetails),

    /// Backed by environment variables, optionally filtered by prefix.
    Environment {
        /// Variable prefix; `None` or blank means the whole process environment.
        prefix: Option<&'a str>,
    },

    /// Backed by another configuration root.
    ///
    /// `None` when the inner providers cannot be listed; the provider is then
    /// kept as a single opaque entry.
    Chained(Option<&'a [Box<dyn Provider>]>),

    /// In-memory key/value pairs.
    Memory,

    /// Anything else.
    Other,
}

impl ProviderDetails<'_> {
    /// Returns `true` for an environment provider without a usable prefix.
    pub fn is_global_environment(&self) -> bool {
        match self {
            ProviderDetails::Environment { prefix } => {
                prefix.is_none_or(|prefix| prefix.trim().is_empty())
            }
            _ => false,
        }
    }
}

/// Case-insensitive key/value map shared by the built-in providers.
///
/// The first casing inserted for a key is the one reported by
/// [`child_keys`](Self::child_keys); later inserts replace the value only.
#[derive(Clone, Default)]
pub struct KeyValueStore {
    entries: BTreeMap<String, (String, String)>,
}

impl KeyValueStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();

        match self.entries.entry(key::fold(&key)) {
            Entry::Occupied(mut entry) => entry.get_mut().1 = value,
            Entry::Vacant(entry) => {
                entry.insert((key, value));
            }
        }
    }

    /// Looks up a key ignoring case.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(&key::fold(key))
            .map(|(_, value)| value.as_str())
    }

    /// Immediate child segments below `parent`.
    pub fn child_keys(&self, parent: Option<&str>) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut children = Vec::new();

        for (original, _) in self.entries.values() {
            if let Some(segment) = key::child_segment(original, parent)
                && seen.insert(key::fold(segment))
            {
                children.push(segment.to_string());
            }
        }

        children
    }

    /// Iterates keys in their original casing.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(|(key, _)| key.as_str())
    }

    /// Iterates `(key, value)` pairs, keys in their original casing.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .values()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// Values may be secrets; only keys are shown.
impl Debug for KeyValueStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyValueStore")
            .field("keys", &self.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for KeyValueStore {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut store = Self::new();
        for (key, value) in iter {
            store.insert(key, value);
        }
        store
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for KeyValueStore {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}
