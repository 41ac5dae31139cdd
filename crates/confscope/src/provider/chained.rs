//! Provider backed by another configuration root.

use std::sync::Arc;

use crate::config::{ConfigRoot, Configuration};

use super::{Provider, ProviderDetails};

/// Provider that layers a whole [`ConfigRoot`] as a single source.
///
/// Reports expand it into the providers of the inner root, recursively.
#[derive(Clone, Debug)]
pub struct ChainedProvider {
    root: Arc<ConfigRoot>,
}

impl ChainedProvider {
    /// Wraps a shared root.
    pub fn new(root: Arc<ConfigRoot>) -> Self {
        Self { root }
    }

    /// The wrapped root.
    pub fn root(&self) -> &Arc<ConfigRoot> {
        &self.root
    }
}

impl Provider for ChainedProvider {
    fn kind_name(&self) -> &str {
        "ChainedProvider"
    }

    fn try_get(&self, key: &str) -> Option<String> {
        self.root.get(key)
    }

    fn child_keys(&self, parent: Option<&str>) -> Vec<String> {
        self.root.child_keys(parent)
    }

    fn details(&self) -> ProviderDetails<'_> {
        ProviderDetails::Chained(Some(self.root.provider_list()))
    }
}
