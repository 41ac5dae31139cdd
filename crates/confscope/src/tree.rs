//! The configuration key tree.
//!
//! Every key the configuration knows about becomes a [`KeyNode`] carrying
//! the [`ValueStack`] resolved for it. Siblings are ordered branches first,
//! then value-bearing nodes, each group alphabetically.

use std::cmp::Ordering;

use crate::config::Configuration;
use crate::key;
use crate::macros::debug;
use crate::normalize::ProviderEntry;
use crate::resolve::{self, ValueStack};

/// A key in the tree.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyNode {
    /// Key segment; empty for the root.
    pub name: String,
    /// Child keys in display order.
    pub children: Vec<KeyNode>,
    /// Values defined for this exact key.
    pub values: ValueStack,
}

impl KeyNode {
    /// Returns `true` if no normalized provider defines this key.
    pub fn is_branch(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns `true` if this node or any descendant carries a value.
    pub fn has_values(&self) -> bool {
        !self.values.is_empty() || self.children.iter().any(KeyNode::has_values)
    }

    /// Finds a descendant by `:`-delimited path, ignoring case.
    pub fn find(&self, path: &str) -> Option<&KeyNode> {
        path.split(key::KEY_DELIMITER).try_fold(self, |node, segment| {
            node.children.iter().find(|child| key::eq(&child.name, segment))
        })
    }

    /// Visits every descendant depth-first with its full path.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&str, &'a KeyNode)) {
        self.walk_from(None, visit);
    }

    fn walk_from<'a>(&'a self, path: Option<&str>, visit: &mut impl FnMut(&str, &'a KeyNode)) {
        for child in &self.children {
            let child_path = key::combine(path, &child.name);
            visit(&child_path, child);
            child.walk_from(Some(&child_path), visit);
        }
    }

    /// Number of descendants.
    pub fn len(&self) -> usize {
        self.children.iter().map(|child| 1 + child.len()).sum()
    }

    /// Returns `true` if the node has no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// Builds the full key tree of `config`, resolving every key against
/// `providers`.
pub fn build(providers: &[ProviderEntry<'_>], config: &dyn Configuration) -> KeyNode {
    let root = KeyNode {
        name: String::new(),
        children: build_children(providers, config, None),
        values: ValueStack::default(),
    };

    debug!(keys = root.len(), "built key tree");

    root
}

fn build_children(
    providers: &[ProviderEntry<'_>],
    config: &dyn Configuration,
    path: Option<&str>,
) -> Vec<KeyNode> {
    let mut children: Vec<KeyNode> = config
        .child_keys(path)
        .into_iter()
        .map(|name| {
            let full_path = key::combine(path, &name);
            KeyNode {
                values: resolve::resolve(providers, &full_path),
                children: build_children(providers, config, Some(&full_path)),
                name,
            }
        })
        .collect();

    children.sort_by(sibling_order);
    children
}

/// Branches before value-bearing nodes, then by name.
pub fn sibling_order(a: &KeyNode, b: &KeyNode) -> Ordering {
    b.is_branch()
        .cmp(&a.is_branch())
        .then_with(|| key::compare(&a.name, &b.name))
}
