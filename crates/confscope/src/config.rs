//! Layered configuration roots.
//!
//! A [`ConfigRoot`] is an ordered list of providers. Later providers override
//! earlier ones: [`Configuration::get`] returns the value of the last provider
//! that defines the key.
//!
//! # Layering Order
//!
//! Providers are queried in the order they were added, so a typical setup
//!
//! 1. in-memory defaults
//! 2. `appsettings.json`
//! 3. `appsettings.Development.json`
//! 4. environment variables with prefix `APP_`
//!
//! lets environment variables win over every file.

use std::fmt::{self, Debug, Formatter};

use crate::key;
use crate::provider::Provider;

mod builder;

pub use builder::ConfigBuilder;

/// Read access to a configuration tree.
pub trait Configuration {
    /// Effective value of a key path, if any provider defines it.
    fn get(&self, key: &str) -> Option<String>;

    /// Immediate child segments below `path` (`None` = root), in first-seen
    /// order with duplicates (ignoring case) removed.
    fn child_keys(&self, path: Option<&str>) -> Vec<String>;

    /// The ordered providers, when this configuration exposes them.
    ///
    /// Sections and other views return `None`; reports then skip the
    /// configuration part.
    fn providers(&self) -> Option<&[Box<dyn Provider>]> {
        None
    }
}

/// An ordered stack of providers.
pub struct ConfigRoot {
    providers: Vec<Box<dyn Provider>>,
}

impl ConfigRoot {
    /// Creates a root from providers in override order (last wins).
    pub fn new(providers: Vec<Box<dyn Provider>>) -> Self {
        Self { providers }
    }

    /// Starts a [`ConfigBuilder`].
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// The providers in override order.
    pub fn provider_list(&self) -> &[Box<dyn Provider>] {
        &self.providers
    }

    /// A view of the subtree below `path`.
    pub fn section(&self, path: impl Into<String>) -> ConfigSection<'_> {
        ConfigSection {
            root: self,
            path: path.into(),
        }
    }
}

impl Debug for ConfigRoot {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigRoot")
            .field("providers", &self.providers)
            .finish()
    }
}

impl Configuration for ConfigRoot {
    fn get(&self, key: &str) -> Option<String> {
        self.providers
            .iter()
            .rev()
            .find_map(|provider| provider.try_get(key))
    }

    fn child_keys(&self, path: Option<&str>) -> Vec<String> {
        let mut children = Vec::new();
        for provider in &self.providers {
            key::merge_segments(&mut children, provider.child_keys(path));
        }
        children
    }

    fn providers(&self) -> Option<&[Box<dyn Provider>]> {
        Some(&self.providers)
    }
}

/// A subtree of a [`ConfigRoot`], addressed with keys relative to `path`.
#[derive(Clone, Debug)]
pub struct ConfigSection<'a> {
    root: &'a ConfigRoot,
    path: String,
}

impl ConfigSection<'_> {
    /// Full path of this section.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Last segment of the path.
    pub fn key(&self) -> &str {
        key::last_segment(&self.path)
    }

    /// The section's own value.
    pub fn value(&self) -> Option<String> {
        self.root.get(&self.path)
    }

    /// Returns `true` if the section has a value or any children.
    pub fn exists(&self) -> bool {
        self.value().is_some() || !self.child_keys(None).is_empty()
    }

    fn absolute(&self, relative: Option<&str>) -> String {
        match relative {
            Some(relative) => key::combine(Some(&self.path), relative),
            None => self.path.clone(),
        }
    }
}

impl Configuration for ConfigSection<'_> {
    fn get(&self, key: &str) -> Option<String> {
        self.root.get(&self.absolute(Some(key)))
    }

    fn child_keys(&self, path: Option<&str>) -> Vec<String> {
        self.root.child_keys(Some(&self.absolute(path)))
    }
}
