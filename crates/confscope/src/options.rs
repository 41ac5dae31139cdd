//! Report options, bound from the configuration being inspected.

use serde::Deserialize;

use crate::bind::{self, bool_from_str};
use crate::config::Configuration;
use crate::Error;

/// What the report shows.
///
/// Bound from the [`SECTION`](Self::SECTION) section of the inspected
/// configuration; keys are case-insensitive and every flag defaults to `true`.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReportOptions {
    /// Show the environment table.
    #[serde(rename = "displayenvironment", deserialize_with = "bool_from_str")]
    pub display_environment: bool,

    /// Show the provider table and key tree.
    #[serde(rename = "displayconfig", deserialize_with = "bool_from_str")]
    pub display_config: bool,

    /// Hide environment providers without a prefix.
    #[serde(rename = "ignoreglobalenvironment", deserialize_with = "bool_from_str")]
    pub ignore_global_environment: bool,

    /// Mask values under sensitive-looking keys.
    #[serde(rename = "redactsecrets", deserialize_with = "bool_from_str")]
    pub redact_secrets: bool,
}

impl ReportOptions {
    /// Configuration section the options are read from.
    pub const SECTION: &'static str = "HostInfo";

    /// Binds the options from `config`, falling back to defaults for
    /// anything not set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Bind`] if a flag is not `true` or `false`.
    pub fn from_config(config: &dyn Configuration) -> Result<Self, Error> {
        bind::bind(config, Self::SECTION)
    }
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            display_environment: true,
            display_config: true,
            ignore_global_environment: true,
            redact_secrets: true,
        }
    }
}
