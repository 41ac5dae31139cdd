//! # confscope
//!
//! Introspection and reporting for layered configuration.
//!
//! `confscope` answers "where did this setting come from?". Given a stack of
//! configuration providers (in-memory defaults, files, environment variables,
//! whole nested configuration roots) it resolves every key against every
//! provider and renders a diagnostic report showing the winning value, the
//! values it overrode, and which provider supplied each one.
//!
//! ## Features
//!
//! - **Layered configuration** - [`ConfigBuilder`] stacks providers, last wins
//! - **Provider normalization** - chained roots are expanded into their own
//!   providers; the unprefixed process environment is hidden by default
//! - **Key tree** - every key, sorted branches first, with its full value stack
//! - **Value classification** - numbers, booleans, links and connection strings
//!   are styled distinctly
//! - **Secret redaction** - values under keys containing `key`, `password` or
//!   `secret` are masked
//! - **Rich diagnostics** - loading errors render with source spans via [`miette`]
//!
//! ## Quick Start
//!
//! ```no_run
//! use confscope::{ConfigBuilder, HostEnvironment, HostReport};
//!
//! fn main() -> Result<(), confscope::Error> {
//!     let config = ConfigBuilder::new()
//!         .in_memory([("HostInfo:RedactSecrets", "true")])
//!         .file_optional("appsettings.json")
//!         .env_prefix("APP_")
//!         .build()?;
//!
//!     let host = HostEnvironment::detect("my-service", "1.0.0");
//!     HostReport::new(&host, &config)?.print()
//! }
//! ```
//!
//! ## Report Options
//!
//! The report configures itself from the `HostInfo` section of the
//! configuration it inspects:
//!
//! | Key | Default |
//! |-----|---------|
//! | `HostInfo:DisplayEnvironment` | `true` |
//! | `HostInfo:DisplayConfig` | `true` |
//! | `HostInfo:IgnoreGlobalEnvironment` | `true` |
//! | `HostInfo:RedactSecrets` | `true` |
//!
//! ## Feature Flags
//!
//! | Feature | Description | Default |
//! |---------|-------------|---------|
//! | `toml` | TOML file providers | Yes |
//! | `yaml` | YAML file providers | Yes |
//! | `dotenv` | dotenv file providers | Yes |
//! | `tracing` | `tracing` instrumentation | No |

mod macros;

pub mod bind;
pub mod config;
pub mod diagnostic_codes;
pub mod environment;
pub mod file;
pub mod key;
pub mod normalize;
pub mod options;
pub mod provider;
pub mod render;
pub mod report;
pub mod resolve;
pub mod tree;
pub mod value;

pub use config::{ConfigBuilder, ConfigRoot, ConfigSection, Configuration};
pub use environment::{Architecture, HostEnvironment, RuntimeInfo};
pub use file::{FileDetails, FileError, FileFormat, FileProvider};
pub use options::ReportOptions;
pub use provider::{
    ChainedProvider, EnvProvider, KeyValueStore, MemoryProvider, Provider, ProviderDetails,
};
pub use render::{Renderer, TerminalRenderer};
pub use report::HostReport;

use miette::Diagnostic;

/// Errors that can occur while loading configuration or writing a report.
///
/// Introspection itself never fails: missing keys, opaque providers and
/// unclassifiable values all degrade gracefully. Only loading files, binding
/// options and writing output return errors.
///
/// # Diagnostic Codes
///
/// | Code | Meaning |
/// |------|---------|
/// | `confscope::file::*` | A configuration file could not be loaded |
/// | `confscope::bind_error` | A section could not be bound to a type |
/// | `confscope::multiple_errors` | Several errors occurred |
/// | `confscope::render_error` | The report could not be written |
#[derive(Debug, Diagnostic, thiserror::Error)]
pub enum Error {
    /// A configuration file could not be loaded.
    ///
    /// Transparent, so miette shows the file error's source snippet.
    #[error(transparent)]
    #[diagnostic(transparent)]
    File(#[from] FileError),

    /// A configuration section could not be deserialized.
    #[error("invalid configuration at `{path}`: {message}")]
    #[diagnostic(code(confscope::bind_error))]
    Bind {
        /// Key path of the offending value (`:`-delimited).
        path: String,
        /// Description of what went wrong.
        message: String,
        /// Suggestion for how to fix.
        #[help]
        help: String,
    },

    /// Multiple errors occurred.
    #[error("{} configuration error(s) occurred", .errors.len())]
    #[diagnostic(
        code(confscope::multiple_errors),
        help("fix all listed configuration errors")
    )]
    Multiple {
        /// All accumulated errors.
        #[related]
        errors: Vec<Error>,
    },

    /// Writing the report failed.
    #[error("failed to write report")]
    #[diagnostic(
        code(confscope::render_error),
        help("check that the output stream is still open")
    )]
    Render(#[from] std::io::Error),
}

impl Error {
    /// Combines accumulated errors.
    ///
    /// Returns `None` for no errors and the error itself for exactly one.
    pub fn multiple(mut errors: Vec<Error>) -> Option<Self> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(Error::Multiple { errors }),
        }
    }
}
