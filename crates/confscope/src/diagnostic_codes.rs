//! Centralized registry of diagnostic error codes used throughout confscope.
//!
//! These constants document all error codes used in `#[diagnostic(code(...))]`
//! attributes. Proc-macro attributes require literal strings, so this module
//! is the single place to match codes programmatically.
//!
//! | Code | Description |
//! |------|-------------|
//! | `confscope::file::not_found` | Required configuration file missing |
//! | `confscope::file::read_error` | Configuration file unreadable |
//! | `confscope::file::unknown_format` | Unrecognized file extension |
//! | `confscope::file::parse_error` | File content failed to parse |
//! | `confscope::bind_error` | Section could not be bound to a type |
//! | `confscope::multiple_errors` | Several errors occurred |
//! | `confscope::render_error` | Report could not be written |
//!
//! # Example
//!
//! ```rust,ignore
//! use confscope::diagnostic_codes;
//! use miette::Diagnostic;
//!
//! if error.code().map(|c| c.to_string()).as_deref() == Some(diagnostic_codes::FILE_NOT_FOUND) {
//!     eprintln!("a configuration file is missing");
//! }
//! ```

/// Required configuration file not found.
pub const FILE_NOT_FOUND: &str = "confscope::file::not_found";

/// Configuration file could not be read.
pub const FILE_READ_ERROR: &str = "confscope::file::read_error";

/// Configuration file extension not recognized.
pub const FILE_UNKNOWN_FORMAT: &str = "confscope::file::unknown_format";

/// Configuration file parsing failed.
pub const FILE_PARSE_ERROR: &str = "confscope::file::parse_error";

/// A configuration section could not be bound to the requested type.
pub const BIND_ERROR: &str = "confscope::bind_error";

/// Multiple errors occurred.
pub const MULTIPLE_ERRORS: &str = "confscope::multiple_errors";

/// Writing the report to its sink failed.
pub const RENDER_ERROR: &str = "confscope::render_error";
