#![allow(unused_imports)]
#![allow(unused_macros)]

// Logging macros for confscope.
//
// These forward to `tracing` when the `tracing` feature is enabled and
// compile to nothing otherwise. Callers must never pass configuration values.

// -----------------------------------------------------------------------------
// trace! - per-key resolution, hot loops
// -----------------------------------------------------------------------------

#[cfg(any(feature = "tracing", test))]
macro_rules! trace {
    ($($arg:tt)*) => { ::tracing::trace!($($arg)*) }
}

#[cfg(not(any(feature = "tracing", test)))]
macro_rules! trace {
    ($($arg:tt)*) => {};
}

// -----------------------------------------------------------------------------
// debug! - provider decisions, file loads, tree sizes
// -----------------------------------------------------------------------------

#[cfg(any(feature = "tracing", test))]
macro_rules! debug {
    ($($arg:tt)*) => { ::tracing::debug!($($arg)*) }
}

#[cfg(not(any(feature = "tracing", test)))]
macro_rules! debug {
    ($($arg:tt)*) => {};
}

// -----------------------------------------------------------------------------
// warning! - degraded introspection
// -----------------------------------------------------------------------------

#[cfg(any(feature = "tracing", test))]
macro_rules! warning {
    ($($arg:tt)*) => { ::tracing::warn!($($arg)*) }
}

#[cfg(not(any(feature = "tracing", test)))]
macro_rules! warning {
    ($($arg:tt)*) => {};
}

pub(crate) use debug;
pub(crate) use trace;
pub(crate) use warning;
