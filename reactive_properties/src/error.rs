//! Errors returned when a property cannot be constructed.

use thiserror::Error;

/// Errors that can occur while constructing a property.
///
/// Properties validate their arguments up front; once a property exists, nothing in this crate
/// returns an error. A compute function that panics while reacting to a change propagates
/// that panic out of the `set` that triggered it.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyError {
    /// A derived property was given an empty list of dependencies.
    #[error("a derived property needs at least one dependency")]
    NoDependencies,
    /// A multi-level property's accessor did not read any property through a tracked read.
    #[error(
        "the accessor of a multi-level property did not read any property, \
         so it would never update"
    )]
    NothingTracked,
    /// A tentative property was given a zero duration.
    #[error("a tentative property needs a non-zero override duration")]
    ZeroDuration,
    /// A tentative property was created outside of a Tokio runtime.
    #[error(
        "a tentative property must be created inside a Tokio runtime, or \
         given a runtime handle explicitly"
    )]
    NoRuntime,
}
