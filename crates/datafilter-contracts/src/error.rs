//! Error taxonomy for the datafilter engine.
//!
//! All fallible operations return `DataFilterResult<T>`. A reconciliation
//! whose preconditions are unmet is not an error; it is reported as an
//! aborted outcome by the reconciler.

use thiserror::Error;

/// The unified error type for the datafilter crates.
#[derive(Debug, Error)]
pub enum DataFilterError {
    /// A filter registration is malformed or conflicts with another.
    ///
    /// Raised while building the registry or declaring filters at bootstrap;
    /// it is fatal to startup and never occurs at request time.
    #[error("configuration error: {reason}")]
    Configuration { reason: String },

    /// A principal, basis or entity type passed to an operation is empty or
    /// does not resolve. Not retried.
    #[error("invalid reference: {reason}")]
    InvalidReference { reason: String },

    /// The backing store could not be read or written.
    ///
    /// Surfaced unchanged; retry policy belongs to the storage collaborator.
    #[error("persistence error: {reason}")]
    Persistence { reason: String },
}

impl DataFilterError {
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence { .. })
    }
}

/// Convenience alias used throughout the datafilter crates.
pub type DataFilterResult<T> = Result<T, DataFilterError>;
