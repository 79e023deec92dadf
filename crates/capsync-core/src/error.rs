//! Core error types.

/// Errors raised by the core crate.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The definitions directory could not be read.
    #[error("failed to read definitions directory {path}: {source}")]
    ReadDir {
        /// Directory that was being enumerated.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Error returned by a [`crate::PolicyStore`] operation.
///
/// Stores wrap their own error types into this one so the applier can record
/// the detail in the run summary without knowing the transport.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct StoreError(pub String);

impl StoreError {
    /// Wrap any displayable error.
    pub fn new(detail: impl std::fmt::Display) -> Self {
        Self(detail.to_string())
    }
}
