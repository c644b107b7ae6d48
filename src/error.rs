//! Error types for the data layer.

use thiserror::Error;

/// Problems reported while processing entries.
///
/// None of these are returned from `push`; they are logged and sent on the
/// diagnostics channel, and the offending unit of work is skipped.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DataLayerError {
    #[error("The following item cannot be handled by the data layer because it does not have a valid format: {0}")]
    InvalidItem(String),

    #[error("Handler for '{event}' failed: {message}")]
    HandlerFailed { event: String, message: String },

    #[error("Handler for '{event}' panicked: {message}")]
    HandlerPanicked { event: String, message: String },
}

/// Error type handlers may return.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Return type of a handler.
pub type HandlerResult = std::result::Result<(), HandlerError>;

/// Result type for data layer operations.
pub type Result<T> = std::result::Result<T, DataLayerError>;
