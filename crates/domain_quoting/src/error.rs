//! Quoting errors

use core_kernel::PortError;
use thiserror::Error;

/// Errors surfaced by the quote service
///
/// Underwriting and rating outcomes (refer, no premium row) are part of a
/// successful [`QuoteResult`](crate::QuoteResult); these errors cover
/// requests that cannot be processed at all.
#[derive(Debug, Error)]
pub enum QuoteError {
    /// The request failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// The snapshot could not be loaded
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] PortError),

    /// A concurrent evaluation task failed
    #[error("Evaluation task failed: {0}")]
    Task(String),
}

impl QuoteError {
    pub fn validation(message: impl Into<String>) -> Self {
        QuoteError::Validation(message.into())
    }
}

impl From<validator::ValidationErrors> for QuoteError {
    fn from(errors: validator::ValidationErrors) -> Self {
        QuoteError::Validation(errors.to_string())
    }
}
