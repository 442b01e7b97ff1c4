//! Error types for vocab-core.

use thiserror::Error;

/// Result type alias using QueryError.
pub type Result<T> = std::result::Result<T, QueryError>;

/// Errors raised while validating list-query parameters.
///
/// Messages are client-facing; the backend maps every variant to a 400.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("Invalid page number")]
    InvalidPage,

    #[error("Page number must be positive")]
    NonPositivePage,

    #[error("Invalid pagination parameters")]
    InvalidPerPage,

    #[error("Invalid sort_by parameter. Must be one of: {allowed}")]
    InvalidSortColumn { allowed: String },

    #[error("Invalid order parameter. Must be 'asc' or 'desc'")]
    InvalidOrder,

    #[error("Invalid group_id parameter")]
    InvalidGroupId,
}
