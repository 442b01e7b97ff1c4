//! Core query-composition library shared by the vocabulary backend.
//!
//! Provides:
//! - Pagination parameter validation and offset/page-count arithmetic
//! - Sort-column allow-lists, order parsing and external sort-key translation
//! - Dynamic SELECT/COUNT assembly with positional parameters

pub mod error;
pub mod pagination;
pub mod query;
pub mod sort;

pub use error::{QueryError, Result};
pub use pagination::Pagination;
pub use query::{BuiltQuery, SelectBuilder, SqlParam};
pub use sort::{validate_column, SortKeyMap, SortOrder};
