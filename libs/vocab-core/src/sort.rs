//! Sort-column allow-lists and order parsing.
//!
//! Nothing taken verbatim from a query string is ever interpolated into
//! SQL text: sort columns are resolved against fixed allow-lists and the
//! order keyword against exactly `asc`/`desc`.

use crate::error::{QueryError, Result};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// Parse an `order` query parameter, falling back to `default` when absent.
    pub fn parse(raw: Option<&str>, default: SortOrder) -> Result<SortOrder> {
        match raw {
            None => Ok(default),
            Some(raw) => match raw.to_ascii_lowercase().as_str() {
                "asc" => Ok(SortOrder::Asc),
                "desc" => Ok(SortOrder::Desc),
                _ => Err(QueryError::InvalidOrder),
            },
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Validate a `sort_by` parameter against a resource's allow-list.
///
/// Returns the allow-listed string (never the raw input), or the default
/// column when the parameter is absent.
pub fn validate_column<'a>(
    raw: Option<&str>,
    allowed: &[&'a str],
    default: &'a str,
) -> Result<&'a str> {
    match raw {
        None => Ok(default),
        Some(raw) => allowed
            .iter()
            .find(|column| **column == raw)
            .copied()
            .ok_or_else(|| QueryError::InvalidSortColumn {
                allowed: allowed.join(", "),
            }),
    }
}

/// Translation table from external sort keys to internal SQL expressions.
///
/// Used where the API exposes camelCase sort keys that do not match the
/// underlying columns (the group study-session listing).
pub struct SortKeyMap {
    entries: &'static [(&'static str, &'static str)],
    default: &'static str,
}

impl SortKeyMap {
    pub const fn new(
        entries: &'static [(&'static str, &'static str)],
        default: &'static str,
    ) -> Self {
        Self { entries, default }
    }

    /// Resolve an external sort key to its SQL expression.
    ///
    /// Absent input resolves to the default expression; unmapped keys are
    /// rejected.
    pub fn resolve(&self, raw: Option<&str>) -> Result<&'static str> {
        match raw {
            None => Ok(self.default),
            Some(raw) => self
                .entries
                .iter()
                .find(|(key, _)| *key == raw)
                .map(|(_, expr)| *expr)
                .ok_or_else(|| QueryError::InvalidSortColumn {
                    allowed: self
                        .entries
                        .iter()
                        .map(|(key, _)| *key)
                        .collect::<Vec<_>>()
                        .join(", "),
                }),
        }
    }
}
