//! Pagination parameter validation and arithmetic.

use crate::error::{QueryError, Result};

/// Validated pagination window for a list query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
}

impl Pagination {
    /// Parse a page number for a resource with a fixed page size.
    ///
    /// Non-numeric or non-positive input is rejected rather than
    /// silently defaulted.
    pub fn fixed(page: Option<&str>, page_size: i64) -> Result<Self> {
        Ok(Self {
            page: parse_page(page)?,
            per_page: page_size,
        })
    }

    /// Parse page and per_page for a resource with a client-set page size.
    ///
    /// `per_page` must fall in `1..=max_per_page`.
    pub fn bounded(
        page: Option<&str>,
        per_page: Option<&str>,
        default_per_page: i64,
        max_per_page: i64,
    ) -> Result<Self> {
        let page = parse_page(page)?;
        let per_page = match per_page {
            None => default_per_page,
            Some(raw) => {
                let value: i64 = raw
                    .trim()
                    .parse()
                    .map_err(|_| QueryError::InvalidPerPage)?;
                if !(1..=max_per_page).contains(&value) {
                    return Err(QueryError::InvalidPerPage);
                }
                value
            }
        };
        Ok(Self { page, per_page })
    }

    /// Row offset of the first item on this page.
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }

    /// Number of pages needed for `total` matching rows (ceiling division).
    pub fn total_pages(&self, total: i64) -> i64 {
        (total + self.per_page - 1) / self.per_page
    }
}

fn parse_page(raw: Option<&str>) -> Result<i64> {
    let page = match raw {
        None => 1,
        Some(raw) => raw.trim().parse().map_err(|_| QueryError::InvalidPage)?,
    };
    if page < 1 {
        return Err(QueryError::NonPositivePage);
    }
    Ok(page)
}
