//! Dynamic SELECT/COUNT composition with positional parameters.
//!
//! Builds the row query and its matching count query from the same WHERE
//! predicate so page counts always reflect the active filters. SQL text
//! only ever contains allow-listed column names (see [`crate::sort`]);
//! every client-supplied value travels as a positional parameter.

use crate::pagination::Pagination;
use crate::sort::SortOrder;

/// A positional statement parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlParam {
    Int(i64),
    Text(String),
}

/// A finished query pair: the page query and its count query, each with
/// parameters in placeholder order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltQuery {
    pub query: String,
    pub params: Vec<SqlParam>,
    pub count_query: String,
    pub count_params: Vec<SqlParam>,
}

/// Incrementally assembles a filtered, sorted, paginated SELECT.
pub struct SelectBuilder {
    select: String,
    count_select: String,
    conditions: Vec<String>,
    params: Vec<SqlParam>,
}

impl SelectBuilder {
    /// `select` is the full row query up to (not including) WHERE;
    /// `count_select` is the corresponding `SELECT COUNT(*) ...` prefix.
    pub fn new(select: impl Into<String>, count_select: impl Into<String>) -> Self {
        Self {
            select: select.into(),
            count_select: count_select.into(),
            conditions: Vec::new(),
            params: Vec::new(),
        }
    }

    /// AND a condition containing exactly one `?` placeholder.
    pub fn filter(&mut self, condition: &str, param: SqlParam) {
        self.conditions.push(condition.to_string());
        self.params.push(param);
    }

    /// AND a substring match over one or more text columns.
    ///
    /// `%` and `_` in the term keep their LIKE wildcard meaning.
    pub fn search(&mut self, columns: &[&str], term: &str) {
        let clause = columns
            .iter()
            .map(|column| format!("{column} LIKE ?"))
            .collect::<Vec<_>>()
            .join(" OR ");
        self.conditions.push(format!("({clause})"));
        let pattern = format!("%{term}%");
        for _ in columns {
            self.params.push(SqlParam::Text(pattern.clone()));
        }
    }

    /// Finish the pair. `order_by` must already be allow-list validated.
    pub fn build(&self, order_by: &str, order: SortOrder, pagination: &Pagination) -> BuiltQuery {
        let where_clause = if self.conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.conditions.join(" AND "))
        };

        let query = format!(
            "{}{} ORDER BY {} {} LIMIT ? OFFSET ?",
            self.select,
            where_clause,
            order_by,
            order.as_sql()
        );
        let mut params = self.params.clone();
        params.push(SqlParam::Int(pagination.per_page));
        params.push(SqlParam::Int(pagination.offset()));

        BuiltQuery {
            query,
            params,
            count_query: format!("{}{}", self.count_select, where_clause),
            count_params: self.params.clone(),
        }
    }
}
