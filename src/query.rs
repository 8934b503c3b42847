use crate::types::RowValues;

/// A SQL string and its bound parameters bundled together.
///
/// Batches handed to [`StoreConnection::execute_batch`](crate::store::StoreConnection::execute_batch)
/// are slices of these:
/// ```rust
/// use sql_tables::prelude::*;
///
/// let qp = QueryAndParams::new(
///     "DELETE FROM \"widgets\" WHERE \"Id\" = ?1",
///     vec![RowValues::Int(1)],
/// );
/// # let _ = qp;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct QueryAndParams {
    /// The SQL query string
    pub query: String,
    /// The parameters to be bound to the query
    pub params: Vec<RowValues>,
}

impl QueryAndParams {
    /// Create a new `QueryAndParams` with the given query string and parameters
    pub fn new(query: impl Into<String>, params: Vec<RowValues>) -> Self {
        Self {
            query: query.into(),
            params,
        }
    }

    /// Create a new `QueryAndParams` with no parameters
    pub fn new_without_params(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            params: Vec::new(),
        }
    }
}
