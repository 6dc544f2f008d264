//! Result shapes returned by the gateway.
//!
//! Field names match what the model sees in function results, so these types
//! serialize straight into tool output.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A result row keyed by column name, in column order.
pub type Row = Map<String, Value>;

/// Column metadata as reported by `PRAGMA table_info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,
    /// Declared type (may be empty in SQLite).
    #[serde(rename = "type")]
    pub data_type: String,
    /// Whether the column carries `NOT NULL`.
    pub not_null: bool,
    /// Default value expression, if any.
    pub default_value: Option<String>,
    /// Whether the column is part of the primary key.
    pub primary_key: bool,
}

impl ColumnInfo {
    /// Whether the column accepts NULL.
    #[must_use]
    pub const fn nullable(&self) -> bool {
        !self.not_null
    }
}

/// Rows produced by a query, with columns in the order the store reports them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryRows {
    /// Column names in statement order.
    pub columns: Vec<String>,
    /// Result rows.
    pub rows: Vec<Row>,
}

impl QueryRows {
    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Name, columns and row count of one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    /// Table name.
    pub table_name: String,
    /// Column metadata.
    pub columns: Vec<ColumnInfo>,
    /// Number of rows.
    pub row_count: u64,
}

/// Name and declared type of a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnType {
    /// Column name.
    pub name: String,
    /// Declared type.
    #[serde(rename = "type")]
    pub data_type: String,
}

/// Summary statistics of one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableStatistics {
    /// Table name.
    pub table_name: String,
    /// Number of rows.
    pub row_count: u64,
    /// Number of columns.
    pub column_count: usize,
    /// Declared type of each column, in order.
    pub column_types: Vec<ColumnType>,
}

/// Metadata of one table inside a [`DatabaseContext`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableContext {
    /// Table name.
    pub name: String,
    /// Number of rows.
    pub row_count: u64,
    /// Number of columns.
    pub column_count: usize,
    /// Column metadata.
    pub columns: Vec<ColumnInfo>,
    /// First rows of the table, when samples were requested and the table is not empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_data: Option<Vec<Row>>,
}

/// Snapshot of every table in the store. Built on demand, never cached.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatabaseContext {
    /// Number of tables.
    pub table_count: usize,
    /// Per-table metadata.
    pub tables: Vec<TableContext>,
}
