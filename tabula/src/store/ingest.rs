//! Table ingestion.
//!
//! Uploads arrive as already-parsed records (one JSON object per row). This
//! module names the table and its columns, infers a SQLite type per column and
//! writes everything in one transaction, replacing any table of the same name.

use std::collections::HashSet;
use std::path::Path;

use rusqlite::{Connection, params_from_iter};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use super::error::{StoreError, StoreResult};
use super::identifier::{MAX_IDENTIFIER_LEN, quote_identifier};
use super::value::to_sql;

/// Table name used when nothing usable can be derived.
pub const FALLBACK_TABLE_NAME: &str = "uploaded_data";

/// Prefix SQLite keeps for its own tables.
pub const RESERVED_TABLE_PREFIX: &str = "sqlite_";

/// A table upload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableImport {
    /// Explicit table name; sanitized before use.
    #[serde(default)]
    pub table_name: Option<String>,
    /// Original file name; its stem names the table when `table_name` is absent.
    #[serde(default)]
    pub file_name: Option<String>,
    /// Records to insert.
    pub rows: Vec<Map<String, Value>>,
}

impl TableImport {
    /// Create an upload into `table_name`.
    #[must_use]
    pub fn new(table_name: impl Into<String>, rows: Vec<Map<String, Value>>) -> Self {
        Self {
            table_name: Some(table_name.into()),
            file_name: None,
            rows,
        }
    }

    /// Resolve the sanitized table name.
    #[must_use]
    pub fn resolved_table_name(&self) -> String {
        match (&self.table_name, &self.file_name) {
            (Some(name), _) if !name.trim().is_empty() => sanitize_table_name(name),
            (_, Some(file)) => {
                let stem = Path::new(file)
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                sanitize_table_name(&stem)
            }
            _ => FALLBACK_TABLE_NAME.to_owned(),
        }
    }
}

/// Outcome of an upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    /// Name of the created table.
    pub table_name: String,
    /// Rows written.
    pub rows_inserted: usize,
    /// Column names as created.
    pub columns: Vec<String>,
    /// Rows in the upload.
    pub total_rows: usize,
    /// Columns in the upload.
    pub total_columns: usize,
}

/// Derive a table name: non-alphanumerics become `_`, a leading non-letter gets
/// a `table_` prefix, the result is lower-cased and cut to 64 characters.
#[must_use]
pub fn sanitize_table_name(raw: &str) -> String {
    let mut name = sanitize_column_name(raw);
    if name.is_empty() {
        return FALLBACK_TABLE_NAME.to_owned();
    }
    if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        name.insert_str(0, "table_");
    }
    name.make_ascii_lowercase();
    name.truncate(MAX_IDENTIFIER_LEN);
    name
}

/// Derive a column name: every non-alphanumeric character becomes `_`.
#[must_use]
pub fn sanitize_column_name(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// SQLite storage class chosen for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Integers and booleans.
    Integer,
    /// Any number with a fractional part.
    Real,
    /// Everything else.
    Text,
}

impl ColumnKind {
    /// SQL type name.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Real => "REAL",
            Self::Text => "TEXT",
        }
    }

    fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(_) => Some(Self::Integer),
            Value::Number(n) if n.is_i64() || n.is_u64() => Some(Self::Integer),
            Value::Number(_) => Some(Self::Real),
            _ => Some(Self::Text),
        }
    }

    const fn widen(self, other: Self) -> Self {
        match (self, other) {
            (Self::Integer, Self::Integer) => Self::Integer,
            (Self::Text, _) | (_, Self::Text) => Self::Text,
            _ => Self::Real,
        }
    }
}

/// One planned column: the key in the upload and the name in the table.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PlannedColumn {
    source: String,
    name: String,
    kind: ColumnKind,
}

/// Collect columns in first-seen key order and infer their types.
fn plan_columns(rows: &[Map<String, Value>]) -> Vec<PlannedColumn> {
    let mut seen = HashSet::new();
    let mut taken = HashSet::new();
    let mut columns: Vec<PlannedColumn> = Vec::new();

    for row in rows {
        for key in row.keys() {
            if !seen.insert(key.clone()) {
                continue;
            }
            let mut base = sanitize_column_name(key);
            if base.is_empty() {
                base = format!("column_{}", columns.len() + 1);
            }
            let mut name = base.clone();
            let mut suffix = 2;
            while !taken.insert(name.to_ascii_lowercase()) {
                name = format!("{base}_{suffix}");
                suffix += 1;
            }
            columns.push(PlannedColumn {
                source: key.clone(),
                name,
                kind: ColumnKind::Integer,
            });
        }
    }

    for column in &mut columns {
        column.kind = rows
            .iter()
            .filter_map(|row| row.get(&column.source).and_then(ColumnKind::of))
            .reduce(ColumnKind::widen)
            .unwrap_or(ColumnKind::Text);
    }
    columns
}

/// Write an upload into `conn`, replacing any existing table of that name.
pub(super) fn import(conn: &mut Connection, upload: &TableImport) -> StoreResult<ImportSummary> {
    if upload.rows.is_empty() {
        return Err(StoreError::InvalidImport("upload contains no rows".into()));
    }
    let columns = plan_columns(&upload.rows);
    if columns.is_empty() {
        return Err(StoreError::InvalidImport("upload contains no columns".into()));
    }

    let table_name = upload.resolved_table_name();
    if table_name.starts_with(RESERVED_TABLE_PREFIX) {
        return Err(StoreError::InvalidImport(format!(
            "table name '{table_name}' uses the reserved prefix '{RESERVED_TABLE_PREFIX}'"
        )));
    }
    let table = quote_identifier(&table_name)?;
    let column_defs = columns
        .iter()
        .map(|c| format!("\"{}\" {}", c.name, c.kind.as_sql()))
        .collect::<Vec<_>>()
        .join(", ");
    let column_list = columns
        .iter()
        .map(|c| format!("\"{}\"", c.name))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = (1..=columns.len())
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");

    let tx = conn.transaction()?;
    tx.execute(&format!("DROP TABLE IF EXISTS {table}"), [])?;
    tx.execute(&format!("CREATE TABLE {table} ({column_defs})"), [])?;
    let mut inserted = 0;
    {
        let mut stmt =
            tx.prepare(&format!("INSERT INTO {table} ({column_list}) VALUES ({placeholders})"))?;
        for row in &upload.rows {
            let values = columns
                .iter()
                .map(|c| row.get(&c.source).map_or(rusqlite::types::Value::Null, to_sql));
            inserted += stmt.execute(params_from_iter(values))?;
        }
    }
    tx.commit()?;

    info!(table = %table_name, rows = inserted, columns = columns.len(), "Imported table");

    Ok(ImportSummary {
        table_name,
        rows_inserted: inserted,
        total_rows: upload.rows.len(),
        total_columns: columns.len(),
        columns: columns.into_iter().map(|c| c.name).collect(),
    })
}
