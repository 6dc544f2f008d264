//! SQLite data store gateway.
//!
//! [`DataStore`] owns one [`rusqlite::Connection`] behind an
//! `Arc<Mutex<_>>`. Every operation runs on the blocking pool and holds the
//! lock only for its own duration, so concurrent exchanges interleave at
//! operation granularity.
//!
//! The gateway carries no business logic. It introspects tables, runs
//! read-only statements and imports uploads:
//!
//! ```rust,ignore
//! use tabula::store::DataStore;
//!
//! let store = DataStore::open("data/uploads.db")?;
//! let tables = store.get_all_tables().await?;
//! let rows = store.run("SELECT * FROM sales", Vec::new()).await?;
//! ```

mod error;
mod identifier;
mod ingest;
mod types;
mod value;

pub use error::{StoreError, StoreResult};
pub use identifier::{MAX_IDENTIFIER_LEN, quote_identifier, validate_identifier};
pub use ingest::{
    ColumnKind, FALLBACK_TABLE_NAME, ImportSummary, RESERVED_TABLE_PREFIX, TableImport,
    sanitize_column_name, sanitize_table_name,
};
pub use types::{
    ColumnInfo, ColumnType, DatabaseContext, QueryRows, Row, TableContext, TableInfo,
    TableStatistics,
};
pub use value::{to_json, to_sql};

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rusqlite::{Connection, params_from_iter};
use serde_json::Value;
use tracing::{debug, warn};

/// How long a statement waits on a locked database file before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Shared handle to the SQLite store.
///
/// Cloning is cheap and every clone talks to the same connection.
#[derive(Clone)]
pub struct DataStore {
    conn: Arc<Mutex<Connection>>,
    path: Option<PathBuf>,
}

impl fmt::Debug for DataStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl DataStore {
    /// Open (or create) the database file at `path`, creating parent
    /// directories as needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be created and
    /// [`StoreError::Sqlite`] if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        debug!(path = %path.display(), "Opened data store");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: Some(path),
        })
    }

    /// Open a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Sqlite`] if SQLite fails to initialise.
    pub fn in_memory() -> StoreResult<Self> {
        Ok(Self {
            conn: Arc::new(Mutex::new(Connection::open_in_memory()?)),
            path: None,
        })
    }

    /// Database file path, `None` for in-memory stores.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Connection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().map_err(|e| StoreError::Lock(e.to_string()))?;
            f(&mut guard)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }

    /// Names of all user tables, sorted.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the catalog cannot be read.
    pub async fn get_all_tables(&self) -> StoreResult<Vec<String>> {
        self.with_conn(|conn| list_tables(conn)).await
    }

    /// Whether a table named `name` exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidIdentifier`] for names outside the allow-list.
    pub async fn table_exists(&self, name: &str) -> StoreResult<bool> {
        let name = validate_identifier(name)?.to_owned();
        self.with_conn(move |conn| table_exists(conn, &name)).await
    }

    /// Column metadata of a table, in declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TableNotFound`] if the table does not exist.
    pub async fn table_schema(&self, name: &str) -> StoreResult<Vec<ColumnInfo>> {
        let name = validate_identifier(name)?.to_owned();
        self.with_conn(move |conn| {
            ensure_table(conn, &name)?;
            table_columns(conn, &name)
        })
        .await
    }

    /// Number of rows in a table.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TableNotFound`] if the table does not exist.
    pub async fn row_count(&self, name: &str) -> StoreResult<u64> {
        let name = validate_identifier(name)?.to_owned();
        self.with_conn(move |conn| {
            ensure_table(conn, &name)?;
            count_rows(conn, &name)
        })
        .await
    }

    /// First `limit` rows of a table in storage order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TableNotFound`] if the table does not exist.
    pub async fn sample(&self, name: &str, limit: u32) -> StoreResult<QueryRows> {
        let name = validate_identifier(name)?.to_owned();
        self.with_conn(move |conn| {
            ensure_table(conn, &name)?;
            sample_rows(conn, &name, limit)
        })
        .await
    }

    /// Execute a single read-only statement with bound parameters.
    ///
    /// Only the first statement of `sql` is prepared. It must report itself
    /// read-only, otherwise nothing is stepped and
    /// [`StoreError::NotReadOnly`] is returned.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Sqlite`] for malformed SQL or execution failures.
    pub async fn run(&self, sql: &str, params: Vec<Value>) -> StoreResult<QueryRows> {
        let sql = sql.to_owned();
        self.with_conn(move |conn| query_read_only(conn, &sql, &params))
            .await
    }

    /// Row count, column count and declared column types of a table.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TableNotFound`] if the table does not exist.
    pub async fn table_statistics(&self, name: &str) -> StoreResult<TableStatistics> {
        let name = validate_identifier(name)?.to_owned();
        self.with_conn(move |conn| {
            ensure_table(conn, &name)?;
            let columns = table_columns(conn, &name)?;
            Ok(TableStatistics {
                row_count: count_rows(conn, &name)?,
                column_count: columns.len(),
                column_types: columns
                    .into_iter()
                    .map(|c| ColumnType {
                        name: c.name,
                        data_type: c.data_type,
                    })
                    .collect(),
                table_name: name,
            })
        })
        .await
    }

    /// Columns and row count of a table.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TableNotFound`] if the table does not exist.
    pub async fn table_info(&self, name: &str) -> StoreResult<TableInfo> {
        let name = validate_identifier(name)?.to_owned();
        self.with_conn(move |conn| {
            ensure_table(conn, &name)?;
            Ok(TableInfo {
                columns: table_columns(conn, &name)?,
                row_count: count_rows(conn, &name)?,
                table_name: name,
            })
        })
        .await
    }

    /// Snapshot of every table, taken under a single lock acquisition.
    ///
    /// Tables whose names fall outside the identifier allow-list cannot be
    /// queried safely and are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if any introspection query fails.
    pub async fn database_context(
        &self,
        include_samples: bool,
        sample_limit: u32,
    ) -> StoreResult<DatabaseContext> {
        self.with_conn(move |conn| {
            let mut tables = Vec::new();
            for name in list_tables(conn)? {
                if validate_identifier(&name).is_err() {
                    warn!(table = %name, "Skipping table with unsupported name");
                    continue;
                }
                let columns = table_columns(conn, &name)?;
                let row_count = count_rows(conn, &name)?;
                let sample_data = if include_samples && row_count > 0 {
                    Some(sample_rows(conn, &name, sample_limit)?.rows)
                } else {
                    None
                };
                tables.push(TableContext {
                    name,
                    row_count,
                    column_count: columns.len(),
                    columns,
                    sample_data,
                });
            }
            Ok(DatabaseContext {
                table_count: tables.len(),
                tables,
            })
        })
        .await
    }

    /// Write an upload as a table, replacing any table of the same name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidImport`] for uploads without rows or
    /// columns, and [`StoreError::Sqlite`] if the transaction fails.
    pub async fn import_table(&self, upload: TableImport) -> StoreResult<ImportSummary> {
        self.with_conn(move |conn| ingest::import(conn, &upload))
            .await
    }
}

fn list_tables(conn: &Connection) -> StoreResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master \
         WHERE type = 'table' AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\' ORDER BY name",
    )?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names)
}

fn table_exists(conn: &Connection, name: &str) -> StoreResult<bool> {
    let exists = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
        [name],
        |row| row.get(0),
    )?;
    Ok(exists)
}

fn ensure_table(conn: &Connection, name: &str) -> StoreResult<()> {
    if table_exists(conn, name)? {
        Ok(())
    } else {
        Err(StoreError::TableNotFound(name.to_owned()))
    }
}

fn table_columns(conn: &Connection, name: &str) -> StoreResult<Vec<ColumnInfo>> {
    let mut stmt = conn.prepare(
        "SELECT name, type, \"notnull\", dflt_value, pk FROM pragma_table_info(?1) ORDER BY cid",
    )?;
    let columns = stmt
        .query_map([name], |row| {
            Ok(ColumnInfo {
                name: row.get(0)?,
                data_type: row.get(1)?,
                not_null: row.get::<_, i64>(2)? != 0,
                default_value: row.get(3)?,
                primary_key: row.get::<_, i64>(4)? > 0,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(columns)
}

fn count_rows(conn: &Connection, name: &str) -> StoreResult<u64> {
    let table = quote_identifier(name)?;
    let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
        row.get(0)
    })?;
    Ok(u64::try_from(count).unwrap_or_default())
}

fn sample_rows(conn: &Connection, name: &str, limit: u32) -> StoreResult<QueryRows> {
    let table = quote_identifier(name)?;
    query_read_only(
        conn,
        &format!("SELECT * FROM {table} LIMIT ?1"),
        &[Value::from(limit)],
    )
}

fn query_read_only(conn: &Connection, sql: &str, params: &[Value]) -> StoreResult<QueryRows> {
    let mut stmt = conn.prepare(sql)?;
    if !stmt.readonly() {
        return Err(StoreError::NotReadOnly);
    }

    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let mut rows = stmt.query(params_from_iter(params.iter().map(to_sql)))?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut record = Row::new();
        for (idx, column) in columns.iter().enumerate() {
            record.insert(column.clone(), to_json(row.get_ref(idx)?));
        }
        out.push(record);
    }
    Ok(QueryRows { columns, rows: out })
}

#[cfg(test)]
mod tests {
    use serde_json::{Map, json};

    use super::*;

    fn records(values: Value) -> Vec<Map<String, Value>> {
        serde_json::from_value(values).unwrap()
    }

    async fn seeded() -> DataStore {
        let store = DataStore::in_memory().unwrap();
        store
            .import_table(TableImport::new(
                "sales",
                records(json!([
                    {"id": 1, "region": "north", "amount": 120.5},
                    {"id": 2, "region": "south", "amount": 80.0},
                    {"id": 3, "region": "north", "amount": 42.25}
                ])),
            ))
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_get_all_tables_sorted() {
        let store = seeded().await;
        store
            .import_table(TableImport::new("customers", records(json!([{"name": "Ada"}]))))
            .await
            .unwrap();
        assert_eq!(store.get_all_tables().await.unwrap(), vec!["customers", "sales"]);
    }

    #[tokio::test]
    async fn test_sqlite_like_user_tables_are_listed() {
        let store = DataStore::in_memory().unwrap();
        let upload = TableImport {
            file_name: Some("sqlite2024.csv".into()),
            ..TableImport::new("", records(json!([{"a": 1}])))
        };
        let summary = store.import_table(upload).await.unwrap();
        assert_eq!(summary.table_name, "sqlite2024");
        assert_eq!(store.get_all_tables().await.unwrap(), vec!["sqlite2024"]);
        assert_eq!(store.database_context(false, 3).await.unwrap().table_count, 1);
    }

    #[tokio::test]
    async fn test_run_preserves_column_order() {
        let store = seeded().await;
        let result = store
            .run("SELECT amount, id FROM sales WHERE region = ?1", vec![json!("north")])
            .await
            .unwrap();
        assert_eq!(result.columns, vec!["amount", "id"]);
        assert_eq!(result.len(), 2);
        let keys: Vec<&String> = result.rows[0].keys().collect();
        assert_eq!(keys, vec!["amount", "id"]);
    }

    #[tokio::test]
    async fn test_run_rejects_writes() {
        let store = seeded().await;
        let err = store.run("DELETE FROM sales", Vec::new()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotReadOnly));
        assert_eq!(store.row_count("sales").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_sample_in_insertion_order() {
        let store = seeded().await;
        let sample = store.sample("sales", 2).await.unwrap();
        let ids: Vec<&Value> = sample.rows.iter().map(|r| &r["id"]).collect();
        assert_eq!(ids, vec![&json!(1), &json!(2)]);
        assert_eq!(store.sample("sales", 10).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_missing_table_and_bad_identifier() {
        let store = seeded().await;
        assert!(!store.table_exists("nope").await.unwrap());
        assert!(matches!(
            store.table_info("nope").await.unwrap_err(),
            StoreError::TableNotFound(_)
        ));
        assert!(matches!(
            store.sample("sales; DROP TABLE sales", 1).await.unwrap_err(),
            StoreError::InvalidIdentifier(_)
        ));
    }

    #[tokio::test]
    async fn test_table_statistics() {
        let store = seeded().await;
        let stats = store.table_statistics("sales").await.unwrap();
        assert_eq!(stats.row_count, 3);
        assert_eq!(stats.column_count, 3);
        assert_eq!(stats.column_types[2].data_type, "REAL");
    }

    #[tokio::test]
    async fn test_database_context_samples() {
        let store = seeded().await;
        let plain = store.database_context(false, 3).await.unwrap();
        assert_eq!(plain.table_count, 1);
        assert!(plain.tables[0].sample_data.is_none());

        let sampled = store.database_context(true, 2).await.unwrap();
        assert_eq!(sampled.tables[0].row_count, 3);
        assert_eq!(sampled.tables[0].sample_data.as_ref().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn test_open_creates_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("uploads.db");
        let store = DataStore::open(&path).unwrap();
        store
            .import_table(TableImport::new("t", records(json!([{"a": 1}]))))
            .await
            .unwrap();
        drop(store);

        let reopened = DataStore::open(&path).unwrap();
        assert_eq!(reopened.get_all_tables().await.unwrap(), vec!["t"]);
        assert_eq!(reopened.path(), Some(path.as_path()));
    }
}
