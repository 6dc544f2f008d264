//! Error types for the data store gateway.

/// Error type for data store operations.
///
/// Each variant is a distinct failure mode so callers can map them, e.g. an
/// unknown table to HTTP 404 and a rejected identifier to HTTP 400.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StoreError {
    /// SQLite reported an error (malformed SQL, type mismatch, I/O...).
    #[error("{0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A table name failed the identifier allow-list.
    #[error("invalid table name '{0}': only letters, digits and underscores are allowed (1-64 characters)")]
    InvalidIdentifier(String),

    /// The table does not exist.
    #[error("table '{0}' does not exist")]
    TableNotFound(String),

    /// A statement handed to a read-only entry point would modify the database.
    #[error("statement is not read-only")]
    NotReadOnly,

    /// An upload could not be turned into a table.
    #[error("invalid upload: {0}")]
    InvalidImport(String),

    /// Failed to create the database directory.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The connection mutex was poisoned by a panic.
    #[error("lock error: {0}")]
    Lock(String),

    /// A blocking task failed to join (panicked or was cancelled).
    #[error("task error: {0}")]
    Task(String),
}

/// Convenience alias for store-scoped results.
pub type StoreResult<T> = Result<T, StoreError>;
