//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite / PostgreSQL error (sqlx::Error)                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  InvoiceError (tempo-core) ← What the HTTP caller maps to a status     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use tempo_core::{InvoiceError, ValidationError};

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Row rejected before it reached the database.
    #[error("Invalid product: {0}")]
    Validation(#[from] ValidationError),

    /// Unique constraint violation (duplicate product id).
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// The store refused to serialize this transaction.
    ///
    /// ## When This Occurs
    /// - SQLite: `SQLITE_BUSY` / `SQLITE_LOCKED` after the busy timeout
    /// - PostgreSQL: deadlock (40P01), serialization failure (40001),
    ///   lock wait timeout (55P03), statement timeout (57014)
    #[error("Transaction conflict: {0}")]
    Conflict(String),

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// True when retrying the whole transaction may succeed.
    pub fn is_conflict(&self) -> bool {
        matches!(self, DbError::Conflict(_))
    }
}

/// Returns true for driver error codes that mean "could not serialize".
///
/// SQLite reports extended result codes as decimal strings; the primary code
/// is the low byte (5 = BUSY, 6 = LOCKED). PostgreSQL reports SQLSTATE.
pub(crate) fn is_conflict_code(code: &str) -> bool {
    match code {
        "40001" | "40P01" | "55P03" | "57014" => true,
        // SQLSTATE is always five characters, SQLite codes are shorter
        other if other.len() < 5 => other
            .parse::<i32>()
            .map(|c| matches!(c & 0xff, 5 | 6))
            .unwrap_or(false),
        _ => false,
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Conflict / UniqueViolation / QueryFailed
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// sqlx::Error::Io / PoolClosed→ DbError::ConnectionFailed
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message().to_string();

                if db_err.code().map_or(false, |code| is_conflict_code(&code)) {
                    DbError::Conflict(msg)
                } else if db_err.is_unique_violation() {
                    // SQLite: "UNIQUE constraint failed: products.id"
                    let field = db_err
                        .constraint()
                        .or_else(|| msg.split("UNIQUE constraint failed: ").nth(1))
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg)
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            sqlx::Error::Io(e) => DbError::ConnectionFailed(e.to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Maps storage failures onto the invoice taxonomy.
///
/// ## Mapping
/// ```text
/// NotFound                         → ProductNotFound(id)
/// Validation                       → Validation
/// Conflict                         → TransactionConflict
/// ConnectionFailed / PoolExhausted → StoreUnavailable
/// anything else                    → StoreUnavailable (fatal for the request)
/// ```
impl From<DbError> for InvoiceError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { id, .. } => InvoiceError::ProductNotFound(id),
            DbError::Validation(e) => InvoiceError::Validation(e),
            DbError::Conflict(msg) => InvoiceError::TransactionConflict(msg),
            other => InvoiceError::StoreUnavailable(other.to_string()),
        }
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
