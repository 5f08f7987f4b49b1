//! Store error model.
//!
//! sqlx errors are mapped to `StoreError` in one place:
//!
//! | sqlx error | StoreError |
//! |---|---|
//! | Database (unique violation on `categories`) | `Domain(DuplicateCategory)` (mapped by the caller, which knows the name) |
//! | Database (other) | `Database` |
//! | PoolClosed / PoolTimedOut | `Database` |
//! | Other | `Database` |

use thiserror::Error;

use storekeep_core::DomainError;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A business rule rejected the operation. Nothing was written.
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("database error in {operation}: {message}")]
    Database {
        operation: &'static str,
        message: String,
    },

    /// A stored value could not be read back into its domain type.
    #[error("corrupt row in {table}: {message}")]
    CorruptRow { table: &'static str, message: String },

    #[error("configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// The domain error, if this failure was a rejected operation.
    pub fn domain(&self) -> Option<&DomainError> {
        match self {
            StoreError::Domain(e) => Some(e),
            _ => None,
        }
    }

    pub(crate) fn corrupt(table: &'static str, message: impl Into<String>) -> Self {
        StoreError::CorruptRow {
            table,
            message: message.into(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Map sqlx errors to `StoreError`.
pub(crate) fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> StoreError {
    let message = match err {
        sqlx::Error::Database(db_err) => match db_err.code() {
            Some(code) => format!("{} (code {})", db_err.message(), code),
            None => db_err.message().to_string(),
        },
        sqlx::Error::PoolClosed => "connection pool closed".to_string(),
        sqlx::Error::PoolTimedOut => "timed out waiting for a connection".to_string(),
        sqlx::Error::RowNotFound => "unexpected row not found".to_string(),
        other => other.to_string(),
    };
    StoreError::Database { operation, message }
}

/// Check if an error is a unique constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}
