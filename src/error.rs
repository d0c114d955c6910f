use thiserror::Error;

/// Convenience alias for gateway results.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Errors surfaced by the gateway.
///
/// The offending SQL is carried as data, never folded into the display
/// message; the underlying engine error stays reachable through `source`.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The backing store could not be opened.
    #[error("failed to open database at `{path}`: {source}")]
    Open {
        path: String,
        #[source]
        source: rusqlite::Error,
    },

    /// A non-query command failed to prepare, bind, or execute.
    #[error("command failed: {source}")]
    Command {
        sql: String,
        #[source]
        source: rusqlite::Error,
    },

    /// A query failed to prepare, bind, or read to completion.
    #[error("query failed: {source}")]
    Query {
        sql: String,
        #[source]
        source: rusqlite::Error,
    },
}

/// Coarse classification of the underlying engine failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Constraint,
    TypeMismatch,
    Io,
    Other,
}

impl GatewayError {
    /// The SQL text of the failed statement, when one was involved.
    pub fn sql(&self) -> Option<&str> {
        match self {
            GatewayError::Open { .. } => None,
            GatewayError::Command { sql, .. } | GatewayError::Query { sql, .. } => Some(sql),
        }
    }

    /// Classify the underlying engine error.
    pub fn kind(&self) -> FailureKind {
        let source = match self {
            GatewayError::Open { source, .. }
            | GatewayError::Command { source, .. }
            | GatewayError::Query { source, .. } => source,
        };
        match source {
            rusqlite::Error::SqliteFailure(code, _) => match code.code {
                rusqlite::ErrorCode::ConstraintViolation => FailureKind::Constraint,
                rusqlite::ErrorCode::TypeMismatch => FailureKind::TypeMismatch,
                rusqlite::ErrorCode::CannotOpen
                | rusqlite::ErrorCode::NotADatabase
                | rusqlite::ErrorCode::DatabaseCorrupt
                | rusqlite::ErrorCode::SystemIoFailure
                | rusqlite::ErrorCode::DiskFull => FailureKind::Io,
                _ => FailureKind::Other,
            },
            rusqlite::Error::InvalidColumnType(..)
            | rusqlite::Error::FromSqlConversionFailure(..)
            | rusqlite::Error::ToSqlConversionFailure(..) => FailureKind::TypeMismatch,
            _ => FailureKind::Other,
        }
    }
}
