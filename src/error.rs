//! Typed failures for store access.

use rusqlite::ErrorCode;
use serde::Serialize;
use thiserror::Error;

/// Coarse classification callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    PermissionDenied,
    Network,
    Conflict,
    Invalid,
    Unknown,
}

#[derive(Debug, Error)]
pub enum AccessError {
    /// The addressed row does not exist.
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The store could not be reached (locked, busy, unreadable file).
    #[error("store unavailable: {0}")]
    Network(String),

    /// A uniqueness or reference constraint rejected the write, or a
    /// single-row lookup matched more than one row.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid input: {0}")]
    Invalid(String),

    #[error("store error: {0}")]
    Unknown(String),
}

pub type AccessResult<T> = Result<T, AccessError>;

impl AccessError {
    pub fn not_found(entity: &'static str) -> Self {
        AccessError::NotFound { entity }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AccessError::NotFound { .. } => ErrorKind::NotFound,
            AccessError::PermissionDenied(_) => ErrorKind::PermissionDenied,
            AccessError::Network(_) => ErrorKind::Network,
            AccessError::Conflict(_) => ErrorKind::Conflict,
            AccessError::Invalid(_) => ErrorKind::Invalid,
            AccessError::Unknown(_) => ErrorKind::Unknown,
        }
    }

    /// Wire code used in IPC error responses.
    pub fn code(&self) -> &'static str {
        match self.kind() {
            ErrorKind::NotFound => "not_found",
            ErrorKind::PermissionDenied => "permission_denied",
            ErrorKind::Network => "store_unavailable",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Invalid => "bad_params",
            ErrorKind::Unknown => "db_query_failed",
        }
    }
}

impl From<rusqlite::Error> for AccessError {
    fn from(e: rusqlite::Error) -> Self {
        match &e {
            rusqlite::Error::QueryReturnedNoRows => AccessError::not_found("row"),
            rusqlite::Error::SqliteFailure(inner, _) => match inner.code {
                ErrorCode::ConstraintViolation => AccessError::Conflict(e.to_string()),
                ErrorCode::PermissionDenied
                | ErrorCode::ReadOnly
                | ErrorCode::AuthorizationForStatementDenied => {
                    AccessError::PermissionDenied(e.to_string())
                }
                ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::CannotOpen
                | ErrorCode::SystemIoFailure
                | ErrorCode::FileLockingProtocolFailed => AccessError::Network(e.to_string()),
                _ => AccessError::Unknown(e.to_string()),
            },
            _ => AccessError::Unknown(e.to_string()),
        }
    }
}
