use sea_orm::error::{DbErr, SqlErr};

/// Outcome of a failed gateway or service call.
///
/// Validation and uniqueness failures are raised before any write reaches the
/// store, so the caller can fix the input and retry. Store failures during a
/// create are reported after the unit of work has been rolled back.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Not found or inactive: {0}")]
    NotFoundOrInactive(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Corrupt record: {0}")]
    CorruptRecord(String),

    #[error("Database error: {0}")]
    DatabaseError(DbErr),
}

impl From<DbErr> for ServiceError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg))
            | Some(SqlErr::ForeignKeyConstraintViolation(msg)) => {
                return ServiceError::ConstraintViolation(msg);
            }
            _ => {}
        }

        match err {
            DbErr::Conn(e) => ServiceError::StoreUnavailable(e.to_string()),
            DbErr::ConnectionAcquire(e) => ServiceError::StoreUnavailable(e.to_string()),
            other => ServiceError::DatabaseError(other),
        }
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::InvalidArgument(err.to_string())
    }
}

impl ServiceError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ServiceError::InvalidArgument(message.into())
    }

    /// Errors the caller can recover from by changing its input.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument(_) | Self::DuplicateKey(_) | Self::NotFoundOrInactive(_)
        )
    }
}
