use sea_orm::error::DbErr;
use sea_orm::SqlErr;
use thiserror::Error;

/// Error type returned by every processor operation.
///
/// The taxonomy mirrors how callers are expected to react: validation and
/// stock failures are caller-correctable and never retried automatically,
/// while conflicts and database failures abort the whole transaction and are
/// safe to retry as a unit.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Unique-index collision, typically on a generated order or invoice
    /// number. The numbering scheme is time-derived and best-effort unique,
    /// so callers retry the whole operation on this.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Insufficient stock for {sku}: requested {requested}, available {available}")]
    InsufficientStock {
        sku: String,
        requested: i32,
        available: i32,
    },
}

impl ServiceError {
    /// Whether the failed operation can be retried as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ServiceError::DatabaseError(_) | ServiceError::Conflict(_)
        )
    }

    /// Maps a write failure, turning unique-constraint violations into
    /// retryable conflicts instead of opaque database errors.
    pub fn from_write_err(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg)) => ServiceError::Conflict(msg),
            _ => ServiceError::DatabaseError(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_stock_names_the_offender() {
        let err = ServiceError::InsufficientStock {
            sku: "SKU-100".to_string(),
            requested: 5,
            available: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("SKU-100"));
        assert!(msg.contains("requested 5"));
        assert!(msg.contains("available 2"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn retryable_classification() {
        assert!(ServiceError::Conflict("duplicate order number".into()).is_retryable());
        assert!(
            ServiceError::DatabaseError(DbErr::Custom("connection lost".into())).is_retryable()
        );
        assert!(!ServiceError::ValidationError("empty items".into()).is_retryable());
        assert!(!ServiceError::NotFound("order".into()).is_retryable());
    }
}
