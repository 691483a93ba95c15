//! # Application Error Type
//!
//! Unified error type for handlers and the dispatcher.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Sales Backend                      │
//! │                                                                         │
//! │  Handler                                                               │
//! │  Result<T, AppError>                                                   │
//! │         │                                                               │
//! │         ├── ValidationErrors ─────────────────► Validation   (400)     │
//! │         ├── missing row ──────────────────────► NotFound     (404)     │
//! │         ├── CoreError (status / item rules) ──► Conflict     (409)     │
//! │         ├── DbError::UniqueViolation ─────────► Conflict     (409)     │
//! │         ├── Commit::Failed(DbError) ──────────► Transaction  (500)     │
//! │         ├── other DbError ────────────────────► Database     (500)     │
//! │         ├── PublishError ─────────────────────► Publish      (500)     │
//! │         └── HashError ────────────────────────► Hashing      (500)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The dispatcher turns `status_code()` and `error_code()` into the
//! response envelope:
//! ```json
//! { "code": "NOT_FOUND", "message": "Product not found: 1b4e..." }
//! ```

use sales_core::{CoreError, ValidationErrors};
use sales_db::DbError;
use serde::Serialize;
use thiserror::Error;

use crate::events::PublishError;
use crate::hashing::HashError;

/// Errors surfaced by handlers.
#[derive(Debug, Error)]
pub enum AppError {
    /// The command failed validation. Carries every failed rule.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// A required entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The request contradicts current state (duplicate key, illegal
    /// status change, item already cancelled).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The unit of work failed to commit; nothing was persisted.
    #[error("Transaction failed: {source}")]
    Transaction {
        #[source]
        source: DbError,
    },

    /// Any other storage failure.
    #[error("Database error: {0}")]
    Database(DbError),

    /// The commit succeeded but the domain event could not be published.
    #[error(transparent)]
    Publish(#[from] PublishError),

    /// Password hashing failed.
    #[error(transparent)]
    Hashing(#[from] HashError),
}

/// Machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed (400)
    ValidationError,

    /// Request could not be parsed (400)
    MalformedRequest,

    /// Resource not found (404)
    NotFound,

    /// State conflict (409)
    Conflict,

    /// Commit failed (500)
    TransactionFailed,

    /// Database operation failed (500)
    DatabaseError,

    /// Event publishing failed (500)
    PublishFailed,

    /// Internal server error (500)
    Internal,
}

impl AppError {
    /// Creates a not found error.
    pub fn not_found(entity: &str, id: &str) -> Self {
        AppError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    /// HTTP-style status for the response envelope.
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::Validation(_) => 400,
            AppError::NotFound { .. } => 404,
            AppError::Conflict(_) => 409,
            AppError::Transaction { .. }
            | AppError::Database(_)
            | AppError::Publish(_)
            | AppError::Hashing(_) => 500,
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            AppError::Validation(_) => ErrorCode::ValidationError,
            AppError::NotFound { .. } => ErrorCode::NotFound,
            AppError::Conflict(_) => ErrorCode::Conflict,
            AppError::Transaction { .. } => ErrorCode::TransactionFailed,
            AppError::Database(_) => ErrorCode::DatabaseError,
            AppError::Publish(_) => ErrorCode::PublishFailed,
            AppError::Hashing(_) => ErrorCode::Internal,
        }
    }

    /// Message safe to hand to callers. Server-side failures are reduced
    /// to a generic text; the detail goes to the log.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Transaction { source } => {
                tracing::error!(error = %source, "Transaction failed");
                "Database transaction failed".to_string()
            }
            AppError::Database(e) => {
                tracing::error!(error = %e, "Database operation failed");
                "Database operation failed".to_string()
            }
            AppError::Publish(e) => {
                tracing::error!(error = %e, "Event publishing failed");
                "Event publishing failed".to_string()
            }
            AppError::Hashing(e) => {
                tracing::error!(error = %e, "Password hashing failed");
                "Internal error".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Converts database errors to application errors.
impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => AppError::NotFound { entity, id },
            DbError::UniqueViolation { field, .. } => {
                AppError::Conflict(format!("{} already exists", field))
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::warn!(%message, "Foreign key violation");
                AppError::Conflict("Entity is still referenced or references a missing entity".to_string())
            }
            other => AppError::Database(other),
        }
    }
}

/// Converts core errors to application errors.
impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => AppError::Validation(e),
            CoreError::SaleItemNotFound { item_id, .. } => AppError::not_found("SaleItem", &item_id),
            e @ (CoreError::InvalidSaleStatus { .. }
            | CoreError::SaleNotActive { .. }
            | CoreError::ItemAlreadyCancelled { .. }) => {
                AppError::Conflict(e.to_string())
            }
        }
    }
}

/// Result type for handlers.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use sales_core::SaleStatus;

    #[test]
    fn test_db_errors_map_to_kinds() {
        let err: AppError = DbError::not_found("Product", "p1").into();
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.to_string(), "Product not found: p1");

        let err: AppError = DbError::duplicate("email", "a@b.com").into();
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.error_code(), ErrorCode::Conflict);

        let err: AppError = DbError::QueryFailed("disk I/O error".to_string()).into();
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.public_message(), "Database operation failed");
    }

    #[test]
    fn test_core_errors_map_to_kinds() {
        let err: AppError = CoreError::InvalidSaleStatus {
            sale_id: "s1".to_string(),
            from: SaleStatus::Cancelled,
            to: SaleStatus::Completed,
        }
        .into();
        assert_eq!(err.status_code(), 409);
        assert!(err.to_string().contains("cancelled"));

        let err: AppError = CoreError::SaleItemNotFound {
            sale_id: "s1".to_string(),
            item_id: "i9".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), 404);

        let err: AppError = CoreError::SaleNotActive {
            sale_id: "s1".to_string(),
            status: SaleStatus::Completed,
        }
        .into();
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.error_code(), ErrorCode::Conflict);
    }

    #[test]
    fn test_transaction_keeps_cause() {
        let err = AppError::Transaction {
            source: DbError::TransactionFailed("disk full".to_string()),
        };
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.error_code(), ErrorCode::TransactionFailed);

        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("Transaction failed: disk full"));
    }
}
