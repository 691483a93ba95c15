//! # Error Types
//!
//! Domain-specific error types for sales-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  sales-core errors (this file)                                         │
//! │  ├── ValidationError  - One failed field rule                          │
//! │  ├── ValidationErrors - Every failed rule of one command               │
//! │  └── CoreError        - Aggregate rule violations                      │
//! │                                                                         │
//! │  sales-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  sales-backend errors                                                  │
//! │  └── AppError         - What the caller sees (status + code)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;

use thiserror::Error;

use crate::types::SaleStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations raised by the `Sale` aggregate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The sale cannot move from its current status to the requested one.
    ///
    /// ## When This Occurs
    /// - Completing or cancelling an already cancelled sale
    /// - Re-applying the status the sale already has
    #[error("Sale {sale_id} is {from}, cannot move to {to}")]
    InvalidSaleStatus {
        sale_id: String,
        from: SaleStatus,
        to: SaleStatus,
    },

    /// Items can only be cancelled while the sale is active.
    #[error("Sale {sale_id} is {status}, its items can no longer be cancelled")]
    SaleNotActive { sale_id: String, status: SaleStatus },

    /// The item id does not belong to the sale.
    #[error("Sale item not found: {item_id} (sale {sale_id})")]
    SaleItemNotFound { sale_id: String, item_id: String },

    /// The item was already cancelled.
    #[error("Sale item {item_id} is already cancelled")]
    ItemAlreadyCancelled { item_id: String },

    /// Validation error set.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
}

// =============================================================================
// Validation Error
// =============================================================================

/// A single failed field rule.
///
/// Every variant names the field it belongs to, so a list of these can be
/// rendered as a `field → messages` map.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, invalid email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// The field this error is reported against.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooShort { field, .. }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::InvalidFormat { field, .. } => field,
        }
    }
}

/// The complete set of failed rules for one command.
///
/// Never empty: [`Validator::finish`](crate::validation::Validator::finish)
/// only builds one when at least one rule failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Validation failed: {}", summary(.errors))]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

fn summary(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub(crate) fn new(errors: Vec<ValidationError>) -> Self {
        ValidationErrors { errors }
    }

    /// Wraps a single rule failure.
    pub fn single(error: ValidationError) -> Self {
        ValidationErrors {
            errors: vec![error],
        }
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Whether any rule failed for `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field() == field)
    }

    /// Groups messages by field, the shape returned to callers.
    ///
    /// ```json
    /// { "name": ["name must be at least 2 characters"],
    ///   "price_cents": ["price_cents must be between 1 and 99999999"] }
    /// ```
    pub fn field_map(&self) -> BTreeMap<String, Vec<String>> {
        let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for error in &self.errors {
            map.entry(error.field().to_string())
                .or_default()
                .push(error.to_string());
        }
        map
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        ValidationErrors::single(error)
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
