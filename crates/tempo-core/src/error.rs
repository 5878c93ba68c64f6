//! # Error Types
//!
//! Domain-specific error types for tempo-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tempo-core errors (this file)                                         │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  └── InvoiceError     - Outcome of the invoice transaction             │
//! │                                                                         │
//! │  tempo-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Flow: ValidationError ──┐                                             │
//! │        DbError ──────────┴──► InvoiceError ──► HTTP caller             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Invoice Error
// =============================================================================

/// Errors returned by the invoice transaction.
///
/// Every variant means the transaction was rolled back: no stock change from
/// the failed call survives.
#[derive(Debug, Error)]
pub enum InvoiceError {
    /// Bad input shape (empty customer, no lines, zero quantity), or a
    /// request whose totals overflow.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A requested product id does not exist.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// A requested quantity exceeds the product's stock.
    ///
    /// ## User Workflow
    /// ```text
    /// Invoice line (qty: 5)
    ///      │
    ///      ▼
    /// Locked row: stock=2
    ///      │
    ///      ▼
    /// InsufficientStock { product_id: "P2", available: 2, requested: 5 }
    ///      │
    ///      ▼
    /// Whole invoice aborted, every line rolled back
    /// ```
    #[error("Insufficient stock for {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        available: i64,
        requested: i64,
    },

    /// The store could not serialize the transaction (deadlock, lock wait
    /// timeout, overall timeout). Safe to retry the whole call.
    #[error("Transaction conflict: {0}")]
    TransactionConflict(String),

    /// The store cannot be reached or failed unexpectedly.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl InvoiceError {
    /// Whether the caller may retry the identical request from scratch.
    pub fn is_retryable(&self) -> bool {
        matches!(self, InvoiceError::TransactionConflict(_))
    }

    /// Suggested HTTP status for the caller's mapping.
    ///
    /// ```text
    /// Validation          → 400
    /// ProductNotFound     → 404
    /// InsufficientStock   → 409
    /// TransactionConflict → 409
    /// StoreUnavailable    → 503
    /// ```
    pub fn status_code(&self) -> u16 {
        match self {
            InvoiceError::Validation(_) => 400,
            InvoiceError::ProductNotFound(_) => 404,
            InvoiceError::InsufficientStock { .. } => 409,
            InvoiceError::TransactionConflict(_) => 409,
            InvoiceError::StoreUnavailable(_) => 503,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before any store access.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// A computed amount does not fit in the money representation.
    #[error("{field} exceeds the largest representable amount")]
    AmountOverflow { field: String },
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = InvoiceError::InsufficientStock {
            product_id: "P2".to_string(),
            available: 2,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for P2: available 2, requested 5"
        );

        let err = InvoiceError::ProductNotFound("P9".to_string());
        assert_eq!(err.to_string(), "Product not found: P9");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "customerName".to_string(),
        };
        assert_eq!(err.to_string(), "customerName is required");

        let err = ValidationError::OutOfRange {
            field: "discount".to_string(),
            min: 0,
            max: 100,
        };
        assert_eq!(err.to_string(), "discount must be between 0 and 100");

        let err = ValidationError::AmountOverflow {
            field: "grandTotal".to_string(),
        };
        assert_eq!(err.to_string(), "grandTotal exceeds the largest representable amount");
    }

    #[test]
    fn test_validation_converts_to_invoice_error() {
        let validation_err = ValidationError::Required {
            field: "items".to_string(),
        };
        let err: InvoiceError = validation_err.into();
        assert!(matches!(err, InvoiceError::Validation(_)));
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_only_conflicts_are_retryable() {
        assert!(InvoiceError::TransactionConflict("deadlock".into()).is_retryable());
        assert!(!InvoiceError::StoreUnavailable("down".into()).is_retryable());
        assert!(!InvoiceError::ProductNotFound("P9".into()).is_retryable());
        assert_eq!(InvoiceError::StoreUnavailable("down".into()).status_code(), 503);
    }
}
