//! # Error Types
//!
//! Domain-specific error types for furnstock-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  furnstock-core errors (this file)                                      │
//! │  ├── CoreError        - Missing entities, stock shortfalls              │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  furnstock-db errors (separate crate)                                   │
//! │  └── DbError          - Database failures, wraps CoreError              │
//! │                                                                         │
//! │  Back-office CLI errors (in app)                                        │
//! │  └── CliError         - What the operator sees (code + message)         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → CliError → Terminal      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every error carries the identifiers needed to act on it (product id,
//! SKU, available vs requested quantity).

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business errors raised by the catalog and the two stock-moving
/// transactions (delivery and sale).
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found.
    ///
    /// ## When This Occurs
    /// - Product id referenced by a delivery or sale line doesn't exist
    /// - Product was deleted from the catalog
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Supplier referenced by a delivery doesn't exist.
    #[error("Supplier not found: {0}")]
    SupplierNotFound(String),

    /// Category cannot be found.
    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    /// Employee referenced by a sale doesn't exist.
    #[error("Employee not found: {0}")]
    EmployeeNotFound(String),

    /// Delivery cannot be found.
    #[error("Delivery not found: {0}")]
    DeliveryNotFound(String),

    /// Sale cannot be found.
    #[error("Sale not found: {0}")]
    SaleNotFound(String),

    /// Insufficient stock to complete a sale.
    ///
    /// ## Sale Workflow
    /// ```text
    /// Sale line (qty: 5)
    ///      │
    ///      ▼
    /// Check stock: available=3
    ///      │
    ///      ▼
    /// InsufficientStock { sku: "SOFA-001", available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// Nothing is written; the whole sale is rejected
    /// ```
    #[error("Insufficient stock for {sku} ({product_id}): available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        sku: String,
        available: i64,
        requested: i64,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any business logic or storage work runs.
#[derive(Debug, Error)]
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

    /// Invalid format (e.g., invalid UUID, malformed amount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., duplicate SKU).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_stock_message() {
        let err = CoreError::InsufficientStock {
            product_id: "p-1".to_string(),
            sku: "SOFA-001".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for SOFA-001 (p-1): available 3, requested 5"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "items".to_string(),
        };
        assert_eq!(err.to_string(), "items is required");

        let err = ValidationError::OutOfRange {
            field: "discount".to_string(),
            min: 0,
            max: 100,
        };
        assert_eq!(err.to_string(), "discount must be between 0 and 100");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(
            core_err.to_string(),
            "Validation error: quantity must be positive"
        );
    }
}
