//! # Validation Module
//!
//! Input validation for catalog writes and invoice requests.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Storefront (TypeScript)                                      │
//! │  └── Basic format checks, immediate feedback                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  └── Business rules, checked before any transaction is opened          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database                                                     │
//! │  └── NOT NULL, CHECK (stock >= 0), CHECK (discount BETWEEN 0 AND 100)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::invoice::InvoiceLineRequest;
use crate::types::Product;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

fn required(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates the id of a product written to the catalog (1-64 characters).
pub fn validate_product_id(id: &str) -> ValidationResult<()> {
    required("productId", id, 64)
}

/// Validates a product id referenced by an invoice line.
///
/// Ids are opaque: any non-blank id may be looked up, and an unknown one
/// surfaces later as `ProductNotFound`.
pub fn validate_line_product_id(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "productId".to_string(),
        });
    }

    Ok(())
}

/// Validates a product name (1-255 characters).
///
/// ## Example
/// ```rust
/// use tempo_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Elegance Chrono").is_ok());
/// assert!(validate_product_name("  ").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    required("name", name, 255)
}

/// Validates the customer name printed on the invoice (1-200 characters).
pub fn validate_customer_name(name: &str) -> ValidationResult<()> {
    required("customerName", name, 200)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an invoice line quantity. Any positive quantity is accepted;
/// whether it fits is decided against stock.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a price in minor units. Zero is allowed.
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a discount percentage (0-100).
pub fn validate_discount(percent: i64) -> ValidationResult<()> {
    if !(0..=100).contains(&percent) {
        return Err(ValidationError::OutOfRange {
            field: "discount".to_string(),
            min: 0,
            max: 100,
        });
    }

    Ok(())
}

/// Validates a stock level. Zero is allowed.
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Aggregate Validators
// =============================================================================

/// Validates every field of a product before it is written to the catalog.
pub fn validate_product(product: &Product) -> ValidationResult<()> {
    validate_product_id(&product.id)?;
    validate_product_name(&product.name)?;
    validate_price_cents(product.price_cents)?;
    validate_discount(product.discount)?;
    validate_stock(product.stock)?;
    Ok(())
}

/// Validates the shape of an invoice request.
///
/// ## Rules
/// - At least one line
/// - Every line has a non-blank product id and a quantity of at least 1
///
/// Stock and existence are NOT checked here: they can only be decided under
/// the row lock.
pub fn validate_invoice_lines(lines: &[InvoiceLineRequest]) -> ValidationResult<()> {
    if lines.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    for line in lines {
        validate_line_product_id(&line.product_id)?;
        validate_quantity(line.quantity)?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
