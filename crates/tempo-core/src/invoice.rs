//! # Invoice Data Contract
//!
//! Input and output types of the invoice transaction, and the pure pricing
//! step it applies to every locked product.
//!
//! ## Flow
//! ```text
//! [InvoiceLineRequest] ──► (tempo-db: lock + decrement) ──► Product
//!                                                            │
//!                                   InvoiceLineResult::price ◄┘
//!                                                            │
//!                                   InvoiceLines::push ◄──────┘
//!                                                            │
//!                                   InvoiceLines::finish ──► InvoiceResult
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::Product;

// =============================================================================
// Request
// =============================================================================

/// One (product, quantity) request within an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InvoiceLineRequest {
    pub product_id: String,
    pub quantity: i64,
}

impl InvoiceLineRequest {
    pub fn new(product_id: impl Into<String>, quantity: i64) -> Self {
        InvoiceLineRequest {
            product_id: product_id.into(),
            quantity,
        }
    }
}

// =============================================================================
// Line Result
// =============================================================================

/// A priced invoice line.
///
/// Uses the snapshot pattern: name and price are frozen at the moment the
/// row was locked, later catalog edits don't change an issued invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InvoiceLineResult {
    pub product_id: String,
    pub name: String,
    pub quantity: i64,
    pub unit_price_after_discount: Money,
    pub subtotal: Money,
}

impl InvoiceLineResult {
    /// Prices `quantity` units of `product`.
    ///
    /// `unit = price × (1 − discount/100)`, `subtotal = unit × quantity`.
    /// Fails with `AmountOverflow` when the subtotal does not fit.
    pub fn price(product: &Product, quantity: i64) -> Result<Self, ValidationError> {
        let unit = product.discounted_price();
        let subtotal = unit
            .checked_multiply_quantity(quantity)
            .ok_or_else(|| ValidationError::AmountOverflow {
                field: "subtotal".to_string(),
            })?;

        Ok(InvoiceLineResult {
            product_id: product.id.clone(),
            name: product.name.clone(),
            quantity,
            unit_price_after_discount: unit,
            subtotal,
        })
    }
}

// =============================================================================
// Accumulator
// =============================================================================

/// Lines priced so far inside an open transaction.
///
/// `grand_total` is kept equal to the sum of the line subtotals on every push.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvoiceLines {
    lines: Vec<InvoiceLineResult>,
    grand_total: Money,
}

impl InvoiceLines {
    pub fn with_capacity(capacity: usize) -> Self {
        InvoiceLines {
            lines: Vec::with_capacity(capacity),
            grand_total: Money::zero(),
        }
    }

    /// Appends a line. On overflow of the grand total nothing is appended.
    pub fn push(&mut self, line: InvoiceLineResult) -> Result<(), ValidationError> {
        self.grand_total = self
            .grand_total
            .checked_add(line.subtotal)
            .ok_or_else(|| ValidationError::AmountOverflow {
                field: "grandTotal".to_string(),
            })?;
        self.lines.push(line);
        Ok(())
    }

    pub fn lines(&self) -> &[InvoiceLineResult] {
        &self.lines
    }

    pub fn grand_total(&self) -> Money {
        self.grand_total
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Seals the priced lines into an issued invoice.
    pub fn finish(
        self,
        invoice_number: String,
        customer_name: impl Into<String>,
        issued_at: DateTime<Utc>,
    ) -> InvoiceResult {
        InvoiceResult {
            invoice_number,
            customer_name: customer_name.into(),
            issued_at,
            lines: self.lines,
            grand_total: self.grand_total,
        }
    }
}

// =============================================================================
// Invoice Result
// =============================================================================

/// A committed invoice, ready for the document renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InvoiceResult {
    pub invoice_number: String,
    pub customer_name: String,
    #[ts(as = "String")]
    pub issued_at: DateTime<Utc>,
    pub lines: Vec<InvoiceLineResult>,
    pub grand_total: Money,
}

impl InvoiceResult {
    /// Total number of units across all lines.
    pub fn total_units(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// File name the storefront offers for the rendered document.
    ///
    /// ## Example
    /// ```rust
    /// # use chrono::Utc;
    /// # use tempo_core::InvoiceLines;
    /// let invoice = InvoiceLines::default().finish("INV-1".into(), "Ana María Pérez", Utc::now());
    /// assert_eq!(invoice.download_file_name(), "factura_Ana_María_Pérez.docx");
    /// ```
    pub fn download_file_name(&self) -> String {
        format!("factura_{}.docx", self.customer_name.replace(' ', "_"))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::tests::watch;

    #[test]
    fn test_price_line_with_discount() {
        // P1: price=100, discount=10%, qty=3 → unit 90, subtotal 270
        let product = watch("P1", 10000, 10, 10);
        let line = InvoiceLineResult::price(&product, 3).unwrap();

        assert_eq!(line.product_id, "P1");
        assert_eq!(line.unit_price_after_discount, Money::from_cents(9000));
        assert_eq!(line.subtotal, Money::from_cents(27000));
    }

    #[test]
    fn test_grand_total_equals_sum_of_subtotals() {
        let mut lines = InvoiceLines::with_capacity(3);
        for (product, qty) in [
            (watch("A", 45_000_000, 10, 50), 2),
            (watch("B", 1005, 15, 50), 7),
            (watch("C", 28_000_000, 0, 50), 1),
        ] {
            lines.push(InvoiceLineResult::price(&product, qty).unwrap()).unwrap();
        }

        let summed: Money = lines.lines().iter().map(|l| l.subtotal).sum();
        assert_eq!(lines.grand_total(), summed);
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_overflowing_amounts_are_rejected() {
        let err = InvoiceLineResult::price(&watch("P1", i64::MAX / 2, 0, 10), 3).unwrap_err();
        assert!(matches!(err, ValidationError::AmountOverflow { ref field } if field == "subtotal"));

        let line = InvoiceLineResult::price(&watch("P1", i64::MAX / 2, 0, 10), 2).unwrap();
        let mut lines = InvoiceLines::default();
        lines.push(line.clone()).unwrap();

        let err = lines.push(line).unwrap_err();
        assert!(matches!(err, ValidationError::AmountOverflow { ref field } if field == "grandTotal"));
        assert_eq!(lines.len(), 1);
        assert_eq!(lines.grand_total(), Money::from_cents(i64::MAX - 1));
    }

    #[test]
    fn test_finish_carries_lines_and_total() {
        let mut lines = InvoiceLines::default();
        lines
            .push(InvoiceLineResult::price(&watch("P1", 10000, 10, 10), 3).unwrap())
            .unwrap();
        let issued_at = Utc::now();

        let invoice = lines.finish("INV-42".to_string(), "Ana", issued_at);

        assert_eq!(invoice.invoice_number, "INV-42");
        assert_eq!(invoice.customer_name, "Ana");
        assert_eq!(invoice.issued_at, issued_at);
        assert_eq!(invoice.grand_total, Money::from_cents(27000));
        assert_eq!(invoice.total_units(), 3);
    }

    #[test]
    fn test_json_contract_is_camel_case() {
        let request: InvoiceLineRequest =
            serde_json::from_str(r#"{"productId":"P1","quantity":3}"#).unwrap();
        assert_eq!(request, InvoiceLineRequest::new("P1", 3));

        let mut lines = InvoiceLines::default();
        lines
            .push(InvoiceLineResult::price(&watch("P1", 10000, 10, 10), 3).unwrap())
            .unwrap();
        let json = serde_json::to_value(lines.finish("INV-1".into(), "Ana", Utc::now())).unwrap();

        assert_eq!(json["invoiceNumber"], "INV-1");
        assert_eq!(json["grandTotal"], 27000);
        assert_eq!(json["lines"][0]["unitPriceAfterDiscount"], 9000);
    }
}
