//! # Invoice Transaction Processor
//!
//! Turns a cart into an issued invoice: every requested product is locked,
//! checked, decremented and priced inside ONE store transaction.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     process(customer, lines)                            │
//! │                                                                         │
//! │  validate input ──✗──► InvoiceError::Validation (store untouched)      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  store.begin() ───────────────────────────── transaction_timeout ──┐   │
//! │       │                                                              │   │
//! │       ▼  for each line, in request order                             │   │
//! │  ┌──────────────────────────────────────────────┐                    │   │
//! │  │ lock_and_fetch(id) ──✗──► ProductNotFound    │                    │   │
//! │  │ stock < qty        ──✗──► InsufficientStock  │── any ✗ ─► rollback│   │
//! │  │ price, add to total ──✗──► AmountOverflow    │                    │   │
//! │  │ update_stock(stock - qty)                    │                    │   │
//! │  └──────────────────────────────────────────────┘                    │   │
//! │       │                                                              │   │
//! │       ▼                                                              │   │
//! │  commit ◄────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  invoice number + issued_at ──► InvoiceResult                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Guarantees
//! - All or nothing: a failed call leaves every product's stock untouched.
//! - No overselling: the check and the decrement happen under the same lock.
//! - Not idempotent: two identical calls decrement twice.
//! - Nothing is retried here. [`InvoiceError::is_retryable`] tells the
//!   caller when a fresh attempt may succeed.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use tempo_core::validation::{validate_customer_name, validate_invoice_lines};
use tempo_core::{InvoiceError, InvoiceLineRequest, InvoiceLineResult, InvoiceLines, InvoiceResult};

use crate::store::{ProductStore, StoreTransaction};

// =============================================================================
// Configuration
// =============================================================================

/// Limits applied to every invoice transaction.
#[derive(Debug, Clone)]
pub struct InvoiceConfig {
    /// Upper bound on one whole `process` call, lock waits included.
    /// Default: 10 seconds
    pub transaction_timeout: Duration,
}

impl Default for InvoiceConfig {
    fn default() -> Self {
        InvoiceConfig {
            transaction_timeout: Duration::from_secs(10),
        }
    }
}

impl InvoiceConfig {
    pub fn transaction_timeout(mut self, timeout: Duration) -> Self {
        self.transaction_timeout = timeout;
        self
    }
}

// =============================================================================
// Processor
// =============================================================================

/// Issues invoices against any [`ProductStore`].
///
/// ## Usage
/// ```rust,ignore
/// let processor = InvoiceProcessor::new(db.product_store(), InvoiceConfig::default());
///
/// let invoice = processor
///     .process("Ana María", &[InvoiceLineRequest::new(product_id, 2)])
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct InvoiceProcessor<S> {
    store: S,
    config: InvoiceConfig,
}

impl<S: ProductStore> InvoiceProcessor<S> {
    pub fn new(store: S, config: InvoiceConfig) -> Self {
        InvoiceProcessor { store, config }
    }

    /// Runs the invoice transaction.
    ///
    /// ## Returns
    /// * `Ok(InvoiceResult)` - Committed; stock has been decremented
    /// * `Err(InvoiceError)` - Rolled back; stock is unchanged
    pub async fn process(
        &self,
        customer_name: &str,
        lines: &[InvoiceLineRequest],
    ) -> Result<InvoiceResult, InvoiceError> {
        validate_customer_name(customer_name)?;
        validate_invoice_lines(lines)?;

        let customer_name = customer_name.trim();
        info!(customer = %customer_name, lines = lines.len(), "Processing invoice");

        // On expiry the reserve future is dropped, and with it the open
        // transaction, which rolls back.
        let priced = match tokio::time::timeout(self.config.transaction_timeout, self.reserve(lines)).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(
                    customer = %customer_name,
                    timeout_ms = self.config.transaction_timeout.as_millis() as u64,
                    "Invoice transaction timed out"
                );
                return Err(InvoiceError::TransactionConflict(format!(
                    "transaction exceeded {}ms",
                    self.config.transaction_timeout.as_millis()
                )));
            }
        };

        let issued_at = Utc::now();
        let invoice_number = generate_invoice_number(issued_at);

        info!(
            invoice_number = %invoice_number,
            lines = priced.len(),
            grand_total = %priced.grand_total(),
            "Invoice committed"
        );

        Ok(priced.finish(invoice_number, customer_name, issued_at))
    }

    /// Opens the transaction, applies every line and commits, or rolls back
    /// on the first failure.
    async fn reserve(&self, lines: &[InvoiceLineRequest]) -> Result<InvoiceLines, InvoiceError> {
        let mut tx = self.store.begin().await?;

        match apply_lines(&mut tx, lines).await {
            Ok(priced) => {
                tx.commit().await?;
                Ok(priced)
            }
            Err(err) => {
                debug!(error = %err, "Rolling back invoice transaction");
                if let Err(rollback_err) = tx.rollback().await {
                    // The connection discards the transaction anyway
                    warn!(error = %rollback_err, "Rollback failed");
                }
                Err(err)
            }
        }
    }
}

/// Locks, checks, prices and decrements each line in request order.
async fn apply_lines<T: StoreTransaction>(
    tx: &mut T,
    lines: &[InvoiceLineRequest],
) -> Result<InvoiceLines, InvoiceError> {
    let mut priced = InvoiceLines::with_capacity(lines.len());

    for line in lines {
        let product = tx
            .lock_and_fetch(&line.product_id)
            .await?
            .ok_or_else(|| InvoiceError::ProductNotFound(line.product_id.clone()))?;

        if !product.has_stock(line.quantity) {
            warn!(
                product_id = %product.id,
                available = product.stock,
                requested = line.quantity,
                "Insufficient stock"
            );
            return Err(InvoiceError::InsufficientStock {
                product_id: product.id,
                available: product.stock,
                requested: line.quantity,
            });
        }

        // Priced before the write so an overflowing line leaves nothing pending
        priced.push(InvoiceLineResult::price(&product, line.quantity)?)?;

        let remaining = product.stock - line.quantity;
        tx.update_stock(&product.id, remaining).await?;

        debug!(
            product_id = %product.id,
            quantity = line.quantity,
            stock = remaining,
            "Stock reserved"
        );
    }

    Ok(priced)
}

/// Builds an invoice number: `INV-<unix seconds>-<4 hex digits>`.
///
/// Unique in practice, not guaranteed: two invoices in the same second
/// collide with probability 1/65536.
pub fn generate_invoice_number(issued_at: DateTime<Utc>) -> String {
    let suffix = (Uuid::new_v4().as_u128() & 0xffff) as u16;
    format!("INV-{}-{:04x}", issued_at.timestamp(), suffix)
}

// =============================================================================
// Unit Tests
// =============================================================================
