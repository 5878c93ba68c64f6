//! # Domain Types
//!
//! Catalog types shared by the storefront, the admin dashboard and the
//! invoice transaction.
//!
//! ## Product Row
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │    Product                                  │
//! │  ─────────────────────────────────────────  │
//! │  id (opaque, UUID v4 when created here)     │
//! │  name, description, category                │
//! │  price_cents   (Money, ≥ 0)                 │
//! │  discount      (whole percent, 0..=100)     │
//! │  stock         (≥ 0, only decremented by    │
//! │                 the invoice transaction)    │
//! │  is_featured                                │
//! └─────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A watch in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    /// Unique identifier.
    pub id: String,

    /// Display name shown in the catalog and on invoices.
    pub name: String,

    /// Long description for the product page.
    pub description: Option<String>,

    /// Catalog category ("Clásico", "Deportivo", ...).
    pub category: String,

    /// List price in minor units.
    pub price_cents: i64,

    /// Discount as a whole percentage in [0, 100].
    pub discount: i64,

    /// Units available for sale.
    pub stock: i64,

    /// Shown in the featured collection on the home page.
    pub is_featured: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the list price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns the unit price after the product discount.
    ///
    /// ## Example
    /// ```rust
    /// # use chrono::Utc;
    /// # use tempo_core::Product;
    /// let product = Product {
    ///     id: "P1".into(),
    ///     name: "Elegance Chrono".into(),
    ///     description: None,
    ///     category: "Clásico".into(),
    ///     price_cents: 10000,
    ///     discount: 10,
    ///     stock: 10,
    ///     is_featured: false,
    ///     created_at: Utc::now(),
    ///     updated_at: Utc::now(),
    /// };
    /// assert_eq!(product.discounted_price().cents(), 9000);
    /// ```
    pub fn discounted_price(&self) -> Money {
        // 0..=100 regardless of what the row holds
        let percent = self.discount.clamp(0, 100) as u32;
        self.price().apply_percentage_discount(percent)
    }

    /// Checks whether `quantity` units can be taken from stock.
    #[inline]
    pub fn has_stock(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
