//! # tempo-core: Pure Business Logic for Tempo
//!
//! Domain types and rules for the Tempo watch storefront backend.
//! Everything here is a pure function of its inputs: no database, no clock,
//! no randomness.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Tempo Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │           Storefront / Admin (Next.js, out of repo)             │   │
//! │  │    Catalog UI ──► Cart ──► "Generate invoice" ──► .docx file    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP (out of repo)                     │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    tempo-db::InvoiceProcessor                   │   │
//! │  │          lock ─► check ─► decrement ─► price ─► commit          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tempo-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  invoice  │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │ line math │  │   rules   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Catalog types (Product)
//! - [`money`] - Money type with integer arithmetic and currency formatting
//! - [`invoice`] - Invoice data contract and per-line pricing
//! - [`error`] - Validation and invoice error taxonomy
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use tempo_core::money::{format_currency, Money};
//!
//! // 450.000 pesos, stored in minor units
//! let price = Money::from_major_minor(450_000, 0);
//!
//! // 10% off
//! let discounted = price.apply_percentage_discount(10);
//! assert_eq!(format_currency(discounted), "$405.000");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod invoice;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{InvoiceError, ValidationError};
pub use invoice::{InvoiceLineRequest, InvoiceLineResult, InvoiceLines, InvoiceResult};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Storefront address encoded in the invoice QR code.
pub const STOREFRONT_URL: &str = "https://royal-fernet.vercel.app";
