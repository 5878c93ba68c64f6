//! # tempo-db: Database Layer for Tempo
//!
//! Storage for the watch catalog and the invoice transaction that sells
//! from it. SQLite (via sqlx) is the primary backend; PostgreSQL is
//! supported for the invoice path.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Tempo Data Flow                                 │
//! │                                                                         │
//! │  HTTP handler (out of repo): POST generate-invoice                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     tempo-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────────┐   ┌────────────────┐   ┌──────────────┐  │   │
//! │  │   │InvoiceProcessor│──►│  ProductStore  │   │  Migrations  │  │   │
//! │  │   │ (invoice.rs)   │   │  sqlite / pg   │   │  (embedded)  │  │   │
//! │  │   └────────────────┘   └───────┬────────┘   └──────────────┘  │   │
//! │  │   ┌────────────────┐   ┌───────▼────────┐                     │   │
//! │  │   │ProductRepository──►│    Database    │                     │   │
//! │  │   │ (catalog CRUD) │   │   (pool.rs)    │                     │   │
//! │  │   └────────────────┘   └────────────────┘                     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (WAL)  or  PostgreSQL                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Catalog repository
//! - [`store`] - Transactional store seam and its backends
//! - [`invoice`] - The invoice transaction processor
//! - [`config`] - Environment-driven service configuration
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tempo_core::InvoiceLineRequest;
//! use tempo_db::{AppConfig, Database, InvoiceProcessor};
//!
//! let config = AppConfig::load()?;
//! let db = Database::new(config.db_config()).await?;
//!
//! let processor = InvoiceProcessor::new(db.product_store(), config.invoice_config());
//! let invoice = processor
//!     .process("Ana María", &[InvoiceLineRequest::new(watch_id, 1)])
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod invoice;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{AppConfig, ConfigError};
pub use error::{DbError, DbResult};
pub use invoice::{generate_invoice_number, InvoiceConfig, InvoiceProcessor};
pub use pool::{Database, DbConfig};

pub use repository::product::ProductRepository;
pub use store::postgres::PgProductStore;
pub use store::sqlite::SqliteProductStore;
pub use store::{ProductStore, StoreTransaction};
