//! # Repository Module
//!
//! Catalog access for the storefront and the admin dashboard.
//!
//! ## Where Repositories Sit
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Catalog / admin handler                Invoice handler                │
//! │       │                                      │                          │
//! │       │  db.products().list_featured()       │  processor.process(..)  │
//! │       ▼                                      ▼                          │
//! │  ProductRepository                      InvoiceProcessor               │
//! │  (pool, one statement per call)         (ProductStore, one tx)         │
//! │       │                                      │                          │
//! │       └──────────────┬───────────────────────┘                          │
//! │                      ▼                                                  │
//! │               products table                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The repository never decrements stock for a sale; only the invoice
//! transaction does that. `set_stock` is an admin restock.
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Product CRUD and listing

pub mod product;
