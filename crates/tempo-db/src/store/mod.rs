//! # Transactional Product Store
//!
//! The narrow storage seam the invoice processor runs against.
//!
//! ## Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  store.begin()                     one transaction, one connection     │
//! │     │                                                                   │
//! │     ├── tx.lock_and_fetch(id)      row is ours until commit/rollback   │
//! │     ├── tx.update_stock(id, n)     only on rows we locked              │
//! │     │      ...                                                          │
//! │     ├── tx.commit()                all decrements visible at once      │
//! │     └── tx.rollback() / drop       none of them ever visible           │
//! │                                                                         │
//! │  A second transaction touching a locked row waits, or fails with       │
//! │  DbError::Conflict when the backend gives up. It never observes a      │
//! │  half-applied invoice.                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Backends
//! - [`sqlite::SqliteProductStore`] - database-wide write lock, taken by the
//!   first statement of the transaction
//! - [`postgres::PgProductStore`] - `SELECT ... FOR UPDATE` row locks

use std::future::Future;

use tempo_core::Product;

use crate::error::DbResult;

pub mod postgres;
pub mod sqlite;

/// Something that can open inventory transactions.
pub trait ProductStore: Send + Sync {
    type Transaction: StoreTransaction;

    /// Opens a new transaction on its own connection.
    fn begin(&self) -> impl Future<Output = DbResult<Self::Transaction>> + Send;
}

/// One open inventory transaction.
///
/// Dropping it without calling [`commit`](StoreTransaction::commit) rolls
/// it back.
pub trait StoreTransaction: Send {
    /// Locks the product row for the rest of the transaction and returns
    /// its current state, or `None` if no such product exists.
    fn lock_and_fetch(
        &mut self,
        product_id: &str,
    ) -> impl Future<Output = DbResult<Option<Product>>> + Send;

    /// Overwrites the stock of a row previously locked by this transaction.
    fn update_stock(
        &mut self,
        product_id: &str,
        new_stock: i64,
    ) -> impl Future<Output = DbResult<()>> + Send;

    fn commit(self) -> impl Future<Output = DbResult<()>> + Send;

    fn rollback(self) -> impl Future<Output = DbResult<()>> + Send;
}
