//! # SQLite Product Store
//!
//! SQLite has no row locks. A write transaction holds the database-wide
//! RESERVED lock from its first write until it ends, so the store makes
//! every `lock_and_fetch` a write:
//!
//! ```text
//! BEGIN (deferred)
//! UPDATE products SET stock = stock WHERE id = ? RETURNING ...   ← lock taken
//! UPDATE products SET stock = ?  WHERE id = ?
//! ...
//! COMMIT                                                        ← lock released
//! ```
//!
//! Competing invoice transactions queue on that lock for up to the pool's
//! `busy_timeout`, then fail with `SQLITE_BUSY`, which surfaces as
//! [`DbError::Conflict`](crate::error::DbError::Conflict). Catalog reads are
//! not blocked (WAL).

use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::trace;

use tempo_core::Product;

use crate::error::{DbError, DbResult};
use crate::store::{ProductStore, StoreTransaction};

/// [`ProductStore`] over a SQLite pool.
#[derive(Debug, Clone)]
pub struct SqliteProductStore {
    pool: SqlitePool,
}

impl SqliteProductStore {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteProductStore { pool }
    }
}

impl ProductStore for SqliteProductStore {
    type Transaction = SqliteTransaction;

    async fn begin(&self) -> DbResult<SqliteTransaction> {
        let tx = self.pool.begin().await?;
        Ok(SqliteTransaction { tx })
    }
}

/// An open SQLite transaction. Rolled back on drop.
#[derive(Debug)]
pub struct SqliteTransaction {
    tx: Transaction<'static, Sqlite>,
}

impl StoreTransaction for SqliteTransaction {
    async fn lock_and_fetch(&mut self, product_id: &str) -> DbResult<Option<Product>> {
        trace!(product_id = %product_id, "Locking product");

        // No-op write: takes the write lock and reads the row in one step
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET stock = stock
            WHERE id = ?1
            RETURNING
                id, name, description, category,
                price_cents, discount, stock, is_featured,
                created_at, updated_at
            "#,
        )
        .bind(product_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(product)
    }

    async fn update_stock(&mut self, product_id: &str, new_stock: i64) -> DbResult<()> {
        let result = sqlx::query("UPDATE products SET stock = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(product_id)
            .bind(new_stock)
            .bind(Utc::now())
            .execute(&mut *self.tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", product_id));
        }

        Ok(())
    }

    async fn commit(self) -> DbResult<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> DbResult<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
