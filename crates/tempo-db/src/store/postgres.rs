//! # PostgreSQL Product Store
//!
//! Real row locks: `SELECT ... FOR UPDATE` blocks only transactions that
//! touch the same products. Every transaction sets its own `lock_timeout`,
//! so a waiter gives up with SQLSTATE 55P03 instead of hanging; deadlocks
//! between invoices that lock the same rows in different orders come back
//! as 40P01. Both surface as [`DbError::Conflict`](crate::error::DbError::Conflict).

use std::time::Duration;

use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{info, trace};

use tempo_core::Product;

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::store::{ProductStore, StoreTransaction};

/// [`ProductStore`] over a PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PgProductStore {
    pool: PgPool,
    lock_timeout: Duration,
}

impl PgProductStore {
    pub fn new(pool: PgPool, lock_timeout: Duration) -> Self {
        PgProductStore { pool, lock_timeout }
    }

    /// Connects to `url` and applies the PostgreSQL migrations.
    pub async fn connect(url: &str, max_connections: u32, lock_timeout: Duration) -> DbResult<Self> {
        info!(max_connections, "Connecting to PostgreSQL");

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        migrations::run_postgres_migrations(&pool).await?;

        Ok(PgProductStore::new(pool, lock_timeout))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl ProductStore for PgProductStore {
    type Transaction = PgTransaction;

    async fn begin(&self) -> DbResult<PgTransaction> {
        let mut tx = self.pool.begin().await?;

        // Transaction-local; reset by COMMIT/ROLLBACK
        sqlx::query("SELECT set_config('lock_timeout', $1, true)")
            .bind(format!("{}ms", self.lock_timeout.as_millis()))
            .execute(&mut *tx)
            .await?;

        Ok(PgTransaction { tx })
    }
}

/// An open PostgreSQL transaction. Rolled back on drop.
#[derive(Debug)]
pub struct PgTransaction {
    tx: Transaction<'static, Postgres>,
}

impl StoreTransaction for PgTransaction {
    async fn lock_and_fetch(&mut self, product_id: &str) -> DbResult<Option<Product>> {
        trace!(product_id = %product_id, "Locking product");

        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT
                id, name, description, category,
                price_cents, discount, stock, is_featured,
                created_at, updated_at
            FROM products
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(product_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(product)
    }

    async fn update_stock(&mut self, product_id: &str, new_stock: i64) -> DbResult<()> {
        let result = sqlx::query("UPDATE products SET stock = $2, updated_at = $3 WHERE id = $1")
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
