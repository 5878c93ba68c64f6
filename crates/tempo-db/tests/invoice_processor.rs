//! End-to-end tests of the invoice transaction against real databases.

use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use tempo_core::{InvoiceError, InvoiceLineRequest, Money, Product};
use tempo_db::{
    AppConfig, Database, DbConfig, InvoiceConfig, InvoiceProcessor, ProductStore,
    SqliteProductStore, StoreTransaction,
};
use uuid::Uuid;

fn watch(id: &str, price_cents: i64, discount: i64, stock: i64) -> Product {
    let now = Utc::now();
    Product {
        id: id.to_string(),
        name: format!("Watch {}", id),
        description: None,
        category: "Clásico".to_string(),
        price_cents,
        discount,
        stock,
        is_featured: false,
        created_at: now,
        updated_at: now,
    }
}

async fn catalog(products: &[Product]) -> Database {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    for product in products {
        db.products().insert(product).await.unwrap();
    }
    db
}

fn processor(db: &Database) -> InvoiceProcessor<SqliteProductStore> {
    InvoiceProcessor::new(db.product_store(), InvoiceConfig::default())
}

async fn stock(db: &Database, id: &str) -> i64 {
    db.products().get_by_id(id).await.unwrap().unwrap().stock
}

fn line(id: &str, quantity: i64) -> InvoiceLineRequest {
    InvoiceLineRequest::new(id, quantity)
}

#[tokio::test]
async fn test_discounted_line_decrements_stock() {
    let db = catalog(&[watch("P1", 10000, 10, 10)]).await;

    let invoice = processor(&db).process("Ana", &[line("P1", 3)]).await.unwrap();

    assert_eq!(invoice.lines[0].unit_price_after_discount, Money::from_cents(9000));
    assert_eq!(invoice.lines[0].subtotal, Money::from_cents(27000));
    assert_eq!(invoice.grand_total, Money::from_cents(27000));
    assert!(invoice.invoice_number.starts_with("INV-"));
    assert_eq!(stock(&db, "P1").await, 7);
}

#[tokio::test]
async fn test_insufficient_stock_leaves_stock_untouched() {
    let db = catalog(&[watch("P2", 5000, 0, 2)]).await;

    let err = processor(&db).process("Ana", &[line("P2", 5)]).await.unwrap_err();

    assert!(matches!(
        err,
        InvoiceError::InsufficientStock { ref product_id, available: 2, requested: 5 }
            if product_id == "P2"
    ));
    assert_eq!(err.status_code(), 409);
    assert!(!err.is_retryable());
    assert_eq!(stock(&db, "P2").await, 2);
}

#[tokio::test]
async fn test_failing_line_rolls_back_earlier_lines() {
    let db = catalog(&[watch("P1", 10000, 10, 10), watch("P2", 5000, 0, 2)]).await;
    let processor = processor(&db);

    let err = processor
        .process("Ana", &[line("P1", 3), line("P2", 5)])
        .await
        .unwrap_err();
    assert!(matches!(err, InvoiceError::InsufficientStock { .. }));

    let err = processor
        .process("Ana", &[line("P1", 3), line("P9", 1)])
        .await
        .unwrap_err();
    assert!(matches!(err, InvoiceError::ProductNotFound(ref id) if id == "P9"));

    assert_eq!(stock(&db, "P1").await, 10);
    assert_eq!(stock(&db, "P2").await, 2);
}

#[tokio::test]
async fn test_multi_line_totals() {
    let db = catalog(&[
        watch("ELEGANCE", 45_000_000, 10, 50),
        watch("SPORTIVE", 32_000_000, 0, 75),
        watch("SAPPHIRE", 75_000_000, 15, 30),
    ])
    .await;

    let invoice = processor(&db)
        .process(
            "Ana María Pérez",
            &[line("ELEGANCE", 2), line("SPORTIVE", 1), line("SAPPHIRE", 3)],
        )
        .await
        .unwrap();

    let summed: Money = invoice.lines.iter().map(|l| l.subtotal).sum();
    assert_eq!(invoice.grand_total, summed);
    // 2 × 405.000 + 320.000 + 3 × 637.500
    assert_eq!(invoice.grand_total, Money::from_major_minor(3_042_500, 0));
    assert_eq!(invoice.download_file_name(), "factura_Ana_María_Pérez.docx");

    assert_eq!(stock(&db, "ELEGANCE").await, 48);
    assert_eq!(stock(&db, "SPORTIVE").await, 74);
    assert_eq!(stock(&db, "SAPPHIRE").await, 27);
}

#[tokio::test]
async fn test_identical_calls_decrement_twice() {
    let db = catalog(&[watch("P1", 10000, 0, 10)]).await;
    let processor = processor(&db);

    processor.process("Ana", &[line("P1", 4)]).await.unwrap();
    processor.process("Ana", &[line("P1", 4)]).await.unwrap();

    assert_eq!(stock(&db, "P1").await, 2);

    let err = processor.process("Ana", &[line("P1", 4)]).await.unwrap_err();
    assert!(matches!(err, InvoiceError::InsufficientStock { available: 2, .. }));
}

#[tokio::test]
async fn test_large_quantity_within_stock() {
    let db = catalog(&[watch("P1", 100, 0, 5000)]).await;

    let invoice = processor(&db).process("Ana", &[line("P1", 1000)]).await.unwrap();

    assert_eq!(invoice.total_units(), 1000);
    assert_eq!(invoice.grand_total, Money::from_cents(100_000));
    assert_eq!(stock(&db, "P1").await, 4000);
}

#[tokio::test]
async fn test_overflowing_subtotal_is_rejected() {
    let db = catalog(&[watch("P1", 10000, 0, 10), watch("BIG", i64::MAX / 2, 0, 10)]).await;

    let err = processor(&db)
        .process("Ana", &[line("P1", 1), line("BIG", 3)])
        .await
        .unwrap_err();

    assert!(matches!(err, InvoiceError::Validation(_)));
    assert_eq!(stock(&db, "P1").await, 10);
    assert_eq!(stock(&db, "BIG").await, 10);
}

#[tokio::test]
async fn test_invalid_request_is_rejected() {
    let db = catalog(&[watch("P1", 10000, 0, 10)]).await;
    let processor = processor(&db);

    for (customer, lines) in [
        ("", vec![line("P1", 1)]),
        ("Ana", vec![]),
        ("Ana", vec![line("P1", 0)]),
        ("Ana", vec![line("P1", -2)]),
    ] {
        let err = processor.process(customer, &lines).await.unwrap_err();
        assert!(matches!(err, InvoiceError::Validation(_)), "{customer:?} {lines:?}");
    }

    assert_eq!(stock(&db, "P1").await, 10);
}

// =============================================================================
// Concurrency (file-backed SQLite, several connections)
// =============================================================================

struct TempDb {
    path: PathBuf,
}

impl TempDb {
    fn new() -> Self {
        TempDb {
            path: std::env::temp_dir().join(format!("tempo-test-{}.db", Uuid::new_v4())),
        }
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_invoices_never_oversell() {
    let temp = TempDb::new();
    let db = Database::new(
        DbConfig::new(&temp.path)
            .max_connections(8)
            .busy_timeout(Duration::from_secs(20)),
    )
    .await
    .unwrap();
    db.products().insert(&watch("P1", 10000, 0, 10)).await.unwrap();

    let processor = InvoiceProcessor::new(
        db.product_store(),
        InvoiceConfig::default().transaction_timeout(Duration::from_secs(30)),
    );

    // 8 × 3 units requested, 10 in stock: exactly 3 calls fit
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let processor = processor.clone();
            tokio::spawn(async move {
                processor
                    .process(&format!("Customer {}", i), &[InvoiceLineRequest::new("P1", 3)])
                    .await
            })
        })
        .collect();

    let mut succeeded = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(invoice) => {
                assert_eq!(invoice.total_units(), 3);
                succeeded += 1;
            }
            Err(err) => assert!(
                matches!(err, InvoiceError::InsufficientStock { .. }),
                "unexpected error: {err}"
            ),
        }
    }

    assert_eq!(succeeded, 3);
    assert_eq!(stock(&db, "P1").await, 1);

    db.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_catalog_reads_do_not_block_on_open_invoice() {
    let temp = TempDb::new();
    let db = Database::new(DbConfig::new(&temp.path).max_connections(4))
        .await
        .unwrap();
    db.products().insert(&watch("P1", 10000, 0, 10)).await.unwrap();

    let store = db.product_store();
    let mut tx = store.begin().await.unwrap();
    tx.lock_and_fetch("P1").await.unwrap();
    tx.update_stock("P1", 0).await.unwrap();

    // Reader sees the last committed state while the writer holds the lock
    assert_eq!(stock(&db, "P1").await, 10);

    tx.rollback().await.unwrap();
    assert_eq!(stock(&db, "P1").await, 10);

    db.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_lock_wait_timeout_is_a_retryable_conflict() {
    let temp = TempDb::new();
    let db = Database::new(
        DbConfig::new(&temp.path)
            .max_connections(4)
            .busy_timeout(Duration::from_millis(100)),
    )
    .await
    .unwrap();
    db.products().insert(&watch("P1", 10000, 0, 10)).await.unwrap();

    let store = db.product_store();
    let mut holder = store.begin().await.unwrap();
    holder.lock_and_fetch("P1").await.unwrap();

    let err = processor(&db).process("Ana", &[line("P1", 1)]).await.unwrap_err();

    assert!(matches!(err, InvoiceError::TransactionConflict(_)), "unexpected error: {err}");
    assert!(err.is_retryable());
    assert_eq!(err.status_code(), 409);

    holder.rollback().await.unwrap();
    assert_eq!(stock(&db, "P1").await, 10);

    // Lock released: the same request now goes through
    processor(&db).process("Ana", &[line("P1", 1)]).await.unwrap();
    assert_eq!(stock(&db, "P1").await, 9);

    db.close().await;
}

// =============================================================================
// PostgreSQL (runs only when TEST_POSTGRES_URL is set)
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_postgres_row_locks() {
    let Ok(url) = std::env::var("TEST_POSTGRES_URL") else {
        eprintln!("TEST_POSTGRES_URL not set, skipping");
        return;
    };

    let config = AppConfig::from_lookup(|key| match key {
        "DATABASE_URL" => Some(url.clone()),
        "DB_MAX_CONNECTIONS" => Some("8".to_string()),
        "LOCK_TIMEOUT_MS" => Some("10000".to_string()),
        _ => None,
    })
    .unwrap();
    let store = config.connect_postgres().await.unwrap().unwrap();

    let id = format!("pg-{}", Uuid::new_v4());
    let product = watch(&id, 10000, 10, 10);
    sqlx::query(
        "INSERT INTO products (id, name, category, price_cents, discount, stock, is_featured)
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(&product.id)
    .bind(&product.name)
    .bind(&product.category)
    .bind(product.price_cents)
    .bind(product.discount)
    .bind(product.stock)
    .bind(product.is_featured)
    .execute(store.pool())
    .await
    .unwrap();

    let processor = InvoiceProcessor::new(store.clone(), config.invoice_config());

    let invoice = processor
        .process("Ana", &[InvoiceLineRequest::new(id.as_str(), 3)])
        .await
        .unwrap();
    assert_eq!(invoice.grand_total, Money::from_cents(27000));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let processor = processor.clone();
            let id = id.clone();
            tokio::spawn(async move {
                processor
                    .process("Ana", &[InvoiceLineRequest::new(id, 3)])
                    .await
            })
        })
        .collect();

    let mut succeeded = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            succeeded += 1;
        }
    }
    assert_eq!(succeeded, 2);

    let remaining: i64 = sqlx::query_scalar("SELECT stock FROM products WHERE id = $1")
        .bind(&id)
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(remaining, 1);

    sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(&id)
        .execute(store.pool())
        .await
        .unwrap();
}
