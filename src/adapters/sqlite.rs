//! Managed-store adapter backed by SQLite.
//!
//! Uses `rusqlite` in synchronous mode behind a mutex; every lookup is a
//! short indexed read, so the lock is never held across an `.await`.
//! An order fetch reads the order row and its line items (joined with
//! product metadata) under one lock, giving a consistent snapshot.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use super::errors::AdapterError;
use super::types::{OrderDetails, OrderItem, ProductDetails, RefundDetails};
use super::DataAdapter;

// ─── SqliteAdapter ──────────────────────────────────────────────────────────

pub struct SqliteAdapter {
    conn: Mutex<Connection>,
}

impl SqliteAdapter {
    /// Open (or create) the store at `path`.
    ///
    /// Pass `":memory:"` for an in-memory store (tests, demos).
    pub fn open(path: &str) -> Result<Self, AdapterError> {
        let conn = Connection::open(path).map_err(|e| AdapterError::ConnectionFailed {
            target: path.to_string(),
            reason: e.to_string(),
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;

        let adapter = Self {
            conn: Mutex::new(conn),
        };
        adapter.create_tables()?;
        Ok(adapter)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, AdapterError> {
        self.conn.lock().map_err(|e| AdapterError::DatabaseError {
            reason: format!("connection lock poisoned: {e}"),
        })
    }

    fn create_tables(&self) -> Result<(), AdapterError> {
        self.lock()?.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS products (
                product_id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                price REAL NOT NULL,
                stock INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS orders (
                order_id TEXT PRIMARY KEY,
                status TEXT NOT NULL,
                total REAL NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS order_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                order_id TEXT NOT NULL,
                product_id TEXT NOT NULL,
                quantity INTEGER NOT NULL,
                price REAL NOT NULL,
                FOREIGN KEY (order_id) REFERENCES orders(order_id)
            );

            CREATE INDEX IF NOT EXISTS idx_order_items_order
                ON order_items(order_id, id);

            CREATE TABLE IF NOT EXISTS refunds (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                order_id TEXT NOT NULL,
                amount REAL NOT NULL,
                status TEXT NOT NULL,
                reason TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_refunds_order
                ON refunds(order_id, id);
            ",
        )?;
        Ok(())
    }

    // ─── Seeding ────────────────────────────────────────────────────────

    pub fn insert_product(&self, product: &ProductDetails) -> Result<(), AdapterError> {
        self.lock()?.execute(
            "INSERT OR REPLACE INTO products (product_id, name, description, price, stock)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                product.product_id,
                product.name,
                product.description,
                product.price,
                product.stock
            ],
        )?;
        Ok(())
    }

    /// Insert an order and its line items atomically.
    ///
    /// Item `name`/`description` are ignored; they are joined from
    /// `products` on read.
    pub fn insert_order(&self, order: &OrderDetails) -> Result<(), AdapterError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO orders (order_id, status, total, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![order.order_id, order.status, order.total, order.created_at],
        )?;

        for item in order.items.iter().flatten() {
            tx.execute(
                "INSERT INTO order_items (order_id, product_id, quantity, price)
                 VALUES (?1, ?2, ?3, ?4)",
                params![order.order_id, item.product_id, item.quantity, item.price],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    pub fn insert_refund(&self, refund: &RefundDetails) -> Result<(), AdapterError> {
        self.lock()?.execute(
            "INSERT INTO refunds (order_id, amount, status, reason) VALUES (?1, ?2, ?3, ?4)",
            params![refund.order_id, refund.amount, refund.status, refund.reason],
        )?;
        Ok(())
    }

    // ─── Queries ────────────────────────────────────────────────────────

    fn query_order(&self, order_id: &str) -> Result<Option<OrderDetails>, AdapterError> {
        let conn = self.lock()?;

        let order = conn
            .query_row(
                "SELECT order_id, status, total, created_at FROM orders WHERE order_id = ?1",
                params![order_id],
                |row| {
                    Ok(OrderDetails {
                        order_id: row.get(0)?,
                        status: row.get(1)?,
                        total: row.get(2)?,
                        created_at: row.get(3)?,
                        items: None,
                    })
                },
            )
            .optional()?;

        let Some(mut order) = order else {
            return Ok(None);
        };

        let mut stmt = conn.prepare(
            "SELECT oi.product_id, oi.quantity, oi.price, p.name, p.description
             FROM order_items oi
             LEFT JOIN products p ON p.product_id = oi.product_id
             WHERE oi.order_id = ?1
             ORDER BY oi.id",
        )?;

        let rows = stmt.query_map(params![order_id], |row| {
            Ok(OrderItem {
                product_id: row.get(0)?,
                quantity: row.get(1)?,
                price: row.get(2)?,
                name: row.get(3)?,
                description: row.get(4)?,
            })
        })?;

        let items = rows.collect::<Result<Vec<_>, _>>()?;
        order.items = Some(items);
        Ok(Some(order))
    }

    fn query_product(&self, product_id: &str) -> Result<Option<ProductDetails>, AdapterError> {
        let product = self
            .lock()?
            .query_row(
                "SELECT product_id, name, description, price, stock
                 FROM products WHERE product_id = ?1",
                params![product_id],
                |row| {
                    Ok(ProductDetails {
                        product_id: row.get(0)?,
                        name: row.get(1)?,
                        description: row.get(2)?,
                        price: row.get(3)?,
                        stock: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(product)
    }

    /// Most recent refund recorded against the order.
    fn query_refund(&self, order_id: &str) -> Result<Option<RefundDetails>, AdapterError> {
        let refund = self
            .lock()?
            .query_row(
                "SELECT order_id, amount, status, reason
                 FROM refunds WHERE order_id = ?1
                 ORDER BY id DESC LIMIT 1",
                params![order_id],
                |row| {
                    Ok(RefundDetails {
                        order_id: row.get(0)?,
                        amount: row.get(1)?,
                        status: row.get(2)?,
                        reason: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(refund)
    }
}

#[async_trait]
impl DataAdapter for SqliteAdapter {
    async fn fetch_order_info(&self, order_id: &str) -> Result<Option<OrderDetails>, AdapterError> {
        self.query_order(order_id)
    }

    async fn fetch_product_info(
        &self,
        product_id: &str,
    ) -> Result<Option<ProductDetails>, AdapterError> {
        self.query_product(product_id)
    }

    async fn fetch_refund_info(
        &self,
        order_id: &str,
    ) -> Result<Option<RefundDetails>, AdapterError> {
        self.query_refund(order_id)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
