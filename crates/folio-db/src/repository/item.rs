//! # Item Repository
//!
//! Read and create operations for catalog items.
//!
//! Stock mutation is deliberately NOT here: `stock_quantity`,
//! `total_sold` and `total_revenue_cents` are written only by the stock
//! ledger ([`crate::repository::stock::StockLedgerRepository`]) so every
//! change leaves a movement row behind.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use folio_core::Item;

/// Repository for catalog item database operations.
#[derive(Debug, Clone)]
pub struct ItemRepository {
    pool: SqlitePool,
}

/// Input for creating a catalog item.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub cost_cents: Option<i64>,
    pub min_stock_level: i64,
    pub isbn: Option<String>,
    pub author: Option<String>,
}

impl ItemRepository {
    /// Creates a new ItemRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ItemRepository { pool }
    }

    /// Gets an item by ID. Returns NotFound if missing.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Item> {
        sqlx::query_as::<_, Item>("SELECT * FROM items WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Item", id))
    }

    /// Gets an item by its business code (shelf label).
    pub async fn get_by_code(&self, code: &str) -> DbResult<Item> {
        sqlx::query_as::<_, Item>("SELECT * FROM items WHERE code = ?")
            .bind(code)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Item", code))
    }

    /// Inserts a catalog item with zero stock. Opening stock arrives via
    /// the ledger as an INITIAL movement so reconciliation holds from day
    /// one.
    pub async fn create(&self, new: NewItem) -> DbResult<Item> {
        debug!(code = %new.code, "Creating catalog item");

        let now = Utc::now();
        let item = Item {
            id: Uuid::new_v4().to_string(),
            code: new.code,
            name: new.name,
            description: new.description,
            price_cents: new.price_cents,
            cost_cents: new.cost_cents,
            stock_quantity: 0,
            min_stock_level: new.min_stock_level,
            isbn: new.isbn,
            author: new.author,
            is_active: true,
            total_sold: 0,
            total_revenue_cents: 0,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO items (
                id, code, name, description, price_cents, cost_cents,
                stock_quantity, min_stock_level, isbn, author, is_active,
                total_sold, total_revenue_cents, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&item.id)
        .bind(&item.code)
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.price_cents)
        .bind(item.cost_cents)
        .bind(item.stock_quantity)
        .bind(item.min_stock_level)
        .bind(&item.isbn)
        .bind(&item.author)
        .bind(item.is_active)
        .bind(item.total_sold)
        .bind(item.total_revenue_cents)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(item)
    }

    /// Deactivates an item (soft delete). Historical bills keep their
    /// snapshots; new sales of the item are rejected.
    pub async fn deactivate(&self, id: &str) -> DbResult<()> {
        let result =
            sqlx::query("UPDATE items SET is_active = 0, updated_at = ? WHERE id = ?")
                .bind(Utc::now())
                .bind(id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", id));
        }
        Ok(())
    }

    /// Lists active items ordered by code.
    pub async fn list_active(&self, limit: i64) -> DbResult<Vec<Item>> {
        let limit = super::clamp_limit(limit);
        let items = sqlx::query_as::<_, Item>(
            "SELECT * FROM items WHERE is_active = 1 ORDER BY code LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    /// Lists active items at or below their reorder threshold.
    pub async fn list_low_stock(&self) -> DbResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(
            r#"
            SELECT * FROM items
            WHERE is_active = 1 AND stock_quantity <= min_stock_level
            ORDER BY stock_quantity ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
