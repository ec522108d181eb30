//! # Stock Ledger Repository
//!
//! The only writer of `items.stock_quantity` and the sales aggregates.
//! Every mutation happens in one transaction together with an append-only
//! `stock_movements` row, so the ledger always explains the on-hand
//! number.
//!
//! ## Never Oversell
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  Two tills sell the last copy of BK-001 at the same time      │
//! │                                                               │
//! │  Till A: UPDATE items SET stock_quantity = stock_quantity - 1 │
//! │          WHERE id = ? AND is_active = 1                       │
//! │            AND stock_quantity >= 1        → 1 row, SOLD       │
//! │                                                               │
//! │  Till B: same statement, runs after A     → 0 rows, REJECTED  │
//! │                                                               │
//! │  The guard and the write are ONE statement; SQLite serializes │
//! │  writers, so no interleaving can satisfy both.                │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! A zero-row update is classified afterwards with a plain SELECT:
//! missing item, inactive item, or insufficient stock (with the
//! available quantity for the error message).

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use folio_core::{MovementType, ReferenceType, StockMovement};

/// Result of a conditional stock debit.
///
/// The guard failing is a business outcome, not a database fault, so it
/// is reported as data rather than a [`DbError`]; the workflow layer maps
/// it onto its own error taxonomy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebitOutcome {
    /// Stock was debited and the OUT movement recorded.
    Debited,
    /// No item row with this id.
    NotFound,
    /// Item exists but is deactivated.
    Inactive,
    /// Item is active but has fewer units than requested.
    Insufficient { available: i64 },
}

/// Repository for the append-only stock movement ledger.
#[derive(Debug, Clone)]
pub struct StockLedgerRepository {
    pool: SqlitePool,
}

impl StockLedgerRepository {
    /// Creates a new StockLedgerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StockLedgerRepository { pool }
    }

    /// Debits stock for one bill line and records the OUT/SALE movement.
    ///
    /// One transaction:
    /// 1. Conditional decrement, guarded on active + sufficient stock,
    ///    folding in the sales aggregates in the same statement
    /// 2. Append movement row with NEGATIVE quantity, referencing the bill
    ///
    /// ## Arguments
    /// * `revenue_cents` - The line total attributed to this debit, added
    ///   to `total_revenue_cents`
    pub async fn debit_for_sale(
        &self,
        item_id: &str,
        quantity: i64,
        revenue_cents: i64,
        bill_id: &str,
        actor: &str,
    ) -> DbResult<DebitOutcome> {
        debug!(item_id = %item_id, quantity, bill_id = %bill_id, "Debiting stock for sale");

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE items
            SET stock_quantity = stock_quantity - ?,
                total_sold = total_sold + ?,
                total_revenue_cents = total_revenue_cents + ?,
                updated_at = ?
            WHERE id = ? AND is_active = 1 AND stock_quantity >= ?
            "#,
        )
        .bind(quantity)
        .bind(quantity)
        .bind(revenue_cents)
        .bind(Utc::now())
        .bind(item_id)
        .bind(quantity)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            // Guard failed; figure out which clause.
            let row: Option<(bool, i64)> = sqlx::query_as(
                "SELECT is_active, stock_quantity FROM items WHERE id = ?",
            )
            .bind(item_id)
            .fetch_optional(&mut *tx)
            .await?;
            tx.rollback().await?;

            return Ok(match row {
                None => DebitOutcome::NotFound,
                Some((false, _)) => DebitOutcome::Inactive,
                Some((true, available)) => DebitOutcome::Insufficient { available },
            });
        }

        self.append_movement(
            &mut tx,
            item_id,
            MovementType::Out,
            -quantity,
            ReferenceType::Sale,
            Some(bill_id),
            None,
            actor,
        )
        .await?;

        tx.commit().await?;
        Ok(DebitOutcome::Debited)
    }

    /// Restores stock for one cancelled bill line and records the
    /// RETURN movement. Sales aggregates are reversed, floored at zero.
    pub async fn restore_for_return(
        &self,
        item_id: &str,
        quantity: i64,
        revenue_cents: i64,
        bill_id: &str,
        actor: &str,
    ) -> DbResult<()> {
        debug!(item_id = %item_id, quantity, bill_id = %bill_id, "Restoring stock for return");

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE items
            SET stock_quantity = stock_quantity + ?,
                total_sold = MAX(total_sold - ?, 0),
                total_revenue_cents = MAX(total_revenue_cents - ?, 0),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(quantity)
        .bind(quantity)
        .bind(revenue_cents)
        .bind(Utc::now())
        .bind(item_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(DbError::not_found("Item", item_id));
        }

        self.append_movement(
            &mut tx,
            item_id,
            MovementType::Return,
            quantity,
            ReferenceType::Return,
            Some(bill_id),
            None,
            actor,
        )
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Records a stock receipt (purchase delivery or opening stock).
    ///
    /// `reference` should be [`ReferenceType::Purchase`] or
    /// [`ReferenceType::Initial`]; the quantity must be positive.
    pub async fn record_receipt(
        &self,
        item_id: &str,
        quantity: i64,
        reference: ReferenceType,
        notes: Option<&str>,
        actor: &str,
    ) -> DbResult<()> {
        debug!(item_id = %item_id, quantity, "Recording stock receipt");

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE items SET stock_quantity = stock_quantity + ?, updated_at = ? WHERE id = ?",
        )
        .bind(quantity)
        .bind(Utc::now())
        .bind(item_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(DbError::not_found("Item", item_id));
        }

        self.append_movement(
            &mut tx,
            item_id,
            MovementType::In,
            quantity,
            reference,
            None,
            notes,
            actor,
        )
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Records a manual stock correction. `delta` is signed; a negative
    /// adjustment is guarded the same way as a sale so the on-hand count
    /// can never go below zero.
    pub async fn record_adjustment(
        &self,
        item_id: &str,
        delta: i64,
        notes: Option<&str>,
        actor: &str,
    ) -> DbResult<DebitOutcome> {
        debug!(item_id = %item_id, delta, "Recording stock adjustment");

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE items
            SET stock_quantity = stock_quantity + ?,
                updated_at = ?
            WHERE id = ? AND stock_quantity + ? >= 0
            "#,
        )
        .bind(delta)
        .bind(Utc::now())
        .bind(item_id)
        .bind(delta)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            let row: Option<(bool, i64)> = sqlx::query_as(
                "SELECT is_active, stock_quantity FROM items WHERE id = ?",
            )
            .bind(item_id)
            .fetch_optional(&mut *tx)
            .await?;
            tx.rollback().await?;

            return Ok(match row {
                None => DebitOutcome::NotFound,
                Some((_, available)) => DebitOutcome::Insufficient { available },
            });
        }

        self.append_movement(
            &mut tx,
            item_id,
            MovementType::Adjustment,
            delta,
            ReferenceType::Adjustment,
            None,
            notes,
            actor,
        )
        .await?;

        tx.commit().await?;
        Ok(DebitOutcome::Debited)
    }

    /// Lists movements for an item, newest first.
    pub async fn movements_for_item(
        &self,
        item_id: &str,
        limit: i64,
    ) -> DbResult<Vec<StockMovement>> {
        let limit = super::clamp_limit(limit);
        let movements = sqlx::query_as::<_, StockMovement>(
            "SELECT * FROM stock_movements WHERE item_id = ? ORDER BY created_at DESC, id DESC LIMIT ?",
        )
        .bind(item_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(movements)
    }

    /// Lists movements referencing a business event (e.g. all movements
    /// of one bill).
    pub async fn movements_for_reference(
        &self,
        reference_type: ReferenceType,
        reference_id: &str,
    ) -> DbResult<Vec<StockMovement>> {
        let movements = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT * FROM stock_movements
            WHERE reference_type = ? AND reference_id = ?
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(reference_type)
        .bind(reference_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(movements)
    }

    /// Sums the signed movement quantities for an item. When every
    /// receipt went through the ledger this equals `stock_quantity`;
    /// reporting uses it as a reconciliation check.
    pub async fn quantity_sum(&self, item_id: &str) -> DbResult<i64> {
        let sum: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(quantity), 0) FROM stock_movements WHERE item_id = ?",
        )
        .bind(item_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(sum)
    }

    /// Appends a movement row inside the caller's transaction.
    #[allow(clippy::too_many_arguments)]
    async fn append_movement(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        item_id: &str,
        movement_type: MovementType,
        quantity: i64,
        reference_type: ReferenceType,
        reference_id: Option<&str>,
        notes: Option<&str>,
        actor: &str,
    ) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO stock_movements (
                id, item_id, movement_type, quantity,
                reference_type, reference_id, notes, created_at, created_by
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(item_id)
        .bind(movement_type)
        .bind(quantity)
        .bind(reference_type)
        .bind(reference_id)
        .bind(notes)
        .bind(Utc::now())
        .bind(actor)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
