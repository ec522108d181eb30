//! # Bill Repository
//!
//! Persistence for bill headers and their line items.
//!
//! ## Immutability
//! A bill's monetary columns and its lines are frozen at insert. The only
//! mutation this repository performs afterwards is the ACTIVE -> CANCELLED
//! status flip, done with a conditional update so two concurrent cancels
//! cannot both win.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use folio_core::{Bill, BillLine, BillStatus};

/// One page of bill headers (lines not loaded).
#[derive(Debug, Clone)]
pub struct BillPage {
    pub bills: Vec<Bill>,
    pub total_count: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Result of attempting the ACTIVE -> CANCELLED transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// This call performed the transition.
    Cancelled,
    /// The bill exists but was not ACTIVE.
    NotActive(BillStatus),
}

/// Repository for bill database operations.
#[derive(Debug, Clone)]
pub struct BillRepository {
    pool: SqlitePool,
}

impl BillRepository {
    /// Creates a new BillRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BillRepository { pool }
    }

    /// Inserts a bill header together with all of its lines in one
    /// transaction. Either the whole bill exists afterwards or none of it.
    pub async fn insert_with_lines(&self, bill: &Bill) -> DbResult<()> {
        debug!(
            bill_id = %bill.id,
            bill_number = %bill.bill_number,
            line_count = bill.lines.len(),
            "Inserting bill"
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO bills (
                id, bill_number, customer_id, status,
                subtotal_cents, discount_bps, discount_cents,
                tax_bps, tax_cents, total_cents,
                payment_method, payment_status, notes,
                created_at, updated_at, created_by
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&bill.id)
        .bind(&bill.bill_number)
        .bind(&bill.customer_id)
        .bind(bill.status)
        .bind(bill.subtotal_cents)
        .bind(bill.discount_bps)
        .bind(bill.discount_cents)
        .bind(bill.tax_bps)
        .bind(bill.tax_cents)
        .bind(bill.total_cents)
        .bind(bill.payment_method)
        .bind(bill.payment_status)
        .bind(&bill.notes)
        .bind(bill.created_at)
        .bind(bill.updated_at)
        .bind(&bill.created_by)
        .execute(&mut *tx)
        .await?;

        for line in &bill.lines {
            sqlx::query(
                r#"
                INSERT INTO bill_items (
                    id, bill_id, item_id, code_snapshot, name_snapshot,
                    quantity, unit_price_cents, discount_bps, discount_cents,
                    line_total_cents, created_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&line.id)
            .bind(&line.bill_id)
            .bind(&line.item_id)
            .bind(&line.code_snapshot)
            .bind(&line.name_snapshot)
            .bind(line.quantity)
            .bind(line.unit_price_cents)
            .bind(line.discount_bps)
            .bind(line.discount_cents)
            .bind(line.line_total_cents)
            .bind(line.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Gets a bill by ID with its lines loaded.
    pub async fn find_by_id(&self, id: &str) -> DbResult<Bill> {
        let bill = sqlx::query_as::<_, Bill>("SELECT * FROM bills WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Bill", id))?;

        self.with_lines(bill).await
    }

    /// Gets a bill by its human-readable number with lines loaded.
    pub async fn find_by_number(&self, bill_number: &str) -> DbResult<Bill> {
        let bill = sqlx::query_as::<_, Bill>("SELECT * FROM bills WHERE bill_number = ?")
            .bind(bill_number)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Bill", bill_number))?;

        self.with_lines(bill).await
    }

    /// Loads the lines of a bill in insertion order.
    async fn with_lines(&self, mut bill: Bill) -> DbResult<Bill> {
        bill.lines = sqlx::query_as::<_, BillLine>(
            "SELECT * FROM bill_items WHERE bill_id = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(&bill.id)
        .fetch_all(&self.pool)
        .await?;
        Ok(bill)
    }

    /// Lists bill headers, newest first (lines not loaded).
    pub async fn list(&self, limit: i64, offset: i64) -> DbResult<BillPage> {
        let limit = super::clamp_limit(limit);
        let offset = offset.max(0);

        let total_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bills")
            .fetch_one(&self.pool)
            .await?;

        let bills = sqlx::query_as::<_, Bill>(
            "SELECT * FROM bills ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(BillPage {
            bills,
            total_count,
            limit,
            offset,
        })
    }

    /// Lists a customer's bill headers, newest first.
    pub async fn list_for_customer(
        &self,
        customer_id: &str,
        limit: i64,
        offset: i64,
    ) -> DbResult<BillPage> {
        let limit = super::clamp_limit(limit);
        let offset = offset.max(0);

        let total_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM bills WHERE customer_id = ?")
                .bind(customer_id)
                .fetch_one(&self.pool)
                .await?;

        let bills = sqlx::query_as::<_, Bill>(
            r#"
            SELECT * FROM bills WHERE customer_id = ?
            ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?
            "#,
        )
        .bind(customer_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(BillPage {
            bills,
            total_count,
            limit,
            offset,
        })
    }

    /// Lists bill headers created in `[start, end)`, newest first.
    pub async fn list_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: i64,
        offset: i64,
    ) -> DbResult<BillPage> {
        let limit = super::clamp_limit(limit);
        let offset = offset.max(0);

        let total_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM bills WHERE created_at >= ? AND created_at < ?",
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        let bills = sqlx::query_as::<_, Bill>(
            r#"
            SELECT * FROM bills WHERE created_at >= ? AND created_at < ?
            ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?
            "#,
        )
        .bind(start)
        .bind(end)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(BillPage {
            bills,
            total_count,
            limit,
            offset,
        })
    }

    /// Flips an ACTIVE bill to CANCELLED.
    ///
    /// The condition is part of the statement, so of two concurrent
    /// cancels exactly one observes `Cancelled` and the other
    /// `NotActive`; the loser must not run compensation.
    pub async fn mark_cancelled(&self, id: &str) -> DbResult<CancelOutcome> {
        debug!(bill_id = %id, "Cancelling bill");

        let result = sqlx::query(
            "UPDATE bills SET status = 'cancelled', updated_at = ? WHERE id = ? AND status = 'active'",
        )
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(CancelOutcome::Cancelled);
        }

        let status: Option<BillStatus> =
            sqlx::query_scalar("SELECT status FROM bills WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        match status {
            None => Err(DbError::not_found("Bill", id)),
            Some(status) => Ok(CancelOutcome::NotActive(status)),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::TimeZone;
    use folio_core::{PaymentMethod, PaymentStatus};
    use uuid::Uuid;

    async fn seeded_db() -> (Database, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let customer = db
            .customers()
            .create("ACC-9000", "Test Customer", None, None, None)
            .await
            .unwrap();
        (db, customer.id)
    }

    fn sample_bill(customer_id: &str, bill_number: &str, line_count: usize) -> Bill {
        let now = Utc::now();
        let bill_id = Uuid::new_v4().to_string();
        let lines: Vec<BillLine> = (0..line_count)
            .map(|i| BillLine {
                id: Uuid::new_v4().to_string(),
                bill_id: bill_id.clone(),
                item_id: format!("item-{i}"),
                code_snapshot: format!("BK-{i:03}"),
                name_snapshot: format!("Book {i}"),
                quantity: 2,
                unit_price_cents: 1_000,
                discount_bps: 0,
                discount_cents: 0,
                line_total_cents: 2_000,
                created_at: now,
            })
            .collect();
        let subtotal: i64 = lines.iter().map(|l| l.line_total_cents).sum();

        Bill {
            id: bill_id,
            bill_number: bill_number.to_string(),
            customer_id: customer_id.to_string(),
            status: BillStatus::Active,
            subtotal_cents: subtotal,
            discount_bps: 0,
            discount_cents: 0,
            tax_bps: 0,
            tax_cents: 0,
            total_cents: subtotal,
            payment_method: PaymentMethod::Cash,
            payment_status: PaymentStatus::Paid,
            notes: None,
            created_at: now,
            updated_at: now,
            created_by: "cashier".to_string(),
            lines,
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_round_trip() {
        let (db, customer_id) = seeded_db().await;
        let repo = db.bills();

        // bill_items has an FK on items, so seed the referenced row.
        let item = db
            .items()
            .create(crate::repository::item::NewItem {
                code: "BK-900".to_string(),
                name: "Book 900".to_string(),
                description: None,
                price_cents: 1_000,
                cost_cents: None,
                min_stock_level: 0,
                isbn: None,
                author: None,
            })
            .await
            .unwrap();

        let mut bill = sample_bill(&customer_id, "BILL202608000001", 1);
        bill.lines[0].item_id = item.id.clone();
        repo.insert_with_lines(&bill).await.unwrap();

        let fetched = repo.find_by_id(&bill.id).await.unwrap();
        assert_eq!(fetched.bill_number, "BILL202608000001");
        assert_eq!(fetched.status, BillStatus::Active);
        assert_eq!(fetched.lines.len(), 1);
        assert_eq!(fetched.lines[0].item_id, item.id);
        assert_eq!(fetched.lines[0].line_total_cents, 2_000);

        let by_number = repo.find_by_number("BILL202608000001").await.unwrap();
        assert_eq!(by_number.id, bill.id);
    }

    #[tokio::test]
    async fn test_duplicate_bill_number_rejected() {
        let (db, customer_id) = seeded_db().await;
        let repo = db.bills();

        repo.insert_with_lines(&sample_bill(&customer_id, "BILL202608000002", 0))
            .await
            .unwrap();
        let err = repo
            .insert_with_lines(&sample_bill(&customer_id, "BILL202608000002", 0))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_cancel_is_single_winner() {
        let (db, customer_id) = seeded_db().await;
        let repo = db.bills();

        let bill = sample_bill(&customer_id, "BILL202608000003", 0);
        repo.insert_with_lines(&bill).await.unwrap();

        assert_eq!(
            repo.mark_cancelled(&bill.id).await.unwrap(),
            CancelOutcome::Cancelled
        );
        assert_eq!(
            repo.mark_cancelled(&bill.id).await.unwrap(),
            CancelOutcome::NotActive(BillStatus::Cancelled)
        );

        let err = repo.mark_cancelled("no-such-bill").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_between_filters_by_created_at() {
        let (db, customer_id) = seeded_db().await;
        let repo = db.bills();

        let at = |day: u32| Utc.with_ymd_and_hms(2026, 8, day, 12, 0, 0).unwrap();
        for (i, day) in [5u32, 10, 15, 20].iter().enumerate() {
            let mut bill = sample_bill(&customer_id, &format!("BILL20260800002{i}"), 0);
            bill.created_at = at(*day);
            bill.updated_at = bill.created_at;
            repo.insert_with_lines(&bill).await.unwrap();
        }

        let page = repo.list_between(at(10), at(20), 50, 0).await.unwrap();
        assert_eq!(page.total_count, 2);
        assert_eq!(page.bills.len(), 2);
        // Newest first, and the exclusive end leaves out the day-20 bill.
        assert_eq!(page.bills[0].created_at, at(15));
        assert_eq!(page.bills[1].created_at, at(10));

        let empty = repo.list_between(at(21), at(25), 50, 0).await.unwrap();
        assert_eq!(empty.total_count, 0);
        assert!(empty.bills.is_empty());
    }

    #[tokio::test]
    async fn test_list_for_customer_pagination() {
        let (db, customer_id) = seeded_db().await;
        let repo = db.bills();

        for i in 0..5 {
            repo.insert_with_lines(&sample_bill(
                &customer_id,
                &format!("BILL20260800001{i}"),
                0,
            ))
            .await
            .unwrap();
        }

        let page = repo.list_for_customer(&customer_id, 2, 0).await.unwrap();
        assert_eq!(page.total_count, 5);
        assert_eq!(page.bills.len(), 2);

        let page = repo.list_for_customer(&customer_id, 2, 4).await.unwrap();
        assert_eq!(page.bills.len(), 1);

        let all = repo.list(100, 0).await.unwrap();
        assert_eq!(all.total_count, 5);
    }
}
