//! # Customer Repository
//!
//! Database operations for customer accounts.
//!
//! ## Purchase Aggregates
//! `total_purchases_cents` and `total_bills` are running totals maintained
//! incrementally: `record_purchase` on bill creation, `record_cancellation`
//! on cancel. Cancellation floors both at zero rather than letting legacy
//! data drive them negative.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use folio_core::Customer;

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Gets a customer by ID. Returns NotFound if missing.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Customer> {
        sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))
    }

    /// Gets a customer by account number.
    pub async fn get_by_account_no(&self, account_no: &str) -> DbResult<Customer> {
        sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE account_no = ?")
            .bind(account_no)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", account_no))
    }

    /// Returns whether an ACTIVE customer with this id exists.
    pub async fn exists_active(&self, id: &str) -> DbResult<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM customers WHERE id = ? AND is_active = 1")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count > 0)
    }

    /// Inserts a new customer.
    pub async fn insert(&self, customer: &Customer) -> DbResult<()> {
        debug!(id = %customer.id, account_no = %customer.account_no, "Inserting customer");

        sqlx::query(
            r#"
            INSERT INTO customers (
                id, account_no, name, phone, email, address, is_active,
                total_purchases_cents, total_bills, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.account_no)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(&customer.address)
        .bind(customer.is_active)
        .bind(customer.total_purchases_cents)
        .bind(customer.total_bills)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Creates a customer with a fresh id and zeroed aggregates.
    pub async fn create(
        &self,
        account_no: &str,
        name: &str,
        phone: Option<&str>,
        email: Option<&str>,
        address: Option<&str>,
    ) -> DbResult<Customer> {
        let now = Utc::now();
        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            account_no: account_no.to_string(),
            name: name.to_string(),
            phone: phone.map(String::from),
            email: email.map(String::from),
            address: address.map(String::from),
            is_active: true,
            total_purchases_cents: 0,
            total_bills: 0,
            created_at: now,
            updated_at: now,
        };
        self.insert(&customer).await?;
        Ok(customer)
    }

    /// Records a completed purchase against the customer aggregates.
    pub async fn record_purchase(&self, customer_id: &str, total_cents: i64) -> DbResult<()> {
        debug!(customer_id = %customer_id, total_cents, "Recording purchase on customer");

        let result = sqlx::query(
            r#"
            UPDATE customers
            SET total_purchases_cents = total_purchases_cents + ?,
                total_bills = total_bills + 1,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(total_cents)
        .bind(Utc::now())
        .bind(customer_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", customer_id));
        }
        Ok(())
    }

    /// Reverses a purchase on cancellation, flooring both aggregates at
    /// zero so pre-existing data can't push them negative.
    pub async fn record_cancellation(&self, customer_id: &str, total_cents: i64) -> DbResult<()> {
        debug!(customer_id = %customer_id, total_cents, "Reversing purchase on customer");

        let result = sqlx::query(
            r#"
            UPDATE customers
            SET total_purchases_cents = MAX(total_purchases_cents - ?, 0),
                total_bills = MAX(total_bills - 1, 0),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(total_cents)
        .bind(Utc::now())
        .bind(customer_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", customer_id));
        }
        Ok(())
    }

    /// Lists active customers ordered by name.
    pub async fn list_active(&self, limit: i64) -> DbResult<Vec<Customer>> {
        let limit = super::clamp_limit(limit);
        let customers = sqlx::query_as::<_, Customer>(
            "SELECT * FROM customers WHERE is_active = 1 ORDER BY name LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(customers)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let db = test_db().await;
        let repo = db.customers();

        let created = repo
            .create("ACC-0001", "Nimal Perera", Some("0771234567"), None, None)
            .await
            .unwrap();

        let fetched = repo.get_by_id(&created.id).await.unwrap();
        assert_eq!(fetched.account_no, "ACC-0001");
        assert_eq!(fetched.total_bills, 0);
        assert!(fetched.is_active);

        let by_acc = repo.get_by_account_no("ACC-0001").await.unwrap();
        assert_eq!(by_acc.id, created.id);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let db = test_db().await;
        let err = db.customers().get_by_id("nope").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_duplicate_account_no_rejected() {
        let db = test_db().await;
        let repo = db.customers();

        repo.create("ACC-0002", "First", None, None, None)
            .await
            .unwrap();
        let err = repo
            .create("ACC-0002", "Second", None, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_purchase_and_cancellation_aggregates() {
        let db = test_db().await;
        let repo = db.customers();
        let customer = repo.create("ACC-0003", "Kamala", None, None, None).await.unwrap();

        repo.record_purchase(&customer.id, 12_500).await.unwrap();
        repo.record_purchase(&customer.id, 4_000).await.unwrap();

        let c = repo.get_by_id(&customer.id).await.unwrap();
        assert_eq!(c.total_purchases_cents, 16_500);
        assert_eq!(c.total_bills, 2);

        repo.record_cancellation(&customer.id, 12_500).await.unwrap();
        let c = repo.get_by_id(&customer.id).await.unwrap();
        assert_eq!(c.total_purchases_cents, 4_000);
        assert_eq!(c.total_bills, 1);
    }

    #[tokio::test]
    async fn test_cancellation_floors_at_zero() {
        let db = test_db().await;
        let repo = db.customers();
        let customer = repo.create("ACC-0004", "Saman", None, None, None).await.unwrap();

        repo.record_cancellation(&customer.id, 99_999).await.unwrap();
        let c = repo.get_by_id(&customer.id).await.unwrap();
        assert_eq!(c.total_purchases_cents, 0);
        assert_eq!(c.total_bills, 0);
    }
}
