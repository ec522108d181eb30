//! # Bill Number Counter Repository
//!
//! Per-period monotonic counters backing bill number allocation.
//!
//! One row per period ("202608"). The increment is a single upsert with
//! RETURNING, so concurrent allocations each get a distinct value and a
//! new period implicitly starts at 1; no read-modify-write window exists.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

/// Repository for per-period bill number counters.
#[derive(Debug, Clone)]
pub struct BillNumberRepository {
    pool: SqlitePool,
}

impl BillNumberRepository {
    /// Creates a new BillNumberRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BillNumberRepository { pool }
    }

    /// Allocates the next counter value for a period.
    ///
    /// First call for a period returns 1. Values are never reused, even
    /// when the bill they were allocated for fails to persist; gaps in
    /// the sequence are expected.
    pub async fn allocate(&self, period: &str) -> DbResult<i64> {
        let counter: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO bill_counters (period, counter) VALUES (?, 1)
            ON CONFLICT(period) DO UPDATE SET counter = counter + 1
            RETURNING counter
            "#,
        )
        .bind(period)
        .fetch_one(&self.pool)
        .await?;

        debug!(period = %period, counter, "Allocated bill number counter");
        Ok(counter)
    }

    /// Returns the current counter for a period without incrementing.
    pub async fn current(&self, period: &str) -> DbResult<i64> {
        let counter: Option<i64> =
            sqlx::query_scalar("SELECT counter FROM bill_counters WHERE period = ?")
                .bind(period)
                .fetch_optional(&self.pool)
                .await?;
        Ok(counter.unwrap_or(0))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_allocate_is_monotonic() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.bill_numbers();

        assert_eq!(repo.allocate("202608").await.unwrap(), 1);
        assert_eq!(repo.allocate("202608").await.unwrap(), 2);
        assert_eq!(repo.allocate("202608").await.unwrap(), 3);
        assert_eq!(repo.current("202608").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_new_period_starts_fresh() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.bill_numbers();

        repo.allocate("202608").await.unwrap();
        repo.allocate("202608").await.unwrap();
        assert_eq!(repo.allocate("202609").await.unwrap(), 1);
        assert_eq!(repo.current("202608").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_allocations_are_distinct() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..20 {
            let repo = db.bill_numbers();
            handles.push(tokio::spawn(
                async move { repo.allocate("202610").await.unwrap() },
            ));
        }

        let mut seen = Vec::new();
        for handle in handles {
            seen.push(handle.await.unwrap());
        }
        seen.sort_unstable();
        let expected: Vec<i64> = (1..=20).collect();
        assert_eq!(seen, expected);
    }
}
