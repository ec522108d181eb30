//! # Workflow Ports
//!
//! Every external effect of the billing workflow goes through one of
//! these traits. Production wires the SQLite adapters from
//! [`crate::adapters`]; unit tests wire in-memory fakes.
//!
//! The traits are object-safe (`async_trait`), so the service holds them
//! as `Arc<dyn ...>` and tests can swap any single port.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::BillingResult;
use folio_core::{Bill, BillStatus, Customer, Item, ReferenceType, StockMovement};

/// One page of bill headers.
#[derive(Debug, Clone)]
pub struct PagedBills {
    pub bills: Vec<Bill>,
    pub total_count: i64,
}

/// Result of attempting the ACTIVE -> CANCELLED transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelAttempt {
    /// This caller performed the transition and owns the compensation.
    Cancelled,
    /// Someone else already moved the bill out of ACTIVE.
    NotActive(BillStatus),
}

/// Read access to the item catalog.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Finds an item by id (active or not; the ledger enforces activity
    /// at debit time).
    async fn find_item(&self, item_id: &str) -> BillingResult<Option<Item>>;
}

/// Customer lookups and aggregate maintenance.
#[async_trait]
pub trait Customers: Send + Sync {
    /// Returns the customer only if it exists and is active.
    async fn exists(&self, customer_id: &str) -> BillingResult<Option<Customer>>;

    /// Adds a completed bill to the customer's running totals.
    async fn record_purchase(&self, customer_id: &str, total_cents: i64) -> BillingResult<()>;

    /// Reverses a bill from the running totals (floored at zero).
    async fn record_cancellation(&self, customer_id: &str, total_cents: i64) -> BillingResult<()>;
}

/// Per-period bill number counters.
#[async_trait]
pub trait BillNumbers: Send + Sync {
    /// Returns the next counter value for the period (1-based). Values
    /// are never reused; gaps are fine.
    async fn allocate(&self, period: &str) -> BillingResult<i64>;
}

/// The stock movement ledger.
#[async_trait]
pub trait StockLedger: Send + Sync {
    /// Debits stock for one line and records the OUT/SALE movement.
    /// Fails with `ItemNotFound` / `ItemInactive` / `InsufficientStock`
    /// without side effects when the guard does not hold.
    async fn debit_for_sale(
        &self,
        item_id: &str,
        quantity: i64,
        revenue_cents: i64,
        bill_id: &str,
        actor: &str,
    ) -> BillingResult<()>;

    /// Restores stock for one line and records the RETURN movement.
    async fn restore_for_return(
        &self,
        item_id: &str,
        quantity: i64,
        revenue_cents: i64,
        bill_id: &str,
        actor: &str,
    ) -> BillingResult<()>;

    /// Records a signed manual correction.
    async fn record_adjustment(
        &self,
        item_id: &str,
        delta: i64,
        notes: Option<&str>,
        actor: &str,
    ) -> BillingResult<()>;

    /// Movements referencing one business event, oldest first.
    async fn movements_for(
        &self,
        reference_type: ReferenceType,
        reference_id: &str,
    ) -> BillingResult<Vec<StockMovement>>;

    /// Signed sum of all movements for an item (reconciliation view).
    async fn quantity_sum(&self, item_id: &str) -> BillingResult<i64>;
}

/// Persistence of bills and their lines.
#[async_trait]
pub trait BillStore: Send + Sync {
    /// Inserts header and lines in one transaction.
    async fn insert_with_lines(&self, bill: &Bill) -> BillingResult<()>;

    async fn find_by_id(&self, id: &str) -> BillingResult<Option<Bill>>;

    async fn find_by_number(&self, bill_number: &str) -> BillingResult<Option<Bill>>;

    /// Bill headers, newest first.
    async fn list(&self, limit: i64, offset: i64) -> BillingResult<PagedBills>;

    async fn list_for_customer(
        &self,
        customer_id: &str,
        limit: i64,
        offset: i64,
    ) -> BillingResult<PagedBills>;

    /// Bill headers created in `[start, end)`, newest first.
    async fn list_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: i64,
        offset: i64,
    ) -> BillingResult<PagedBills>;

    /// Conditional ACTIVE -> CANCELLED flip; `BillNotFound` if the bill
    /// does not exist at all.
    async fn mark_cancelled(&self, id: &str) -> BillingResult<CancelAttempt>;
}

/// Append-only audit trail. The service treats failures here as
/// non-fatal.
#[async_trait]
pub trait AuditTrail: Send + Sync {
    async fn record(
        &self,
        actor: &str,
        action: &str,
        entity_type: &str,
        entity_id: Option<&str>,
        detail: Option<&str>,
    ) -> BillingResult<()>;
}
