//! # SQLite Port Adapters
//!
//! Thin wrappers mapping the port traits onto the folio-db repositories.
//! No business decisions live here; only error translation (a failed
//! stock guard becomes the matching typed error, `DbError::NotFound`
//! becomes `None` on lookups).

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::{BillingError, BillingResult};
use crate::ports::{
    AuditTrail, BillNumbers, BillStore, CancelAttempt, Catalog, Customers, PagedBills, StockLedger,
};
use folio_core::{Bill, Customer, Item, ReferenceType, StockMovement};
use folio_db::repository::audit::AuditRepository;
use folio_db::repository::bill::{BillRepository, CancelOutcome};
use folio_db::repository::customer::CustomerRepository;
use folio_db::repository::item::ItemRepository;
use folio_db::repository::sequence::BillNumberRepository;
use folio_db::repository::stock::StockLedgerRepository;
use folio_db::{Database, DbError, DebitOutcome};

fn none_if_not_found<T>(result: Result<T, DbError>) -> BillingResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(DbError::NotFound { .. }) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

// =============================================================================
// Catalog
// =============================================================================

pub struct SqliteCatalog {
    repo: ItemRepository,
}

impl SqliteCatalog {
    pub fn new(db: &Database) -> Self {
        SqliteCatalog { repo: db.items() }
    }
}

#[async_trait]
impl Catalog for SqliteCatalog {
    async fn find_item(&self, item_id: &str) -> BillingResult<Option<Item>> {
        none_if_not_found(self.repo.get_by_id(item_id).await)
    }
}

// =============================================================================
// Customers
// =============================================================================

pub struct SqliteCustomers {
    repo: CustomerRepository,
}

impl SqliteCustomers {
    pub fn new(db: &Database) -> Self {
        SqliteCustomers { repo: db.customers() }
    }
}

#[async_trait]
impl Customers for SqliteCustomers {
    async fn exists(&self, customer_id: &str) -> BillingResult<Option<Customer>> {
        let customer = none_if_not_found(self.repo.get_by_id(customer_id).await)?;
        Ok(customer.filter(|c| c.is_active))
    }

    async fn record_purchase(&self, customer_id: &str, total_cents: i64) -> BillingResult<()> {
        self.repo.record_purchase(customer_id, total_cents).await?;
        Ok(())
    }

    async fn record_cancellation(&self, customer_id: &str, total_cents: i64) -> BillingResult<()> {
        self.repo
            .record_cancellation(customer_id, total_cents)
            .await?;
        Ok(())
    }
}

// =============================================================================
// Bill Numbers
// =============================================================================

pub struct SqliteBillNumbers {
    repo: BillNumberRepository,
}

impl SqliteBillNumbers {
    pub fn new(db: &Database) -> Self {
        SqliteBillNumbers {
            repo: db.bill_numbers(),
        }
    }
}

#[async_trait]
impl BillNumbers for SqliteBillNumbers {
    async fn allocate(&self, period: &str) -> BillingResult<i64> {
        Ok(self.repo.allocate(period).await?)
    }
}

// =============================================================================
// Stock Ledger
// =============================================================================

pub struct SqliteStockLedger {
    repo: StockLedgerRepository,
}

impl SqliteStockLedger {
    pub fn new(db: &Database) -> Self {
        SqliteStockLedger {
            repo: db.stock_ledger(),
        }
    }
}

#[async_trait]
impl StockLedger for SqliteStockLedger {
    async fn debit_for_sale(
        &self,
        item_id: &str,
        quantity: i64,
        revenue_cents: i64,
        bill_id: &str,
        actor: &str,
    ) -> BillingResult<()> {
        let outcome = self
            .repo
            .debit_for_sale(item_id, quantity, revenue_cents, bill_id, actor)
            .await?;

        match outcome {
            DebitOutcome::Debited => Ok(()),
            DebitOutcome::NotFound => Err(BillingError::ItemNotFound(item_id.to_string())),
            DebitOutcome::Inactive => Err(BillingError::ItemInactive(item_id.to_string())),
            DebitOutcome::Insufficient { available } => Err(BillingError::InsufficientStock {
                item: item_id.to_string(),
                available,
                requested: quantity,
            }),
        }
    }

    async fn restore_for_return(
        &self,
        item_id: &str,
        quantity: i64,
        revenue_cents: i64,
        bill_id: &str,
        actor: &str,
    ) -> BillingResult<()> {
        self.repo
            .restore_for_return(item_id, quantity, revenue_cents, bill_id, actor)
            .await?;
        Ok(())
    }

    async fn record_adjustment(
        &self,
        item_id: &str,
        delta: i64,
        notes: Option<&str>,
        actor: &str,
    ) -> BillingResult<()> {
        let outcome = self
            .repo
            .record_adjustment(item_id, delta, notes, actor)
            .await?;

        match outcome {
            DebitOutcome::Debited => Ok(()),
            DebitOutcome::NotFound | DebitOutcome::Inactive => {
                Err(BillingError::ItemNotFound(item_id.to_string()))
            }
            DebitOutcome::Insufficient { available } => Err(BillingError::InsufficientStock {
                item: item_id.to_string(),
                available,
                requested: -delta,
            }),
        }
    }

    async fn movements_for(
        &self,
        reference_type: ReferenceType,
        reference_id: &str,
    ) -> BillingResult<Vec<StockMovement>> {
        Ok(self
            .repo
            .movements_for_reference(reference_type, reference_id)
            .await?)
    }

    async fn quantity_sum(&self, item_id: &str) -> BillingResult<i64> {
        Ok(self.repo.quantity_sum(item_id).await?)
    }
}

// =============================================================================
// Bill Store
// =============================================================================

pub struct SqliteBillStore {
    repo: BillRepository,
}

impl SqliteBillStore {
    pub fn new(db: &Database) -> Self {
        SqliteBillStore { repo: db.bills() }
    }
}

#[async_trait]
impl BillStore for SqliteBillStore {
    async fn insert_with_lines(&self, bill: &Bill) -> BillingResult<()> {
        self.repo.insert_with_lines(bill).await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> BillingResult<Option<Bill>> {
        none_if_not_found(self.repo.find_by_id(id).await)
    }

    async fn find_by_number(&self, bill_number: &str) -> BillingResult<Option<Bill>> {
        none_if_not_found(self.repo.find_by_number(bill_number).await)
    }

    async fn list(&self, limit: i64, offset: i64) -> BillingResult<PagedBills> {
        let page = self.repo.list(limit, offset).await?;
        Ok(PagedBills {
            bills: page.bills,
            total_count: page.total_count,
        })
    }

    async fn list_for_customer(
        &self,
        customer_id: &str,
        limit: i64,
        offset: i64,
    ) -> BillingResult<PagedBills> {
        let page = self
            .repo
            .list_for_customer(customer_id, limit, offset)
            .await?;
        Ok(PagedBills {
            bills: page.bills,
            total_count: page.total_count,
        })
    }

    async fn list_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: i64,
        offset: i64,
    ) -> BillingResult<PagedBills> {
        let page = self.repo.list_between(start, end, limit, offset).await?;
        Ok(PagedBills {
            bills: page.bills,
            total_count: page.total_count,
        })
    }

    async fn mark_cancelled(&self, id: &str) -> BillingResult<CancelAttempt> {
        match self.repo.mark_cancelled(id).await {
            Ok(CancelOutcome::Cancelled) => Ok(CancelAttempt::Cancelled),
            Ok(CancelOutcome::NotActive(status)) => Ok(CancelAttempt::NotActive(status)),
            Err(DbError::NotFound { .. }) => Err(BillingError::BillNotFound(id.to_string())),
            Err(e) => Err(e.into()),
        }
    }
}

// =============================================================================
// Audit Trail
// =============================================================================

pub struct SqliteAuditTrail {
    repo: AuditRepository,
}

impl SqliteAuditTrail {
    pub fn new(db: &Database) -> Self {
        SqliteAuditTrail { repo: db.audit() }
    }
}

#[async_trait]
impl AuditTrail for SqliteAuditTrail {
    async fn record(
        &self,
        actor: &str,
        action: &str,
        entity_type: &str,
        entity_id: Option<&str>,
        detail: Option<&str>,
    ) -> BillingResult<()> {
        self.repo
            .record(actor, action, entity_type, entity_id, detail)
            .await?;
        Ok(())
    }
}
