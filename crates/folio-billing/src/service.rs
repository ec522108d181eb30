//! # Billing Service
//!
//! The create/cancel bill workflow as a saga over the ports.
//!
//! ## Create Bill
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │  validate draft          pure, rejects before any I/O              │
//! │       │                                                            │
//! │  check customer          CustomerNotFound                          │
//! │       │                                                            │
//! │  allocate bill number    BILL + YYYYMM + 000123                    │
//! │       │                                                            │
//! │  debit stock, per line   guard fails on line k:                    │
//! │       │                    restore lines 1..k, return error        │
//! │       │                                                            │
//! │  bump customer totals    fails: restore ALL lines, return          │
//! │       │                                                            │
//! │  insert header+lines     one transaction; fails: restore ALL       │
//! │       │                  lines AND reverse customer totals         │
//! │       │                                                            │
//! │  audit BILL_CREATED      best-effort, warn on failure              │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The bill row is written LAST, after every step that can still fail
//! business-wise, so a failed create never leaves a bill behind. Stock
//! debits are the one effect that precedes it; the compensating restores
//! run synchronously before the error is returned, so callers never
//! observe a partial debit.
//!
//! The allocated bill number is NOT returned to the counter on failure.
//! Gaps in the sequence are harmless; reusing a number is not.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::BillingConfig;
use crate::error::{BillingError, BillingResult};
use crate::ports::{
    AuditTrail, BillNumbers, BillStore, CancelAttempt, Catalog, Customers, PagedBills, StockLedger,
};
use folio_core::{bill_totals, line_amounts, validation, Bill, BillDraft, BillLine, BillStatus};

/// The port bundle the service runs against.
#[derive(Clone)]
pub struct BillingDeps {
    pub catalog: Arc<dyn Catalog>,
    pub customers: Arc<dyn Customers>,
    pub bill_numbers: Arc<dyn BillNumbers>,
    pub stock: Arc<dyn StockLedger>,
    pub bills: Arc<dyn BillStore>,
    pub audit: Arc<dyn AuditTrail>,
}

/// Orchestrates bill creation and cancellation.
#[derive(Clone)]
pub struct BillingService {
    deps: BillingDeps,
    config: BillingConfig,
}

/// A debit already applied, remembered for compensation.
struct AppliedDebit {
    item_id: String,
    quantity: i64,
    revenue_cents: i64,
}

impl BillingService {
    /// Creates a service over an explicit port bundle.
    pub fn new(deps: BillingDeps, config: BillingConfig) -> Self {
        BillingService { deps, config }
    }

    /// Wires the service to a SQLite database via the standard adapters.
    pub fn from_database(db: &folio_db::Database, config: BillingConfig) -> Self {
        use crate::adapters::*;

        BillingService::new(
            BillingDeps {
                catalog: Arc::new(SqliteCatalog::new(db)),
                customers: Arc::new(SqliteCustomers::new(db)),
                bill_numbers: Arc::new(SqliteBillNumbers::new(db)),
                stock: Arc::new(SqliteStockLedger::new(db)),
                bills: Arc::new(SqliteBillStore::new(db)),
                audit: Arc::new(SqliteAuditTrail::new(db)),
            },
            config,
        )
    }

    // =========================================================================
    // Create
    // =========================================================================

    /// Creates a bill from a draft: validates, prices, debits stock,
    /// persists, maintains customer aggregates, audits.
    ///
    /// On any failure after the first stock debit, compensating restores
    /// run synchronously before the error returns.
    pub async fn create_bill(&self, draft: BillDraft, actor: &str) -> BillingResult<Bill> {
        validation::validate_bill_draft(&draft)?;

        let customer = self
            .deps
            .customers
            .exists(&draft.customer_id)
            .await?
            .ok_or_else(|| BillingError::CustomerNotFound(draft.customer_id.clone()))?;

        let now = Utc::now();
        let bill_id = Uuid::new_v4().to_string();

        let bill_number = match &draft.bill_number {
            Some(number) => number.clone(),
            None => self.generate_bill_number().await?,
        };

        debug!(
            bill_id = %bill_id,
            bill_number = %bill_number,
            customer_id = %customer.id,
            line_count = draft.lines.len(),
            "Creating bill"
        );

        // Price the lines and snapshot the catalog data. Pricing before
        // debiting keeps all catalog misses side-effect free; inactive
        // and out-of-stock cases are caught by the debit guard itself.
        let mut lines = Vec::with_capacity(draft.lines.len());
        for line_draft in &draft.lines {
            let item = self
                .deps
                .catalog
                .find_item(&line_draft.item_id)
                .await?
                .ok_or_else(|| BillingError::ItemNotFound(line_draft.item_id.clone()))?;

            let amounts = line_amounts(
                folio_core::Money::from_cents(line_draft.unit_price_cents),
                line_draft.quantity,
                line_draft.discount,
            );

            lines.push(BillLine {
                id: Uuid::new_v4().to_string(),
                bill_id: bill_id.clone(),
                item_id: item.id.clone(),
                code_snapshot: item.code.clone(),
                name_snapshot: item.name.clone(),
                quantity: line_draft.quantity,
                unit_price_cents: line_draft.unit_price_cents,
                discount_bps: line_draft.discount.bps(),
                discount_cents: amounts.discount.cents(),
                line_total_cents: amounts.line_total.cents(),
                created_at: now,
            });
        }

        // Debit stock line by line; remember what succeeded so a failure
        // further down can be unwound.
        let mut applied: Vec<AppliedDebit> = Vec::with_capacity(lines.len());
        for line in &lines {
            let debit = self
                .deps
                .stock
                .debit_for_sale(
                    &line.item_id,
                    line.quantity,
                    line.line_total_cents,
                    &bill_id,
                    actor,
                )
                .await;

            if let Err(e) = debit {
                self.compensate_debits(&applied, &bill_id, actor).await;
                return Err(e);
            }

            applied.push(AppliedDebit {
                item_id: line.item_id.clone(),
                quantity: line.quantity,
                revenue_cents: line.line_total_cents,
            });
        }

        let tax = draft.tax.unwrap_or(self.config.default_tax);
        let totals = bill_totals(
            lines.iter().map(|l| l.line_total()),
            draft.discount,
            tax,
        );

        let bill = Bill {
            id: bill_id.clone(),
            bill_number: bill_number.clone(),
            customer_id: customer.id.clone(),
            status: BillStatus::Active,
            subtotal_cents: totals.subtotal.cents(),
            discount_bps: draft.discount.bps(),
            discount_cents: totals.discount.cents(),
            tax_bps: tax.bps(),
            tax_cents: totals.tax.cents(),
            total_cents: totals.total.cents(),
            payment_method: draft.payment_method,
            payment_status: draft.payment_status,
            notes: draft.notes.clone(),
            created_at: now,
            updated_at: now,
            created_by: actor.to_string(),
            lines,
        };

        if let Err(e) = self
            .deps
            .customers
            .record_purchase(&customer.id, bill.total_cents)
            .await
        {
            self.compensate_debits(&applied, &bill_id, actor).await;
            return Err(e);
        }

        if let Err(e) = self.deps.bills.insert_with_lines(&bill).await {
            self.compensate_debits(&applied, &bill_id, actor).await;
            if let Err(undo) = self
                .deps
                .customers
                .record_cancellation(&customer.id, bill.total_cents)
                .await
            {
                warn!(
                    customer_id = %customer.id,
                    error = %undo,
                    "Failed to reverse customer aggregates during compensation"
                );
            }
            return Err(e);
        }

        self.audit(
            actor,
            "BILL_CREATED",
            "bill",
            Some(&bill.id),
            Some(&bill.bill_number),
        )
        .await;

        info!(
            bill_id = %bill.id,
            bill_number = %bill.bill_number,
            total_cents = bill.total_cents,
            "Bill created"
        );
        Ok(bill)
    }

    /// Restores every applied debit. Individual restore failures are
    /// logged and do not stop the remaining restores; the original error
    /// is what the caller must see.
    async fn compensate_debits(&self, applied: &[AppliedDebit], bill_id: &str, actor: &str) {
        for debit in applied {
            if let Err(e) = self
                .deps
                .stock
                .restore_for_return(
                    &debit.item_id,
                    debit.quantity,
                    debit.revenue_cents,
                    bill_id,
                    actor,
                )
                .await
            {
                warn!(
                    item_id = %debit.item_id,
                    bill_id = %bill_id,
                    error = %e,
                    "Compensating stock restore failed"
                );
            }
        }
    }

    // =========================================================================
    // Cancel
    // =========================================================================

    /// Cancels an active bill: flips the status, restores the stock of
    /// every line and reverses the customer aggregates. The bill's
    /// amounts are never recomputed.
    ///
    /// The status flip is conditional, so of two concurrent cancels only
    /// one proceeds to the restores; the other gets `InvalidState`.
    pub async fn cancel_bill(&self, bill_id: &str, actor: &str) -> BillingResult<Bill> {
        let bill = self
            .deps
            .bills
            .find_by_id(bill_id)
            .await?
            .ok_or_else(|| BillingError::BillNotFound(bill_id.to_string()))?;

        match self.deps.bills.mark_cancelled(&bill.id).await? {
            CancelAttempt::Cancelled => {}
            CancelAttempt::NotActive(status) => {
                return Err(BillingError::InvalidState {
                    bill_id: bill.id.clone(),
                    status,
                });
            }
        }

        debug!(bill_id = %bill.id, line_count = bill.lines.len(), "Cancelling bill");

        // Once the status is flipped every restore gets its chance; a
        // failed line must not leave the later lines un-restored or the
        // customer aggregates still counting the bill.
        let mut first_failure: Option<BillingError> = None;
        for line in &bill.lines {
            if let Err(e) = self
                .deps
                .stock
                .restore_for_return(
                    &line.item_id,
                    line.quantity,
                    line.line_total_cents,
                    &bill.id,
                    actor,
                )
                .await
            {
                warn!(
                    item_id = %line.item_id,
                    bill_id = %bill.id,
                    error = %e,
                    "Stock restore failed during cancellation"
                );
                first_failure.get_or_insert(e);
            }
        }

        if let Err(e) = self
            .deps
            .customers
            .record_cancellation(&bill.customer_id, bill.total_cents)
            .await
        {
            warn!(
                customer_id = %bill.customer_id,
                bill_id = %bill.id,
                error = %e,
                "Failed to reverse customer aggregates during cancellation"
            );
            first_failure.get_or_insert(e);
        }

        if let Some(e) = first_failure {
            return Err(e);
        }

        self.audit(
            actor,
            "BILL_CANCELLED",
            "bill",
            Some(&bill.id),
            Some(&bill.bill_number),
        )
        .await;

        info!(bill_id = %bill.id, bill_number = %bill.bill_number, "Bill cancelled");

        // Reload so the returned bill carries the new status.
        self.deps
            .bills
            .find_by_id(&bill.id)
            .await?
            .ok_or_else(|| BillingError::BillNotFound(bill.id.clone()))
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Gets a bill with its lines.
    pub async fn get_bill(&self, bill_id: &str) -> BillingResult<Bill> {
        self.deps
            .bills
            .find_by_id(bill_id)
            .await?
            .ok_or_else(|| BillingError::BillNotFound(bill_id.to_string()))
    }

    /// Gets a bill by its human-readable number.
    pub async fn get_bill_by_number(&self, bill_number: &str) -> BillingResult<Bill> {
        self.deps
            .bills
            .find_by_number(bill_number)
            .await?
            .ok_or_else(|| BillingError::BillNotFound(bill_number.to_string()))
    }

    /// Lists bill headers, newest first. `page` is 0-based.
    pub async fn list_bills(&self, page: i64, page_size: i64) -> BillingResult<PagedBills> {
        let page = page.max(0);
        self.deps.bills.list(page_size, page * page_size).await
    }

    /// Lists a customer's bill headers, newest first. `page` is 0-based.
    pub async fn list_bills_for_customer(
        &self,
        customer_id: &str,
        page: i64,
        page_size: i64,
    ) -> BillingResult<PagedBills> {
        let page = page.max(0);
        self.deps
            .bills
            .list_for_customer(customer_id, page_size, page * page_size)
            .await
    }

    /// Lists bill headers created in `[start, end)`, newest first.
    /// `page` is 0-based. Feeds the daily and monthly sales views.
    pub async fn list_bills_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        page: i64,
        page_size: i64,
    ) -> BillingResult<PagedBills> {
        let page = page.max(0);
        self.deps
            .bills
            .list_between(start, end, page_size, page * page_size)
            .await
    }

    /// Allocates and formats the next bill number for the current
    /// period, e.g. `BILL202608000123`.
    pub async fn generate_bill_number(&self) -> BillingResult<String> {
        let period = Utc::now().format("%Y%m").to_string();
        let counter = self.deps.bill_numbers.allocate(&period).await?;
        Ok(self.config.format_bill_number(&period, counter))
    }

    /// Records an audit entry, swallowing failures with a warning. The
    /// business operation has already happened; losing an audit row must
    /// not undo it.
    async fn audit(
        &self,
        actor: &str,
        action: &str,
        entity_type: &str,
        entity_id: Option<&str>,
        detail: Option<&str>,
    ) {
        if let Err(e) = self
            .deps
            .audit
            .record(actor, action, entity_type, entity_id, detail)
            .await
        {
            warn!(action = %action, error = %e, "Audit write failed");
        }
    }
}
