//! # Domain Types
//!
//! Core domain types for the bookshop back-office billing subsystem.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                │
//! │                                                                     │
//! │  ┌──────────────┐   ┌──────────────┐   ┌────────────────┐           │
//! │  │    Bill      │──►│   BillLine   │──►│     Item       │           │
//! │  │ ──────────── │   │ ──────────── │   │ ────────────── │           │
//! │  │ bill_number  │   │ qty, price   │   │ stock_quantity │           │
//! │  │ totals       │   │ snapshots    │   │ total_sold     │           │
//! │  │ status       │   │ line_total   │   │ total_revenue  │           │
//! │  └──────────────┘   └──────────────┘   └───────┬────────┘           │
//! │                                                │                    │
//! │  ┌──────────────┐   ┌──────────────┐   ┌───────▼────────┐           │
//! │  │   Customer   │   │   Percent    │   │ StockMovement  │           │
//! │  │ aggregates   │   │  bps (u32)   │   │  append-only   │           │
//! │  └──────────────┘   │ 1000 = 10%   │   │  signed qty    │           │
//! │                     └──────────────┘   └────────────────┘           │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - a business id where one exists (`bill_number`, `code`, `account_no`)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Percent
// =============================================================================

/// A percentage represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000. 1050 bps = 10.5%. Integer bps keep
/// discount and tax rates exact; no float creeps into money math.
/// Used for both bill/line discounts and tax rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Percent(u32);

impl Percent {
    /// Creates a percentage from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Percent(bps)
    }

    /// Creates a percentage from a display value (e.g. `10.5` -> 1050 bps).
    pub fn from_percentage(pct: f64) -> Self {
        Percent((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a display percentage.
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Percent(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for Percent {
    fn default() -> Self {
        Percent::zero()
    }
}

// =============================================================================
// Bill Status
// =============================================================================

/// Lifecycle status of a bill.
///
/// A bill is created ACTIVE and transitions to CANCELLED exactly once
/// (terminal). Nothing is ever deleted; cancellation creates compensating
/// stock movements instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum BillStatus {
    /// Bill is in force; its stock debits stand.
    Active,
    /// Bill was cancelled; stock was restored via RETURN movements.
    Cancelled,
    /// Goods were returned after sale (reserved for a future return flow).
    Returned,
}

impl Default for BillStatus {
    fn default() -> Self {
        BillStatus::Active
    }
}

// =============================================================================
// Payment
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    BankTransfer,
    Cheque,
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Cash
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    Pending,
    Partial,
    Cancelled,
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Paid
    }
}

// =============================================================================
// Stock Movement
// =============================================================================

/// Direction/category of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    In,
    Out,
    Adjustment,
    Return,
}

/// What business event a movement references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum ReferenceType {
    Sale,
    Return,
    Adjustment,
    Purchase,
    Initial,
}

/// One entry in the append-only stock ledger.
///
/// Movements are never updated or deleted; they are the source of truth
/// for stock history. `quantity` is SIGNED: sales are negative, receipts
/// and returns are positive, so an item's movements reconcile as
/// `SUM(quantity) == stock_quantity` once initial stock is recorded as an
/// INITIAL movement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockMovement {
    pub id: String,
    pub item_id: String,
    pub movement_type: MovementType,
    /// Signed stock delta (negative for OUT).
    pub quantity: i64,
    pub reference_type: ReferenceType,
    /// Id of the referenced entity (e.g. the bill id for SALE/RETURN).
    pub reference_id: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
}

// =============================================================================
// Catalog Item
// =============================================================================

/// A catalog item (a book, stationery, ...) as billing sees it.
///
/// `stock_quantity` is mutated only through the stock ledger's debit and
/// restore operations, never written directly by the billing workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Item {
    pub id: String,
    /// Business identifier printed on shelf labels (e.g. "BK-00123").
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub cost_cents: Option<i64>,
    /// Current on-hand quantity; database CHECK keeps it >= 0.
    pub stock_quantity: i64,
    /// Reorder threshold used by low-stock reporting.
    pub min_stock_level: i64,
    pub isbn: Option<String>,
    pub author: Option<String>,
    pub is_active: bool,
    /// Running units-sold aggregate, maintained by the stock ledger.
    pub total_sold: i64,
    /// Running revenue aggregate in cents, maintained by the stock ledger.
    pub total_revenue_cents: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Returns the current price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// True when stock has fallen to or below the reorder threshold.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.stock_quantity <= self.min_stock_level
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer account, as billing sees it.
///
/// The purchase aggregates are maintained incrementally by the billing
/// workflow inside the same per-bill boundary as the stock effects.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: String,
    /// Human-facing account number (e.g. "ACC-0042").
    pub account_no: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub is_active: bool,
    pub total_purchases_cents: i64,
    pub total_bills: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Bill
// =============================================================================

/// A customer invoice with computed monetary totals.
///
/// Monetary invariants (enforced by `calc::bill_totals` and checked in
/// tests, never recomputed after creation):
/// - `subtotal_cents == Σ line.line_total_cents`
/// - `total_cents == subtotal_cents - discount_cents + tax_cents`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Bill {
    pub id: String,
    /// Unique human-readable number, e.g. "BILL202608000123".
    pub bill_number: String,
    pub customer_id: String,
    pub status: BillStatus,
    pub subtotal_cents: i64,
    /// Bill-level discount rate in basis points.
    pub discount_bps: u32,
    pub discount_cents: i64,
    /// Tax rate in basis points, applied to the post-discount subtotal.
    pub tax_bps: u32,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Actor (user id) who created the bill.
    pub created_by: String,
    /// Line items, loaded separately (composition - cascade on delete).
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    #[serde(default)]
    pub lines: Vec<BillLine>,
}

impl Bill {
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Only ACTIVE bills can be cancelled; the transition is terminal.
    #[inline]
    pub fn can_cancel(&self) -> bool {
        self.status == BillStatus::Active
    }
}

// =============================================================================
// Bill Line
// =============================================================================

/// One item/quantity/price entry within a bill.
///
/// Uses the snapshot pattern: code, name and unit price are frozen at
/// sale time so the bill never follows later catalog changes. Immutable
/// after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct BillLine {
    pub id: String,
    pub bill_id: String,
    pub item_id: String,
    /// Item code at time of sale (frozen).
    pub code_snapshot: String,
    /// Item name at time of sale (frozen).
    pub name_snapshot: String,
    pub quantity: i64,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    /// Line-level discount rate in basis points.
    pub discount_bps: u32,
    pub discount_cents: i64,
    /// quantity * unit_price - discount.
    pub line_total_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl BillLine {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

// =============================================================================
// Drafts (create-bill input)
// =============================================================================

/// Input to the create-bill workflow. Exists only within the create call;
/// a draft is never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillDraft {
    pub customer_id: String,
    /// Pre-assigned number; allocated by the workflow when None.
    pub bill_number: Option<String>,
    pub discount: Percent,
    /// Tax rate for the bill; the workflow falls back to its configured
    /// default when None.
    pub tax: Option<Percent>,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
    pub lines: Vec<LineDraft>,
}

/// One requested line on a draft bill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineDraft {
    pub item_id: String,
    pub quantity: i64,
    /// Unit price offered at the till; snapshotted onto the line.
    pub unit_price_cents: i64,
    pub discount: Percent,
}

// =============================================================================
// Audit
// =============================================================================

/// One row of the append-only audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct AuditEntry {
    pub id: String,
    pub actor: String,
    /// e.g. "BILL_CREATED", "BILL_CANCELLED".
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<String>,
    pub detail: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
