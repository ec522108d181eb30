//! # Folio Billing Workflow
//!
//! Creating and cancelling customer bills over the catalog, the stock
//! ledger, per-period bill number counters and the audit trail.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     BillingService                          │
//! │   validate → price → debit stock → persist → aggregates     │
//! │              (synchronous compensation on failure)          │
//! └──────┬──────────┬──────────┬──────────┬──────────┬──────────┘
//!        │          │          │          │          │
//!    Catalog    Customers  BillNumbers StockLedger BillStore ...
//!        │          │          │          │          │
//! ┌──────┴──────────┴──────────┴──────────┴──────────┴──────────┐
//! │              SQLite adapters over folio-db                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The service owns the multi-item guarantees: a bill either debits
//! every line or none (compensating restores run before any error
//! surfaces), and a cancelled bill restores exactly what it debited.
//! Per-item safety (never oversell) lives one level down, in the
//! conditional updates of the stock ledger.
//!
//! ## Example
//!
//! ```rust,ignore
//! use folio_billing::{BillingConfig, BillingService};
//! use folio_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("folio.db")).await?;
//! let billing = BillingService::from_database(&db, BillingConfig::default());
//! let bill = billing.create_bill(draft, "cashier-7").await?;
//! ```

pub mod adapters;
pub mod config;
pub mod error;
pub mod ports;
pub mod service;

pub use config::BillingConfig;
pub use error::{BillingError, BillingResult};
pub use ports::{CancelAttempt, PagedBills};
pub use service::{BillingDeps, BillingService};
