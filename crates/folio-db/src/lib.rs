//! # Folio Database Layer
//!
//! SQLite persistence for the billing workflow: customers, catalog items,
//! bills with their lines, the stock movement ledger, bill number counters
//! and the audit log.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │               folio-billing             │
//! │        (workflow + port adapters)       │
//! └────────────────────┬────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────┐
//! │                folio-db                 │
//! │  ┌──────────┐ ┌──────────┐ ┌─────────┐  │
//! │  │   pool   │ │repository│ │migration│  │
//! │  └──────────┘ └──────────┘ └─────────┘  │
//! └────────────────────┬────────────────────┘
//!                      │
//!               ┌──────▼──────┐
//!               │   SQLite    │
//!               │  (WAL mode) │
//!               └─────────────┘
//! ```
//!
//! ## Transactional Boundaries
//!
//! Each repository method that mutates more than one row runs inside a
//! single transaction. Multi-repository workflows (create bill, cancel
//! bill) are coordinated one level up in `folio-billing`; the invariants
//! that must hold per item (never oversell) are enforced here with
//! conditional single-statement updates.
//!
//! ## Example
//!
//! ```rust,ignore
//! use folio_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("folio.db")).await?;
//! let item = db.items().get_by_code("BK-001").await?;
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::bill::{BillPage, CancelOutcome};
pub use repository::stock::DebitOutcome;
