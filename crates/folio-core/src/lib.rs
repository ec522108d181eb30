//! # folio-core: Pure Business Logic for the Folio Bookshop Back-Office
//!
//! This crate is the heart of the billing subsystem. It contains all
//! business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        Folio Architecture                           │
//! │                                                                     │
//! │  ┌───────────────────────────────────────────────────────────────┐  │
//! │  │                 HTTP / controller layer (external)            │  │
//! │  └─────────────────────────────┬─────────────────────────────────┘  │
//! │                                │                                    │
//! │  ┌─────────────────────────────▼─────────────────────────────────┐  │
//! │  │              folio-billing (workflow + ports)                 │  │
//! │  │    create_bill, cancel_bill, get_bill, generate_bill_number   │  │
//! │  └─────────────────────────────┬─────────────────────────────────┘  │
//! │                                │                                    │
//! │  ┌─────────────────────────────▼─────────────────────────────────┐  │
//! │  │               ★ folio-core (THIS CRATE) ★                     │  │
//! │  │                                                               │  │
//! │  │   ┌─────────┐  ┌─────────┐  ┌─────────┐  ┌────────────┐       │  │
//! │  │   │  types  │  │  money  │  │  calc   │  │ validation │       │  │
//! │  │   │  Bill   │  │  Money  │  │ totals  │  │   rules    │       │  │
//! │  │   │  Item   │  │ Percent │  │  lines  │  │   checks   │       │  │
//! │  │   └─────────┘  └─────────┘  └─────────┘  └────────────┘       │  │
//! │  │                                                               │  │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS          │  │
//! │  └─────────────────────────────┬─────────────────────────────────┘  │
//! │                                │                                    │
//! │  ┌─────────────────────────────▼─────────────────────────────────┐  │
//! │  │                  folio-db (Database Layer)                    │  │
//! │  │           SQLite queries, migrations, repositories            │  │
//! │  └───────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Bill, BillLine, Item, StockMovement, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`calc`] - Line and bill total computation with fixed rounding order
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input = same output, always
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: all monetary values are cents (i64), no float errors
//! 4. **Explicit Errors**: all errors are typed, never strings or panics

pub mod calc;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// Re-exports so callers can do `use folio_core::Money` instead of
// `use folio_core::money::Money`.
pub use calc::{bill_totals, line_amounts, BillTotals, LineAmounts};
pub use error::ValidationError;
pub use money::Money;
pub use types::*;

/// Maximum line items allowed on a single bill.
///
/// ## Business Reason
/// Prevents runaway bills and keeps a single billing transaction bounded;
/// the counter at the till never legitimately reaches this.
pub const MAX_BILL_LINES: usize = 100;

/// Maximum quantity of a single item on one bill line.
///
/// ## Business Reason
/// Catches fat-finger quantities (typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;

/// Maximum unit price on a bill line, in cents (1,000,000.00).
///
/// ## Business Reason
/// Catches fat-finger prices the same way [`MAX_LINE_QUANTITY`] catches
/// quantities, and bounds the line gross: with both caps in force,
/// `unit_price * quantity` stays far inside i64 on every validated draft.
pub const MAX_UNIT_PRICE_CENTS: i64 = 100_000_000;

/// Basis points in 100% - percentages are stored as bps (1% = 100 bps).
pub const MAX_PERCENT_BPS: u32 = 10_000;
