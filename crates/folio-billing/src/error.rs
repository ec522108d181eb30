//! # Billing Error Types
//!
//! The error taxonomy of the workflow layer. Everything the service can
//! fail with is one of these variants; callers can match on them without
//! parsing strings.
//!
//! Two rules the service upholds around errors:
//! - `Validation` never has side effects (it fires before any I/O)
//! - Any error after a stock debit fires AFTER compensation, so partial
//!   debits are never observable

use folio_core::{BillStatus, ValidationError};
use thiserror::Error;

/// Errors from the billing workflow.
#[derive(Debug, Error)]
pub enum BillingError {
    /// Draft failed pure validation; nothing was written.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The draft references a customer that does not exist or is inactive.
    #[error("customer not found or inactive: {0}")]
    CustomerNotFound(String),

    /// A line references an item that does not exist.
    #[error("item not found: {0}")]
    ItemNotFound(String),

    /// A line references a deactivated item.
    #[error("item is inactive: {0}")]
    ItemInactive(String),

    /// A line asked for more units than are on hand.
    #[error("insufficient stock for item {item}: available {available}, requested {requested}")]
    InsufficientStock {
        item: String,
        available: i64,
        requested: i64,
    },

    /// No bill with the given id or number.
    #[error("bill not found: {0}")]
    BillNotFound(String),

    /// The bill exists but is not in a state that allows the operation
    /// (e.g. cancelling an already cancelled bill).
    #[error("bill {bill_id} is {status:?}, operation requires an active bill")]
    InvalidState {
        bill_id: String,
        status: BillStatus,
    },

    /// A storage operation failed. When this surfaces from create_bill,
    /// compensation has already run.
    #[error("persistence error: {0}")]
    Persistence(#[from] folio_db::DbError),
}

/// Result alias for billing operations.
pub type BillingResult<T> = Result<T, BillingError>;
