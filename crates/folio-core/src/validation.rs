//! # Validation Module
//!
//! Business-rule validation for billing inputs.
//!
//! ## Validation Strategy
//! Validation runs FIRST in the create-bill workflow, before the bill
//! number is allocated and before any stock is touched, so a rejected
//! draft has zero side effects. The database adds a second line of
//! defense (CHECK and NOT NULL constraints), but errors from there are
//! infrastructure errors - this module is what produces the typed,
//! user-correctable ones.
//!
//! ## Usage
//! ```rust
//! use folio_core::types::{BillDraft, LineDraft, Percent, PaymentMethod, PaymentStatus};
//! use folio_core::validation::validate_bill_draft;
//!
//! let draft = BillDraft {
//!     customer_id: "c-1".into(),
//!     bill_number: None,
//!     discount: Percent::zero(),
//!     tax: Some(Percent::from_bps(1000)),
//!     payment_method: PaymentMethod::Cash,
//!     payment_status: PaymentStatus::Paid,
//!     notes: None,
//!     lines: vec![LineDraft {
//!         item_id: "i-1".into(),
//!         quantity: 2,
//!         unit_price_cents: 1500,
//!         discount: Percent::zero(),
//!     }],
//! };
//! assert!(validate_bill_draft(&draft).is_ok());
//! ```

use crate::error::{ValidationError, ValidationResult};
use crate::types::{BillDraft, Percent};
use crate::{MAX_BILL_LINES, MAX_LINE_QUANTITY, MAX_PERCENT_BPS, MAX_UNIT_PRICE_CENTS};

/// Validates a whole draft bill. First failure wins.
///
/// ## Rules
/// - customer id present
/// - at least one line, at most [`MAX_BILL_LINES`]
/// - per line: item id present, quantity in 1..=[`MAX_LINE_QUANTITY`],
///   unit price strictly positive
/// - every percentage (bill discount, tax, line discounts) within 0..=100%
pub fn validate_bill_draft(draft: &BillDraft) -> ValidationResult<()> {
    if draft.customer_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "customer_id".to_string(),
        });
    }

    if draft.lines.is_empty() {
        return Err(ValidationError::Empty {
            field: "line item".to_string(),
        });
    }

    if draft.lines.len() > MAX_BILL_LINES {
        return Err(ValidationError::TooMany {
            field: "line items".to_string(),
            max: MAX_BILL_LINES,
        });
    }

    validate_percent("discount_percentage", draft.discount)?;
    if let Some(tax) = draft.tax {
        validate_percent("tax_percentage", tax)?;
    }

    for line in &draft.lines {
        if line.item_id.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "item_id".to_string(),
            });
        }
        validate_quantity(line.quantity)?;
        validate_unit_price_cents(line.unit_price_cents)?;
        validate_percent("line discount_percentage", line.discount)?;
    }

    Ok(())
}

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed [`MAX_LINE_QUANTITY`]
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a unit price in cents.
///
/// ## Rules
/// - Free items are not billable; the price must be strictly positive
/// - Capped at [`MAX_UNIT_PRICE_CENTS`], which together with the
///   quantity cap keeps every line gross inside i64
pub fn validate_unit_price_cents(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "unit_price".to_string(),
        });
    }

    if cents > MAX_UNIT_PRICE_CENTS {
        return Err(ValidationError::OutOfRange {
            field: "unit_price".to_string(),
            min: 1,
            max: MAX_UNIT_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates a percentage: 0..=100% (0..=10000 bps).
pub fn validate_percent(field: &str, pct: Percent) -> ValidationResult<()> {
    if pct.bps() > MAX_PERCENT_BPS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_PERCENT_BPS as i64,
        });
    }

    Ok(())
}

/// Validates a UUID string format.
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
