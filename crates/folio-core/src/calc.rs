//! # Totals Calculator
//!
//! Pure functions computing line amounts and bill totals from decimal
//! inputs. No I/O; this module is the single place where the
//! discount/tax composition order is defined.
//!
//! ## Rounding Policy (fixed, do not reorder)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Per line:                                                          │
//! │    gross      = unit_price × quantity        (exact integer)        │
//! │    discount   = round½up(gross × discount%)  ← rounding point 1     │
//! │    line_total = gross − discount             (exact)                │
//! │                                                                     │
//! │  Per bill:                                                          │
//! │    subtotal   = Σ line_total                 (exact)                │
//! │    discount   = round½up(subtotal × disc%)   ← rounding point 2     │
//! │    tax        = round½up((subtotal − discount) × tax%)  ← point 3   │
//! │    total      = subtotal − discount + tax    (exact)                │
//! │                                                                     │
//! │  Discount FIRST, tax on the post-discount subtotal. Moving a        │
//! │  rounding point produces off-by-one-cent totals; the tests below    │
//! │  pin every one of them.                                             │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::Percent;

/// Computed amounts for a single bill line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineAmounts {
    /// unit_price × quantity, before discount.
    pub gross: Money,
    /// Discount amount, rounded half-up to a cent.
    pub discount: Money,
    /// gross − discount.
    pub line_total: Money,
}

/// Computed amounts for a whole bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillTotals {
    pub subtotal: Money,
    pub discount: Money,
    pub tax: Money,
    pub total: Money,
}

/// Computes the amounts for one line.
///
/// ## Example
/// ```rust
/// use folio_core::calc::line_amounts;
/// use folio_core::money::Money;
/// use folio_core::types::Percent;
///
/// // 5 × 10.00 with 10% line discount → 45.00
/// let line = line_amounts(Money::from_cents(1000), 5, Percent::from_bps(1000));
/// assert_eq!(line.line_total.cents(), 4500);
/// ```
pub fn line_amounts(unit_price: Money, quantity: i64, discount: Percent) -> LineAmounts {
    let gross = unit_price.multiply_quantity(quantity);
    let discount = gross.percent_of(discount);
    LineAmounts {
        gross,
        discount,
        line_total: gross - discount,
    }
}

/// Computes bill totals from line totals plus bill-level discount and tax.
///
/// Tax is computed on the POST-discount subtotal; both derived amounts are
/// rounded half-up to a cent independently, so the returned totals always
/// satisfy `total == subtotal - discount + tax` exactly.
pub fn bill_totals<I>(line_totals: I, discount: Percent, tax: Percent) -> BillTotals
where
    I: IntoIterator<Item = Money>,
{
    let subtotal: Money = line_totals.into_iter().sum();
    let discount = subtotal.percent_of(discount);
    let after_discount = subtotal - discount;
    let tax = after_discount.percent_of(tax);
    BillTotals {
        subtotal,
        discount,
        tax,
        total: after_discount + tax,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
