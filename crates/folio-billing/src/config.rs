//! # Billing Configuration
//!
//! Explicit configuration value for the workflow. Constructed once at
//! startup and passed into [`crate::service::BillingService`]; no global
//! or ambient settings.

use folio_core::Percent;

/// Configuration for the billing workflow.
///
/// ## Example
/// ```rust,ignore
/// let config = BillingConfig::default().with_prefix("INV");
/// ```
#[derive(Debug, Clone)]
pub struct BillingConfig {
    /// Prefix of generated bill numbers.
    pub number_prefix: String,

    /// Zero-pad width of the counter portion of bill numbers.
    /// With the default of 6, counter 123 in 2026-08 formats as
    /// `BILL202608000123`.
    pub counter_width: usize,

    /// Tax rate applied when a draft does not carry one.
    pub default_tax: Percent,
}

impl Default for BillingConfig {
    fn default() -> Self {
        BillingConfig {
            number_prefix: "BILL".to_string(),
            counter_width: 6,
            default_tax: Percent::zero(),
        }
    }
}

impl BillingConfig {
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.number_prefix = prefix.into();
        self
    }

    pub fn with_default_tax(mut self, tax: Percent) -> Self {
        self.default_tax = tax;
        self
    }

    /// Formats a bill number from a period and an allocated counter.
    pub fn format_bill_number(&self, period: &str, counter: i64) -> String {
        format!(
            "{}{}{:0width$}",
            self.number_prefix,
            period,
            counter,
            width = self.counter_width
        )
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
