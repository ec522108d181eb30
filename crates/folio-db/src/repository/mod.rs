//! Repository modules for database access.
//!
//! One repository per aggregate. Repositories own a clone of the pool and
//! are cheap to construct; grab them from [`crate::Database`] accessors.

pub mod audit;
pub mod bill;
pub mod customer;
pub mod item;
pub mod sequence;
pub mod stock;

/// Clamps a caller-supplied page size to something sane.
pub(crate) fn clamp_limit(limit: i64) -> i64 {
    limit.clamp(1, 500)
}
