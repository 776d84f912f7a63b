//! Expiry classification.
//!
//! Splits a table into the rows that have already expired and the rows
//! inside the near-expiry window. Pure: the input table is not touched and
//! the same table and window always give the same subsets.

use crate::components::expired_filter::ExpiredFilter;
use crate::components::near_expiry_filter::NearExpiryFilter;
use crate::filter::Filter;
use crate::thresholds::ExpiryWindow;
use crate::types::InventoryTable;

/// Both expiry subsets for one table and window.
#[derive(Clone, Debug, Default)]
pub struct ExpiryClassification {
    pub expired: InventoryTable,
    pub about_to_expire: InventoryTable,
    /// Rows whose `days_to_expire` could not be read as a number.
    pub unclassified: usize,
    pub window: ExpiryWindow,
}

/// Classify every record of `table` against `window`.
pub fn classify(table: &InventoryTable, window: ExpiryWindow) -> ExpiryClassification {
    let unclassified = table
        .iter()
        .filter(|r| r.days_to_expire().is_none())
        .count();

    if unclassified > 0 {
        log::warn!(
            "{} of {} rows have no numeric days_to_expire and were excluded from expiry classification",
            unclassified,
            table.len()
        );
    }

    // Both filters read only the coerced expiry value and never fail.
    let expired = ExpiredFilter
        .filter(table)
        .map(|r| r.kept)
        .unwrap_or_else(|_| table.with_records(Vec::new()));
    let about_to_expire = NearExpiryFilter::new(window)
        .filter(table)
        .map(|r| r.kept)
        .unwrap_or_else(|_| table.with_records(Vec::new()));

    log::info!(
        "classified rows={} expired={} about_to_expire={} window={}..={}",
        table.len(),
        expired.len(),
        about_to_expire.len(),
        window.min(),
        window.max()
    );

    ExpiryClassification {
        expired,
        about_to_expire,
        unclassified,
        window,
    }
}
