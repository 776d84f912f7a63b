use std::cmp::Ordering;

use crate::types::{InventoryRecord, InventoryTable};
use crate::util;

/// Selectors sort and truncate a table after filtering.
pub trait Selector: Send + Sync {
    /// Default selection: sort and truncate based on provided configs.
    fn select(&self, table: &InventoryTable) -> InventoryTable {
        let mut sorted = self.sort(table);
        if let Some(limit) = self.size() {
            sorted.truncate(limit);
        }
        table.with_records(sorted)
    }

    /// Extract the score used for sorting.
    fn score(&self, table: &InventoryTable, record: &InventoryRecord) -> f64;

    /// Sort records by score in descending order.
    ///
    /// NaN scores are pushed to the end of the list so rows with missing
    /// data never appear at the top. Ties keep table order.
    fn sort(&self, table: &InventoryTable) -> Vec<InventoryRecord> {
        let mut scored: Vec<(f64, &InventoryRecord)> =
            table.iter().map(|r| (self.score(table, r), r)).collect();
        scored.sort_by(|(sa, _), (sb, _)| match (sa.is_nan(), sb.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => sb.partial_cmp(sa).unwrap_or(Ordering::Equal),
        });
        scored.into_iter().map(|(_, r)| r.clone()).collect()
    }

    /// Optionally provide a maximum number of records to select.
    /// Defaults to no truncation if not overridden.
    fn size(&self) -> Option<usize> {
        None
    }

    /// Returns a stable name for logging.
    fn name(&self) -> &str {
        util::short_type_name(std::any::type_name::<Self>())
    }
}
