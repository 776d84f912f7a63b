use crate::error::SchemaError;
use crate::types::InventoryTable;
use crate::util;

/// Result of a filter operation, partitioning records into kept and removed.
#[derive(Clone, Debug)]
pub struct FilterResult {
    pub kept: InventoryTable,
    pub removed: InventoryTable,
}

impl FilterResult {
    pub fn from_partition((kept, removed): (InventoryTable, InventoryTable)) -> Self {
        Self { kept, removed }
    }
}

/// Filters partition a table into kept and removed records, preserving the
/// table's order on both sides.
pub trait Filter: Send + Sync {
    /// Decide if this filter should run for the given table.
    fn enable(&self, _table: &InventoryTable) -> bool {
        true
    }

    /// Evaluate each record against this filter's predicate.
    ///
    /// Fails only when the table lacks a column the predicate needs.
    fn filter(&self, table: &InventoryTable) -> Result<FilterResult, SchemaError>;

    /// Returns a stable name for logging.
    fn name(&self) -> &str {
        util::short_type_name(std::any::type_name::<Self>())
    }
}

/// Run filters in sequence; each one sees only what the previous kept.
/// Disabled filters are skipped.
pub fn apply_filters(
    table: &InventoryTable,
    filters: &[&dyn Filter],
) -> Result<InventoryTable, SchemaError> {
    let mut current = table.clone();
    for filter in filters {
        if !filter.enable(&current) {
            continue;
        }
        let result = filter.filter(&current)?;
        log::debug!(
            "filter={} kept={} removed={}",
            filter.name(),
            result.kept.len(),
            result.removed.len()
        );
        current = result.kept;
    }
    Ok(current)
}
