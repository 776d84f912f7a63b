use crate::error::SchemaError;
use crate::filter::{Filter, FilterResult};
use crate::schema::Column;
use crate::types::InventoryTable;

/// Keeps records flagged `needs_reorder`.
pub struct NeedsReorderFilter;

impl Filter for NeedsReorderFilter {
    fn filter(&self, table: &InventoryTable) -> Result<FilterResult, SchemaError> {
        table
            .schema()
            .require("reorder filter", &[Column::NeedsReorder])?;
        Ok(FilterResult::from_partition(table.partition(|r| {
            table.flag(r, Column::NeedsReorder).unwrap_or(false)
        })))
    }
}
