use crate::error::SchemaError;
use crate::filter::{Filter, FilterResult};
use crate::types::InventoryTable;

/// Keeps records whose `days_to_expire` is negative.
///
/// Records with an undefined expiry are removed, never treated as zero.
pub struct ExpiredFilter;

impl Filter for ExpiredFilter {
    fn filter(&self, table: &InventoryTable) -> Result<FilterResult, SchemaError> {
        Ok(FilterResult::from_partition(table.partition(|r| {
            r.days_to_expire().is_some_and(|days| days < 0.0)
        })))
    }
}
