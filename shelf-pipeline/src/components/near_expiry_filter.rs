use crate::error::SchemaError;
use crate::filter::{Filter, FilterResult};
use crate::thresholds::ExpiryWindow;
use crate::types::InventoryTable;

/// Keeps records whose `days_to_expire` falls inside the inclusive
/// near-expiry window.
pub struct NearExpiryFilter {
    pub window: ExpiryWindow,
}

impl NearExpiryFilter {
    pub fn new(window: ExpiryWindow) -> Self {
        Self { window }
    }
}

impl Default for NearExpiryFilter {
    fn default() -> Self {
        Self::new(ExpiryWindow::default())
    }
}

impl Filter for NearExpiryFilter {
    fn filter(&self, table: &InventoryTable) -> Result<FilterResult, SchemaError> {
        Ok(FilterResult::from_partition(table.partition(|r| {
            r.days_to_expire()
                .is_some_and(|days| self.window.contains(days))
        })))
    }
}
