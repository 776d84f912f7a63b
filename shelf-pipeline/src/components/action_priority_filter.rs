use crate::error::SchemaError;
use crate::filter::{Filter, FilterResult};
use crate::schema::Column;
use crate::types::{ActionPriority, InventoryTable};

/// Keeps records carrying one action priority.
pub struct ActionPriorityFilter {
    pub priority: ActionPriority,
}

impl ActionPriorityFilter {
    pub fn urgent() -> Self {
        Self {
            priority: ActionPriority::Urgent,
        }
    }
}

impl Filter for ActionPriorityFilter {
    fn filter(&self, table: &InventoryTable) -> Result<FilterResult, SchemaError> {
        table
            .schema()
            .require("action priority filter", &[Column::ActionPriority])?;
        Ok(FilterResult::from_partition(table.partition(|r| {
            table.action_priority(r).as_ref() == Some(&self.priority)
        })))
    }
}
