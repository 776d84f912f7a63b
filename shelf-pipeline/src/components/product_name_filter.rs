use crate::error::SchemaError;
use crate::filter::{Filter, FilterResult};
use crate::schema::Column;
use crate::types::InventoryTable;

/// Case-insensitive substring match on `product_name`.
pub struct ProductNameFilter {
    needle: String,
}

impl ProductNameFilter {
    pub fn new(query: &str) -> Self {
        Self {
            needle: query.trim().to_lowercase(),
        }
    }
}

impl Filter for ProductNameFilter {
    fn enable(&self, _table: &InventoryTable) -> bool {
        !self.needle.is_empty()
    }

    fn filter(&self, table: &InventoryTable) -> Result<FilterResult, SchemaError> {
        table
            .schema()
            .require("product search", &[Column::ProductName])?;
        Ok(FilterResult::from_partition(table.partition(|r| {
            table
                .text(r, Column::ProductName)
                .is_some_and(|name| name.to_lowercase().contains(&self.needle))
        })))
    }
}
