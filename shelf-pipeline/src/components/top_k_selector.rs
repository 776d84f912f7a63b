use crate::schema::Column;
use crate::selector::Selector;
use crate::types::{InventoryRecord, InventoryTable};

/// Selects the top K records by a numeric column, highest first.
///
/// Records whose value is missing or non-numeric sort last.
pub struct TopKSelector {
    pub by: Column,
    pub k: usize,
}

impl TopKSelector {
    pub fn new(by: Column, k: usize) -> Self {
        Self { by, k }
    }
}

impl Selector for TopKSelector {
    fn score(&self, table: &InventoryTable, record: &InventoryRecord) -> f64 {
        table.number(record, self.by).unwrap_or(f64::NAN)
    }

    fn size(&self) -> Option<usize> {
        Some(self.k)
    }
}
