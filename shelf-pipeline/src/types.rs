use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::schema::{Column, Schema};

// ---------------------------------------------------------------------------
// Action priority
// ---------------------------------------------------------------------------

/// Recommended action carried in the `action_priority` column.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ActionPriority {
    Urgent,
    Reorder,
    Other(String),
}

impl ActionPriority {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.to_ascii_uppercase().as_str() {
            "URGENT" => ActionPriority::Urgent,
            "REORDER" => ActionPriority::Reorder,
            _ => ActionPriority::Other(trimmed.to_string()),
        }
    }
}

impl fmt::Display for ActionPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionPriority::Urgent => write!(f, "URGENT"),
            ActionPriority::Reorder => write!(f, "REORDER"),
            ActionPriority::Other(s) => write!(f, "{}", s),
        }
    }
}

// ---------------------------------------------------------------------------
// Cell coercion
// ---------------------------------------------------------------------------

/// Numeric coercion: anything that does not parse to a finite number is
/// undefined. An empty cell is never zero.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Flexible flag parsing: handles "true"/"false", "1"/"0", "yes"/"no" and
/// spreadsheet floats such as "1.0".
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => Some(true),
        "false" | "0" | "no" | "n" => Some(false),
        "" => None,
        other => parse_number(other).map(|v| v != 0.0),
    }
}

// ---------------------------------------------------------------------------
// Records and tables
// ---------------------------------------------------------------------------

/// One inventory row, stored as source text.
#[derive(Clone, Debug, PartialEq)]
pub struct InventoryRecord {
    cells: Vec<String>,
    /// `days_to_expire` coerced once at load. `None` when the cell is
    /// missing or non-numeric.
    days_to_expire: Option<f64>,
}

impl InventoryRecord {
    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    pub fn days_to_expire(&self) -> Option<f64> {
        self.days_to_expire
    }
}

/// An ordered set of records sharing one schema.
///
/// Subsets produced by filters and selectors share the parent's schema, so
/// two tables can only be concatenated when they came from the same load.
#[derive(Clone, Debug, Default)]
pub struct InventoryTable {
    schema: Arc<Schema>,
    records: Vec<InventoryRecord>,
}

impl InventoryTable {
    /// Build a table from raw headers and rows.
    ///
    /// Short rows are padded with empty cells and long rows truncated so
    /// every record matches the header width.
    pub fn from_rows<H, S>(raw_headers: H, rows: Vec<Vec<String>>) -> Self
    where
        H: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let schema = Arc::new(Schema::new(raw_headers));
        let width = schema.len();
        let days_idx = schema.position(Column::DaysToExpire);

        let records = rows
            .into_iter()
            .map(|mut cells| {
                cells.resize(width, String::new());
                let days_to_expire = days_idx.and_then(|i| parse_number(&cells[i]));
                InventoryRecord {
                    cells,
                    days_to_expire,
                }
            })
            .collect();

        Self { schema, records }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn records(&self) -> &[InventoryRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, InventoryRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn same_schema(&self, other: &InventoryTable) -> bool {
        Arc::ptr_eq(&self.schema, &other.schema) || *self.schema == *other.schema
    }

    /// A table with this schema and the given records.
    pub fn with_records(&self, records: Vec<InventoryRecord>) -> Self {
        Self {
            schema: Arc::clone(&self.schema),
            records,
        }
    }

    /// First `n` records, in order.
    pub fn head(&self, n: usize) -> Self {
        self.with_records(self.records.iter().take(n).cloned().collect())
    }

    /// `self` followed by `other`. Returns `None` when the schemas differ.
    pub fn concat(&self, other: &InventoryTable) -> Option<Self> {
        if !self.same_schema(other) {
            return None;
        }
        let mut records = Vec::with_capacity(self.len() + other.len());
        records.extend(self.records.iter().cloned());
        records.extend(other.records.iter().cloned());
        Some(self.with_records(records))
    }

    /// Split records by a predicate, preserving order on both sides.
    pub fn partition<F>(&self, mut keep: F) -> (Self, Self)
    where
        F: FnMut(&InventoryRecord) -> bool,
    {
        let (kept, removed): (Vec<_>, Vec<_>) =
            self.records.iter().cloned().partition(|r| keep(r));
        (self.with_records(kept), self.with_records(removed))
    }

    /// Raw cell text for a known column; `None` if the column is absent.
    pub fn cell<'a>(&self, record: &'a InventoryRecord, column: Column) -> Option<&'a str> {
        self.schema
            .position(column)
            .and_then(|i| record.cells.get(i))
            .map(String::as_str)
    }

    /// Trimmed non-empty text.
    pub fn text<'a>(&self, record: &'a InventoryRecord, column: Column) -> Option<&'a str> {
        self.cell(record, column)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn number(&self, record: &InventoryRecord, column: Column) -> Option<f64> {
        if column == Column::DaysToExpire {
            return record.days_to_expire;
        }
        self.cell(record, column).and_then(parse_number)
    }

    pub fn flag(&self, record: &InventoryRecord, column: Column) -> Option<bool> {
        self.cell(record, column).and_then(parse_flag)
    }

    pub fn action_priority(&self, record: &InventoryRecord) -> Option<ActionPriority> {
        self.text(record, Column::ActionPriority)
            .map(ActionPriority::parse)
    }
}

impl PartialEq for InventoryTable {
    fn eq(&self, other: &Self) -> bool {
        self.same_schema(other) && self.records == other.records
    }
}
