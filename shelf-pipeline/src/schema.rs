//! Canonical column names.
//!
//! Source files spell the same column many ways (`Needs_Reorder`,
//! `NeedsReorder`, `needs reorder`, `EOQ`). Headers are canonicalized exactly
//! once, when a table is built; every other module addresses columns through
//! [`Column`] and never sees a raw header.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::error::SchemaError;

/// The inventory attributes the pipeline knows how to interpret.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    ProductName,
    StockQuantity,
    PredictedSales,
    DaysToExpire,
    WasteRiskScore,
    NeedsReorder,
    ReorderPoint,
    EconomicOrderQuantity,
    ActionPriority,
    Category,
}

impl Column {
    pub const ALL: [Column; 10] = [
        Column::ProductName,
        Column::StockQuantity,
        Column::PredictedSales,
        Column::DaysToExpire,
        Column::WasteRiskScore,
        Column::NeedsReorder,
        Column::ReorderPoint,
        Column::EconomicOrderQuantity,
        Column::ActionPriority,
        Column::Category,
    ];

    pub fn canonical_name(self) -> &'static str {
        match self {
            Column::ProductName => "product_name",
            Column::StockQuantity => "stock_quantity",
            Column::PredictedSales => "predicted_sales",
            Column::DaysToExpire => "days_to_expire",
            Column::WasteRiskScore => "waste_risk_score",
            Column::NeedsReorder => "needs_reorder",
            Column::ReorderPoint => "reorder_point",
            Column::EconomicOrderQuantity => "economic_order_quantity",
            Column::ActionPriority => "action_priority",
            Column::Category => "category",
        }
    }

    /// Match a header after case and separator folding.
    fn from_folded(folded: &str) -> Option<Column> {
        let column = match folded {
            "productname" => Column::ProductName,
            "stockquantity" => Column::StockQuantity,
            "predictedsales" => Column::PredictedSales,
            "daystoexpire" | "daystoexpiry" => Column::DaysToExpire,
            "wasteriskscore" => Column::WasteRiskScore,
            "needsreorder" => Column::NeedsReorder,
            "reorderpoint" => Column::ReorderPoint,
            "eoq" | "economicorderquantity" => Column::EconomicOrderQuantity,
            "actionpriority" => Column::ActionPriority,
            "category" => Column::Category,
            _ => return None,
        };
        Some(column)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

fn fold(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, '_' | '-' | ' ' | '.'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Map a raw source header to the name used everywhere downstream.
///
/// Known columns get their canonical snake_case name; anything else is
/// returned trimmed and otherwise untouched.
pub fn canonical_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_start_matches('\u{feff}');
    match Column::from_folded(&fold(trimmed)) {
        Some(column) => column.canonical_name().to_string(),
        None => trimmed.to_string(),
    }
}

/// Header layout of a loaded table.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Schema {
    headers: Vec<String>,
    positions: HashMap<Column, usize>,
}

impl Schema {
    /// Build a schema from raw headers, canonicalizing each one.
    ///
    /// If two source headers fold to the same column, the first one wins.
    pub fn new<I, S>(raw_headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let headers: Vec<String> = raw_headers
            .into_iter()
            .map(|h| canonical_header(h.as_ref()))
            .collect();

        let mut positions = HashMap::new();
        for (idx, header) in headers.iter().enumerate() {
            if let Some(column) = Column::from_folded(&fold(header)) {
                positions.entry(column).or_insert(idx);
            }
        }

        Self { headers, positions }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn position(&self, column: Column) -> Option<usize> {
        self.positions.get(&column).copied()
    }

    pub fn has(&self, column: Column) -> bool {
        self.positions.contains_key(&column)
    }

    /// Check that every column a view depends on is present.
    pub fn require(&self, view: &'static str, columns: &[Column]) -> Result<(), SchemaError> {
        let missing: Vec<Column> = columns.iter().copied().filter(|c| !self.has(*c)).collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(SchemaError { view, missing })
        }
    }
}
