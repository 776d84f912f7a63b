//! Dashboard views derived from the current table.
//!
//! Each view checks its own required columns and fails with a
//! [`SchemaError`] on its own; a missing column in one view never affects
//! another.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::components::action_priority_filter::ActionPriorityFilter;
use crate::components::needs_reorder_filter::NeedsReorderFilter;
use crate::components::product_name_filter::ProductNameFilter;
use crate::components::top_k_selector::TopKSelector;
use crate::error::SchemaError;
use crate::filter::apply_filters;
use crate::router::ContextSelection;
use crate::schema::Column;
use crate::selector::Selector;
use crate::types::{ActionPriority, InventoryTable};

pub const URGENT_VIEW_COLUMNS: [Column; 5] = [
    Column::ProductName,
    Column::WasteRiskScore,
    Column::StockQuantity,
    Column::PredictedSales,
    Column::ActionPriority,
];

pub const REORDER_VIEW_COLUMNS: [Column; 5] = [
    Column::ProductName,
    Column::StockQuantity,
    Column::ReorderPoint,
    Column::EconomicOrderQuantity,
    Column::ActionPriority,
];

pub const SEARCH_VIEW_COLUMNS: [Column; 5] = [
    Column::ProductName,
    Column::StockQuantity,
    Column::PredictedSales,
    Column::WasteRiskScore,
    Column::ActionPriority,
];

pub const CONTEXT_VIEW_COLUMNS: [Column; 6] = [
    Column::ProductName,
    Column::StockQuantity,
    Column::PredictedSales,
    Column::DaysToExpire,
    Column::WasteRiskScore,
    Column::ActionPriority,
];

const CATEGORY_SUMMARY_COLUMNS: [Column; 4] = [
    Column::Category,
    Column::WasteRiskScore,
    Column::ActionPriority,
    Column::NeedsReorder,
];

pub const URGENT_LIMIT: usize = 15;
pub const REORDER_LIMIT: usize = 15;
pub const SEARCH_LIMIT: usize = 20;
pub const PREVIEW_ROWS: usize = 5;
/// Waste risk above which an urgent row is highlighted.
pub const HIGH_RISK_HIGHLIGHT: f64 = 6.0;

// ---------------------------------------------------------------------------
// Tabular views
// ---------------------------------------------------------------------------

/// A titled column subset of a table, ready to print or export.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TableView {
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Row indices to render emphasized.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub highlighted: Vec<usize>,
}

impl TableView {
    /// Project `table` onto `columns`, skipping any the table lacks.
    fn project(title: &str, table: &InventoryTable, columns: &[Column]) -> Self {
        let present: Vec<Column> = columns
            .iter()
            .copied()
            .filter(|c| table.schema().has(*c))
            .collect();
        let rows = table
            .iter()
            .map(|r| {
                present
                    .iter()
                    .map(|c| table.cell(r, *c).unwrap_or_default().to_string())
                    .collect()
            })
            .collect();
        Self {
            title: title.to_string(),
            columns: present.iter().map(|c| c.canonical_name().to_string()).collect(),
            rows,
            highlighted: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// CSV text with exactly this view's columns.
    pub fn to_csv(&self) -> csv::Result<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer
            .into_inner()
            .map_err(|e| csv::Error::from(e.into_error()))
    }
}

/// URGENT rows, highest waste risk first.
pub fn urgent_items(table: &InventoryTable) -> Result<TableView, SchemaError> {
    table.schema().require("urgent items", &URGENT_VIEW_COLUMNS)?;

    let urgent = apply_filters(table, &[&ActionPriorityFilter::urgent()])?;
    let top = TopKSelector::new(Column::WasteRiskScore, URGENT_LIMIT).select(&urgent);

    let mut view = TableView::project("Urgent items", &top, &URGENT_VIEW_COLUMNS);
    view.highlighted = top
        .iter()
        .enumerate()
        .filter(|(_, r)| {
            top.number(r, Column::WasteRiskScore)
                .is_some_and(|risk| risk > HIGH_RISK_HIGHLIGHT)
        })
        .map(|(i, _)| i)
        .collect();
    Ok(view)
}

/// Rows flagged for reorder, highest reorder point first.
pub fn reorder_items(table: &InventoryTable) -> Result<TableView, SchemaError> {
    table.schema().require("reorder items", &[Column::NeedsReorder])?;
    table.schema().require("reorder items", &REORDER_VIEW_COLUMNS)?;

    let flagged = apply_filters(table, &[&NeedsReorderFilter])?;
    let top = TopKSelector::new(Column::ReorderPoint, REORDER_LIMIT).select(&flagged);
    Ok(TableView::project("Items to reorder", &top, &REORDER_VIEW_COLUMNS))
}

/// Products whose name contains `query`, highest waste risk first.
pub fn search_products(table: &InventoryTable, query: &str) -> Result<TableView, SchemaError> {
    table.schema().require("product search", &SEARCH_VIEW_COLUMNS)?;

    let filter = ProductNameFilter::new(query);
    let matches = if query.trim().is_empty() {
        table.with_records(Vec::new())
    } else {
        apply_filters(table, &[&filter])?
    };
    let top = TopKSelector::new(Column::WasteRiskScore, SEARCH_LIMIT).select(&matches);
    Ok(TableView::project("Matching products", &top, &SEARCH_VIEW_COLUMNS))
}

/// The rows routed to the assistant, as shown alongside the answer.
pub fn context_view(selection: &ContextSelection) -> TableView {
    TableView::project(
        &format!("Matching products ({})", selection.label),
        &selection.records,
        &CONTEXT_VIEW_COLUMNS,
    )
}

/// First rows of a freshly loaded table, every column.
pub fn preview(table: &InventoryTable) -> TableView {
    let head = table.head(PREVIEW_ROWS);
    TableView {
        title: "Preview of uploaded data".to_string(),
        columns: table.schema().headers().to_vec(),
        rows: head.iter().map(|r| r.cells().to_vec()).collect(),
        highlighted: Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HeadlineMetrics {
    pub urgent_items: usize,
    pub reorder_items: usize,
    pub total_skus: usize,
}

/// Counts of URGENT and REORDER priorities, plus table size.
pub fn headline_metrics(table: &InventoryTable) -> Result<HeadlineMetrics, SchemaError> {
    table
        .schema()
        .require("headline metrics", &[Column::ActionPriority])?;

    let mut metrics = HeadlineMetrics {
        urgent_items: 0,
        reorder_items: 0,
        total_skus: table.len(),
    };
    for record in table.iter() {
        match table.action_priority(record) {
            Some(ActionPriority::Urgent) => metrics.urgent_items += 1,
            Some(ActionPriority::Reorder) => metrics.reorder_items += 1,
            _ => {}
        }
    }
    Ok(metrics)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ActionCount {
    pub action_priority: String,
    pub count: usize,
}

/// Rows per action priority, most common first. Blank priorities are not
/// counted.
pub fn action_overview(table: &InventoryTable) -> Result<Vec<ActionCount>, SchemaError> {
    table
        .schema()
        .require("action overview", &[Column::ActionPriority])?;

    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for record in table.iter() {
        if let Some(priority) = table.action_priority(record) {
            *counts.entry(priority.to_string()).or_insert(0) += 1;
        }
    }

    let mut overview: Vec<ActionCount> = counts
        .into_iter()
        .map(|(action_priority, count)| ActionCount {
            action_priority,
            count,
        })
        .collect();
    // BTreeMap order breaks ties by name; the sort is stable.
    overview.sort_by(|a, b| b.count.cmp(&a.count));
    Ok(overview)
}

/// Risk and action totals for one category.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CategoryRisk {
    pub category: String,
    /// Mean waste risk rounded to 2 decimals; `None` if no row had a score.
    pub avg_waste_risk: Option<f64>,
    /// Rows in the category with a numeric waste risk score.
    pub total_items: usize,
    pub urgent_count: usize,
    pub reorder_count: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CategorySummary {
    pub categories: Vec<CategoryRisk>,
}

impl CategorySummary {
    /// The category with the highest mean waste risk.
    pub fn highest_risk(&self) -> Option<&CategoryRisk> {
        self.categories.iter().find(|c| c.avg_waste_risk.is_some())
    }
}

#[derive(Default)]
struct CategoryAccumulator {
    risk_sum: f64,
    risk_count: usize,
    urgent: usize,
    reorder: usize,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Per-category mean risk, item count, URGENT count and reorder count,
/// sorted by mean risk descending. Computed in a single pass.
pub fn category_summary(table: &InventoryTable) -> Result<CategorySummary, SchemaError> {
    table
        .schema()
        .require("category summary", &CATEGORY_SUMMARY_COLUMNS)?;

    let mut groups: BTreeMap<String, CategoryAccumulator> = BTreeMap::new();
    for record in table.iter() {
        let Some(category) = table.text(record, Column::Category) else {
            continue;
        };
        let acc = groups.entry(category.to_string()).or_default();
        if let Some(risk) = table.number(record, Column::WasteRiskScore) {
            acc.risk_sum += risk;
            acc.risk_count += 1;
        }
        if table.action_priority(record) == Some(ActionPriority::Urgent) {
            acc.urgent += 1;
        }
        if table.flag(record, Column::NeedsReorder).unwrap_or(false) {
            acc.reorder += 1;
        }
    }

    let mut categories: Vec<CategoryRisk> = groups
        .into_iter()
        .map(|(category, acc)| CategoryRisk {
            category,
            avg_waste_risk: (acc.risk_count > 0)
                .then(|| round2(acc.risk_sum / acc.risk_count as f64)),
            total_items: acc.risk_count,
            urgent_count: acc.urgent,
            reorder_count: acc.reorder,
        })
        .collect();

    categories.sort_by(|a, b| match (a.avg_waste_risk, b.avg_waste_risk) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(std::cmp::Ordering::Equal),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    Ok(CategorySummary { categories })
}
