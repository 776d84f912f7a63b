//! Plain-text and JSON presentation.

use std::fmt::Write as _;

use chrono::Utc;
use serde::Serialize;

use shelf_pipeline::views::{ActionCount, CategorySummary, HeadlineMetrics, TableView};
use shelf_pipeline::{ExpiryClassification, SchemaError, SessionSettings, Transcript};

/// Marker printed before highlighted rows.
const HIGHLIGHT_MARK: &str = "!";

// ---------------------------------------------------------------------------
// JSON output contract
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    generated_at: String,
    #[serde(flatten)]
    body: &'a T,
}

/// Serialize `body` with a `generated_at` timestamp.
pub fn to_json<T: Serialize>(body: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&Envelope {
        generated_at: Utc::now().to_rfc3339(),
        body,
    })
}

/// A view result as it appears in JSON: either the view or its error.
#[derive(Serialize)]
#[serde(untagged)]
pub enum Section<T: Serialize> {
    Ok(T),
    Unavailable { error: String },
}

impl<T: Serialize> From<Result<T, SchemaError>> for Section<T> {
    fn from(result: Result<T, SchemaError>) -> Self {
        match result {
            Ok(value) => Section::Ok(value),
            Err(err) => Section::Unavailable {
                error: err.to_string(),
            },
        }
    }
}

#[derive(Serialize)]
pub struct OverviewJson {
    pub metrics: Section<HeadlineMetrics>,
    pub action_overview: Section<Vec<ActionCount>>,
    pub category_summary: Section<CategorySummary>,
    pub expiry: ExpiryJson,
}

#[derive(Serialize)]
pub struct ExpiryJson {
    pub near_expiry_min: i64,
    pub near_expiry_max: i64,
    pub risk_threshold: f64,
    pub expired: usize,
    pub about_to_expire: usize,
    pub unclassified: usize,
}

impl ExpiryJson {
    pub fn new(classification: &ExpiryClassification, settings: &SessionSettings) -> Self {
        Self {
            near_expiry_min: settings.window.min(),
            near_expiry_max: settings.window.max(),
            risk_threshold: settings.risk_threshold,
            expired: classification.expired.len(),
            about_to_expire: classification.about_to_expire.len(),
            unclassified: classification.unclassified,
        }
    }
}

#[derive(Serialize)]
pub struct AnswerJson<'a> {
    pub question: &'a str,
    pub scope: String,
    pub context_rows: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Set when resending the question may succeed.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub retryable: bool,
}

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

/// Render a view as an aligned text table.
pub fn table(view: &TableView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({} rows)", view.title, view.len());
    if view.is_empty() {
        out.push_str("  (none)\n");
        return out;
    }

    let mut widths: Vec<usize> = view.columns.iter().map(|c| c.chars().count()).collect();
    for row in &view.rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let pad = " ".repeat(HIGHLIGHT_MARK.len());
    let _ = writeln!(out, "{} {}", pad, join_padded(&view.columns, &widths));
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let _ = writeln!(out, "{} {}", pad, rule.join("  "));
    for (i, row) in view.rows.iter().enumerate() {
        let mark = if view.highlighted.contains(&i) { HIGHLIGHT_MARK } else { pad.as_str() };
        let _ = writeln!(out, "{} {}", mark, join_padded(row, &widths));
    }
    out
}

fn join_padded(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, w)| format!("{:<width$}", cell, width = *w))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

pub fn metrics(metrics: &HeadlineMetrics) -> String {
    format!(
        "Urgent items: {}   Reorder items: {}   Total SKUs: {}\n",
        metrics.urgent_items, metrics.reorder_items, metrics.total_skus
    )
}

pub fn action_overview(counts: &[ActionCount]) -> String {
    let mut out = String::from("Action priority overview\n");
    for count in counts {
        let _ = writeln!(out, "  {:<12} {}", count.action_priority, count.count);
    }
    out
}

pub fn category_summary(summary: &CategorySummary) -> String {
    let mut out = String::from("Category risk\n");
    let _ = writeln!(
        out,
        "  {:<20} {:>9} {:>6} {:>7} {:>8}",
        "category", "avg_risk", "items", "urgent", "reorder"
    );
    for c in &summary.categories {
        let risk = c
            .avg_waste_risk
            .map(|r| format!("{:.2}", r))
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "  {:<20} {:>9} {:>6} {:>7} {:>8}",
            c.category, risk, c.total_items, c.urgent_count, c.reorder_count
        );
    }
    if let Some(top) = summary.highest_risk() {
        let _ = writeln!(out, "Highest risk category: {}", top.category);
    }
    out
}

pub fn expiry(classification: &ExpiryClassification, settings: &SessionSettings) -> String {
    let mut out = format!(
        "Expiry window {}-{} days: {} expired, {} about to expire",
        settings.window.min(),
        settings.window.max(),
        classification.expired.len(),
        classification.about_to_expire.len()
    );
    if classification.unclassified > 0 {
        let _ = write!(out, ", {} without a usable expiry", classification.unclassified);
    }
    let _ = writeln!(out, " (risk threshold {:.1})", settings.risk_threshold);
    out
}

pub fn transcript(transcript: &Transcript) -> String {
    if transcript.is_empty() {
        return "No messages yet.\n".to_string();
    }
    let mut out = String::new();
    for turn in transcript.turns() {
        let _ = writeln!(out, "[{}] {}", turn.role, turn.message);
    }
    out
}

/// Text for a view result: the view, or the reason it is unavailable.
pub fn or_unavailable<T>(result: &Result<T, SchemaError>, render: impl Fn(&T) -> String) -> String {
    match result {
        Ok(value) => render(value),
        Err(err) => format!("warning: {}\n", err),
    }
}
