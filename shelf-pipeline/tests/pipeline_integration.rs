use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use shelf_bridge::{AssistantGateway, GatewayError, GatewayResult};
use shelf_pipeline::classifier::classify;
use shelf_pipeline::components::action_priority_filter::ActionPriorityFilter;
use shelf_pipeline::components::expired_filter::ExpiredFilter;
use shelf_pipeline::components::near_expiry_filter::NearExpiryFilter;
use shelf_pipeline::components::top_k_selector::TopKSelector;
use shelf_pipeline::error::TurnError;
use shelf_pipeline::filter::Filter;
use shelf_pipeline::inventory_loader::{load_bytes, load_inventory};
use shelf_pipeline::router::{route, ContextScope};
use shelf_pipeline::schema::Column;
use shelf_pipeline::selector::Selector;
use shelf_pipeline::serializer::serialize;
use shelf_pipeline::session::{Interaction, LoadOutcome, Role, Session, SessionSettings, NO_MATCH_NOTICE};
use shelf_pipeline::thresholds::ExpiryWindow;
use shelf_pipeline::types::InventoryTable;
use shelf_pipeline::views;

// ---------------------------------------------------------------------------
// Test data fixtures
// ---------------------------------------------------------------------------

const HEADER: &str = "Product_Name,Stock_Quantity,Predicted_Sales,Days_to_Expire,Waste_Risk_Score,Needs_Reorder,Reorder_Point,EOQ,Action_Priority,Category";

/// A small grocery dataset: two expired rows, three near expiry, one fresh,
/// one with an unreadable expiry.
fn sample_csv() -> String {
    format!(
        "{HEADER}
Whole Milk,40,25,3,7.2,0,20,60,URGENT,Dairy
Sourdough Bread,12,18,-1,8.1,1,15,40,URGENT,Bakery
Cheddar,80,10,45,1.3,0,10,30,OK,Dairy
\"Apples, Gala\",5,30,10,2.4,1,25,80,REORDER,Produce
Greek Yogurt,22,14,1,6.5,1,18,50,URGENT,Dairy
Bagels,30,12,-4,5.0,0,12,36,OK,Bakery
Spinach,15,20,unknown,4.2,1,30,70,REORDER,Produce
"
    )
}

fn sample_table() -> InventoryTable {
    load_inventory(sample_csv().as_bytes()).unwrap()
}

fn names(table: &InventoryTable) -> Vec<String> {
    table
        .iter()
        .map(|r| table.text(r, Column::ProductName).unwrap_or_default().to_string())
        .collect()
}

/// Table with rows A(-2), B(5), C(20).
fn abc_table() -> InventoryTable {
    let csv = "Product_Name,Days_to_Expire\nA,-2\nB,5\nC,20\n";
    load_inventory(csv.as_bytes()).unwrap()
}

fn expired_rows(n: usize) -> InventoryTable {
    let mut csv = String::from("Product_Name,Days_to_Expire\n");
    for i in 0..n {
        csv.push_str(&format!("item-{i},-{}\n", i + 1));
    }
    load_inventory(csv.as_bytes()).unwrap()
}

/// Gateway double that records prompts and returns a canned reply.
struct RecordingGateway {
    prompts: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingGateway {
    fn answering() -> Self {
        Self {
            prompts: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    fn failing() -> Self {
        Self {
            prompts: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    fn last_prompt(&self) -> String {
        self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl AssistantGateway for RecordingGateway {
    async fn answer(&self, prompt: &str) -> GatewayResult<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.fail {
            Err(GatewayError::RateLimited { retry_after_secs: 5 })
        } else {
            Ok("- Discount **Whole Milk** today".to_string())
        }
    }
}

/// Gateway that never answers in time.
struct StalledGateway;

#[async_trait]
impl AssistantGateway for StalledGateway {
    async fn answer(&self, _prompt: &str) -> GatewayResult<String> {
        tokio::time::sleep(Duration::from_secs(10)).await;
        Ok("too late".to_string())
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[test]
fn end_to_end_abc_scenario() {
    let table = abc_table();
    let classification = classify(&table, ExpiryWindow::new(1, 10).unwrap());

    assert_eq!(names(&classification.expired), vec!["A"]);
    assert_eq!(names(&classification.about_to_expire), vec!["B"]);

    let expired = route("expired", &classification, 50).unwrap();
    assert_eq!(names(&expired.records), vec!["A"]);

    let near = route("near expiry", &classification, 50).unwrap();
    assert_eq!(names(&near.records), vec!["B"]);

    let default = route("status check", &classification, 50).unwrap();
    assert_eq!(default.scope, ContextScope::ExpiredAndNearExpiry);
    assert_eq!(names(&default.records), vec!["A", "B"]);
}

#[test]
fn non_numeric_expiry_is_excluded_not_zero() {
    let table = sample_table();
    let classification = classify(&table, ExpiryWindow::new(0, 10).unwrap());
    assert_eq!(classification.unclassified, 1);
    assert!(!names(&classification.expired).contains(&"Spinach".to_string()));
    assert!(!names(&classification.about_to_expire).contains(&"Spinach".to_string()));
}

#[test]
fn subsets_keep_table_order() {
    let classification = classify(&sample_table(), ExpiryWindow::default());
    assert_eq!(names(&classification.expired), vec!["Sourdough Bread", "Bagels"]);
    assert_eq!(
        names(&classification.about_to_expire),
        vec!["Whole Milk", "Apples, Gala", "Greek Yogurt"]
    );
}

#[test]
fn expired_and_near_expiry_are_disjoint_for_non_negative_windows() {
    let table = sample_table();
    for (min, max) in [(0, 0), (0, 5), (1, 10), (3, 365)] {
        let c = classify(&table, ExpiryWindow::new(min, max).unwrap());
        for record in c.about_to_expire.iter() {
            assert!(!c.expired.records().contains(record), "overlap for window {min}..={max}");
        }
    }
}

#[test]
fn negative_window_may_overlap_expired() {
    let c = classify(&sample_table(), ExpiryWindow::new(-5, -1).unwrap());
    assert_eq!(names(&c.about_to_expire), vec!["Sourdough Bread", "Bagels"]);
}

#[test]
fn classification_is_idempotent() {
    let table = sample_table();
    let window = ExpiryWindow::default();
    let first = classify(&table, window);
    let second = classify(&table, window);
    assert_eq!(serialize(&first.expired).unwrap(), serialize(&second.expired).unwrap());
    assert_eq!(
        serialize(&first.about_to_expire).unwrap(),
        serialize(&second.about_to_expire).unwrap()
    );
    assert_eq!(table, sample_table());
}

#[test]
fn expiry_filters_partition_every_row() {
    let table = sample_table();
    let expired = ExpiredFilter.filter(&table).unwrap();
    assert_eq!(expired.kept.len() + expired.removed.len(), table.len());

    let near = NearExpiryFilter::default().filter(&table).unwrap();
    assert_eq!(near.kept.len(), 3);
    assert_eq!(near.removed.len(), 4);
    assert_eq!(NearExpiryFilter::default().name(), "NearExpiryFilter");
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

#[test]
fn near_expiry_question_routes_the_same_every_time() {
    let classification = classify(&sample_table(), ExpiryWindow::default());
    for _ in 0..3 {
        let selection = route("is anything about to expire?", &classification, 50).unwrap();
        assert_eq!(selection.scope, ContextScope::NearExpiry);
        assert_eq!(selection.label, "products with 1-10 days to expiry");
    }
}

#[test]
fn truncation_keeps_first_rows_in_order() {
    let classification = classify(&expired_rows(80), ExpiryWindow::default());
    let selection = route("expired items", &classification, 50).unwrap();
    assert_eq!(selection.scope, ContextScope::Expired);
    assert_eq!(selection.records.len(), 50);
    let expected: Vec<String> = (0..50).map(|i| format!("item-{i}")).collect();
    assert_eq!(names(&selection.records), expected);
}

#[test]
fn combined_context_truncates_after_concatenation() {
    let classification = classify(&sample_table(), ExpiryWindow::default());
    let selection = route("what should I do today?", &classification, 3).unwrap();
    assert_eq!(
        names(&selection.records),
        vec!["Sourdough Bread", "Bagels", "Whole Milk"]
    );
}

#[test]
fn empty_table_yields_empty_context() {
    let empty = load_inventory(format!("{HEADER}\n").as_bytes()).unwrap();
    let classification = classify(&empty, ExpiryWindow::default());
    for query in ["expired", "near expiry", "hello"] {
        let err = route(query, &classification, 50).unwrap_err();
        assert_eq!(err.scope, ContextScope::detect(query));
    }
}

// ---------------------------------------------------------------------------
// Serialization
// ---------------------------------------------------------------------------

#[test]
fn serialized_context_round_trips_through_a_csv_reader() {
    let classification = classify(&sample_table(), ExpiryWindow::default());
    let selection = route("near expiry", &classification, 50).unwrap();
    let text = serialize(&selection.records).unwrap();

    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let header = reader.headers().unwrap().clone();
    assert_eq!(header.len(), selection.records.schema().len());

    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), selection.records.len());
    for (parsed, original) in rows.iter().zip(selection.records.iter()) {
        let parsed: Vec<&str> = parsed.iter().collect();
        let original: Vec<&str> = original.cells().iter().map(String::as_str).collect();
        assert_eq!(parsed, original);
    }
    assert!(text.contains("\"Apples, Gala\""));
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

#[test]
fn headline_metrics_count_priorities() {
    let metrics = views::headline_metrics(&sample_table()).unwrap();
    assert_eq!(metrics.urgent_items, 3);
    assert_eq!(metrics.reorder_items, 2);
    assert_eq!(metrics.total_skus, 7);
}

#[test]
fn action_overview_sorts_by_count() {
    let overview = views::action_overview(&sample_table()).unwrap();
    let pairs: Vec<(&str, usize)> = overview
        .iter()
        .map(|a| (a.action_priority.as_str(), a.count))
        .collect();
    assert_eq!(pairs, vec![("URGENT", 3), ("OK", 2), ("REORDER", 2)]);
}

#[test]
fn urgent_view_sorts_by_risk_and_highlights_high_risk() {
    let view = views::urgent_items(&sample_table()).unwrap();
    assert_eq!(
        view.columns,
        vec!["product_name", "waste_risk_score", "stock_quantity", "predicted_sales", "action_priority"]
    );
    let products: Vec<&str> = view.rows.iter().map(|r| r[0].as_str()).collect();
    assert_eq!(products, vec!["Sourdough Bread", "Whole Milk", "Greek Yogurt"]);
    assert_eq!(view.highlighted, vec![0, 1, 2]);
}

#[test]
fn reorder_view_uses_flag_and_reorder_point() {
    let view = views::reorder_items(&sample_table()).unwrap();
    let products: Vec<&str> = view.rows.iter().map(|r| r[0].as_str()).collect();
    assert_eq!(products, vec!["Spinach", "Apples, Gala", "Greek Yogurt", "Sourdough Bread"]);
    assert_eq!(view.columns[3], "economic_order_quantity");
}

#[test]
fn reorder_view_degrades_without_flag_column() {
    let table = load_inventory(
        "Product_Name,Stock_Quantity,Reorder_Point,EOQ,Action_Priority\nMilk,1,2,3,OK\n".as_bytes(),
    )
    .unwrap();
    let err = views::reorder_items(&table).unwrap_err();
    assert_eq!(err.missing, vec![Column::NeedsReorder]);
    // Independent views keep working.
    assert_eq!(views::headline_metrics(&table).unwrap().total_skus, 1);
}

#[test]
fn category_summary_aggregates_once_per_category() {
    let summary = views::category_summary(&sample_table()).unwrap();
    let order: Vec<&str> = summary.categories.iter().map(|c| c.category.as_str()).collect();
    assert_eq!(order, vec!["Bakery", "Dairy", "Produce"]);

    let bakery = &summary.categories[0];
    assert_eq!(bakery.avg_waste_risk, Some(6.55));
    assert_eq!(bakery.total_items, 2);
    assert_eq!(bakery.urgent_count, 1);
    assert_eq!(bakery.reorder_count, 1);

    let dairy = &summary.categories[1];
    assert_eq!(dairy.avg_waste_risk, Some(5.0));
    assert_eq!(dairy.urgent_count, 2);

    assert_eq!(summary.highest_risk().map(|c| c.category.as_str()), Some("Bakery"));
}

#[test]
fn category_total_counts_only_scored_rows() {
    let csv = "Product_Name,Category,Waste_Risk_Score,Action_Priority,Needs_Reorder\n\
               Milk,Dairy,8,URGENT,0\n\
               Cream,Dairy,,URGENT,1\n\
               Butter,Dairy,4,OK,1\n\
               Salt,Pantry,n/a,OK,0\n";
    let summary = views::category_summary(&load_inventory(csv.as_bytes()).unwrap()).unwrap();

    let dairy = &summary.categories[0];
    assert_eq!(dairy.category, "Dairy");
    assert_eq!(dairy.avg_waste_risk, Some(6.0));
    assert_eq!(dairy.total_items, 2);
    assert_eq!(dairy.urgent_count, 2);
    assert_eq!(dairy.reorder_count, 2);

    let pantry = &summary.categories[1];
    assert_eq!(pantry.avg_waste_risk, None);
    assert_eq!(pantry.total_items, 0);
}

#[test]
fn category_summary_needs_all_columns() {
    let table = load_inventory("Product_Name,Category\nMilk,Dairy\n".as_bytes()).unwrap();
    let err = views::category_summary(&table).unwrap_err();
    assert_eq!(
        err.missing,
        vec![Column::WasteRiskScore, Column::ActionPriority, Column::NeedsReorder]
    );
}

#[test]
fn search_is_case_insensitive_and_ranked_by_risk() {
    let view = views::search_products(&sample_table(), "  YOG ").unwrap();
    assert_eq!(view.len(), 1);
    assert_eq!(view.rows[0][0], "Greek Yogurt");

    let bread = views::search_products(&sample_table(), "b").unwrap();
    let products: Vec<&str> = bread.rows.iter().map(|r| r[0].as_str()).collect();
    assert_eq!(products, vec!["Sourdough Bread", "Bagels"]);

    assert!(views::search_products(&sample_table(), "kiwi").unwrap().is_empty());
    assert!(views::search_products(&sample_table(), "   ").unwrap().is_empty());
}

#[test]
fn top_k_selector_pushes_missing_scores_last() {
    let table = load_inventory(
        "Product_Name,Waste_Risk_Score\nA,\nB,2\nC,9\nD,n/a\n".as_bytes(),
    )
    .unwrap();
    let selected = TopKSelector::new(Column::WasteRiskScore, 3).select(&table);
    assert_eq!(names(&selected), vec!["C", "B", "A"]);
}

#[test]
fn action_priority_filter_requires_column() {
    let table = load_inventory("Product_Name\nMilk\n".as_bytes()).unwrap();
    assert!(ActionPriorityFilter::urgent().filter(&table).is_err());
}

#[test]
fn context_view_shows_fixed_columns() {
    let classification = classify(&sample_table(), ExpiryWindow::default());
    let selection = route("expired", &classification, 50).unwrap();
    let view = views::context_view(&selection);
    assert_eq!(view.title, "Matching products (expired products)");
    assert_eq!(view.columns.len(), 6);
    assert_eq!(view.rows[0][3], "-1");
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[tokio::test]
async fn answered_turn_is_appended_to_transcript() {
    let mut session = Session::new(sample_table(), SessionSettings::default());
    let gateway = RecordingGateway::answering();

    match session.ask("Which items are about to expire?", &gateway).await {
        Interaction::Answered { selection, answer } => {
            assert_eq!(selection.scope, ContextScope::NearExpiry);
            assert!(answer.contains("Whole Milk"));
        }
        other => panic!("unexpected interaction: {other:?}"),
    }

    let turns = session.transcript().turns();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].role, Role::User);
    assert_eq!(turns[1].role, Role::Assistant);

    let prompt = gateway.last_prompt();
    assert!(prompt.contains("between 1 and 10"));
    assert!(prompt.contains("\"Apples, Gala\""));
    assert!(prompt.contains("User question: Which items are about to expire?"));
}

#[tokio::test]
async fn empty_context_skips_the_gateway() {
    let empty = load_inventory(format!("{HEADER}\n").as_bytes()).unwrap();
    let mut session = Session::new(empty, SessionSettings::default());
    let gateway = RecordingGateway::answering();

    let outcome = session.ask("anything expired?", &gateway).await;
    assert!(matches!(outcome, Interaction::NoMatches(_)));
    assert_eq!(gateway.calls(), 0);
    assert_eq!(
        session.transcript().last().map(|t| t.message.as_str()),
        Some(NO_MATCH_NOTICE)
    );
}

#[tokio::test]
async fn gateway_failure_keeps_prior_transcript() {
    let mut session = Session::new(sample_table(), SessionSettings::default());
    let good = RecordingGateway::answering();
    session.ask("status check", &good).await;
    assert_eq!(session.transcript().len(), 2);

    let bad = RecordingGateway::failing();
    match session.ask("expired?", &bad).await {
        Interaction::Failed { error, .. } => {
            assert!(matches!(error, TurnError::Gateway(GatewayError::RateLimited { .. })))
        }
        other => panic!("unexpected interaction: {other:?}"),
    }
    let turns = session.transcript().turns();
    assert_eq!(turns.len(), 3);
    assert_eq!(turns[2].role, Role::User);

    // The next message may retry.
    assert!(matches!(
        session.ask("expired?", &good).await,
        Interaction::Answered { .. }
    ));
    assert_eq!(session.transcript().len(), 5);
}

#[tokio::test]
async fn slow_gateway_times_out() {
    let settings = SessionSettings {
        gateway_timeout: Duration::from_millis(50),
        ..SessionSettings::default()
    };
    let mut session = Session::new(sample_table(), settings);
    match session.ask("status check", &StalledGateway).await {
        Interaction::Failed { error, .. } => {
            assert!(matches!(error, TurnError::Gateway(GatewayError::Timeout(_))))
        }
        other => panic!("unexpected interaction: {other:?}"),
    }
}

#[tokio::test]
async fn window_change_reclassifies() {
    let mut session = Session::new(abc_table(), SessionSettings::default());
    assert_eq!(names(&session.classification().about_to_expire), vec!["B"]);

    session.set_window(ExpiryWindow::new(1, 30).unwrap());
    assert_eq!(names(&session.classification().about_to_expire), vec!["B", "C"]);

    let gateway = RecordingGateway::answering();
    session.ask("near expiry", &gateway).await;
    assert!(gateway.last_prompt().contains("between 1 and 30"));
}

#[test]
fn bad_upload_falls_back_to_previous_table() {
    let mut session = Session::new(sample_table(), SessionSettings::default());

    let outcome = session.apply_upload(load_bytes("broken.xlsx", b"garbage".to_vec()));
    assert!(matches!(outcome, LoadOutcome::Rejected(_)));
    assert_eq!(session.table().len(), 7);

    let outcome = session.apply_upload(load_bytes("notes.txt", b"restock friday".to_vec()));
    assert!(matches!(outcome, LoadOutcome::TextPreview(ref t) if t == "restock friday"));
    assert_eq!(session.table().len(), 7);

    let outcome = session.apply_upload(load_bytes("scan.pdf", Vec::new()));
    assert!(matches!(outcome, LoadOutcome::Unsupported { ref extension } if extension == "pdf"));
}

#[test]
fn new_table_fully_replaces_old_classification() {
    let mut session = Session::new(sample_table(), SessionSettings::default());
    let outcome = session.apply_upload(load_bytes("abc.csv", b"Product_Name,Days_to_Expire\nA,-2\nB,5\nC,20\n".to_vec()));
    assert!(matches!(outcome, LoadOutcome::Replaced { rows: 3 }));

    let classification = session.classification();
    assert_eq!(names(&classification.expired), vec!["A"]);
    assert_eq!(names(&classification.about_to_expire), vec!["B"]);
    assert!(classification.expired.same_schema(session.table()));
}

#[test]
fn risk_threshold_is_range_checked() {
    let mut session = Session::new(sample_table(), SessionSettings::default());
    assert!(session.set_risk_threshold(2.5).is_ok());
    assert_eq!(session.settings().risk_threshold, 2.5);
    assert!(session.set_risk_threshold(-1.0).is_err());
    assert_eq!(session.settings().risk_threshold, 2.5);
}

#[test]
fn bundled_dataset_loads_and_classifies() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../fixtures/inventory_optimized.csv");
    let table = shelf_pipeline::load_inventory_file(&path).unwrap();
    assert_eq!(table.len(), 20);

    let classification = classify(&table, ExpiryWindow::default());
    assert_eq!(
        names(&classification.expired),
        vec!["Sourdough Loaf", "Bagels 6pk", "Strawberries"]
    );
    assert_eq!(classification.about_to_expire.len(), 9);
    assert_eq!(classification.unclassified, 1);

    let metrics = views::headline_metrics(&table).unwrap();
    assert_eq!((metrics.urgent_items, metrics.reorder_items, metrics.total_skus), (9, 5, 20));

    let summary = views::category_summary(&table).unwrap();
    let top = summary.highest_risk().unwrap();
    assert_eq!(top.category, "Bakery");
    assert_eq!(top.avg_waste_risk, Some(8.13));
}
