//! Handlers shared by the one-shot subcommands and the chat loop.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use shelf_bridge::{AssistantGateway, GatewayError, GatewayResult};
use shelf_pipeline::export::{export_view, REORDER_EXPORT_FILE, URGENT_EXPORT_FILE};
use shelf_pipeline::session::NO_MATCH_NOTICE;
use shelf_pipeline::views::{self, TableView};
use shelf_pipeline::{load_path, ExpiryWindow, Interaction, LoadOutcome, SchemaError, Session};

use crate::cli::export_target;
use crate::render::{self, AnswerJson, ExpiryJson, OverviewJson, Section};

/// Stand-in used when no API key is configured; every question reports it.
pub struct MissingCredentialGateway {
    env_var: String,
}

impl MissingCredentialGateway {
    pub fn new(env_var: impl Into<String>) -> Self {
        Self {
            env_var: env_var.into(),
        }
    }
}

#[async_trait]
impl AssistantGateway for MissingCredentialGateway {
    async fn answer(&self, _prompt: &str) -> GatewayResult<String> {
        Err(GatewayError::MissingCredential {
            env_var: self.env_var.clone(),
        })
    }

    fn name(&self) -> &str {
        "unconfigured"
    }
}

/// Which exportable view a command refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportKind {
    Urgent,
    Reorder,
}

impl ExportKind {
    fn default_file(self) -> &'static str {
        match self {
            ExportKind::Urgent => URGENT_EXPORT_FILE,
            ExportKind::Reorder => REORDER_EXPORT_FILE,
        }
    }
}

pub struct App {
    pub session: Session,
    pub gateway: Box<dyn AssistantGateway>,
    pub export_dir: PathBuf,
    pub json: bool,
}

impl App {
    pub fn overview(&self) -> String {
        let table = self.session.table();
        let metrics = views::headline_metrics(table);
        let actions = views::action_overview(table);
        let categories = views::category_summary(table);

        if self.json {
            let body = OverviewJson {
                metrics: metrics.into(),
                action_overview: actions.into(),
                category_summary: categories.into(),
                expiry: ExpiryJson::new(self.session.classification(), self.session.settings()),
            };
            return json_or_error(&body);
        }

        let mut out = String::new();
        out.push_str(&render::or_unavailable(&metrics, render::metrics));
        out.push_str(&render::expiry(self.session.classification(), self.session.settings()));
        out.push('\n');
        out.push_str(&render::or_unavailable(&actions, |a| render::action_overview(a)));
        out.push('\n');
        out.push_str(&render::or_unavailable(&categories, render::category_summary));
        out
    }

    /// Render a view, writing it as CSV too when `export` is set.
    pub fn exportable_view(&self, kind: ExportKind, export: Option<&Path>) -> String {
        let table = self.session.table();
        let view = match kind {
            ExportKind::Urgent => views::urgent_items(table),
            ExportKind::Reorder => views::reorder_items(table),
        };

        let mut out = self.view_text(view.as_ref().map_err(|e| e.clone()));
        if let (Ok(view), Some(requested)) = (&view, export) {
            let target = export_target(requested, &self.export_dir, kind.default_file());
            match export_view(view, &target) {
                Ok(path) if !self.json => out.push_str(&format!("Exported to {}\n", path.display())),
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(error = %err, "export failed");
                    out.push_str(&format!("warning: export failed: {}\n", err));
                }
            }
        }
        out
    }

    pub fn search(&self, query: &str) -> String {
        let view = views::search_products(self.session.table(), query);
        self.view_text(view.as_ref().map_err(|e| e.clone()))
    }

    fn view_text(&self, view: Result<&TableView, SchemaError>) -> String {
        if self.json {
            let section: Section<&TableView> = view.into();
            return json_or_error(&section);
        }
        render::or_unavailable(&view, |v| render::table(v))
    }

    /// Ask one question and render what happened.
    pub async fn ask(&mut self, question: &str) -> String {
        let interaction = self.session.ask(question, self.gateway.as_ref()).await;
        if self.json {
            return json_or_error(&answer_json(question, &interaction));
        }

        match interaction {
            Interaction::Answered { selection, answer } => {
                let mut out = render::table(&views::context_view(&selection));
                out.push('\n');
                out.push_str(&answer);
                out.push('\n');
                out
            }
            Interaction::NoMatches(empty) => {
                format!("{} ({})\n", NO_MATCH_NOTICE, empty.label)
            }
            Interaction::Failed { error, .. } if error.is_retryable() => {
                format!("error: {}\nThe assistant may answer if you send the question again.\n", error)
            }
            Interaction::Failed { error, .. } => format!("error: {}\n", error),
        }
    }

    /// Load a new data file into the session.
    pub fn load(&mut self, path: &Path) -> String {
        match self.session.apply_upload(load_path(path)) {
            LoadOutcome::Replaced { rows } => {
                let mut out = format!("Loaded {} rows from {}\n", rows, path.display());
                out.push_str(&render::table(&views::preview(self.session.table())));
                out
            }
            LoadOutcome::TextPreview(text) => {
                format!("Text file preview (current table unchanged):\n{}\n", text)
            }
            LoadOutcome::Unsupported { extension } => format!(
                "warning: unsupported file type {:?}; current table unchanged\n",
                extension
            ),
            LoadOutcome::Rejected(err) => {
                format!("warning: {}; current table unchanged\n", err)
            }
        }
    }

    pub fn set_window(&mut self, min: i64, max: i64) -> String {
        match ExpiryWindow::new(min, max) {
            Ok(window) => {
                self.session.set_window(window);
                render::expiry(self.session.classification(), self.session.settings())
            }
            Err(err) => format!("warning: {}\n", err),
        }
    }

    pub fn set_risk_threshold(&mut self, value: f64) -> String {
        match self.session.set_risk_threshold(value) {
            Ok(()) => format!("Risk threshold set to {:.1}\n", value),
            Err(err) => format!("warning: {}\n", err),
        }
    }

    pub fn history(&self) -> String {
        if self.json {
            return json_or_error(self.session.transcript());
        }
        render::transcript(self.session.transcript())
    }
}

fn answer_json<'a>(question: &'a str, interaction: &'a Interaction) -> AnswerJson<'a> {
    match interaction {
        Interaction::Answered { selection, answer } => AnswerJson {
            question,
            scope: selection.scope.to_string(),
            context_rows: selection.records.len(),
            answer: Some(answer.as_str()),
            notice: None,
            error: None,
            retryable: false,
        },
        Interaction::NoMatches(empty) => AnswerJson {
            question,
            scope: empty.scope.to_string(),
            context_rows: 0,
            answer: None,
            notice: Some(NO_MATCH_NOTICE),
            error: None,
            retryable: false,
        },
        Interaction::Failed { selection, error } => AnswerJson {
            question,
            scope: selection.scope.to_string(),
            context_rows: selection.records.len(),
            answer: None,
            notice: None,
            error: Some(error.to_string()),
            retryable: error.is_retryable(),
        },
    }
}

fn json_or_error<T: serde::Serialize>(body: &T) -> String {
    match render::to_json(body) {
        Ok(json) => json + "\n",
        Err(err) => format!("error: failed to serialize output: {}\n", err),
    }
}
