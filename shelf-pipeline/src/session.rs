//! One interactive dashboard session.
//!
//! The session owns the current table, its expiry classification and the
//! chat transcript. Every handler takes `&mut Session`, so a table swap and
//! the matching reclassification happen together, before the next message
//! is routed.

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use shelf_bridge::{compose_prompt, AssistantGateway, GatewayError, PromptContext};

use crate::classifier::{classify, ExpiryClassification};
use crate::error::{ConfigError, LoadError, TurnError};
use crate::inventory_loader::{text_preview, Upload};
use crate::router::{route, ContextSelection, EmptyContext};
use crate::serializer::serialize;
use crate::thresholds::{
    validate_risk_threshold, ExpiryWindow, Thresholds, DEFAULT_CONTEXT_LIMIT,
    DEFAULT_RISK_THRESHOLD,
};
use crate::types::InventoryTable;

/// Assistant notice appended when no product matches the routed filter.
pub const NO_MATCH_NOTICE: &str =
    "No products match this expiry filter. Try a wider range or a different query.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChatTurn {
    pub role: Role,
    pub message: String,
}

/// Append-only chat history.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Transcript {
    turns: Vec<ChatTurn>,
}

impl Transcript {
    fn push(&mut self, role: Role, message: impl Into<String>) {
        self.turns.push(ChatTurn {
            role,
            message: message.into(),
        });
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&ChatTurn> {
        self.turns.last()
    }
}

/// Session-level knobs.
#[derive(Clone, Debug)]
pub struct SessionSettings {
    pub window: ExpiryWindow,
    /// Reserved: validated and shown, not read by any filter.
    pub risk_threshold: f64,
    pub context_limit: usize,
    pub gateway_timeout: Duration,
}

impl SessionSettings {
    pub fn from_thresholds(thresholds: &Thresholds, gateway_timeout: Duration) -> Result<Self, ConfigError> {
        thresholds.validate()?;
        Ok(Self {
            window: thresholds.window()?,
            risk_threshold: thresholds.risk_threshold,
            context_limit: thresholds.context_limit,
            gateway_timeout,
        })
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            window: ExpiryWindow::default(),
            risk_threshold: DEFAULT_RISK_THRESHOLD,
            context_limit: DEFAULT_CONTEXT_LIMIT,
            gateway_timeout: Duration::from_secs(30),
        }
    }
}

/// What happened to one chat message.
#[derive(Debug)]
pub enum Interaction {
    /// The assistant answered; the answer is in the transcript.
    Answered {
        selection: ContextSelection,
        answer: String,
    },
    /// Nothing matched; the notice is in the transcript, the gateway was
    /// not called.
    NoMatches(EmptyContext),
    /// The turn failed; only the user's message was added to the transcript.
    Failed {
        selection: ContextSelection,
        error: TurnError,
    },
}

/// Result of trying to swap in an uploaded file.
#[derive(Debug)]
pub enum LoadOutcome {
    Replaced { rows: usize },
    TextPreview(String),
    Unsupported { extension: String },
    /// The upload was unreadable; the previous table is still active.
    Rejected(LoadError),
}

pub struct Session {
    table: InventoryTable,
    settings: SessionSettings,
    classification: ExpiryClassification,
    transcript: Transcript,
}

impl Session {
    pub fn new(table: InventoryTable, settings: SessionSettings) -> Self {
        let classification = classify(&table, settings.window);
        Self {
            table,
            settings,
            classification,
            transcript: Transcript::default(),
        }
    }

    pub fn table(&self) -> &InventoryTable {
        &self.table
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn classification(&self) -> &ExpiryClassification {
        &self.classification
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Replace the table wholesale and reclassify it.
    pub fn replace_table(&mut self, table: InventoryTable) {
        self.classification = classify(&table, self.settings.window);
        self.table = table;
    }

    /// Apply a load result. Anything other than a table leaves the current
    /// table in place.
    pub fn apply_upload(&mut self, upload: Result<Upload, LoadError>) -> LoadOutcome {
        match upload {
            Ok(Upload::Table(table)) => {
                let rows = table.len();
                self.replace_table(table);
                log::info!("replaced table rows={}", rows);
                LoadOutcome::Replaced { rows }
            }
            Ok(Upload::Text(text)) => LoadOutcome::TextPreview(text_preview(&text).to_string()),
            Ok(Upload::Unsupported { extension }) => {
                log::warn!("upload with unsupported extension {:?} ignored", extension);
                LoadOutcome::Unsupported { extension }
            }
            Err(err) => {
                log::warn!("upload rejected, keeping previous table: {}", err);
                LoadOutcome::Rejected(err)
            }
        }
    }

    pub fn set_window(&mut self, window: ExpiryWindow) {
        self.settings.window = window;
        self.classification = classify(&self.table, window);
    }

    pub fn set_risk_threshold(&mut self, value: f64) -> Result<(), ConfigError> {
        self.settings.risk_threshold = validate_risk_threshold(value)?;
        Ok(())
    }

    /// Handle one chat message: route, compose, ask, record.
    pub async fn ask(&mut self, message: &str, gateway: &dyn AssistantGateway) -> Interaction {
        self.transcript.push(Role::User, message);

        let selection = match route(message, &self.classification, self.settings.context_limit) {
            Ok(selection) => selection,
            Err(empty) => {
                log::info!("no rows for scope={}, skipping gateway", empty.scope);
                self.transcript.push(Role::Assistant, NO_MATCH_NOTICE);
                return Interaction::NoMatches(empty);
            }
        };

        match self.request_answer(message, &selection, gateway).await {
            Ok(answer) => {
                self.transcript.push(Role::Assistant, answer.clone());
                Interaction::Answered { selection, answer }
            }
            Err(error) => {
                log::warn!("assistant turn failed gateway={} error={}", gateway.name(), error);
                Interaction::Failed { selection, error }
            }
        }
    }

    async fn request_answer(
        &self,
        message: &str,
        selection: &ContextSelection,
        gateway: &dyn AssistantGateway,
    ) -> Result<String, TurnError> {
        let context_csv = serialize(&selection.records)?;
        let prompt = compose_prompt(&PromptContext {
            context_csv: &context_csv,
            question: message,
            near_expiry_min: self.settings.window.min(),
            near_expiry_max: self.settings.window.max(),
        });

        log::info!(
            "asking assistant scope={} rows={} prompt_chars={}",
            selection.scope,
            selection.records.len(),
            prompt.len()
        );

        let timeout = self.settings.gateway_timeout;
        match tokio::time::timeout(timeout, gateway.answer(&prompt)).await {
            Ok(answer) => Ok(answer?),
            Err(_) => Err(GatewayError::Timeout(timeout).into()),
        }
    }
}
