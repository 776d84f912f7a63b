//! Shelf Sentinel CLI: expiry and reorder dashboard with an inventory assistant.
//!
//! One-shot subcommands print a view and exit; `chat` (the default) runs an
//! interactive session against the same table.

mod chat;
mod cli;
mod commands;
mod config;
mod render;

use std::path::Path;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use shelf_bridge::{AssistantGateway, GatewayError, OpenAiGateway};
use shelf_pipeline::{load_inventory_file, load_path, InventoryTable, LoadOutcome, Session, SessionSettings};

use crate::cli::{Cli, Command};
use crate::commands::{App, ExportKind, MissingCredentialGateway};
use crate::config::ShelfConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for --json.
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")));
    tracing_subscriber::registry().with(stderr_layer).init();

    if let Some(file) = config::load_credentials() {
        tracing::debug!(file = %file.display(), "loaded credential file");
    }

    let mut config = config::load_config(cli.config.as_deref()).context("failed to load configuration")?;
    cli.apply_overrides(&mut config.thresholds);

    let settings = SessionSettings::from_thresholds(&config.thresholds, config.gateway.timeout())
        .context("invalid threshold settings")?;

    let mut session = Session::new(default_table(&config), settings);
    if let Some(path) = &cli.data {
        report_upload(path, session.apply_upload(load_path(path)));
    }

    let mut app = App {
        session,
        gateway: build_gateway(&config)?,
        export_dir: config.export_dir.clone(),
        json: cli.json,
    };

    let output = match cli.command() {
        Command::Overview => app.overview(),
        Command::Urgent { export } => app.exportable_view(ExportKind::Urgent, export.as_deref().map(Path::new)),
        Command::Reorder { export } => app.exportable_view(ExportKind::Reorder, export.as_deref().map(Path::new)),
        Command::Search { query } => app.search(&query.join(" ")),
        Command::Ask { question } => app.ask(&question.join(" ")).await,
        Command::Chat => return chat::run(&mut app).await,
    };
    print!("{}", output);
    Ok(())
}

/// The configured dataset, or an empty table if it cannot be read.
fn default_table(config: &ShelfConfig) -> InventoryTable {
    match load_inventory_file(&config.data_path) {
        Ok(table) => {
            tracing::info!(path = %config.data_path.display(), rows = table.len(), "loaded default data");
            table
        }
        Err(err) => {
            tracing::warn!(error = %err, "default data unavailable, starting with an empty table");
            InventoryTable::default()
        }
    }
}

fn report_upload(path: &Path, outcome: LoadOutcome) {
    match outcome {
        LoadOutcome::Replaced { rows } => {
            tracing::info!(path = %path.display(), rows, "loaded data file");
        }
        LoadOutcome::TextPreview(_) => {
            tracing::warn!(path = %path.display(), "text file is not a table, keeping the default data");
        }
        LoadOutcome::Unsupported { extension } => {
            tracing::warn!(path = %path.display(), extension = %extension, "unsupported file type, keeping the default data");
        }
        LoadOutcome::Rejected(err) => {
            tracing::warn!(error = %err, "could not load data file, keeping the default data");
        }
    }
}

fn build_gateway(config: &ShelfConfig) -> anyhow::Result<Box<dyn AssistantGateway>> {
    match OpenAiGateway::new(config.gateway.clone()) {
        Ok(gateway) => {
            tracing::info!(model = %config.gateway.model, "assistant ready");
            Ok(Box::new(gateway))
        }
        Err(GatewayError::MissingCredential { env_var }) => {
            tracing::warn!(env_var = %env_var, "no API key configured, questions will fail until it is set");
            Ok(Box::new(MissingCredentialGateway::new(env_var)))
        }
        Err(err) => Err(err).context("failed to build assistant client"),
    }
}
