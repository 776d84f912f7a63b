//! Interactive chat loop.

use std::io::Write as _;
use std::path::PathBuf;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::commands::{App, ExportKind};

const HELP: &str = "\
Ask a question about expired or near-expiry stock, or use a command:
  /load <path>          load a .csv, .xlsx, .xls or .txt file
  /window <min> <max>   set the near-expiry window in days
  /risk <value>         set the waste risk threshold (0-10)
  /overview             headline metrics and category risk
  /urgent [--export [path]]   urgent items
  /reorder [--export [path]]  items to reorder
  /search <text>        search products by name
  /history              show the conversation so far
  /help                 show this help
  /quit                 leave
";

/// A parsed line of chat input.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatInput {
    Question(String),
    Load(PathBuf),
    Window { min: i64, max: i64 },
    Risk(f64),
    Overview,
    Urgent { export: Option<PathBuf> },
    Reorder { export: Option<PathBuf> },
    Search(String),
    History,
    Help,
    Quit,
    Invalid(String),
}

impl ChatInput {
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let Some(command) = line.strip_prefix('/') else {
            return Some(ChatInput::Question(line.to_string()));
        };

        let (name, rest) = match command.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (command, ""),
        };

        let parsed = match name {
            "load" if !rest.is_empty() => ChatInput::Load(PathBuf::from(rest)),
            "load" => ChatInput::Invalid("usage: /load <path>".into()),
            "window" => parse_window(rest),
            "risk" => match rest.parse::<f64>() {
                Ok(value) => ChatInput::Risk(value),
                Err(_) => ChatInput::Invalid("usage: /risk <value>".into()),
            },
            "overview" => ChatInput::Overview,
            "urgent" => ChatInput::Urgent {
                export: parse_export(rest),
            },
            "reorder" => ChatInput::Reorder {
                export: parse_export(rest),
            },
            "search" => ChatInput::Search(rest.to_string()),
            "history" => ChatInput::History,
            "help" => ChatInput::Help,
            "quit" | "exit" => ChatInput::Quit,
            other => ChatInput::Invalid(format!("unknown command /{} (try /help)", other)),
        };
        Some(parsed)
    }
}

fn parse_window(rest: &str) -> ChatInput {
    let mut parts = rest.split_whitespace().map(str::parse::<i64>);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(Ok(min)), Some(Ok(max)), None) => ChatInput::Window { min, max },
        _ => ChatInput::Invalid("usage: /window <min> <max>".into()),
    }
}

fn parse_export(rest: &str) -> Option<PathBuf> {
    let path = rest.strip_prefix("--export")?;
    Some(PathBuf::from(path.trim()))
}

/// Run the chat loop until `/quit` or end of input.
pub async fn run(app: &mut App) -> anyhow::Result<()> {
    println!("Shelf Sentinel chat. Type /help for commands.");
    print!("{}", app.overview());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let Some(input) = ChatInput::parse(&line) else {
            continue;
        };

        let output = match input {
            ChatInput::Quit => break,
            ChatInput::Question(question) => app.ask(&question).await,
            ChatInput::Load(path) => app.load(&path),
            ChatInput::Window { min, max } => app.set_window(min, max),
            ChatInput::Risk(value) => app.set_risk_threshold(value),
            ChatInput::Overview => app.overview(),
            ChatInput::Urgent { export } => app.exportable_view(ExportKind::Urgent, export.as_deref()),
            ChatInput::Reorder { export } => app.exportable_view(ExportKind::Reorder, export.as_deref()),
            ChatInput::Search(query) => app.search(&query),
            ChatInput::History => app.history(),
            ChatInput::Help => HELP.to_string(),
            ChatInput::Invalid(message) => format!("{}\n", message),
        };
        print!("{}", output);
    }

    tracing::info!(turns = app.session.transcript().len(), "chat ended");
    Ok(())
}
