//! Command-line interface.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use shelf_pipeline::thresholds::Thresholds;

/// Shelf Sentinel: expiry and reorder monitoring with an inventory assistant.
#[derive(Parser, Debug)]
#[command(name = "shelf-server", version, about, long_about = None)]
pub struct Cli {
    /// Inventory file to load instead of the configured default (.csv, .xlsx, .xls, .txt)
    #[arg(short, long, global = true)]
    pub data: Option<PathBuf>,

    /// Configuration file path (defaults to ./shelf.toml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Lower bound of the near-expiry window, in days
    #[arg(long, global = true, allow_hyphen_values = true)]
    pub near_min: Option<i64>,

    /// Upper bound of the near-expiry window, in days
    #[arg(long, global = true, allow_hyphen_values = true)]
    pub near_max: Option<i64>,

    /// Waste risk threshold (0.0 to 10.0)
    #[arg(long, global = true)]
    pub risk_threshold: Option<f64>,

    /// Print machine-readable JSON instead of text tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Headline metrics, action overview and category risk
    Overview,
    /// Urgent items, highest waste risk first
    Urgent {
        /// Also write the view as CSV (default file name if no path is given)
        #[arg(long, num_args = 0..=1, default_missing_value = "")]
        export: Option<String>,
    },
    /// Items flagged for reorder
    Reorder {
        /// Also write the view as CSV (default file name if no path is given)
        #[arg(long, num_args = 0..=1, default_missing_value = "")]
        export: Option<String>,
    },
    /// Search products by name
    Search {
        /// Case-insensitive substring of the product name
        query: Vec<String>,
    },
    /// Ask the assistant one question and exit
    Ask {
        question: Vec<String>,
    },
    /// Interactive chat (default)
    Chat,
}

impl Cli {
    /// Overlay the threshold flags onto configured values.
    pub fn apply_overrides(&self, thresholds: &mut Thresholds) {
        if let Some(min) = self.near_min {
            thresholds.near_expiry_min = min;
        }
        if let Some(max) = self.near_max {
            thresholds.near_expiry_max = max;
        }
        if let Some(risk) = self.risk_threshold {
            thresholds.risk_threshold = risk;
        }
    }

    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Chat)
    }
}

/// Resolve an `--export` value: an empty path means the default file in `dir`.
pub fn export_target(requested: &Path, dir: &Path, default_name: &str) -> PathBuf {
    if requested.as_os_str().is_empty() {
        dir.join(default_name)
    } else {
        requested.to_path_buf()
    }
}
