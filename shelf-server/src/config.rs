//! Layered configuration.
//!
//! Priority (highest to lowest):
//! 1. Command-line flags (applied by the caller after loading)
//! 2. Environment variables prefixed with `SHELF_` (`__` separates nesting,
//!    e.g. `SHELF_THRESHOLDS__NEAR_EXPIRY_MAX=14`)
//! 3. The config file (`--config PATH`, else `shelf.toml` if present)
//! 4. Built-in defaults

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use shelf_bridge::GatewayConfig;
use shelf_pipeline::inventory_loader::DEFAULT_DATA_FILE;
use shelf_pipeline::Thresholds;

pub const DEFAULT_CONFIG_FILE: &str = "shelf.toml";

/// Dotenv files searched for the API credential, in order.
pub const CREDENTIAL_FILES: [&str; 2] = ["OPENAI_API_KEY.env", ".env"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShelfConfig {
    /// Default dataset, loaded at startup.
    pub data_path: PathBuf,
    /// Directory that exports are written to when no explicit path is given.
    pub export_dir: PathBuf,
    pub thresholds: Thresholds,
    pub gateway: GatewayConfig,
}

impl Default for ShelfConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_FILE),
            export_dir: PathBuf::from("."),
            thresholds: Thresholds::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

/// Load configuration from layered sources.
pub fn load_config(config_path: Option<&Path>) -> Result<ShelfConfig, Box<figment::Error>> {
    let mut figment = Figment::from(Serialized::defaults(ShelfConfig::default()));

    match config_path {
        // An explicit file must exist.
        Some(path) => figment = figment.merge(Toml::file_exact(path)),
        None => {
            let local = Path::new(DEFAULT_CONFIG_FILE);
            if local.exists() {
                figment = figment.merge(Toml::file(local));
            }
        }
    }

    figment = figment.merge(Env::prefixed("SHELF_").split("__"));

    figment.extract().map_err(Box::new)
}

/// Load the first credential file found. Existing environment variables win.
pub fn load_credentials() -> Option<PathBuf> {
    CREDENTIAL_FILES
        .iter()
        .find_map(|name| dotenvy::from_filename(name).ok())
}
