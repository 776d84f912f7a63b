use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GatewayResult;

/// An external completion service that turns a prompt into an answer.
#[async_trait]
pub trait AssistantGateway: Send + Sync {
    /// Send one composed prompt and return the assistant's markdown answer.
    async fn answer(&self, prompt: &str) -> GatewayResult<String>;

    /// Returns a stable name for logging.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
            .rsplit("::")
            .next()
            .unwrap_or("gateway")
    }
}

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a grocery inventory optimization assistant. \
You see small CSV snippets about products (stock, predicted sales, waste risk, reorder point, priority). \
Always answer briefly in markdown with clear, practical actions for the store manager.";

/// Connection settings for the assistant service.
///
/// Holds the *name* of the environment variable carrying the credential,
/// never the credential itself, so the config can be logged and serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub base_url: String,
    pub model: String,
    pub api_key_env: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Upper bound on one assistant turn, in seconds.
    pub timeout_secs: u64,
    pub system_prompt: String,
}

impl GatewayConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            temperature: 0.2,
            max_tokens: 800,
            timeout_secs: 30,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_timeout_is_clamped_to_one_second() {
        let config = GatewayConfig {
            timeout_secs: 0,
            ..GatewayConfig::default()
        };
        assert_eq!(config.timeout(), Duration::from_secs(1));
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: GatewayConfig = serde_json::from_str(r#"{"model":"gpt-4o-mini"}"#).unwrap();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.api_key_env, DEFAULT_API_KEY_ENV);
        assert_eq!(config.max_tokens, 800);
    }
}
