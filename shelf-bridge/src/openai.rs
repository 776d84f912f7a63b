//! OpenAI-compatible chat completions gateway.
//!
//! Works against any endpoint that speaks the `/chat/completions` format
//! (OpenAI, Azure OpenAI, Ollama, vLLM).

use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::error::{GatewayError, GatewayResult};
use crate::gateway::{AssistantGateway, GatewayConfig};

pub struct OpenAiGateway {
    client: Client,
    config: GatewayConfig,
    api_key: String,
}

impl OpenAiGateway {
    /// Build a gateway, reading the credential from `config.api_key_env`.
    pub fn new(config: GatewayConfig) -> GatewayResult<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| GatewayError::MissingCredential {
                env_var: config.api_key_env.clone(),
            })?;
        Self::with_api_key(config, api_key)
    }

    pub fn with_api_key(config: GatewayConfig, api_key: String) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| GatewayError::Transport(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    fn request_body(&self, prompt: &str) -> Value {
        json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": self.config.system_prompt },
                { "role": "user", "content": prompt },
            ],
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
            "stream": false,
        })
    }

    /// Map a non-success HTTP status to a gateway error.
    fn map_http_error(status: u16, body: &str) -> GatewayError {
        match status {
            401 | 403 => GatewayError::AuthFailed,
            429 => {
                // "Rate limit reached ... Please try again in 20s."
                let retry_after_secs = serde_json::from_str::<Value>(body)
                    .ok()
                    .and_then(|v| v.get("error")?.get("message")?.as_str().map(str::to_string))
                    .and_then(|msg| {
                        msg.split("in ")
                            .last()
                            .map(|s| s.trim().trim_end_matches('.').trim_end_matches('s').to_string())
                            .and_then(|s| s.parse::<f64>().ok())
                    })
                    .map(|secs| secs.ceil() as u64)
                    .unwrap_or(5);
                GatewayError::RateLimited { retry_after_secs }
            }
            s if s >= 500 => GatewayError::Server {
                status: s,
                body: body.to_string(),
            },
            s => GatewayError::Http {
                status: s,
                body: body.to_string(),
            },
        }
    }

    /// Extract the first choice's message content.
    fn parse_response(json: &Value) -> GatewayResult<String> {
        let content = json
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .ok_or_else(|| GatewayError::MalformedResponse("missing choices[0].message.content".into()))?;

        let text = content
            .as_str()
            .ok_or_else(|| GatewayError::MalformedResponse("message content is not a string".into()))?
            .trim();

        if text.is_empty() {
            return Err(GatewayError::EmptyAnswer);
        }
        Ok(text.to_string())
    }
}

impl fmt::Debug for OpenAiGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiGateway")
            .field("base_url", &self.config.base_url)
            .field("model", &self.config.model)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl AssistantGateway for OpenAiGateway {
    async fn answer(&self, prompt: &str) -> GatewayResult<String> {
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));

        log::debug!(
            "sending completion request url={} model={} prompt_chars={}",
            url,
            self.config.model,
            prompt.len()
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout(self.config.timeout())
                } else {
                    GatewayError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Transport(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            return Err(Self::map_http_error(status.as_u16(), &body));
        }

        let json: Value = serde_json::from_str(&body)
            .map_err(|e| GatewayError::MalformedResponse(format!("invalid JSON: {}", e)))?;

        Self::parse_response(&json)
    }
}
