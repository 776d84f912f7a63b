//! Assistant bridge: the seam between the inventory pipeline and a hosted
//! language model.
//!
//! The pipeline never talks HTTP. It hands a composed prompt to an
//! [`AssistantGateway`] and gets back either markdown text or a typed
//! [`GatewayError`]. Everything about the remote service (endpoint, model,
//! credential, timeout) lives in [`GatewayConfig`].

pub mod error;
pub mod gateway;
pub mod openai;
pub mod prompt;

pub use error::{GatewayError, GatewayResult};
pub use gateway::{AssistantGateway, GatewayConfig};
pub use openai::OpenAiGateway;
pub use prompt::{compose_prompt, PromptContext};
