//! Embedding/completion gateway for factbase.
//!
//! Wraps the external model backends (OpenAI, Ollama) behind the
//! [`Provider`] trait: `complete(prompt) -> text` and
//! `embed(text) -> vector`.

pub mod providers;
pub mod registry;

pub use providers::{GatewayError, OllamaClient, OpenAiClient, Provider};
pub use registry::build_provider;
