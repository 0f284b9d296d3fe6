pub mod ollama;
pub mod openai;
pub mod provider;

pub use ollama::OllamaClient;
pub use openai::OpenAiClient;
pub use provider::{GatewayError, Provider};
