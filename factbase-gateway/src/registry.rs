//! Builds the configured provider client.

use factbase_core::config::{Config, ConfigError, ProviderKind};
use tracing::info;

use crate::providers::{OllamaClient, OpenAiClient, Provider};

/// Construct the boxed provider selected by the configuration.
///
/// `Config::load` already guarantees the provider's secret is present;
/// the check here keeps the constructor total for hand-built configs.
pub fn build_provider(config: &Config) -> Result<Box<dyn Provider>, ConfigError> {
    let models = &config.settings.models;
    match models.provider {
        ProviderKind::OpenAi => {
            let api_key = config
                .openai_api_key()
                .ok_or(ConfigError::MissingSecret {
                    provider: ProviderKind::OpenAi,
                    var: "OPENAI_API_KEY",
                })?;
            let client = OpenAiClient::new(
                api_key,
                &models.openai.name,
                &models.openai.embedding_model,
                &models.openai.base_url,
            );
            info!(
                "OpenAI client created (model: {}, embeddings: {})",
                models.openai.name, models.openai.embedding_model
            );
            Ok(Box::new(client))
        }
        ProviderKind::Ollama => {
            let client = OllamaClient::new(
                &models.ollama.name,
                models.ollama.embedding_model(),
                &models.ollama.base_url,
            );
            info!(
                "Ollama client created (model: {}, embeddings: {})",
                models.ollama.name,
                models.ollama.embedding_model()
            );
            Ok(Box::new(client))
        }
    }
}
