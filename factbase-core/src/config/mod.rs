//! Configuration management for factbase.
//!
//! Configuration comes from two sources, combined into one [`Config`]:
//!
//! - **Secrets** from environment variables (`OPENAI_API_KEY`), never from
//!   files.
//! - **Settings** from a TOML file at `~/.config/factbase/config.toml`
//!   (override the path with `FACTBASE_CONFIG`), strongly typed and
//!   validated before anything else runs.

mod secrets;
mod settings;

pub use secrets::Secrets;
pub use settings::{
    DistanceMetric, LoggingSettings, ModelsSettings, OllamaModelSettings, OpenAiModelSettings,
    PromptSettings, ProviderKind, SearchSettings, Settings, SettingsError, VectorStoreSettings,
};

/// Combined configuration containing both secrets and settings.
///
/// Constructed once at process start and passed by reference into
/// everything that needs it; there is no ambient global lookup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Secrets loaded from environment variables
    pub secrets: Secrets,
    /// Settings loaded from the TOML configuration file
    pub settings: Settings,
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Provider '{provider}' requires the {var} environment variable")]
    MissingSecret {
        provider: ProviderKind,
        var: &'static str,
    },
}

impl Config {
    /// Load configuration from all sources and cross-validate.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file cannot be read, parsed, or
    /// validated, or if the configured provider's API key is missing.
    pub fn load() -> Result<Self, ConfigError> {
        let secrets = Secrets::from_env();
        let settings = Settings::load()?;
        Self::from_parts(secrets, settings)
    }

    /// Combine pre-loaded parts, applying the provider/secret cross-check.
    pub fn from_parts(secrets: Secrets, settings: Settings) -> Result<Self, ConfigError> {
        if settings.models.provider == ProviderKind::OpenAi && secrets.openai_api_key.is_none() {
            return Err(ConfigError::MissingSecret {
                provider: ProviderKind::OpenAi,
                var: "OPENAI_API_KEY",
            });
        }
        Ok(Self { secrets, settings })
    }

    /// The configured provider.
    pub fn provider(&self) -> ProviderKind {
        self.settings.models.provider
    }

    /// Get the OpenAI API key (if configured).
    pub fn openai_api_key(&self) -> Option<&str> {
        self.secrets.openai_api_key.as_deref()
    }
}

/// Load .env file if it exists (for development convenience).
pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}
