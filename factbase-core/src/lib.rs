//! Shared configuration and prompt plumbing for factbase.

pub mod config;
pub mod template;

pub use config::{
    Config, ConfigError, DistanceMetric, PromptSettings, ProviderKind, SearchSettings, Secrets,
    Settings, SettingsError, VectorStoreSettings, load_dotenv,
};
pub use template::TemplateError;
