//! Settings configuration loaded from TOML files.
//!
//! Non-sensitive configuration lives in TOML in the XDG config directory
//! (~/.config/factbase/config.toml, overridable via FACTBASE_CONFIG).
//! Everything is strongly typed and validated at load time; a typo in a
//! knob or a prompt slot fails startup, not a pipeline turn.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::template::{self, TemplateError};

/// Default TOML configuration file content, written on first run.
const DEFAULT_CONFIG_TOML: &str = r#"# factbase configuration file
# Located at: ~/.config/factbase/config.toml
#
# This file contains non-sensitive configuration.
# Secrets are loaded from environment variables:
#   - OPENAI_API_KEY (required when models.provider = "openai")

[vectorstore]
url = "http://127.0.0.1:6333"
collection_name = "factbase"
vector_size = 768
# One of: cosine, dot, euclid
distance = "cosine"

[search]
# top_k for both the dedup check and question answering
doc_num = 5
# minimum vector similarity for a document to count as a search match
vectorstore_threshold = 0.7
# minimum LLM-adjudicated similarity for two statements to be duplicates
llm_threshold = 0.8

[models]
provider = "ollama"

[models.openai]
name = "gpt-4o-mini"
embedding_model = "text-embedding-3-small"
base_url = "https://api.openai.com"

[models.ollama]
name = "llama3.1"
embedding_model = "nomic-embed-text"
base_url = "http://127.0.0.1:11434"

[logging]
level = "info"

# Prompt templates. {slot} is substituted, {{ and }} are literal braces.
[prompts]
classify_input = """
Classify the following user input as either a statement or a question.
Respond with exactly one word: statement or question.

Input: {user_input}
"""

validate_statement = """
Decide whether the following statement is factually plausible.
Respond with exactly one word: valid or invalid.

Statement: {statement}
"""

check_duplicate = """
Rate how semantically similar these two statements are on a scale from 0 to 1.
Respond with a single number and nothing else.

Statement A: {statement}
Statement B: {existing}
"""

reformulate_for_db = """
Reformulate the following statement into a single concise, self-contained
factual sentence suitable for a knowledge base.
Respond with the reformulated sentence only.

Statement: {statement}
"""

handle_question = """
Answer the question using only the context below. If the context does not
contain the answer, say that you have no information about that.

Context:
{context}

Question: {question}
"""
"#;

/// Settings loaded from the TOML configuration file.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Settings {
    /// Vector store connection and collection parameters
    #[serde(default)]
    pub vectorstore: VectorStoreSettings,

    /// Search tuning knobs shared by dedup and question answering
    #[serde(default)]
    pub search: SearchSettings,

    /// Model provider selection and per-provider model names
    #[serde(default)]
    pub models: ModelsSettings,

    /// Prompt templates for each pipeline stage
    #[serde(default)]
    pub prompts: PromptSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Vector store connection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VectorStoreSettings {
    #[serde(default = "default_vectorstore_url")]
    pub url: String,
    #[serde(default = "default_collection_name")]
    pub collection_name: String,
    #[serde(default = "default_vector_size")]
    pub vector_size: usize,
    #[serde(default)]
    pub distance: DistanceMetric,
}

impl Default for VectorStoreSettings {
    fn default() -> Self {
        Self {
            url: default_vectorstore_url(),
            collection_name: default_collection_name(),
            vector_size: default_vector_size(),
            distance: DistanceMetric::default(),
        }
    }
}

/// Similarity metric used by the backing collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    #[default]
    Cosine,
    Dot,
    Euclid,
}

impl DistanceMetric {
    /// Metric name in the vector store's API casing.
    pub fn as_api_str(&self) -> &'static str {
        match self {
            DistanceMetric::Cosine => "Cosine",
            DistanceMetric::Dot => "Dot",
            DistanceMetric::Euclid => "Euclid",
        }
    }
}

/// Search tuning knobs.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchSettings {
    /// top_k for both the dedup search and question answering
    #[serde(default = "default_doc_num")]
    pub doc_num: usize,
    /// Similarity floor for vector search matches
    #[serde(default = "default_vectorstore_threshold")]
    pub vectorstore_threshold: f32,
    /// LLM duplicate-score floor in [0, 1]
    #[serde(default = "default_llm_threshold")]
    pub llm_threshold: f64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            doc_num: default_doc_num(),
            vectorstore_threshold: default_vectorstore_threshold(),
            llm_threshold: default_llm_threshold(),
        }
    }
}

/// Which external model backend serves completions and embeddings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    Ollama,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::OpenAi => write!(f, "openai"),
            ProviderKind::Ollama => write!(f, "ollama"),
        }
    }
}

/// Model configuration: provider selection plus per-provider blocks.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelsSettings {
    #[serde(default = "default_provider")]
    pub provider: ProviderKind,
    #[serde(default)]
    pub openai: OpenAiModelSettings,
    #[serde(default)]
    pub ollama: OllamaModelSettings,
}

impl Default for ModelsSettings {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            openai: OpenAiModelSettings::default(),
            ollama: OllamaModelSettings::default(),
        }
    }
}

/// OpenAI model names and endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OpenAiModelSettings {
    #[serde(default = "default_openai_model")]
    pub name: String,
    #[serde(default = "default_openai_embedding_model")]
    pub embedding_model: String,
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
}

impl Default for OpenAiModelSettings {
    fn default() -> Self {
        Self {
            name: default_openai_model(),
            embedding_model: default_openai_embedding_model(),
            base_url: default_openai_base_url(),
        }
    }
}

/// Ollama model names and endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OllamaModelSettings {
    #[serde(default = "default_ollama_model")]
    pub name: String,
    /// Embedding model; falls back to `name` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding_model: Option<String>,
    #[serde(default = "default_ollama_base_url")]
    pub base_url: String,
}

impl OllamaModelSettings {
    /// Embedding model name, defaulting to the completion model.
    pub fn embedding_model(&self) -> &str {
        self.embedding_model.as_deref().unwrap_or(&self.name)
    }
}

impl Default for OllamaModelSettings {
    fn default() -> Self {
        Self {
            name: default_ollama_model(),
            embedding_model: Some(default_ollama_embedding_model()),
            base_url: default_ollama_base_url(),
        }
    }
}

/// Prompt templates keyed by pipeline stage.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PromptSettings {
    #[serde(default = "default_classify_input_prompt")]
    pub classify_input: String,
    #[serde(default = "default_validate_statement_prompt")]
    pub validate_statement: String,
    #[serde(default = "default_check_duplicate_prompt")]
    pub check_duplicate: String,
    #[serde(default = "default_reformulate_for_db_prompt")]
    pub reformulate_for_db: String,
    #[serde(default = "default_handle_question_prompt")]
    pub handle_question: String,
}

impl Default for PromptSettings {
    fn default() -> Self {
        Self {
            classify_input: default_classify_input_prompt(),
            validate_statement: default_validate_statement_prompt(),
            check_duplicate: default_check_duplicate_prompt(),
            reformulate_for_db: default_reformulate_for_db_prompt(),
            handle_question: default_handle_question_prompt(),
        }
    }
}

impl PromptSettings {
    /// Each template paired with the slots the pipeline supplies to it.
    pub fn templates(&self) -> [(&'static str, &str, &'static [&'static str]); 5] {
        [
            ("classify_input", self.classify_input.as_str(), &["user_input"]),
            ("validate_statement", self.validate_statement.as_str(), &["statement"]),
            (
                "check_duplicate",
                self.check_duplicate.as_str(),
                &["statement", "existing"],
            ),
            (
                "reformulate_for_db",
                self.reformulate_for_db.as_str(),
                &["statement"],
            ),
            (
                "handle_question",
                self.handle_question.as_str(),
                &["context", "question"],
            ),
        ]
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_vectorstore_url() -> String {
    "http://127.0.0.1:6333".to_string()
}

fn default_collection_name() -> String {
    "factbase".to_string()
}

fn default_vector_size() -> usize {
    768
}

fn default_doc_num() -> usize {
    5
}

fn default_vectorstore_threshold() -> f32 {
    0.7
}

fn default_llm_threshold() -> f64 {
    0.8
}

fn default_provider() -> ProviderKind {
    ProviderKind::Ollama
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_openai_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_ollama_model() -> String {
    "llama3.1".to_string()
}

fn default_ollama_embedding_model() -> String {
    "nomic-embed-text".to_string()
}

fn default_ollama_base_url() -> String {
    "http://127.0.0.1:11434".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_prompt(body: &str) -> String {
    body.trim_start().to_string()
}

fn default_classify_input_prompt() -> String {
    default_prompt(
        r#"
Classify the following user input as either a statement or a question.
Respond with exactly one word: statement or question.

Input: {user_input}
"#,
    )
}

fn default_validate_statement_prompt() -> String {
    default_prompt(
        r#"
Decide whether the following statement is factually plausible.
Respond with exactly one word: valid or invalid.

Statement: {statement}
"#,
    )
}

fn default_check_duplicate_prompt() -> String {
    default_prompt(
        r#"
Rate how semantically similar these two statements are on a scale from 0 to 1.
Respond with a single number and nothing else.

Statement A: {statement}
Statement B: {existing}
"#,
    )
}

fn default_reformulate_for_db_prompt() -> String {
    default_prompt(
        r#"
Reformulate the following statement into a single concise, self-contained
factual sentence suitable for a knowledge base.
Respond with the reformulated sentence only.

Statement: {statement}
"#,
    )
}

fn default_handle_question_prompt() -> String {
    default_prompt(
        r#"
Answer the question using only the context below. If the context does not
contain the answer, say that you have no information about that.

Context:
{context}

Question: {question}
"#,
    )
}

/// Errors that can occur when loading or validating settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write default config file {path}: {source}")]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("vectorstore.vector_size must be at least 1")]
    InvalidVectorSize,

    #[error("search.doc_num must be at least 1")]
    InvalidDocNum,

    #[error("search.vectorstore_threshold must be a finite number")]
    InvalidVectorstoreThreshold,

    #[error("search.llm_threshold must be within [0, 1], got {0}")]
    InvalidLlmThreshold(f64),

    #[error("prompt '{template}' is malformed: {source}")]
    MalformedPrompt {
        template: &'static str,
        source: TemplateError,
    },

    #[error("prompt '{template}' references unsupported slot '{{{slot}}}'")]
    UnsupportedPromptSlot {
        template: &'static str,
        slot: String,
    },
}

impl Settings {
    /// Load settings from the config file, creating a default file if absent.
    pub fn load() -> Result<Self, SettingsError> {
        let path = Self::config_path()?;
        if !path.exists() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|source| SettingsError::WriteFile {
                    path: path.clone(),
                    source,
                })?;
            }
            fs::write(&path, DEFAULT_CONFIG_TOML).map_err(|source| SettingsError::WriteFile {
                path: path.clone(),
                source,
            })?;
            tracing::info!("Created default config file at {}", path.display());
        }

        let raw = fs::read_to_string(&path).map_err(|source| SettingsError::ReadFile {
            path: path.clone(),
            source,
        })?;
        Self::parse(&raw)
    }

    /// Parse and validate settings from a TOML string.
    pub fn parse(raw: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(raw)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Path to the config file (FACTBASE_CONFIG override, XDG otherwise).
    pub fn config_path() -> Result<PathBuf, SettingsError> {
        if let Ok(path) = std::env::var("FACTBASE_CONFIG") {
            return Ok(PathBuf::from(path));
        }
        let config_dir = dirs::config_dir().ok_or(SettingsError::NoConfigDir)?;
        Ok(config_dir.join("factbase").join("config.toml"))
    }

    /// Validate every knob and prompt template, before any pipeline call.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.vectorstore.vector_size == 0 {
            return Err(SettingsError::InvalidVectorSize);
        }
        if self.search.doc_num == 0 {
            return Err(SettingsError::InvalidDocNum);
        }
        if !self.search.vectorstore_threshold.is_finite() {
            return Err(SettingsError::InvalidVectorstoreThreshold);
        }
        if !(0.0..=1.0).contains(&self.search.llm_threshold) {
            return Err(SettingsError::InvalidLlmThreshold(self.search.llm_threshold));
        }

        for (name, body, allowed) in self.prompts.templates() {
            let slots = template::slots(body)
                .map_err(|source| SettingsError::MalformedPrompt {
                    template: name,
                    source,
                })?;
            for slot in slots {
                if !allowed.contains(&slot.as_str()) {
                    return Err(SettingsError::UnsupportedPromptSlot {
                        template: name,
                        slot,
                    });
                }
            }
        }

        Ok(())
    }
}
