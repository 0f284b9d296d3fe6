//! Provider trait for abstracting different model backends.

/// Errors that can occur when calling a model backend.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: HTTP {status}: {message}")]
    Api { status: u16, message: String },
    #[error("No content in response")]
    NoContent,
    #[error("Invalid response format: {0}")]
    InvalidFormat(String),
}

/// Single seam over an external language model: text completion plus
/// embedding. One request per call, no retry or backoff at this layer.
#[async_trait::async_trait]
pub trait Provider: Send + Sync {
    /// Provider name
    fn name(&self) -> &str;

    /// Current completion model
    fn model(&self) -> &str;

    /// Send a single-turn prompt and return the model's text output with
    /// surrounding whitespace trimmed. Casing is left untouched; callers
    /// that expect a short categorical answer normalize on their side.
    async fn complete(&self, prompt: &str) -> Result<String, GatewayError>;

    /// Embed a text into a vector of fixed dimension (per configured
    /// embedding model).
    async fn embed(&self, text: &str) -> Result<Vec<f32>, GatewayError>;

    /// Clone the provider (boxed)
    fn clone_box(&self) -> Box<dyn Provider>;
}

impl Clone for Box<dyn Provider> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
