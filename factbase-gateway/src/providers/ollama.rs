//! Ollama API client.

use serde::{Deserialize, Serialize};

use crate::providers::provider::{GatewayError, Provider};

/// Ollama API client serving completions and embeddings from a local
/// daemon. No authentication.
#[derive(Clone)]
pub struct OllamaClient {
    http_client: reqwest::Client,
    model: String,
    embedding_model: String,
    base_url: String,
}

/// Request body for /api/generate
#[derive(Debug, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
}

/// Response from /api/generate (stream: false)
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Request body for /api/embed
#[derive(Debug, Serialize)]
struct EmbedRequest {
    model: String,
    input: Vec<String>,
}

/// Response from /api/embed. Older daemons return a single `embedding`,
/// newer ones a batched `embeddings`.
#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Option<Vec<Vec<f32>>>,
    embedding: Option<Vec<f32>>,
}

impl OllamaClient {
    /// Create a new Ollama client.
    pub fn new(
        model: impl Into<String>,
        embedding_model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("Failed to build HTTP client");

        let base_url: String = base_url.into();
        Self {
            http_client,
            model: model.into(),
            embedding_model: embedding_model.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn generate_url(&self) -> String {
        format!("{}/api/generate", self.base_url)
    }

    fn embed_url(&self) -> String {
        format!("{}/api/embed", self.base_url)
    }
}

#[async_trait::async_trait]
impl Provider for OllamaClient {
    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str) -> Result<String, GatewayError> {
        let request_body = GenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
            options: GenerateOptions { temperature: 0.0 },
        };

        let response = self
            .http_client
            .post(self.generate_url())
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let generated: GenerateResponse = response.json().await?;
        if generated.response.trim().is_empty() {
            return Err(GatewayError::NoContent);
        }
        Ok(generated.response.trim().to_string())
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, GatewayError> {
        let request_body = EmbedRequest {
            model: self.embedding_model.clone(),
            input: vec![text.to_string()],
        };

        let response = self
            .http_client
            .post(self.embed_url())
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let payload: EmbedResponse = response.json().await?;

        if let Some(embeddings) = payload.embeddings {
            return embeddings.into_iter().next().ok_or_else(|| {
                GatewayError::InvalidFormat("embedding response missing vectors".to_string())
            });
        }

        if let Some(embedding) = payload.embedding {
            return Ok(embedding);
        }

        Err(GatewayError::InvalidFormat(
            "embedding response missing vectors".to_string(),
        ))
    }

    fn clone_box(&self) -> Box<dyn Provider> {
        Box::new(self.clone())
    }
}
