//! OpenAI API client.

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::providers::provider::{GatewayError, Provider};

/// OpenAI API client serving completions and embeddings.
#[derive(Clone)]
pub struct OpenAiClient {
    http_client: reqwest::Client,
    api_key: String,
    model: String,
    embedding_model: String,
    base_url: String,
}

/// Request body for the Chat Completions API
#[derive(Debug, Serialize)]
struct ChatCompletionsRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiMessage {
    role: String,
    content: Option<String>,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
struct ChatCompletionsResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: OpenAiMessage,
}

/// Request body for the Embeddings API
#[derive(Debug, Serialize)]
struct EmbeddingsRequest {
    model: String,
    input: Vec<String>,
}

/// Embeddings response
#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl OpenAiClient {
    /// Create a new OpenAI client.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        embedding_model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http_client,
            api_key: api_key.into(),
            model: model.into(),
            embedding_model: embedding_model.into(),
            base_url: base_url.into(),
        }
    }

    fn build_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let auth_value = format!("Bearer {}", self.api_key);
        if let Ok(header_value) = HeaderValue::from_str(&auth_value) {
            headers.insert(AUTHORIZATION, header_value);
        }
        headers
    }

    fn normalized_base_url(&self) -> String {
        self.base_url.trim_end_matches('/').to_string()
    }

    fn chat_completions_url(&self) -> String {
        let base = self.normalized_base_url();
        if base.ends_with("/v1") {
            format!("{}/chat/completions", base)
        } else {
            format!("{}/v1/chat/completions", base)
        }
    }

    fn embeddings_url(&self) -> String {
        let base = self.normalized_base_url();
        if base.ends_with("/v1") {
            format!("{}/embeddings", base)
        } else {
            format!("{}/v1/embeddings", base)
        }
    }
}

#[async_trait::async_trait]
impl Provider for OpenAiClient {
    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str) -> Result<String, GatewayError> {
        let request_body = ChatCompletionsRequest {
            model: self.model.clone(),
            messages: vec![OpenAiMessage {
                role: "user".to_string(),
                content: Some(prompt.to_string()),
            }],
            temperature: 0.0,
            max_tokens: 1024,
        };

        let response = self
            .http_client
            .post(self.chat_completions_url())
            .headers(self.build_headers())
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

        let completions: ChatCompletionsResponse = response.json().await?;
        let text = completions
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(GatewayError::NoContent)?;

        if text.trim().is_empty() {
            return Err(GatewayError::NoContent);
        }
        Ok(text.trim().to_string())
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, GatewayError> {
        let request_body = EmbeddingsRequest {
            model: self.embedding_model.clone(),
            input: vec![text.to_string()],
        };

        let response = self
            .http_client
            .post(self.embeddings_url())
            .headers(self.build_headers())
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

        let embeddings: EmbeddingsResponse = response.json().await?;
        embeddings
            .data
            .into_iter()
            .next()
            .map(|data| data.embedding)
            .ok_or_else(|| {
                GatewayError::InvalidFormat("embedding response missing vectors".to_string())
            })
    }

    fn clone_box(&self) -> Box<dyn Provider> {
        Box::new(self.clone())
    }
}
