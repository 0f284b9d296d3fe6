//! Shared test doubles: a scripted provider and an in-memory cosine store.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use factbase_gateway::{GatewayError, Provider};
use factbase_knowledge::store::{DocumentStore, ScoredDocument, StoredDocument};
use factbase_knowledge::StoreError;

const EMBED_DIM: usize = 16;

/// Deterministic embedding: identical texts embed identically, so cosine
/// similarity is reflexive-maximal for round-trip checks.
pub fn embed_text(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0f32; EMBED_DIM];
    for (i, byte) in text.bytes().enumerate() {
        vector[(byte as usize + i) % EMBED_DIM] += 1.0;
    }
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in &mut vector {
            *v /= norm;
        }
    }
    vector
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Provider returning scripted completions in order and deterministic
/// embeddings. Every completion prompt is recorded for assertions.
pub struct ScriptedProvider {
    completions: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new(responses: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            completions: Mutex::new(responses.iter().map(|r| r.to_string()).collect()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    /// Number of complete() calls made so far.
    pub fn complete_calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// All prompts passed to complete(), in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, prompt: &str) -> Result<String, GatewayError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let response = self
            .completions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected complete() call for prompt:\n{prompt}"));
        Ok(response.trim().to_string())
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, GatewayError> {
        Ok(embed_text(text))
    }

    fn clone_box(&self) -> Box<dyn Provider> {
        panic!("scripted provider is not cloneable");
    }
}

/// In-memory document store with brute-force cosine search; embeds via
/// the provider exactly like the real store does.
pub struct MemoryStore {
    provider: Arc<dyn Provider>,
    docs: Mutex<Vec<(StoredDocument, Vec<f32>)>>,
}

impl MemoryStore {
    pub fn new(provider: Arc<dyn Provider>) -> Arc<Self> {
        Arc::new(Self {
            provider,
            docs: Mutex::new(Vec::new()),
        })
    }

    /// Texts currently stored, in insertion order.
    pub fn texts(&self) -> Vec<String> {
        self.docs
            .lock()
            .unwrap()
            .iter()
            .map(|(doc, _)| doc.text.clone())
            .collect()
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, text: &str) -> Result<StoredDocument, StoreError> {
        let vector = self.provider.embed(text).await?;
        let document = StoredDocument {
            id: Uuid::new_v4(),
            text: text.to_string(),
            created_at: Utc::now().to_rfc3339(),
        };
        self.docs.lock().unwrap().push((document.clone(), vector));
        Ok(document)
    }

    async fn search(
        &self,
        query: &str,
        top_k: usize,
        min_score: f32,
    ) -> Result<Vec<ScoredDocument>, StoreError> {
        let vector = self.provider.embed(query).await?;
        let mut hits: Vec<ScoredDocument> = self
            .docs
            .lock()
            .unwrap()
            .iter()
            .map(|(doc, stored_vector)| ScoredDocument {
                id: doc.id.to_string(),
                text: doc.text.clone(),
                score: cosine(&vector, stored_vector),
            })
            .filter(|hit| hit.score >= min_score)
            .collect();
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(top_k);
        Ok(hits)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.docs.lock().unwrap().len() as u64)
    }
}
