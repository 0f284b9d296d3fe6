//! Document store seam used by the ingestion pipeline.

use uuid::Uuid;

use crate::errors::StoreError;

/// A canonical statement persisted with its embedding.
#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub id: Uuid,
    pub text: String,
    /// RFC 3339 insertion timestamp.
    pub created_at: String,
}

/// A search hit: a stored document plus its similarity score.
#[derive(Debug, Clone)]
pub struct ScoredDocument {
    pub id: String,
    pub text: String,
    pub score: f32,
}

/// Durable, similarity-addressable repository of canonical statements.
///
/// `insert` performs no dedup of its own; the pipeline owns that decision.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Embed `text` and persist it with a generated id.
    async fn insert(&self, text: &str) -> Result<StoredDocument, StoreError>;

    /// Embed `query` and return up to `top_k` documents with similarity
    /// >= `min_score`, descending by score. An empty result is not an
    /// error.
    async fn search(
        &self,
        query: &str,
        top_k: usize,
        min_score: f32,
    ) -> Result<Vec<ScoredDocument>, StoreError>;

    /// Current document count. Observability only.
    async fn count(&self) -> Result<u64, StoreError>;
}
