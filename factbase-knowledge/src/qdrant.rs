//! Qdrant-compatible vector store client.
//!
//! Talks to the vector search service over its REST API: one collection,
//! one unnamed vector per point, payload `{text, created_at}`.

use std::sync::Arc;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use factbase_core::config::{DistanceMetric, VectorStoreSettings};
use factbase_gateway::Provider;

use crate::errors::StoreError;
use crate::store::{DocumentStore, ScoredDocument, StoredDocument};

/// Vector store backed by a Qdrant-compatible service.
#[derive(Clone)]
pub struct QdrantStore {
    http_client: reqwest::Client,
    base_url: String,
    collection: String,
    vector_size: usize,
    provider: Arc<dyn Provider>,
}

/// Collection creation request
#[derive(Debug, Serialize)]
struct CreateCollectionRequest {
    vectors: VectorParams,
}

#[derive(Debug, Serialize)]
struct VectorParams {
    size: usize,
    distance: String,
}

/// Collection info response (only the fields we check)
#[derive(Debug, Deserialize)]
struct CollectionInfoResponse {
    result: CollectionInfo,
}

#[derive(Debug, Deserialize)]
struct CollectionInfo {
    config: CollectionConfig,
}

#[derive(Debug, Deserialize)]
struct CollectionConfig {
    params: CollectionParams,
}

#[derive(Debug, Deserialize)]
struct CollectionParams {
    vectors: VectorParamsInfo,
}

#[derive(Debug, Deserialize)]
struct VectorParamsInfo {
    size: usize,
}

/// Point upsert request
#[derive(Debug, Serialize)]
struct UpsertPointsRequest {
    points: Vec<Point>,
}

#[derive(Debug, Serialize)]
struct Point {
    id: Uuid,
    vector: Vec<f32>,
    payload: PointPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PointPayload {
    text: String,
    created_at: String,
}

/// Similarity search request
#[derive(Debug, Serialize)]
struct SearchRequest {
    vector: Vec<f32>,
    limit: usize,
    score_threshold: f32,
    with_payload: bool,
}

/// Similarity search response
#[derive(Debug, Deserialize)]
struct SearchResponse {
    result: Vec<ScoredPoint>,
}

#[derive(Debug, Deserialize)]
struct ScoredPoint {
    id: PointId,
    score: f32,
    payload: Option<PointPayload>,
}

/// Point ids come back as either integers or UUID strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum PointId {
    Int(u64),
    Str(String),
}

impl std::fmt::Display for PointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PointId::Int(n) => write!(f, "{n}"),
            PointId::Str(s) => write!(f, "{s}"),
        }
    }
}

/// Count request/response
#[derive(Debug, Serialize)]
struct CountRequest {
    exact: bool,
}

#[derive(Debug, Deserialize)]
struct CountResponse {
    result: CountResult,
}

#[derive(Debug, Deserialize)]
struct CountResult {
    count: u64,
}

/// What `ensure_collection` decided after inspecting the backend.
#[derive(Debug, PartialEq, Eq)]
enum CollectionAction {
    Create,
    Keep,
}

/// Compare an existing collection's dimension (if any) against the
/// configured one. A disagreement is a configuration error, caught here
/// rather than surfacing as silent corruption later.
fn plan_collection(
    existing_size: Option<usize>,
    expected_size: usize,
    collection: &str,
) -> Result<CollectionAction, StoreError> {
    match existing_size {
        None => Ok(CollectionAction::Create),
        Some(size) if size == expected_size => Ok(CollectionAction::Keep),
        Some(size) => Err(StoreError::DimensionMismatch {
            collection: collection.to_string(),
            expected: expected_size,
            actual: size,
        }),
    }
}

impl QdrantStore {
    /// Connect to the vector store and ensure the backing collection
    /// exists with the configured dimension.
    pub async fn connect(
        settings: &VectorStoreSettings,
        provider: Arc<dyn Provider>,
    ) -> Result<Self, StoreError> {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        let store = Self {
            http_client,
            base_url: settings.url.trim_end_matches('/').to_string(),
            collection: settings.collection_name.clone(),
            vector_size: settings.vector_size,
            provider,
        };

        store.ensure_collection(settings.distance).await?;

        let total = store.count().await?;
        info!("Total documents in '{}': {}", store.collection, total);

        Ok(store)
    }

    fn collection_url(&self) -> String {
        format!("{}/collections/{}", self.base_url, self.collection)
    }

    fn points_url(&self) -> String {
        format!("{}/points?wait=true", self.collection_url())
    }

    fn search_url(&self) -> String {
        format!("{}/points/search", self.collection_url())
    }

    fn count_url(&self) -> String {
        format!("{}/points/count", self.collection_url())
    }

    /// Idempotent: creates the collection if absent, verifies its
    /// dimension otherwise.
    async fn ensure_collection(&self, distance: DistanceMetric) -> Result<(), StoreError> {
        let response = self.http_client.get(self.collection_url()).send().await?;

        let existing_size = if response.status() == reqwest::StatusCode::NOT_FOUND {
            None
        } else {
            let info: CollectionInfoResponse = parse_json(check_status(response).await?).await?;
            Some(info.result.config.params.vectors.size)
        };

        match plan_collection(existing_size, self.vector_size, &self.collection)? {
            CollectionAction::Keep => {
                info!("Collection '{}' already exists", self.collection);
            }
            CollectionAction::Create => {
                info!(
                    "Collection '{}' does not exist, creating it",
                    self.collection
                );
                let request = CreateCollectionRequest {
                    vectors: VectorParams {
                        size: self.vector_size,
                        distance: distance.as_api_str().to_string(),
                    },
                };
                let response = self
                    .http_client
                    .put(self.collection_url())
                    .json(&request)
                    .send()
                    .await?;
                check_status(response).await?;
            }
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl DocumentStore for QdrantStore {
    async fn insert(&self, text: &str) -> Result<StoredDocument, StoreError> {
        let vector = self.provider.embed(text).await?;
        if vector.len() != self.vector_size {
            return Err(StoreError::DimensionMismatch {
                collection: self.collection.clone(),
                expected: self.vector_size,
                actual: vector.len(),
            });
        }

        let document = StoredDocument {
            id: Uuid::new_v4(),
            text: text.to_string(),
            created_at: Utc::now().to_rfc3339(),
        };
        let request = UpsertPointsRequest {
            points: vec![Point {
                id: document.id,
                vector,
                payload: PointPayload {
                    text: document.text.clone(),
                    created_at: document.created_at.clone(),
                },
            }],
        };

        let response = self
            .http_client
            .put(self.points_url())
            .json(&request)
            .send()
            .await?;
        check_status(response).await?;

        Ok(document)
    }

    async fn search(
        &self,
        query: &str,
        top_k: usize,
        min_score: f32,
    ) -> Result<Vec<ScoredDocument>, StoreError> {
        let vector = self.provider.embed(query).await?;
        if vector.len() != self.vector_size {
            return Err(StoreError::DimensionMismatch {
                collection: self.collection.clone(),
                expected: self.vector_size,
                actual: vector.len(),
            });
        }

        let request = SearchRequest {
            vector,
            limit: top_k,
            score_threshold: min_score,
            with_payload: true,
        };

        let response = self
            .http_client
            .post(self.search_url())
            .json(&request)
            .send()
            .await?;
        let parsed: SearchResponse = parse_json(check_status(response).await?).await?;

        parsed
            .result
            .into_iter()
            .map(|hit| {
                let payload = hit.payload.ok_or_else(|| {
                    StoreError::InvalidResponse(format!("search hit {} has no payload", hit.id))
                })?;
                Ok(ScoredDocument {
                    id: hit.id.to_string(),
                    text: payload.text,
                    score: hit.score,
                })
            })
            .collect()
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let response = self
            .http_client
            .post(self.count_url())
            .json(&CountRequest { exact: true })
            .send()
            .await?;
        let parsed: CountResponse = parse_json(check_status(response).await?).await?;
        Ok(parsed.result.count)
    }
}

/// Turn non-2xx responses into `StoreError::Api`.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(StoreError::Api {
            status: status.as_u16(),
            message,
        });
    }
    Ok(response)
}

/// Parse a response body, surfacing decode failures as `InvalidResponse`.
async fn parse_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, StoreError> {
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| StoreError::InvalidResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use factbase_gateway::GatewayError;

    /// Provider double returning a fixed-dimension embedding; any
    /// completion attempt is a test bug.
    #[derive(Clone)]
    struct FixedDimProvider {
        dim: usize,
    }

    #[async_trait::async_trait]
    impl Provider for FixedDimProvider {
        fn name(&self) -> &str {
            "fixed"
        }

        fn model(&self) -> &str {
            "fixed"
        }

        async fn complete(&self, _prompt: &str) -> Result<String, GatewayError> {
            panic!("store must not call complete()");
        }

        async fn embed(&self, _text: &str) -> Result<Vec<f32>, GatewayError> {
            Ok(vec![0.0; self.dim])
        }

        fn clone_box(&self) -> Box<dyn Provider> {
            Box::new(self.clone())
        }
    }

    fn unreachable_store(vector_size: usize, provider_dim: usize) -> QdrantStore {
        QdrantStore {
            http_client: reqwest::Client::new(),
            // Port 9 (discard): any request reaching the network is a
            // test failure by construction.
            base_url: "http://127.0.0.1:9".to_string(),
            collection: "facts".to_string(),
            vector_size,
            provider: Arc::new(FixedDimProvider { dim: provider_dim }),
        }
    }

    #[test]
    fn test_plan_collection_absent_creates() {
        assert_eq!(
            plan_collection(None, 768, "facts").unwrap(),
            CollectionAction::Create
        );
    }

    #[test]
    fn test_plan_collection_same_dimension_is_noop() {
        // Calling ensure twice with identical parameters keeps the
        // collection untouched.
        assert_eq!(
            plan_collection(Some(768), 768, "facts").unwrap(),
            CollectionAction::Keep
        );
        assert_eq!(
            plan_collection(Some(768), 768, "facts").unwrap(),
            CollectionAction::Keep
        );
    }

    #[test]
    fn test_plan_collection_dimension_mismatch() {
        let err = plan_collection(Some(1536), 768, "facts").unwrap_err();
        match err {
            StoreError::DimensionMismatch {
                collection,
                expected,
                actual,
            } => {
                assert_eq!(collection, "facts");
                assert_eq!(expected, 768);
                assert_eq!(actual, 1536);
            }
            other => panic!("expected DimensionMismatch, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_insert_rejects_wrong_dimension_before_backend() {
        let store = unreachable_store(8, 4);
        let err = store.insert("the sky is blue").await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::DimensionMismatch {
                expected: 8,
                actual: 4,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_search_rejects_wrong_dimension_before_backend() {
        let store = unreachable_store(8, 4);
        let err = store.search("anything", 5, 0.7).await.unwrap_err();
        assert!(matches!(err, StoreError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_urls() {
        let store = unreachable_store(8, 8);
        assert_eq!(
            store.collection_url(),
            "http://127.0.0.1:9/collections/facts"
        );
        assert_eq!(
            store.points_url(),
            "http://127.0.0.1:9/collections/facts/points?wait=true"
        );
        assert_eq!(
            store.search_url(),
            "http://127.0.0.1:9/collections/facts/points/search"
        );
        assert_eq!(
            store.count_url(),
            "http://127.0.0.1:9/collections/facts/points/count"
        );
    }

    #[test]
    fn test_create_collection_request_shape() {
        let request = CreateCollectionRequest {
            vectors: VectorParams {
                size: 768,
                distance: DistanceMetric::Cosine.as_api_str().to_string(),
            },
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["vectors"]["size"], 768);
        assert_eq!(value["vectors"]["distance"], "Cosine");
    }

    #[test]
    fn test_search_request_shape() {
        let request = SearchRequest {
            vector: vec![0.1, 0.2],
            limit: 5,
            score_threshold: 0.7,
            with_payload: true,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["limit"], 5);
        assert_eq!(value["with_payload"], true);
        assert!((value["score_threshold"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_collection_info_parsing() {
        let raw = r#"{
            "result": {
                "status": "green",
                "config": {"params": {"vectors": {"size": 768, "distance": "Cosine"}}}
            },
            "status": "ok",
            "time": 0.0001
        }"#;
        let parsed: CollectionInfoResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.result.config.params.vectors.size, 768);
    }

    #[test]
    fn test_search_response_parsing_uuid_and_int_ids() {
        let raw = r#"{
            "result": [
                {"id": "9f2c2a9e-5a80-4f3a-9a4b-000000000001", "version": 3, "score": 0.91,
                 "payload": {"text": "The sky is blue.", "created_at": "2026-08-06T00:00:00Z"}},
                {"id": 42, "version": 1, "score": 0.75,
                 "payload": {"text": "Water boils at 100C at sea level.", "created_at": "2026-08-06T00:00:00Z"}}
            ],
            "status": "ok",
            "time": 0.002
        }"#;
        let parsed: SearchResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.result.len(), 2);
        assert_eq!(
            parsed.result[0].id.to_string(),
            "9f2c2a9e-5a80-4f3a-9a4b-000000000001"
        );
        assert_eq!(parsed.result[1].id.to_string(), "42");
        assert!(parsed.result[0].score > parsed.result[1].score);
    }

    #[test]
    fn test_count_response_parsing() {
        let raw = r#"{"result": {"count": 17}, "status": "ok", "time": 0.0003}"#;
        let parsed: CountResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.result.count, 17);
    }
}
