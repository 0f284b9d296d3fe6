//! Knowledge store and ingestion pipeline for factbase.

pub mod decode;
pub mod errors;
pub mod outcome;
pub mod pipeline;
pub mod qdrant;
pub mod store;

pub use decode::{InputKind, Validity};
pub use errors::{DecodeError, PipelineError, PipelineResult, StoreError};
pub use outcome::TurnOutcome;
pub use pipeline::Pipeline;
pub use qdrant::QdrantStore;
pub use store::{DocumentStore, ScoredDocument, StoredDocument};
