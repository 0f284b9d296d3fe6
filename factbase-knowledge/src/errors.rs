use factbase_core::template::TemplateError;
use factbase_gateway::GatewayError;

/// Errors from the vector store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("vector store unreachable: {0}")]
    Unavailable(#[from] reqwest::Error),
    #[error("vector store API error: HTTP {status}: {message}")]
    Api { status: u16, message: String },
    #[error(
        "configuration error: collection '{collection}' expects vectors of dimension {expected}, got {actual}"
    )]
    DimensionMismatch {
        collection: String,
        expected: usize,
        actual: usize,
    },
    #[error("malformed vector store response: {0}")]
    InvalidResponse(String),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Strict-decode violations for model responses.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum DecodeError {
    #[error("expected a numeric similarity score, got '{raw}'")]
    MalformedScore { raw: String },
    #[error("similarity score {score} is outside [0, 1]")]
    ScoreOutOfRange { score: f64 },
}

/// Any failure while processing one user turn.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Template(#[from] TemplateError),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
