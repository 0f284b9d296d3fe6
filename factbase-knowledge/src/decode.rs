//! Strict decoding of model responses, one decoder per response kind.
//!
//! The gateway hands back trimmed text; these decoders interpret it.
//! Classification is total, validation fails closed, and the similarity
//! score is a bounded-float decode that errors instead of coercing.

use tracing::warn;

use crate::errors::DecodeError;

/// What kind of input the user gave us.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Statement,
    Question,
    Unrecognized,
}

/// Decode a classification response. Total: anything outside the two
/// expected literals is `Unrecognized`, never an error.
pub fn classification(raw: &str) -> InputKind {
    match raw.trim().to_lowercase().as_str() {
        "statement" => InputKind::Statement,
        "question" => InputKind::Question,
        other => {
            warn!("Unrecognized classification response: '{other}'");
            InputKind::Unrecognized
        }
    }
}

/// Plausibility verdict for a candidate statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity {
    Valid,
    Invalid,
}

/// Decode a validation response. Fail-closed: anything outside
/// {"valid", "invalid"} counts as invalid and is logged as an anomaly.
pub fn validity(raw: &str) -> Validity {
    match raw.trim().to_lowercase().as_str() {
        "valid" => Validity::Valid,
        "invalid" => Validity::Invalid,
        other => {
            warn!("Unexpected validation response: '{other}', defaulting to invalid");
            Validity::Invalid
        }
    }
}

/// Decode a similarity score in [0, 1]. A non-numeric response is a
/// format violation, not a silent zero.
pub fn similarity_score(raw: &str) -> Result<f64, DecodeError> {
    let trimmed = raw.trim();
    let score: f64 = trimmed.parse().map_err(|_| DecodeError::MalformedScore {
        raw: trimmed.to_string(),
    })?;
    if !score.is_finite() {
        return Err(DecodeError::MalformedScore {
            raw: trimmed.to_string(),
        });
    }
    if !(0.0..=1.0).contains(&score) {
        return Err(DecodeError::ScoreOutOfRange { score });
    }
    Ok(score)
}
