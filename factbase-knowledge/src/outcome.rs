//! Terminal pipeline outcomes and their user-facing messages.

/// Terminal state of one pipeline turn. Every variant maps to exactly one
/// kind tag and one human-readable message for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Statement validated, deduped, reformulated and inserted.
    Stored { canonical: String },
    /// Statement already present in the knowledge base.
    Duplicate,
    /// Statement judged implausible; nothing stored.
    Rejected,
    /// Question answered from retrieved context.
    Answered { answer: String },
    /// Input was neither a statement nor a question.
    Unrecognized,
}

impl TurnOutcome {
    /// Stable tag for the presentation contract.
    pub fn kind(&self) -> &'static str {
        match self {
            TurnOutcome::Stored { .. } => "stored",
            TurnOutcome::Duplicate => "duplicate",
            TurnOutcome::Rejected => "rejected",
            TurnOutcome::Answered { .. } => "answered",
            TurnOutcome::Unrecognized => "unrecognized",
        }
    }

    /// The one message shown to the user for this outcome.
    pub fn message(&self) -> String {
        match self {
            TurnOutcome::Stored { canonical } => format!(
                "Statement added to the knowledge base! Reformulated as: {canonical}"
            ),
            TurnOutcome::Duplicate => {
                "This information already exists in the knowledge base.".to_string()
            }
            TurnOutcome::Rejected => "This statement seems invalid or implausible.".to_string(),
            TurnOutcome::Answered { answer } => answer.clone(),
            TurnOutcome::Unrecognized => {
                "I could not tell whether that was a statement or a question. Try rephrasing it."
                    .to_string()
            }
        }
    }
}
