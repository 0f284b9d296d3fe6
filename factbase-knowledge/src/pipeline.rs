//! The ingestion-and-dedup decision pipeline.
//!
//! One user turn per invocation:
//! classify → (validate → dedup → reformulate → store) for statements,
//! classify → (search → answer) for questions. All external calls are
//! issued strictly sequentially; later stages depend on earlier results.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};

use factbase_core::config::{PromptSettings, SearchSettings, Settings};
use factbase_core::template;
use factbase_gateway::Provider;

use crate::decode::{self, InputKind, Validity};
use crate::errors::PipelineResult;
use crate::outcome::TurnOutcome;
use crate::store::DocumentStore;

/// Ingestion pipeline over one provider and one document store.
///
/// Holds no per-turn state; everything it needs is constructed once at
/// startup and passed in by reference.
pub struct Pipeline {
    provider: Arc<dyn Provider>,
    store: Arc<dyn DocumentStore>,
    prompts: PromptSettings,
    search: SearchSettings,
    /// Serializes dedup-check → insert so concurrent ingestions through
    /// this pipeline cannot both miss the check and both insert.
    ingest_lock: Mutex<()>,
}

impl Pipeline {
    pub fn new(
        provider: Arc<dyn Provider>,
        store: Arc<dyn DocumentStore>,
        settings: &Settings,
    ) -> Self {
        Self {
            provider,
            store,
            prompts: settings.prompts.clone(),
            search: settings.search.clone(),
            ingest_lock: Mutex::new(()),
        }
    }

    /// Process one raw user input to a terminal outcome.
    pub async fn handle_input(&self, user_input: &str) -> PipelineResult<TurnOutcome> {
        let kind = self.classify_input(user_input).await?;
        info!("Input classified as: {kind:?}");

        match kind {
            InputKind::Statement => self.ingest_statement(user_input).await,
            InputKind::Question => self.answer_question(user_input).await,
            InputKind::Unrecognized => Ok(TurnOutcome::Unrecognized),
        }
    }

    /// Classify input as question or statement.
    async fn classify_input(&self, user_input: &str) -> PipelineResult<InputKind> {
        let prompt = template::render(
            &self.prompts.classify_input,
            &[("user_input", user_input)],
        )?;
        let response = self.provider.complete(&prompt).await?;
        Ok(decode::classification(&response))
    }

    /// Validate → dedup → reformulate → store, stopping at the first
    /// terminal decision.
    async fn ingest_statement(&self, statement: &str) -> PipelineResult<TurnOutcome> {
        if self.validate_statement(statement).await? == Validity::Invalid {
            info!("Statement rejected as invalid or implausible");
            return Ok(TurnOutcome::Rejected);
        }

        let _guard = self.ingest_lock.lock().await;

        if self.check_duplicate(statement).await? {
            info!("Statement already exists in the knowledge base");
            return Ok(TurnOutcome::Duplicate);
        }

        let canonical = self.reformulate(statement).await?;
        self.store.insert(&canonical).await?;

        match self.store.count().await {
            Ok(total) => info!("Total documents: {total}"),
            Err(e) => warn!("Could not read document count: {e}"),
        }

        Ok(TurnOutcome::Stored { canonical })
    }

    /// Check whether the statement is potentially valid.
    async fn validate_statement(&self, statement: &str) -> PipelineResult<Validity> {
        let prompt = template::render(
            &self.prompts.validate_statement,
            &[("statement", statement)],
        )?;
        let response = self.provider.complete(&prompt).await?;
        Ok(decode::validity(&response))
    }

    /// Two-stage duplicate check: vector search narrows the candidates,
    /// then the model adjudicates each in descending-score order. The
    /// first adjudicated score at or above the threshold short-circuits.
    async fn check_duplicate(&self, statement: &str) -> PipelineResult<bool> {
        let matches = self
            .store
            .search(
                statement,
                self.search.doc_num,
                self.search.vectorstore_threshold,
            )
            .await?;

        for candidate in &matches {
            let prompt = template::render(
                &self.prompts.check_duplicate,
                &[("statement", statement), ("existing", &candidate.text)],
            )?;
            let response = self.provider.complete(&prompt).await?;
            let score = decode::similarity_score(&response)?;
            info!("Duplicate score against '{}': {score}", candidate.id);

            if score >= self.search.llm_threshold {
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Reformulate the statement into its canonical stored form. The
    /// output is trusted verbatim.
    async fn reformulate(&self, statement: &str) -> PipelineResult<String> {
        let prompt = template::render(
            &self.prompts.reformulate_for_db,
            &[("statement", statement)],
        )?;
        let canonical = self.provider.complete(&prompt).await?;
        Ok(canonical)
    }

    /// Answer a question from retrieved context. An empty knowledge base
    /// still produces a completion call with an empty context block.
    async fn answer_question(&self, question: &str) -> PipelineResult<TurnOutcome> {
        let matches = self
            .store
            .search(
                question,
                self.search.doc_num,
                self.search.vectorstore_threshold,
            )
            .await?;

        let context = matches
            .iter()
            .map(|m| m.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        info!("Answer context:\n{context}");

        let prompt = template::render(
            &self.prompts.handle_question,
            &[("context", &context), ("question", question)],
        )?;
        let answer = self.provider.complete(&prompt).await?;

        Ok(TurnOutcome::Answered { answer })
    }
}
