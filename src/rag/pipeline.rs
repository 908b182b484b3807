//! The retrieval sub-pipeline.
//!
//! Sequences utterance extraction, embedding, similarity search, and context
//! formatting. Retrieval is an enhancement: every failure on this path
//! degrades to "proceed without context" and is never surfaced to the
//! caller. Only the completion call itself may fail a request.

use super::context::format_context;
use super::{RetrievalCounters, RetrievalOutcome, SkipReason};
use crate::chat::{last_user_message, ChatMessage};
use crate::config::RagSettings;
use crate::embedding::Embedder;
use crate::insights::InsightStore;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Coordinates retrieval for one deployment.
///
/// Collaborator handles are created once per process and shared across
/// requests; all per-request state stays on the stack.
pub struct RagPipeline {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn InsightStore>,
    settings: RagSettings,
    instruction: String,
    counters: Arc<RetrievalCounters>,
}

impl RagPipeline {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn InsightStore>,
        settings: RagSettings,
        instruction: &str,
    ) -> Self {
        Self {
            embedder,
            store,
            settings,
            instruction: instruction.to_string(),
            counters: Arc::new(RetrievalCounters::default()),
        }
    }

    /// Process-lifetime counters for operational tracing.
    pub fn counters(&self) -> Arc<RetrievalCounters> {
        self.counters.clone()
    }

    /// Run retrieval for a conversation history.
    ///
    /// Infallible by design: the worst outcome is an empty context block
    /// with a recorded skip reason.
    #[instrument(skip(self, messages))]
    pub async fn retrieve(&self, messages: &[ChatMessage]) -> RetrievalOutcome {
        let outcome = self.run(messages).await;
        self.counters.record(&outcome);
        match outcome.skipped {
            Some(reason) => info!("Retrieval skipped: {}", reason),
            None => info!("Retrieval included {} insights", outcome.insights_used),
        }
        outcome
    }

    async fn run(&self, messages: &[ChatMessage]) -> RetrievalOutcome {
        if !self.settings.enabled {
            return RetrievalOutcome::skipped(SkipReason::Disabled);
        }

        let utterance = last_user_message(messages);
        if utterance.trim().is_empty() {
            return RetrievalOutcome::skipped(SkipReason::NoUserText);
        }

        let embedding = match self.embedder.embed(utterance).await {
            Ok(embedding) => embedding,
            Err(e) => {
                warn!("Embedding failed, proceeding without context: {}", e);
                return RetrievalOutcome::skipped(SkipReason::EmbeddingFailed);
            }
        };

        let insights = match self
            .store
            .search(&embedding, self.settings.match_limit as usize)
            .await
        {
            Ok(insights) => insights,
            Err(e) => {
                warn!("Insight search failed, proceeding without context: {}", e);
                return RetrievalOutcome::skipped(SkipReason::StoreFailed);
            }
        };

        if insights.is_empty() {
            return RetrievalOutcome::skipped(SkipReason::NoMatches);
        }

        let context_block = format_context(&insights, &self.settings.truncation, &self.instruction);

        RetrievalOutcome {
            insights_used: insights.len(),
            context_block,
            skipped: None,
        }
    }
}
