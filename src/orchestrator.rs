//! Top-level chat orchestration.
//!
//! Wires the process-lifetime collaborators (embedder, insight store,
//! completion gateway) and sequences one request: validate, retrieve,
//! assemble, stream. Credential and completion failures are fatal to the
//! request; retrieval failures never are.

use crate::chat::ChatTurn;
use crate::completion::{CompletionGateway, ModelParams, OpenAIGateway, TokenStream};
use crate::config::{Prompts, Settings};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{Result, RaadError};
use crate::insights::{
    HttpInsightStore, InsightRecord, InsightStore, MemoryInsightStore, SqliteInsightStore,
};
use crate::openai::{create_client, resolve_api_key};
use crate::rag::{prompt, RagPipeline, RetrievalCounters, SkipReason};
use futures::StreamExt;
use std::sync::Arc;
use tracing::{info, instrument};

/// The main orchestrator for the chat pipeline.
pub struct ChatOrchestrator {
    settings: Settings,
    prompts: Prompts,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn InsightStore>,
    gateway: Arc<dyn CompletionGateway>,
    rag: RagPipeline,
}

/// A started chat: the token stream plus per-request retrieval telemetry.
pub struct ChatOutcome {
    pub stream: TokenStream,
    pub insights_used: usize,
    pub skip_reason: Option<SkipReason>,
}

impl std::fmt::Debug for ChatOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatOutcome")
            .field("stream", &"<stream>")
            .field("insights_used", &self.insights_used)
            .field("skip_reason", &self.skip_reason)
            .finish()
    }
}

impl ChatOrchestrator {
    /// Create an orchestrator with default collaborators from settings.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(settings.prompts.custom_dir.as_deref())?;

        let client = create_client(settings.completion.api_key.as_deref());
        let embedder: Arc<dyn Embedder> = Arc::new(OpenAIEmbedder::new(
            client.clone(),
            &settings.embedding.model,
            settings.embedding.dimensions as usize,
        ));
        let store = build_store(&settings)?;
        let gateway: Arc<dyn CompletionGateway> = Arc::new(OpenAIGateway::new(client));

        Ok(Self::with_components(
            settings, prompts, embedder, store, gateway,
        ))
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn InsightStore>,
        gateway: Arc<dyn CompletionGateway>,
    ) -> Self {
        let rag = RagPipeline::new(
            embedder.clone(),
            store.clone(),
            settings.rag.clone(),
            &prompts.chat.evidence_instruction,
        );

        Self {
            settings,
            prompts,
            embedder,
            store,
            gateway,
            rag,
        }
    }

    /// Get a reference to the insight store.
    pub fn store(&self) -> Arc<dyn InsightStore> {
        self.store.clone()
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Process-lifetime retrieval counters.
    pub fn counters(&self) -> Arc<RetrievalCounters> {
        self.rag.counters()
    }

    /// Run one chat turn and open the response stream.
    #[instrument(skip(self, turn), fields(model = %turn.model))]
    pub async fn chat(&self, turn: ChatTurn) -> Result<ChatOutcome> {
        resolve_api_key(self.settings.completion.api_key.as_deref())?;
        self.check_model_allowed(&turn.model)?;

        let retrieval = self.rag.retrieve(&turn.messages).await;

        let messages = prompt::assemble(
            &self.prompts.chat.persona,
            &retrieval.context_block,
            &turn.messages,
        );

        let params = ModelParams {
            model: turn.model,
            temperature: turn.temperature,
        };
        let mut stream = self.gateway.complete(messages, &params).await?;

        // The upstream may report a request rejection as the first stream
        // item. Peek one token so rejections become translated faults for
        // the caller instead of an aborted stream.
        let stream: TokenStream = match stream.next().await {
            Some(Err(e)) => return Err(e),
            Some(Ok(token)) => {
                Box::pin(futures::stream::iter(std::iter::once(Ok(token))).chain(stream))
            }
            None => Box::pin(futures::stream::empty()),
        };

        info!(
            insights_used = retrieval.insights_used,
            "Chat stream started"
        );

        Ok(ChatOutcome {
            stream,
            insights_used: retrieval.insights_used,
            skip_reason: retrieval.skipped,
        })
    }

    /// Raw retrieval: embed a query and return the ranked insights.
    ///
    /// This is the standalone retrieval surface; unlike the chat path its
    /// errors are returned to the caller.
    #[instrument(skip(self, query))]
    pub async fn retrieve(&self, query: &str, limit: usize) -> Result<Vec<InsightRecord>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(RaadError::InvalidInput("Missing 'query' string".to_string()));
        }

        let embedding = self.embedder.embed(query).await?;
        self.store.search(&embedding, limit).await
    }

    fn check_model_allowed(&self, model: &str) -> Result<()> {
        let allowed = &self.settings.completion.allowed_models;
        if !allowed.is_empty() && !allowed.iter().any(|m| m == model) {
            return Err(RaadError::InvalidInput(format!(
                "Model '{}' is not allowed",
                model
            )));
        }
        Ok(())
    }
}

/// Select the insight store backend from configuration.
fn build_store(settings: &Settings) -> Result<Arc<dyn InsightStore>> {
    match settings.insights.provider.as_str() {
        "sqlite" => Ok(Arc::new(
            SqliteInsightStore::new(&settings.sqlite_path())?
                .with_min_similarity(settings.insights.min_similarity),
        )),
        "http" => Ok(Arc::new(HttpInsightStore::new(
            &settings.insights.endpoint,
            settings.insights.service_key.clone(),
        )?)),
        "memory" => Ok(Arc::new(
            MemoryInsightStore::new().with_min_similarity(settings.insights.min_similarity),
        )),
        other => Err(RaadError::Config(format!(
            "Unknown insight store provider: {}",
            other
        ))),
    }
}
