//! Raad - Insight-Grounded Streaming Chat
//!
//! A chat completion service that grounds LLM answers in a vector-indexed
//! knowledge base of operator "insights", streaming tokens back as they
//! arrive.
//!
//! The name "Raad" comes from the Norwegian word for "advice."
//!
//! # Overview
//!
//! Raad lets you:
//! - Serve a streaming chat endpoint whose answers are backed by retrieved
//!   evidence from your insight base
//! - Query the insight base directly by semantic similarity
//! - Degrade gracefully: a retrieval outage never blocks the chat path
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `chat` - Conversation types and request normalization
//! - `embedding` - Embedding generation
//! - `insights` - Insight store abstraction (memory, SQLite, HTTP)
//! - `rag` - Context retrieval, formatting, and prompt assembly
//! - `completion` - Streaming chat completion gateway
//! - `orchestrator` - Request coordination
//! - `server` - HTTP API
//!
//! # Example
//!
//! ```rust,no_run
//! use raad::chat::ChatRequest;
//! use raad::config::Settings;
//! use raad::orchestrator::ChatOrchestrator;
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let model = settings.completion.model.clone();
//!     let temperature = settings.completion.temperature;
//!     let orchestrator = ChatOrchestrator::new(settings)?;
//!
//!     let request = ChatRequest {
//!         query: Some("How do I raise close rate?".to_string()),
//!         ..Default::default()
//!     };
//!     let mut outcome = orchestrator
//!         .chat(request.normalize(&model, temperature)?)
//!         .await?;
//!
//!     while let Some(token) = outcome.stream.next().await {
//!         print!("{}", token?);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod chat;
pub mod cli;
pub mod completion;
pub mod config;
pub mod embedding;
pub mod error;
pub mod insights;
pub mod openai;
pub mod orchestrator;
pub mod rag;
pub mod server;

pub use error::{RaadError, Result};
