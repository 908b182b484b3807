//! Streaming chat completion gateway.

mod openai;

pub use openai::OpenAIGateway;

use crate::chat::ChatMessage;
use crate::error::Result;
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

/// Sampling parameters for one completion call.
#[derive(Debug, Clone)]
pub struct ModelParams {
    pub model: String,
    pub temperature: f32,
}

/// Per-model output-token cap.
///
/// Vision-capable and newer-generation models get a fixed larger cap; other
/// models leave the cap unset and inherit the upstream default.
struct ModelCap {
    model: &'static str,
    max_output_tokens: u32,
}

const OUTPUT_TOKEN_CAPS: &[ModelCap] = &[
    ModelCap {
        model: "gpt-4-vision-preview",
        max_output_tokens: 4096,
    },
    ModelCap {
        model: "gpt-4o",
        max_output_tokens: 4096,
    },
];

/// Look up the output-token cap for a model, if one applies.
pub fn max_output_tokens(model: &str) -> Option<u32> {
    OUTPUT_TOKEN_CAPS
        .iter()
        .find(|cap| cap.model == model)
        .map(|cap| cap.max_output_tokens)
}

/// An ordered stream of response tokens.
///
/// An `Err` item is terminal: the upstream failed mid-stream and no further
/// tokens will arrive.
pub type TokenStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Trait for streaming completion backends.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    /// Start a streaming completion over the assembled message sequence.
    ///
    /// Tokens are relayed as they arrive, in order, without buffering the
    /// full response. Fails with a `Completion` error carrying the upstream
    /// code/message when the request is rejected.
    async fn complete(&self, messages: Vec<ChatMessage>, params: &ModelParams)
        -> Result<TokenStream>;
}
