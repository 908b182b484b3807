//! Configuration management.

mod prompts;
mod settings;

pub use prompts::{ChatPrompts, Prompts};
pub use settings::{
    CompletionSettings, EmbeddingSettings, GeneralSettings, InsightSettings, PromptSettings,
    RagSettings, ServerSettings, Settings, TruncationLimits,
};
