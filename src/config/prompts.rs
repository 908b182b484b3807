//! Prompt templates for Raad.
//!
//! Prompts can be customized by placing TOML files in the custom prompts
//! directory. They are versioned configuration owned by the deployment,
//! never caller-controllable.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Prompts {
    pub chat: ChatPrompts,
}

/// Prompts for the chat pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatPrompts {
    /// Persona and style rules appended after the retrieved context.
    pub persona: String,
    /// Instruction sentence placed before the evidence region.
    pub evidence_instruction: String,
}

impl Default for ChatPrompts {
    fn default() -> Self {
        Self {
            persona: r#"You are a residential home services operator. Be direct and practical.
Avoid fluff. If the question is vague, ask at most 2 surgical clarifiers, then answer."#
                .to_string(),

            evidence_instruction: "Use the insights below as primary evidence. \
Return a numbered operator playbook with concrete scripts, KPIs, and first-week actions. \
State assumptions briefly if data is missing. End with 3 risks and what to monitor."
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from defaults, with optional overrides from a custom directory.
    pub fn load(custom_dir: Option<&str>) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let chat_path = custom_path.join("chat.toml");
            if chat_path.exists() {
                let content = std::fs::read_to_string(&chat_path)?;
                prompts.chat = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(!prompts.chat.persona.is_empty());
        assert!(!prompts.chat.evidence_instruction.is_empty());
    }

    #[test]
    fn test_load_without_custom_dir_uses_defaults() {
        let prompts = Prompts::load(None).unwrap();
        assert_eq!(prompts.chat.persona, Prompts::default().chat.persona);
    }
}
