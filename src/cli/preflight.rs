//! Pre-flight checks before operations that call upstream services.

use crate::config::Settings;
use crate::error::Result;
use crate::openai::resolve_api_key;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Chat requires an API key for embeddings and completion.
    Chat,
    /// Search requires an API key for the query embedding.
    Search,
}

/// Run pre-flight checks for the given operation.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Chat | Operation::Search => {
            resolve_api_key(settings.completion.api_key.as_deref())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_key_passes() {
        let mut settings = Settings::default();
        settings.completion.api_key = Some("sk-test".to_string());
        assert!(check(Operation::Chat, &settings).is_ok());
        assert!(check(Operation::Search, &settings).is_ok());
    }
}
