//! OpenAI client configuration with sensible defaults.
//!
//! A single client is constructed per process and shared by the embedder
//! and the completion gateway.

use crate::error::{Result, RaadError};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Default timeout for OpenAI API requests (5 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Create an OpenAI client with configured timeout.
///
/// Uses a 5-minute timeout by default to prevent hung API calls. When
/// `api_key` is None the key is read from the `OPENAI_API_KEY` environment
/// variable by the underlying client.
pub fn create_client(api_key: Option<&str>) -> Client<OpenAIConfig> {
    create_client_with_timeout(api_key, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
}

/// Create an OpenAI client with a custom timeout.
pub fn create_client_with_timeout(
    api_key: Option<&str>,
    timeout: Duration,
) -> Client<OpenAIConfig> {
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .expect("Failed to create HTTP client");

    let mut config = OpenAIConfig::default();
    if let Some(key) = api_key {
        config = config.with_api_key(key);
    }

    Client::with_config(config).with_http_client(http_client)
}

/// Resolve the API key from configuration or the environment.
///
/// Fails with `CredentialMissing` before any upstream call is attempted.
pub fn resolve_api_key(configured: Option<&str>) -> Result<String> {
    if let Some(key) = configured.filter(|k| !k.is_empty()) {
        return Ok(key.to_string());
    }
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(key),
        _ => Err(RaadError::CredentialMissing("OpenAI".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_key_wins() {
        let key = resolve_api_key(Some("sk-configured")).unwrap();
        assert_eq!(key, "sk-configured");
    }

    #[test]
    fn test_empty_configured_key_is_not_a_credential() {
        // Falls through to the environment; with the variable unset this
        // must classify as a missing credential.
        std::env::remove_var("OPENAI_API_KEY");
        let err = resolve_api_key(Some("")).unwrap_err();
        assert!(matches!(err, RaadError::CredentialMissing(_)));
    }
}
