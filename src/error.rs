//! Error types for Raad, and the translation layer that turns internal
//! failures into stable caller-facing faults.

use thiserror::Error;

/// Library-level error type for Raad operations.
#[derive(Error, Debug)]
pub enum RaadError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0} API key not found")]
    CredentialMissing(String),

    #[error("Cannot embed empty input")]
    EmptyInput,

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Insight store error: {0}")]
    InsightStore(String),

    #[error("Completion failed: {message}")]
    Completion {
        /// Structured error code reported by the upstream, when present.
        code: Option<String>,
        message: String,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Result type alias for Raad operations.
pub type Result<T> = std::result::Result<T, RaadError>;

/// A caller-facing fault: an HTTP-style status code and a stable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiFault {
    pub status: u16,
    pub message: String,
}

const MSG_KEY_MISSING: &str =
    "OpenAI API key not found. Please set it in your profile settings.";
const MSG_KEY_INCORRECT: &str =
    "OpenAI API key is incorrect. Please fix it in your profile settings.";

/// Fallback classification rules applied to upstream error text.
///
/// Matching on message text is brittle; it is kept as a last resort behind
/// structured error codes, and lives only here.
const FALLBACK_RULES: &[(&str, u16, &str)] = &[
    ("api key not found", 400, MSG_KEY_MISSING),
    ("incorrect api key", 401, MSG_KEY_INCORRECT),
    ("invalid_api_key", 401, MSG_KEY_INCORRECT),
];

/// Translate an internal error into a caller-facing fault.
///
/// Credential and completion failures keep their actionable messages and
/// upstream-derived status codes; anything else degrades to a generic 500.
pub fn translate(err: &RaadError) -> ApiFault {
    match err {
        RaadError::CredentialMissing(_) => ApiFault {
            status: 400,
            message: MSG_KEY_MISSING.to_string(),
        },
        RaadError::Completion { code, message } => {
            // Structured code first, text matching only as a fallback.
            if let Some(code) = code {
                if let Some(fault) = match_rules(code) {
                    return fault;
                }
            }
            match_rules(message).unwrap_or(ApiFault {
                status: 500,
                message: message.clone(),
            })
        }
        RaadError::InvalidInput(msg) => ApiFault {
            status: 400,
            message: msg.clone(),
        },
        other => ApiFault {
            status: 500,
            message: other.to_string(),
        },
    }
}

fn match_rules(text: &str) -> Option<ApiFault> {
    let lowered = text.to_lowercase();
    FALLBACK_RULES
        .iter()
        .find(|(needle, _, _)| lowered.contains(needle))
        .map(|(_, status, message)| ApiFault {
            status: *status,
            message: message.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credential_is_actionable() {
        let fault = translate(&RaadError::CredentialMissing("OpenAI".to_string()));
        assert_eq!(fault.status, 400);
        assert!(fault.message.contains("profile settings"));
    }

    #[test]
    fn test_incorrect_api_key_keeps_unauthorized_status() {
        let fault = translate(&RaadError::Completion {
            code: None,
            message: "Incorrect API key provided: sk-foo".to_string(),
        });
        assert_eq!(fault.status, 401);
        assert!(fault.message.contains("incorrect"));
        assert!(fault.message.contains("profile settings"));
    }

    #[test]
    fn test_structured_code_beats_message_text() {
        let fault = translate(&RaadError::Completion {
            code: Some("invalid_api_key".to_string()),
            message: "something opaque from upstream".to_string(),
        });
        assert_eq!(fault.status, 401);
        assert_eq!(fault.message, MSG_KEY_INCORRECT);
    }

    #[test]
    fn test_unknown_upstream_failure_defaults_to_500() {
        let fault = translate(&RaadError::Completion {
            code: Some("rate_limit_exceeded".to_string()),
            message: "Rate limit reached".to_string(),
        });
        assert_eq!(fault.status, 500);
        assert_eq!(fault.message, "Rate limit reached");
    }

    #[test]
    fn test_invalid_input_is_bad_request() {
        let fault = translate(&RaadError::InvalidInput("Missing 'query' string".to_string()));
        assert_eq!(fault.status, 400);
        assert_eq!(fault.message, "Missing 'query' string");
    }

    #[test]
    fn test_retrieval_errors_never_leak_as_credentials() {
        // Store/embedding failures are normally swallowed by the pipeline;
        // if one ever reaches the translator it is a plain 500.
        let fault = translate(&RaadError::InsightStore("connection refused".to_string()));
        assert_eq!(fault.status, 500);
    }
}
