//! OpenAI streaming completion implementation.

use super::{max_output_tokens, CompletionGateway, ModelParams, TokenStream};
use crate::chat::{ChatMessage, Role};
use crate::error::{Result, RaadError};
use async_openai::error::OpenAIError;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use futures::StreamExt;
use tracing::{debug, instrument};

/// OpenAI-backed completion gateway.
pub struct OpenAIGateway {
    client: Client<OpenAIConfig>,
}

impl OpenAIGateway {
    pub fn new(client: Client<OpenAIConfig>) -> Self {
        Self { client }
    }
}

fn to_request_message(message: &ChatMessage) -> Result<ChatCompletionRequestMessage> {
    let converted = match message.role {
        Role::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(message.content.clone())
            .build()
            .map(Into::into),
        Role::User => ChatCompletionRequestUserMessageArgs::default()
            .content(message.content.clone())
            .build()
            .map(Into::into),
        Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
            .content(message.content.clone())
            .build()
            .map(Into::into),
    };
    converted.map_err(|e| RaadError::InvalidInput(format!("Invalid message: {}", e)))
}

fn map_openai_error(err: OpenAIError) -> RaadError {
    match err {
        OpenAIError::ApiError(api) => RaadError::Completion {
            code: api.code.clone(),
            message: api.message,
        },
        other => RaadError::Completion {
            code: None,
            message: other.to_string(),
        },
    }
}

#[async_trait]
impl CompletionGateway for OpenAIGateway {
    #[instrument(skip(self, messages), fields(model = %params.model, count = messages.len()))]
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        params: &ModelParams,
    ) -> Result<TokenStream> {
        let request_messages = messages
            .iter()
            .map(to_request_message)
            .collect::<Result<Vec<_>>>()?;

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder
            .model(&params.model)
            .messages(request_messages)
            .temperature(params.temperature);
        if let Some(cap) = max_output_tokens(&params.model) {
            builder.max_tokens(cap);
        }
        let request = builder
            .build()
            .map_err(|e| RaadError::InvalidInput(format!("Invalid completion request: {}", e)))?;

        let stream = self
            .client
            .chat()
            .create_stream(request)
            .await
            .map_err(map_openai_error)?;

        debug!("Completion stream opened");

        // Forward content deltas in arrival order; a mid-stream upstream
        // error becomes a terminal Err item for the caller.
        let tokens = stream.filter_map(|chunk| async move {
            match chunk {
                Ok(response) => response
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|choice| choice.delta.content)
                    .filter(|token| !token.is_empty())
                    .map(Ok),
                Err(e) => Some(Err(map_openai_error(e))),
            }
        });

        Ok(Box::pin(tokens))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_openai::error::ApiError;

    #[test]
    fn test_role_conversion() {
        let system = to_request_message(&ChatMessage::system("rules")).unwrap();
        assert!(matches!(system, ChatCompletionRequestMessage::System(_)));

        let user = to_request_message(&ChatMessage::user("question")).unwrap();
        assert!(matches!(user, ChatCompletionRequestMessage::User(_)));

        let assistant = to_request_message(&ChatMessage::assistant("answer")).unwrap();
        assert!(matches!(
            assistant,
            ChatCompletionRequestMessage::Assistant(_)
        ));
    }

    #[test]
    fn test_api_error_keeps_structured_code() {
        let err = map_openai_error(OpenAIError::ApiError(ApiError {
            message: "Incorrect API key provided".to_string(),
            r#type: Some("invalid_request_error".to_string()),
            param: None,
            code: Some("invalid_api_key".to_string()),
        }));

        match err {
            RaadError::Completion { code, message } => {
                assert_eq!(code.as_deref(), Some("invalid_api_key"));
                assert!(message.contains("Incorrect API key"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_non_api_error_has_no_code() {
        let err = map_openai_error(OpenAIError::InvalidArgument("connection reset".to_string()));
        match err {
            RaadError::Completion { code, message } => {
                assert!(code.is_none());
                assert!(message.contains("connection reset"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
