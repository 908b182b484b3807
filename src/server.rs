//! HTTP API for the chat and retrieval surfaces.
//!
//! `/chat` streams completion tokens as they arrive; `/retrieve` returns
//! ranked insights as JSON; `/health` reports store size and retrieval
//! counters. Failures are returned as `{message}` JSON with a status code
//! from the error translator.

use crate::chat::ChatRequest;
use crate::error::{translate, RaadError};
use crate::insights::InsightRecord;
use crate::orchestrator::ChatOrchestrator;
use crate::rag::CountersSnapshot;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use uuid::Uuid;

/// Shared application state.
pub struct AppState {
    orchestrator: ChatOrchestrator,
}

/// Build the API router around an orchestrator.
pub fn app(orchestrator: ChatOrchestrator) -> Router {
    let state = Arc::new(AppState { orchestrator });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/chat", post(chat))
        .route("/retrieve", post(retrieve))
        .layer(cors)
        .with_state(state)
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct RetrieveRequest {
    #[serde(default)]
    query: String,
    #[serde(default = "default_retrieve_limit")]
    limit: usize,
}

fn default_retrieve_limit() -> usize {
    5
}

#[derive(Serialize)]
struct RetrieveResponse {
    results: Vec<InsightRecord>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    rag_enabled: bool,
    insights: usize,
    retrieval: CountersSnapshot,
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

// === Handlers ===

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let insights = state
        .orchestrator
        .store()
        .count()
        .await
        .unwrap_or_default();

    Json(HealthResponse {
        status: "ok",
        rag_enabled: state.orchestrator.settings().rag.enabled,
        insights,
        retrieval: state.orchestrator.counters().snapshot(),
    })
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Response {
    let request_id = Uuid::new_v4();
    let completion = &state.orchestrator.settings().completion;

    let turn = match request.normalize(&completion.model, completion.temperature) {
        Ok(turn) => turn,
        Err(e) => return fault_response(&e),
    };

    info!(%request_id, model = %turn.model, "Chat request");

    match state.orchestrator.chat(turn).await {
        Ok(outcome) => {
            let mut headers = HeaderMap::new();
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            );
            headers.insert(
                HeaderName::from_static("x-insights-used"),
                HeaderValue::from_str(&outcome.insights_used.to_string())
                    .unwrap_or_else(|_| HeaderValue::from_static("0")),
            );
            if let Some(reason) = outcome.skip_reason {
                if let Ok(value) = HeaderValue::from_str(&reason.to_string()) {
                    headers.insert(HeaderName::from_static("x-retrieval-skipped"), value);
                }
            }

            // Relay tokens as they arrive. A terminal Err item aborts the
            // connection so the caller sees the interruption rather than a
            // silently truncated answer.
            (headers, Body::from_stream(outcome.stream)).into_response()
        }
        Err(e) => {
            warn!(%request_id, "Chat request failed: {}", e);
            fault_response(&e)
        }
    }
}

async fn retrieve(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RetrieveRequest>,
) -> Response {
    match state
        .orchestrator
        .retrieve(&request.query, request.limit)
        .await
    {
        Ok(results) => Json(RetrieveResponse { results }).into_response(),
        Err(e) => {
            warn!("Retrieval request failed: {}", e);
            fault_response(&e)
        }
    }
}

fn fault_response(err: &RaadError) -> Response {
    let fault = translate(err);
    let status =
        StatusCode::from_u16(fault.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(ErrorBody {
            message: fault.message,
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_response_maps_translated_status() {
        let response = fault_response(&RaadError::Completion {
            code: None,
            message: "Incorrect API key provided".to_string(),
        });
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = fault_response(&RaadError::CredentialMissing("OpenAI".to_string()));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = fault_response(&RaadError::InsightStore("down".to_string()));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
