//! Remote insight store implementation.
//!
//! Talks to a server-side matching endpoint that runs the similarity query
//! next to the index (e.g. a database RPC exposed over HTTP). The endpoint
//! receives `{query_embedding, match_limit}` and returns a JSON array of
//! ranked insight records.

use super::{InsightRecord, InsightStore};
use crate::error::{Result, RaadError};
use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, instrument, warn};

/// HTTP-backed insight store.
#[derive(Debug)]
pub struct HttpInsightStore {
    client: reqwest::Client,
    endpoint: String,
    service_key: Option<String>,
}

#[derive(Serialize)]
struct MatchRequest<'a> {
    query_embedding: &'a [f32],
    match_limit: usize,
}

impl HttpInsightStore {
    /// Create a store querying the given matching endpoint.
    ///
    /// `service_key` is sent as a bearer token; the matching service runs
    /// with service-role access and must never be exposed to callers.
    pub fn new(endpoint: &str, service_key: Option<String>) -> Result<Self> {
        if endpoint.is_empty() {
            return Err(RaadError::Config(
                "Insight store endpoint is not configured".to_string(),
            ));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.to_string(),
            service_key,
        })
    }
}

#[async_trait]
impl InsightStore for HttpInsightStore {
    #[instrument(skip(self, query_embedding))]
    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<InsightRecord>> {
        let mut request = self.client.post(&self.endpoint).json(&MatchRequest {
            query_embedding,
            match_limit: limit,
        });
        if let Some(key) = &self.service_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| RaadError::InsightStore(format!("Match request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RaadError::InsightStore(format!(
                "Match endpoint returned {}",
                status
            )));
        }

        let values: Vec<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| RaadError::InsightStore(format!("Malformed match response: {}", e)))?;

        // Decode per element; one malformed record is dropped, not fatal.
        let mut records = Vec::with_capacity(values.len());
        for value in values {
            match serde_json::from_value::<InsightRecord>(value) {
                Ok(record) => records.push(record),
                Err(e) => warn!("Skipping malformed insight record: {}", e),
            }
        }

        // The service returns ranked results; enforce the ordering contract
        // anyway so a misbehaving deployment cannot scramble the context.
        records.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        records.truncate(limit);

        debug!("Match endpoint returned {} records", records.len());
        Ok(records)
    }

    async fn count(&self) -> Result<usize> {
        // The matching service does not expose a count; report unknown as 0.
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_endpoint_is_a_config_error() {
        let err = HttpInsightStore::new("", None).unwrap_err();
        assert!(matches!(err, RaadError::Config(_)));
    }

    #[test]
    fn test_mixed_response_drops_only_bad_records() {
        // Mirrors the per-element decode in search().
        let values: Vec<serde_json::Value> = serde_json::from_str(
            r#"[
                {"id": 1, "similarity": 0.9, "problem_statement": "good"},
                {"similarity": 0.8},
                {"id": 3, "similarity": "bad", "problem_statement": "lenient"}
            ]"#,
        )
        .unwrap();

        let records: Vec<InsightRecord> = values
            .into_iter()
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, 1);
        assert_eq!(records[1].id, 3);
        assert_eq!(records[1].similarity, 0.0);
    }
}
