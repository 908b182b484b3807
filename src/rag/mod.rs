//! Retrieval-augmented generation: context retrieval, formatting, and
//! prompt assembly around the chat completion.

pub mod context;
pub mod pipeline;
pub mod prompt;

pub use pipeline::RagPipeline;

use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Why retrieval produced no context for a request.
///
/// Every reason is a degraded-but-successful outcome; none of them fail the
/// chat request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Retrieval is switched off for this deployment.
    Disabled,
    /// The history contains no user-authored text to search with.
    NoUserText,
    /// The embedding service was unreachable or returned malformed data.
    EmbeddingFailed,
    /// The insight store was unreachable or the query failed.
    StoreFailed,
    /// The query ran but nothing cleared the relevance floor.
    NoMatches,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            SkipReason::Disabled => "rag disabled",
            SkipReason::NoUserText => "no user text",
            SkipReason::EmbeddingFailed => "embedding failed",
            SkipReason::StoreFailed => "store failed",
            SkipReason::NoMatches => "no matches",
        };
        write!(f, "{}", reason)
    }
}

/// Result of the retrieval sub-pipeline for one request.
#[derive(Debug, Clone)]
pub struct RetrievalOutcome {
    /// Formatted context block; empty when retrieval was skipped.
    pub context_block: String,
    /// Number of insights included in the context block.
    pub insights_used: usize,
    /// Set when retrieval degraded to an empty context.
    pub skipped: Option<SkipReason>,
}

impl RetrievalOutcome {
    pub fn skipped(reason: SkipReason) -> Self {
        Self {
            context_block: String::new(),
            insights_used: 0,
            skipped: Some(reason),
        }
    }
}

/// Process-lifetime retrieval counters.
///
/// Individual requests succeed through retrieval outages; these counters are
/// how operators notice a systemic one.
#[derive(Debug, Default)]
pub struct RetrievalCounters {
    requests: AtomicU64,
    insights_used: AtomicU64,
    disabled: AtomicU64,
    no_user_text: AtomicU64,
    embedding_failed: AtomicU64,
    store_failed: AtomicU64,
    no_matches: AtomicU64,
}

/// Point-in-time view of [`RetrievalCounters`].
#[derive(Debug, Clone, Serialize)]
pub struct CountersSnapshot {
    pub requests: u64,
    pub insights_used: u64,
    pub disabled: u64,
    pub no_user_text: u64,
    pub embedding_failed: u64,
    pub store_failed: u64,
    pub no_matches: u64,
}

impl RetrievalCounters {
    pub fn record(&self, outcome: &RetrievalOutcome) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        self.insights_used
            .fetch_add(outcome.insights_used as u64, Ordering::Relaxed);
        let counter = match outcome.skipped {
            None => return,
            Some(SkipReason::Disabled) => &self.disabled,
            Some(SkipReason::NoUserText) => &self.no_user_text,
            Some(SkipReason::EmbeddingFailed) => &self.embedding_failed,
            Some(SkipReason::StoreFailed) => &self.store_failed,
            Some(SkipReason::NoMatches) => &self.no_matches,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CountersSnapshot {
        CountersSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            insights_used: self.insights_used.load(Ordering::Relaxed),
            disabled: self.disabled.load(Ordering::Relaxed),
            no_user_text: self.no_user_text.load(Ordering::Relaxed),
            embedding_failed: self.embedding_failed.load(Ordering::Relaxed),
            store_failed: self.store_failed.load(Ordering::Relaxed),
            no_matches: self.no_matches.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_record_skips_and_usage() {
        let counters = RetrievalCounters::default();
        counters.record(&RetrievalOutcome {
            context_block: "ctx".to_string(),
            insights_used: 3,
            skipped: None,
        });
        counters.record(&RetrievalOutcome::skipped(SkipReason::StoreFailed));
        counters.record(&RetrievalOutcome::skipped(SkipReason::NoMatches));

        let snapshot = counters.snapshot();
        assert_eq!(snapshot.requests, 3);
        assert_eq!(snapshot.insights_used, 3);
        assert_eq!(snapshot.store_failed, 1);
        assert_eq!(snapshot.no_matches, 1);
        assert_eq!(snapshot.embedding_failed, 0);
    }

    #[test]
    fn test_skip_reason_display() {
        assert_eq!(SkipReason::NoUserText.to_string(), "no user text");
        assert_eq!(SkipReason::EmbeddingFailed.to_string(), "embedding failed");
    }
}
