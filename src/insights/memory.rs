//! In-memory insight store implementation.
//!
//! Useful for testing and small datasets.

use super::{cosine_similarity, InsightRecord, InsightStore, StoredInsight};
use crate::error::{Result, RaadError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory insight store.
#[derive(Debug)]
pub struct MemoryInsightStore {
    insights: RwLock<HashMap<i64, StoredInsight>>,
    min_similarity: f64,
}

impl MemoryInsightStore {
    /// Create a new in-memory insight store with no relevance floor.
    pub fn new() -> Self {
        Self {
            insights: RwLock::new(HashMap::new()),
            min_similarity: 0.0,
        }
    }

    /// Set the minimum similarity below which matches are dropped.
    pub fn with_min_similarity(mut self, min_similarity: f64) -> Self {
        self.min_similarity = min_similarity;
        self
    }

    /// Insert an insight. Used by tests and external indexing jobs.
    pub fn insert(&self, insight: StoredInsight) -> Result<()> {
        let mut insights = self
            .insights
            .write()
            .map_err(|e| RaadError::InsightStore(format!("Failed to acquire lock: {}", e)))?;
        insights.insert(insight.id, insight);
        Ok(())
    }
}

impl Default for MemoryInsightStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InsightStore for MemoryInsightStore {
    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<InsightRecord>> {
        let insights = self
            .insights
            .read()
            .map_err(|e| RaadError::InsightStore(format!("Failed to acquire lock: {}", e)))?;

        let mut results: Vec<InsightRecord> = insights
            .values()
            .map(|insight| {
                let similarity = cosine_similarity(query_embedding, &insight.embedding);
                insight.to_record(similarity)
            })
            .filter(|r| r.similarity >= self.min_similarity)
            .collect();

        results.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(limit);

        Ok(results)
    }

    async fn count(&self) -> Result<usize> {
        let insights = self
            .insights
            .read()
            .map_err(|e| RaadError::InsightStore(format!("Failed to acquire lock: {}", e)))?;
        Ok(insights.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_store() -> MemoryInsightStore {
        let store = MemoryInsightStore::new();
        store
            .insert(StoredInsight::new(1, "exact match", vec![1.0, 0.0, 0.0]))
            .unwrap();
        store
            .insert(StoredInsight::new(2, "orthogonal", vec![0.0, 1.0, 0.0]))
            .unwrap();
        store
            .insert(StoredInsight::new(3, "close match", vec![0.9, 0.1, 0.0]))
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_search_ranks_by_descending_similarity() {
        let store = seeded_store();
        let results = store.search(&[1.0, 0.0, 0.0], 10).await.unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].id, 1);
        assert_eq!(results[1].id, 3);
        assert!(results[0].similarity >= results[1].similarity);
        assert!(results[1].similarity >= results[2].similarity);
    }

    #[tokio::test]
    async fn test_search_respects_limit_and_floor() {
        let store = seeded_store().with_min_similarity(0.5);
        let results = store.search(&[1.0, 0.0, 0.0], 1).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, 1);

        // Orthogonal vector clears nothing above the floor.
        let results = store.search(&[0.0, 0.0, 1.0], 10).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_empty_store_returns_empty_not_error() {
        let store = MemoryInsightStore::new();
        let results = store.search(&[1.0, 0.0, 0.0], 5).await.unwrap();
        assert!(results.is_empty());
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
