//! Insight store abstraction.
//!
//! Provides a trait-based interface over the vector-indexed knowledge base
//! of operator insights, with in-memory, SQLite, and remote HTTP backends.

mod http;
mod memory;
mod sqlite;

pub use http::HttpInsightStore;
pub use memory::MemoryInsightStore;
pub use sqlite::SqliteInsightStore;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};

/// A knowledge record returned by a similarity search, ranked by relevance.
///
/// Any optional field may be absent or empty; absent fields are omitted from
/// formatted output entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightRecord {
    pub id: i64,
    /// Similarity to the query (higher is more relevant). A missing or
    /// non-numeric value deserializes as 0.0 instead of failing the record.
    #[serde(default, deserialize_with = "lenient_similarity")]
    pub similarity: f64,
    #[serde(default)]
    pub primary_tag: Option<String>,
    #[serde(default)]
    pub secondary_tag: Option<String>,
    #[serde(default)]
    pub tertiary_tag: Option<String>,
    pub problem_statement: String,
    #[serde(default)]
    pub solution_given: Option<String>,
    #[serde(default)]
    pub implementation_steps: Option<String>,
    #[serde(default)]
    pub financial_impact: Option<String>,
    #[serde(default)]
    pub power_quote: Option<String>,
    #[serde(default)]
    pub business_context: Option<String>,
    #[serde(default)]
    pub priority_level: Option<String>,
}

fn lenient_similarity<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    })
}

/// An insight as written into a local index, with its embedding.
///
/// Index maintenance belongs to external indexing jobs; the local store
/// adapters only expose inserts for those jobs and for tests.
#[derive(Debug, Clone)]
pub struct StoredInsight {
    pub id: i64,
    pub primary_tag: Option<String>,
    pub secondary_tag: Option<String>,
    pub tertiary_tag: Option<String>,
    pub problem_statement: String,
    pub solution_given: Option<String>,
    pub implementation_steps: Option<String>,
    pub financial_impact: Option<String>,
    pub power_quote: Option<String>,
    pub business_context: Option<String>,
    pub priority_level: Option<String>,
    pub embedding: Vec<f32>,
}

impl StoredInsight {
    /// Minimal constructor for tests and seeding jobs.
    pub fn new(id: i64, problem_statement: &str, embedding: Vec<f32>) -> Self {
        Self {
            id,
            primary_tag: None,
            secondary_tag: None,
            tertiary_tag: None,
            problem_statement: problem_statement.to_string(),
            solution_given: None,
            implementation_steps: None,
            financial_impact: None,
            power_quote: None,
            business_context: None,
            priority_level: None,
            embedding,
        }
    }

    /// Build the ranked record for this insight at a given similarity.
    pub fn to_record(&self, similarity: f64) -> InsightRecord {
        InsightRecord {
            id: self.id,
            similarity,
            primary_tag: self.primary_tag.clone(),
            secondary_tag: self.secondary_tag.clone(),
            tertiary_tag: self.tertiary_tag.clone(),
            problem_statement: self.problem_statement.clone(),
            solution_given: self.solution_given.clone(),
            implementation_steps: self.implementation_steps.clone(),
            financial_impact: self.financial_impact.clone(),
            power_quote: self.power_quote.clone(),
            business_context: self.business_context.clone(),
            priority_level: self.priority_level.clone(),
        }
    }
}

/// Trait for insight store implementations.
///
/// Zero matches above the store's relevance floor is a normal outcome and
/// returns an empty sequence, never an error.
#[async_trait]
pub trait InsightStore: Send + Sync + std::fmt::Debug {
    /// Search for the most similar insights, ordered by descending similarity.
    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<InsightRecord>>;

    /// Total number of stored insights.
    async fn count(&self) -> Result<usize>;
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f64 = a.iter().zip(b.iter()).map(|(x, y)| (x * y) as f64).sum();
    let norm_a: f64 = a.iter().map(|x| (x * x) as f64).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (x * x) as f64).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!(cosine_similarity(&a, &c).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);

        assert_eq!(cosine_similarity(&a, &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn test_record_deserializes_with_minimal_fields() {
        let record: InsightRecord = serde_json::from_str(
            r#"{"id": 1, "similarity": 0.91, "problem_statement": "Low close rate"}"#,
        )
        .unwrap();
        assert_eq!(record.id, 1);
        assert!((record.similarity - 0.91).abs() < 1e-9);
        assert!(record.solution_given.is_none());
    }

    #[test]
    fn test_non_numeric_similarity_becomes_zero() {
        let record: InsightRecord = serde_json::from_str(
            r#"{"id": 2, "similarity": "n/a", "problem_statement": "p"}"#,
        )
        .unwrap();
        assert_eq!(record.similarity, 0.0);

        let record: InsightRecord = serde_json::from_str(
            r#"{"id": 3, "similarity": null, "problem_statement": "p"}"#,
        )
        .unwrap();
        assert_eq!(record.similarity, 0.0);

        let record: InsightRecord =
            serde_json::from_str(r#"{"id": 4, "problem_statement": "p"}"#).unwrap();
        assert_eq!(record.similarity, 0.0);
    }

    #[test]
    fn test_numeric_string_similarity_is_parsed() {
        let record: InsightRecord = serde_json::from_str(
            r#"{"id": 5, "similarity": "0.42", "problem_statement": "p"}"#,
        )
        .unwrap();
        assert!((record.similarity - 0.42).abs() < 1e-9);
    }
}
