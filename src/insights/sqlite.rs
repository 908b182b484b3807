//! SQLite-based insight store implementation.
//!
//! Uses SQLite with cosine similarity computed in Rust for simplicity.
//! For large indexes, consider the sqlite-vec extension or a dedicated
//! vector database behind the HTTP adapter.

use super::{cosine_similarity, InsightRecord, InsightStore, StoredInsight};
use crate::error::{Result, RaadError};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;
use tracing::{info, instrument, warn};

/// SQLite-based insight store.
#[derive(Debug)]
pub struct SqliteInsightStore {
    conn: Mutex<Connection>,
    min_similarity: f64,
}

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS insights (
        id INTEGER PRIMARY KEY,
        primary_tag TEXT,
        secondary_tag TEXT,
        tertiary_tag TEXT,
        problem_statement TEXT NOT NULL,
        solution_given TEXT,
        implementation_steps TEXT,
        financial_impact TEXT,
        power_quote TEXT,
        business_context TEXT,
        priority_level TEXT,
        embedding BLOB NOT NULL,
        indexed_at TEXT NOT NULL
    );
"#;

impl SqliteInsightStore {
    /// Open (or create) an insight store at the given path.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // WAL for better concurrent read performance
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite insight store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
            min_similarity: 0.0,
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
            min_similarity: 0.0,
        })
    }

    /// Set the minimum similarity below which matches are dropped.
    pub fn with_min_similarity(mut self, min_similarity: f64) -> Self {
        self.min_similarity = min_similarity;
        self
    }

    /// Insert an insight. Used by tests and external indexing jobs.
    pub fn insert(&self, insight: &StoredInsight) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RaadError::InsightStore(format!("Failed to acquire lock: {}", e)))?;

        conn.execute(
            r#"
            INSERT OR REPLACE INTO insights
            (id, primary_tag, secondary_tag, tertiary_tag, problem_statement,
             solution_given, implementation_steps, financial_impact, power_quote,
             business_context, priority_level, embedding, indexed_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
            params![
                insight.id,
                insight.primary_tag,
                insight.secondary_tag,
                insight.tertiary_tag,
                insight.problem_statement,
                insight.solution_given,
                insight.implementation_steps,
                insight.financial_impact,
                insight.power_quote,
                insight.business_context,
                insight.priority_level,
                Self::embedding_to_bytes(&insight.embedding),
                Utc::now().to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    /// Serialize embedding to bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize embedding from bytes.
    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                f32::from_le_bytes(arr)
            })
            .collect()
    }
}

#[async_trait]
impl InsightStore for SqliteInsightStore {
    #[instrument(skip(self, query_embedding))]
    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<InsightRecord>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RaadError::InsightStore(format!("Failed to acquire lock: {}", e)))?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, primary_tag, secondary_tag, tertiary_tag, problem_statement,
                   solution_given, implementation_steps, financial_impact, power_quote,
                   business_context, priority_level, embedding
            FROM insights
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            let embedding: Vec<u8> = row.get(11)?;
            Ok(StoredInsight {
                id: row.get(0)?,
                primary_tag: row.get(1)?,
                secondary_tag: row.get(2)?,
                tertiary_tag: row.get(3)?,
                problem_statement: row.get(4)?,
                solution_given: row.get(5)?,
                implementation_steps: row.get(6)?,
                financial_impact: row.get(7)?,
                power_quote: row.get(8)?,
                business_context: row.get(9)?,
                priority_level: row.get(10)?,
                embedding: Self::bytes_to_embedding(&embedding),
            })
        })?;

        let mut results = Vec::new();
        for row in rows {
            // One malformed row must not block the rest of the set.
            let insight = match row {
                Ok(insight) => insight,
                Err(e) => {
                    warn!("Skipping malformed insight row: {}", e);
                    continue;
                }
            };
            let similarity = cosine_similarity(query_embedding, &insight.embedding);
            if similarity >= self.min_similarity {
                results.push(insight.to_record(similarity));
            }
        }

        results.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(limit);

        Ok(results)
    }

    async fn count(&self) -> Result<usize> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RaadError::InsightStore(format!("Failed to acquire lock: {}", e)))?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM insights", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
