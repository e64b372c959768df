//! Enrichment cache: enriched jobs keyed by normalized job title.
//!
//! Every record is stored as its own document, id `{title}_{index}`, tagged
//! with the normalized title. Writes are first-writer-wins per title: the
//! `{title}_0` document acts as the claim, and a writer that loses the claim
//! leaves the existing set untouched. Entries never expire, but a set holding
//! a malformed document is evicted on lookup so the title can be cached again.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::models::job::EnrichedJob;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result of a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    Stored,
    /// Another writer already cached this title; nothing was written.
    AlreadyCached,
}

#[async_trait]
pub trait EnrichmentCache: Send + Sync {
    /// Cached jobs for `title`, in stored order. A miss is an empty `Vec`.
    async fn get(&self, title: &str) -> Result<Vec<EnrichedJob>, CacheError>;

    /// Stores `jobs` under `title` unless the title is already cached.
    async fn put_if_absent(&self, title: &str, jobs: &[EnrichedJob])
        -> Result<PutOutcome, CacheError>;
}

/// Trimmed and lower-cased; the only form titles take inside the cache.
pub fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

fn document_id(key: &str, index: usize) -> String {
    format!("{key}_{index}")
}

/// Decodes stored documents. One malformed document fails the whole set.
fn decode_documents(documents: &[String]) -> Result<Vec<EnrichedJob>, serde_json::Error> {
    documents
        .iter()
        .map(|doc| serde_json::from_str::<EnrichedJob>(doc))
        .collect()
}

/// Postgres-backed cache over the `enriched_jobs` table.
#[derive(Clone)]
pub struct PgEnrichmentCache {
    pool: PgPool,
}

impl PgEnrichmentCache {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EnrichmentCache for PgEnrichmentCache {
    async fn get(&self, title: &str) -> Result<Vec<EnrichedJob>, CacheError> {
        let key = normalize_title(title);
        let documents: Vec<String> = sqlx::query_scalar(
            "SELECT document FROM enriched_jobs WHERE job_title = $1 ORDER BY position",
        )
        .bind(&key)
        .fetch_all(&self.pool)
        .await?;

        match decode_documents(&documents) {
            Ok(jobs) => Ok(jobs),
            Err(e) => {
                warn!("Malformed cached document for '{key}', evicting entry: {e}");
                sqlx::query("DELETE FROM enriched_jobs WHERE job_title = $1")
                    .bind(&key)
                    .execute(&self.pool)
                    .await?;
                Ok(Vec::new())
            }
        }
    }

    async fn put_if_absent(
        &self,
        title: &str,
        jobs: &[EnrichedJob],
    ) -> Result<PutOutcome, CacheError> {
        let key = normalize_title(title);
        if jobs.is_empty() {
            return Ok(PutOutcome::Stored);
        }

        let mut tx = self.pool.begin().await?;
        for (index, job) in jobs.iter().enumerate() {
            let document = serde_json::to_string(job)?;
            let result = sqlx::query(
                r#"
                INSERT INTO enriched_jobs (id, job_title, position, document)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .bind(document_id(&key, index))
            .bind(&key)
            .bind(index as i32)
            .bind(document)
            .execute(&mut *tx)
            .await?;

            // Losing the claim on `{title}_0` means another writer got there first.
            if index == 0 && result.rows_affected() == 0 {
                tx.rollback().await?;
                info!("Enrichment cache already holds '{key}', keeping existing entry");
                return Ok(PutOutcome::AlreadyCached);
            }
        }
        tx.commit().await?;

        info!("Cached {} enriched job(s) for '{key}'", jobs.len());
        Ok(PutOutcome::Stored)
    }
}

/// In-process cache, keyed by normalized title, holding serialized documents.
#[derive(Default)]
pub struct MemoryEnrichmentCache {
    entries: RwLock<HashMap<String, Vec<String>>>,
}

impl MemoryEnrichmentCache {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn insert_raw(&self, title: &str, documents: Vec<String>) {
        self.entries
            .write()
            .await
            .insert(normalize_title(title), documents);
    }
}

#[async_trait]
impl EnrichmentCache for MemoryEnrichmentCache {
    async fn get(&self, title: &str) -> Result<Vec<EnrichedJob>, CacheError> {
        let key = normalize_title(title);
        let mut entries = self.entries.write().await;
        let Some(documents) = entries.get(&key) else {
            return Ok(Vec::new());
        };
        match decode_documents(documents) {
            Ok(jobs) => Ok(jobs),
            Err(e) => {
                warn!("Malformed cached document for '{key}', evicting entry: {e}");
                entries.remove(&key);
                Ok(Vec::new())
            }
        }
    }

    async fn put_if_absent(
        &self,
        title: &str,
        jobs: &[EnrichedJob],
    ) -> Result<PutOutcome, CacheError> {
        let key = normalize_title(title);
        if jobs.is_empty() {
            return Ok(PutOutcome::Stored);
        }
        let documents = jobs
            .iter()
            .map(serde_json::to_string)
            .collect::<Result<Vec<_>, _>>()?;

        let mut entries = self.entries.write().await;
        if entries.contains_key(&key) {
            return Ok(PutOutcome::AlreadyCached);
        }
        entries.insert(key, documents);
        Ok(PutOutcome::Stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(role: &str, score: u8) -> EnrichedJob {
        EnrichedJob {
            role: role.to_string(),
            company: "Acme".to_string(),
            fit_reason: "Strong SQL".to_string(),
            match_score: score,
            ..Default::default()
        }
    }

    #[test]
    fn test_normalize_title() {
        assert_eq!(normalize_title("  Data Analyst "), "data analyst");
        assert_eq!(document_id("data analyst", 2), "data analyst_2");
    }

    #[tokio::test]
    async fn test_round_trip_by_normalized_title() {
        let cache = MemoryEnrichmentCache::new();
        let jobs = vec![job("Data Analyst", 80), job("BI Analyst", 60)];
        let outcome = cache.put_if_absent("Data Analyst", &jobs).await.unwrap();
        assert_eq!(outcome, PutOutcome::Stored);
        assert_eq!(cache.get("  data ANALYST").await.unwrap(), jobs);
    }

    #[tokio::test]
    async fn test_first_writer_wins() {
        let cache = MemoryEnrichmentCache::new();
        cache.put_if_absent("Engineer", &[job("First", 90)]).await.unwrap();
        let outcome = cache
            .put_if_absent("engineer", &[job("Second", 10)])
            .await
            .unwrap();
        assert_eq!(outcome, PutOutcome::AlreadyCached);
        assert_eq!(cache.get("Engineer").await.unwrap()[0].role, "First");
    }

    #[tokio::test]
    async fn test_malformed_document_is_a_miss() {
        let cache = MemoryEnrichmentCache::new();
        let good = serde_json::to_string(&job("A", 50)).unwrap();
        cache
            .insert_raw("Analyst", vec![good, "{not json".to_string()])
            .await;
        assert!(cache.get("analyst").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_entry_is_replaced_by_next_write() {
        let cache = MemoryEnrichmentCache::new();
        cache.insert_raw("Analyst", vec!["{not json".to_string()]).await;
        assert!(cache.get("Analyst").await.unwrap().is_empty());

        let outcome = cache.put_if_absent("analyst", &[job("Analyst", 70)]).await.unwrap();
        assert_eq!(outcome, PutOutcome::Stored);
        assert_eq!(cache.get("Analyst").await.unwrap()[0].match_score, 70);
    }

    #[tokio::test]
    async fn test_unknown_title_is_a_miss() {
        let cache = MemoryEnrichmentCache::new();
        assert!(cache.get("nobody").await.unwrap().is_empty());
    }
}
