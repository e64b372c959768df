//! Competency store: the taxonomy the profile is matched against.
//!
//! Loaded wholesale at startup and immutable afterwards. Exact-name lookup is
//! case-insensitive; free-text queries rank competencies by cosine similarity
//! of their embedded `name. definition` text.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

pub mod embedding;
pub mod handlers;
pub mod table;

use embedding::{cosine_similarity, Embedder, EmbeddingError};
pub use table::CompetencyRecord;

/// A similarity hit.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredCompetency {
    pub competency: CompetencyRecord,
    pub similarity: f32,
}

pub struct CompetencyStore {
    records: Vec<CompetencyRecord>,
    by_name: HashMap<String, usize>,
    embeddings: Vec<Vec<f32>>,
    embedder: Arc<dyn Embedder>,
}

impl CompetencyStore {
    /// Indexes `records`, embedding every row once. Duplicate names keep the first row.
    pub async fn build(
        records: Vec<CompetencyRecord>,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self, EmbeddingError> {
        let mut by_name = HashMap::with_capacity(records.len());
        for (idx, record) in records.iter().enumerate() {
            by_name.entry(name_key(&record.name)).or_insert(idx);
        }

        let documents: Vec<String> = records
            .iter()
            .map(|r| format!("{}. {}", r.name, r.definition))
            .collect();
        let embeddings = embedder.embed(&documents).await?;
        if embeddings.len() != records.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: records.len(),
                actual: embeddings.len(),
            });
        }

        info!("Competency index built: {} entries", records.len());
        Ok(Self {
            records,
            by_name,
            embeddings,
            embedder,
        })
    }

    /// Every distinct competency name, in table order.
    pub fn names(&self) -> Vec<String> {
        let mut indices: Vec<usize> = self.by_name.values().copied().collect();
        indices.sort_unstable();
        indices
            .into_iter()
            .map(|idx| self.records[idx].name.clone())
            .collect()
    }

    pub fn find_by_name(&self, name: &str) -> Option<&CompetencyRecord> {
        self.by_name
            .get(&name_key(name))
            .map(|idx| &self.records[*idx])
    }

    /// Top `top_k` competencies most similar to `text`, best first.
    pub async fn query(
        &self,
        text: &str,
        top_k: usize,
    ) -> Result<Vec<ScoredCompetency>, EmbeddingError> {
        if top_k == 0 || self.records.is_empty() {
            return Ok(Vec::new());
        }

        let query = self.embedder.embed(&[text.to_string()]).await?;
        let query = query.into_iter().next().ok_or(EmbeddingError::CountMismatch {
            expected: 1,
            actual: 0,
        })?;

        let mut scored: Vec<(usize, f32)> = self
            .embeddings
            .iter()
            .enumerate()
            .map(|(idx, emb)| (idx, cosine_similarity(&query, emb)))
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(idx, similarity)| ScoredCompetency {
                competency: self.records[idx].clone(),
                similarity,
            })
            .collect())
    }
}

fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}
