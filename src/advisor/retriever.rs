// SPDX-License-Identifier: MIT

//! Course-catalog retrieval over a persisted, pre-embedded index.
//!
//! The index is produced by an offline job and opened read-only here:
//! `<index_dir>/index.json` holding `{ "embedding_model", "chunks": [...] }`.

use crate::adk::embedding::Embedder;
use crate::adk::error::AdvisorError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::Path;
use std::sync::Arc;

pub const INDEX_FILE: &str = "index.json";

/// A passage of course material returned by retrieval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    pub text: String,
}

#[async_trait]
pub trait Retriever: Send + Sync {
    /// Up to `limit` passages most relevant to `query`, best first. May be empty.
    async fn get_relevant(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Passage>, Box<dyn Error + Send + Sync>>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedChunk {
    pub id: String,
    pub text: String,
    pub embedding: Vec<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IndexFile {
    #[serde(default)]
    pub embedding_model: Option<String>,
    pub chunks: Vec<IndexedChunk>,
}

/// Cosine-similarity retriever over an [`IndexFile`]
pub struct IndexRetriever {
    chunks: Vec<IndexedChunk>,
    dim: usize,
    embedding_model: Option<String>,
    embedder: Arc<dyn Embedder>,
}

impl IndexRetriever {
    /// Open `<dir>/index.json`. The index must exist, be non-empty and have a
    /// single embedding dimension.
    pub fn open(dir: &Path, embedder: Arc<dyn Embedder>) -> Result<Self, AdvisorError> {
        let path = dir.join(INDEX_FILE);
        if !path.exists() {
            return Err(AdvisorError::index(format!(
                "course index not found at {}",
                path.display()
            )));
        }
        let raw = std::fs::read_to_string(&path)?;
        let index: IndexFile = serde_json::from_str(&raw)?;
        let retriever = Self::from_index(index, embedder)?;
        log::info!(
            "Retriever initialized with {} chunks from {}",
            retriever.chunk_count(),
            path.display()
        );
        Ok(retriever)
    }

    pub fn from_index(index: IndexFile, embedder: Arc<dyn Embedder>) -> Result<Self, AdvisorError> {
        let Some(first) = index.chunks.first() else {
            return Err(AdvisorError::index("course index is empty"));
        };
        let dim = first.embedding.len();
        if dim == 0 {
            return Err(AdvisorError::index(format!("chunk {} has no embedding", first.id)));
        }
        if let Some(bad) = index.chunks.iter().find(|c| c.embedding.len() != dim) {
            return Err(AdvisorError::index(format!(
                "chunk {} has embedding dimension {}, expected {}",
                bad.id,
                bad.embedding.len(),
                dim
            )));
        }
        Ok(Self {
            chunks: index.chunks,
            dim,
            embedding_model: index.embedding_model,
            embedder,
        })
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Embedding model the index was built with, if recorded
    pub fn embedding_model(&self) -> Option<&str> {
        self.embedding_model.as_deref()
    }
}

#[async_trait]
impl Retriever for IndexRetriever {
    async fn get_relevant(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Passage>, Box<dyn Error + Send + Sync>> {
        let query_embedding = self.embedder.embed(query).await?;
        if query_embedding.len() != self.dim {
            return Err(AdvisorError::index(format!(
                "query embedding has dimension {}, index expects {}",
                query_embedding.len(),
                self.dim
            ))
            .into());
        }

        let mut scored: Vec<(f32, &IndexedChunk)> = self
            .chunks
            .iter()
            .map(|chunk| (cosine_similarity(&query_embedding, &chunk.embedding), chunk))
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        let passages: Vec<Passage> = scored
            .into_iter()
            .take(limit)
            .map(|(_, chunk)| Passage {
                text: chunk.text.clone(),
            })
            .collect();
        log::info!("Retrieved {} documents for query: {}", passages.len(), query);
        Ok(passages)
    }
}

/// Cosine similarity; 0.0 for mismatched or zero-length vectors
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }
    dot / (mag_a * mag_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct FixedEmbedder(Vec<f32>);

    #[async_trait]
    impl Embedder for FixedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, Box<dyn Error + Send + Sync>> {
            Ok(self.0.clone())
        }
    }

    fn chunk(id: &str, text: &str, embedding: Vec<f32>) -> IndexedChunk {
        IndexedChunk {
            id: id.to_string(),
            text: text.to_string(),
            embedding,
        }
    }

    fn sample_index() -> IndexFile {
        IndexFile {
            embedding_model: Some("text-embedding-004".to_string()),
            chunks: vec![
                chunk("a", "Intro to CS", vec![1.0, 0.0]),
                chunk("b", "Data Structures", vec![0.8, 0.6]),
                chunk("c", "Art History", vec![0.0, 1.0]),
            ],
        }
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[tokio::test]
    async fn test_get_relevant_orders_by_similarity() {
        let retriever =
            IndexRetriever::from_index(sample_index(), Arc::new(FixedEmbedder(vec![1.0, 0.1])))
                .unwrap();

        let passages = retriever.get_relevant("cs courses", 2).await.unwrap();
        let texts: Vec<&str> = passages.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["Intro to CS", "Data Structures"]);
    }

    #[tokio::test]
    async fn test_get_relevant_limit_larger_than_index() {
        let retriever =
            IndexRetriever::from_index(sample_index(), Arc::new(FixedEmbedder(vec![0.0, 1.0])))
                .unwrap();
        let passages = retriever.get_relevant("art", 10).await.unwrap();
        assert_eq!(passages.len(), 3);
        assert_eq!(passages[0].text, "Art History");
    }

    #[tokio::test]
    async fn test_query_dimension_mismatch_is_error() {
        let retriever = IndexRetriever::from_index(
            sample_index(),
            Arc::new(FixedEmbedder(vec![1.0, 0.0, 0.0])),
        )
        .unwrap();

        let err = retriever.get_relevant("cs", 4).await.unwrap_err();
        assert!(err.to_string().contains("dimension 3, index expects 2"));
    }

    #[test]
    fn test_empty_index_rejected() {
        let index = IndexFile {
            embedding_model: None,
            chunks: vec![],
        };
        let err = IndexRetriever::from_index(index, Arc::new(FixedEmbedder(vec![])))
            .err()
            .unwrap();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_mixed_dimensions_rejected() {
        let index = IndexFile {
            embedding_model: None,
            chunks: vec![chunk("a", "x", vec![1.0, 0.0]), chunk("b", "y", vec![1.0])],
        };
        assert!(IndexRetriever::from_index(index, Arc::new(FixedEmbedder(vec![]))).is_err());
    }

    #[test]
    fn test_open_missing_index() {
        let dir = tempfile::tempdir().unwrap();
        let err = IndexRetriever::open(dir.path(), Arc::new(FixedEmbedder(vec![])))
            .err()
            .unwrap();
        assert!(matches!(err, AdvisorError::Index(_)));
    }

    #[test]
    fn test_open_reads_index_file() {
        let dir = tempfile::tempdir().unwrap();
        let body = json!({
            "embedding_model": "text-embedding-004",
            "chunks": [
                { "id": "1", "text": "CS101: Intro", "source": "catalog.pdf", "embedding": [0.1, 0.2] }
            ]
        });
        std::fs::write(dir.path().join(INDEX_FILE), body.to_string()).unwrap();

        let retriever =
            IndexRetriever::open(dir.path(), Arc::new(FixedEmbedder(vec![0.1, 0.2]))).unwrap();
        assert_eq!(retriever.chunk_count(), 1);
        assert_eq!(retriever.embedding_model(), Some("text-embedding-004"));
    }
}
