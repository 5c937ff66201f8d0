//! Embedding-based scorer backed by the store's embedding cache.
//!
//! The cache lives in the [`FaqStore`], not in memory: [`SemanticScorer::refresh_cache`]
//! writes one vector per FAQ, and every [`SemanticScorer::score`] call
//! re-reads the joined table and scans it with cosine similarity.

use anyhow::{bail, Result};

use crate::embedding::{cosine_similarity, embed_one, Embedder};
use crate::lexical::accept;
use crate::models::FaqRecord;
use crate::store::FaqStore;

/// Default acceptance threshold: a similarity must be strictly greater.
pub const SEMANTIC_THRESHOLD: f64 = 0.5;

/// Best semantic candidate for a query.
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticScore {
    /// The best record, or `None` below threshold or with an empty cache.
    pub matched: Option<FaqRecord>,
    /// Similarity of the best record, returned even below threshold.
    pub similarity: f64,
}

/// Scores queries against cached FAQ embeddings.
pub struct SemanticScorer<'a> {
    store: &'a dyn FaqStore,
    embedder: &'a dyn Embedder,
    threshold: f64,
}

impl<'a> SemanticScorer<'a> {
    pub fn new(store: &'a dyn FaqStore, embedder: &'a dyn Embedder) -> Self {
        Self {
            store,
            embedder,
            threshold: SEMANTIC_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Embed every corpus question and upsert the vectors keyed by FAQ id.
    ///
    /// Questions are embedded as stored, without normalization.
    pub async fn refresh_cache(&self, corpus: &[FaqRecord]) -> Result<usize> {
        if corpus.is_empty() {
            return Ok(0);
        }
        let questions: Vec<String> = corpus.iter().map(|f| f.question.clone()).collect();
        let vectors = self.embedder.embed(&questions).await?;
        if vectors.len() != corpus.len() {
            bail!(
                "embedding model returned {} vectors for {} questions",
                vectors.len(),
                corpus.len()
            );
        }

        for (faq, vector) in corpus.iter().zip(vectors.iter()) {
            self.store.upsert_embedding(faq.id, vector).await?;
        }

        tracing::debug!(
            model = self.embedder.model_name(),
            count = corpus.len(),
            "embedding cache refreshed"
        );
        Ok(corpus.len())
    }

    /// Find the cached FAQ closest to `query`.
    ///
    /// The scan starts from `0.0` and only a strictly greater similarity
    /// replaces the current best, so the first of equal maxima wins and
    /// non-positive similarities never select a record. Similarities are
    /// clamped to `[0, 1]`; f32 rounding can put self-similarity just
    /// above `1.0`.
    pub async fn score(&self, query: &str) -> Result<SemanticScore> {
        let query_vec = embed_one(self.embedder, query).await?;
        let cached = self.store.list_embeddings_joined().await?;
        if cached.is_empty() {
            return Ok(SemanticScore {
                matched: None,
                similarity: 0.0,
            });
        }

        let mut best = None;
        let mut best_score = 0.0f64;
        for entry in &cached {
            let similarity =
                (cosine_similarity(&query_vec, &entry.vector) as f64).clamp(0.0, 1.0);
            if similarity > best_score {
                best_score = similarity;
                best = Some(entry);
            }
        }

        let matched = best.and_then(|e| accept(e.to_record(), best_score, self.threshold));
        Ok(SemanticScore {
            matched,
            similarity: best_score,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewFaq;
    use crate::store::memory::InMemoryStore;
    use async_trait::async_trait;

    /// Same vector for every text; its f32 self-cosine lands just above 1.0.
    struct ConstantEmbedder;

    #[async_trait]
    impl Embedder for ConstantEmbedder {
        fn model_name(&self) -> &str {
            "constant-test"
        }
        fn dims(&self) -> usize {
            3
        }
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![0.3, 0.3, 0.3]).collect())
        }
    }

    #[tokio::test]
    async fn test_empty_cache_scores_zero() {
        let store = InMemoryStore::new();
        let scorer = SemanticScorer::new(&store, &ConstantEmbedder);
        let score = scorer.score("anything").await.unwrap();
        assert_eq!(score.matched, None);
        assert_eq!(score.similarity, 0.0);
    }

    #[tokio::test]
    async fn test_similarity_never_exceeds_one() {
        let store = InMemoryStore::new();
        let id = store
            .insert_faq(&NewFaq::new("reset password", "Settings."))
            .await
            .unwrap();
        let corpus = store.list_all_faqs().await.unwrap();
        let scorer = SemanticScorer::new(&store, &ConstantEmbedder);
        assert_eq!(scorer.refresh_cache(&corpus).await.unwrap(), 1);

        let score = scorer.score("reset password").await.unwrap();
        assert_eq!(score.matched.map(|f| f.id), Some(id));
        assert!(score.similarity <= 1.0, "similarity {}", score.similarity);
        assert!((score.similarity - 1.0).abs() < 1e-6);
    }
}
