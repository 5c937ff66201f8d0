//! Hybrid FAQ matcher.
//!
//! Combines the [`LexicalIndex`] and the [`SemanticScorer`] behind a
//! two-state lifecycle:
//!
//! ```text
//!   NotReady ──fit() with non-empty corpus──▶ Ready
//!      ▲                                        │
//!      └──────fit() with empty corpus───────────┘
//! ```
//!
//! The matcher does no locking. Hosts that share it between tasks must
//! serialize `fit` against queries themselves (the HTTP server wraps it in
//! a `tokio::sync::RwLock`).
//!
//! # Hybrid rule
//!
//! Both scorers run on every query and the result with the higher
//! confidence wins, lexical on ties. The per-scorer thresholds only decide
//! whether a record is attached; they do not gate the comparison, so a
//! sub-threshold lexical score can still win with `matched == None`.

use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::embedding::Embedder;
use crate::lexical::{LexicalIndex, DEFAULT_MAX_FEATURES, LEXICAL_THRESHOLD};
use crate::models::{FaqRecord, MatchResult};
use crate::semantic::{SemanticScorer, SEMANTIC_THRESHOLD};
use crate::store::FaqStore;

/// Tuning knobs for the matcher, decoupled from application config.
#[derive(Debug, Clone, PartialEq)]
pub struct MatcherParams {
    /// Vocabulary cap for the lexical index.
    pub max_features: usize,
    pub lexical_threshold: f64,
    pub semantic_threshold: f64,
}

impl Default for MatcherParams {
    fn default() -> Self {
        Self {
            max_features: DEFAULT_MAX_FEATURES,
            lexical_threshold: LEXICAL_THRESHOLD,
            semantic_threshold: SEMANTIC_THRESHOLD,
        }
    }
}

/// Which scorer(s) answer a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMethod {
    /// TF-IDF cosine only.
    Lexical,
    /// Embedding cosine only.
    Semantic,
    /// Both, higher confidence wins.
    #[default]
    Hybrid,
}

impl std::fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchMethod::Lexical => write!(f, "lexical"),
            MatchMethod::Semantic => write!(f, "semantic"),
            MatchMethod::Hybrid => write!(f, "hybrid"),
        }
    }
}

impl FromStr for MatchMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lexical" | "tfidf" | "keyword" => Ok(MatchMethod::Lexical),
            "semantic" => Ok(MatchMethod::Semantic),
            "hybrid" => Ok(MatchMethod::Hybrid),
            _ => Err(format!(
                "Unknown match method: {}. Use lexical, semantic, or hybrid.",
                s
            )),
        }
    }
}

/// Fitted matcher state.
#[derive(Debug, Clone, PartialEq)]
pub enum MatcherState {
    NotReady,
    Ready {
        index: LexicalIndex,
        /// Corpus snapshot; position `i` matches row `i` of `index`.
        corpus: Vec<FaqRecord>,
    },
}

/// Hybrid lexical + semantic FAQ matcher.
pub struct HybridMatcher {
    store: Arc<dyn FaqStore>,
    embedder: Arc<dyn Embedder>,
    params: MatcherParams,
    state: MatcherState,
}

impl HybridMatcher {
    pub fn new(store: Arc<dyn FaqStore>, embedder: Arc<dyn Embedder>, params: MatcherParams) -> Self {
        Self {
            store,
            embedder,
            params,
            state: MatcherState::NotReady,
        }
    }

    pub fn state(&self) -> &MatcherState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, MatcherState::Ready { .. })
    }

    /// Number of documents in the fitted lexical index (0 when not ready).
    pub fn indexed_len(&self) -> usize {
        match &self.state {
            MatcherState::Ready { index, .. } => index.len(),
            MatcherState::NotReady => 0,
        }
    }

    /// Rebuild the lexical index and the embedding cache from the store.
    ///
    /// An empty corpus leaves the matcher `NotReady` without error. Store
    /// and embedding errors propagate and leave the previous state intact.
    pub async fn fit(&mut self) -> Result<()> {
        let corpus = self.store.list_all_faqs().await?;

        let index = match LexicalIndex::fit(&corpus, self.params.max_features) {
            Some(index) => index.with_threshold(self.params.lexical_threshold),
            None => {
                tracing::info!("corpus is empty; matcher not ready");
                self.state = MatcherState::NotReady;
                return Ok(());
            }
        };

        self.semantic().refresh_cache(&corpus).await?;

        tracing::info!(
            faqs = corpus.len(),
            vocabulary = index.vocabulary_len(),
            "matcher fitted"
        );
        self.state = MatcherState::Ready { index, corpus };
        Ok(())
    }

    /// Best hybrid match for `query`.
    pub async fn find_best_match(&self, query: &str) -> Result<MatchResult> {
        self.find_best_match_with(query, MatchMethod::Hybrid).await
    }

    /// Best match for `query` using the given scorer(s).
    pub async fn find_best_match_with(
        &self,
        query: &str,
        method: MatchMethod,
    ) -> Result<MatchResult> {
        let (index, corpus) = match &self.state {
            MatcherState::Ready { index, corpus } => (index, corpus),
            MatcherState::NotReady => return Ok(MatchResult::none()),
        };

        let lexical = || {
            let score = index.score(query);
            MatchResult {
                matched: score.index.and_then(|i| corpus.get(i).cloned()),
                confidence: score.similarity,
            }
        };

        match method {
            MatchMethod::Lexical => Ok(lexical()),
            MatchMethod::Semantic => self.semantic_match(query).await,
            MatchMethod::Hybrid => {
                let lex = lexical();
                let sem = self.semantic_match(query).await?;
                Ok(prefer(lex, sem))
            }
        }
    }

    async fn semantic_match(&self, query: &str) -> Result<MatchResult> {
        let score = self.semantic().score(query).await?;
        Ok(MatchResult {
            matched: score.matched,
            confidence: score.similarity,
        })
    }

    fn semantic(&self) -> SemanticScorer<'_> {
        SemanticScorer::new(self.store.as_ref(), self.embedder.as_ref())
            .with_threshold(self.params.semantic_threshold)
    }
}

/// Hybrid rule: the lexical result wins unless the semantic confidence is
/// strictly higher.
pub fn prefer(lexical: MatchResult, semantic: MatchResult) -> MatchResult {
    if lexical.confidence >= semantic.confidence {
        lexical
    } else {
        semantic
    }
}
