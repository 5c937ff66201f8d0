//! TF-IDF lexical index over FAQ questions.
//!
//! # Weighting
//!
//! 1. Normalize each question and extract unigram + bigram terms with
//!    English stopwords removed (see [`crate::text::terms`]).
//! 2. Keep at most `max_features` terms, ranked by total corpus count
//!    (descending), ties broken alphabetically.
//! 3. Weight each document term as `count × idf` where
//!    `idf = ln((1 + n) / (1 + df)) + 1`.
//! 4. L2-normalize every document row.
//!
//! Queries are projected the same way (out-of-vocabulary terms dropped),
//! so cosine similarity reduces to a sparse dot product.

use std::collections::{BTreeMap, HashMap};

use crate::models::FaqRecord;
use crate::text::{normalize, terms};

/// Default acceptance threshold: a similarity must be strictly greater.
pub const LEXICAL_THRESHOLD: f64 = 0.3;

/// Default vocabulary cap.
pub const DEFAULT_MAX_FEATURES: usize = 5000;

/// Sparse row: `(term index, weight)` sorted by term index.
type SparseRow = Vec<(usize, f64)>;

/// Best lexical candidate for a query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LexicalScore {
    /// Corpus position of the best document, or `None` when the
    /// similarity did not clear the threshold.
    pub index: Option<usize>,
    /// Similarity of the best document, returned even below threshold.
    pub similarity: f64,
}

/// Fitted document-term matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct LexicalIndex {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    rows: Vec<SparseRow>,
    threshold: f64,
}

impl LexicalIndex {
    /// Fit the index over the questions of `corpus`.
    ///
    /// Row `i` of the index corresponds to `corpus[i]`. Returns `None` for
    /// an empty corpus.
    pub fn fit(corpus: &[FaqRecord], max_features: usize) -> Option<Self> {
        if corpus.is_empty() {
            return None;
        }

        let docs: Vec<Vec<String>> = corpus
            .iter()
            .map(|faq| terms(&normalize(&faq.question)))
            .collect();

        let mut totals: BTreeMap<&str, usize> = BTreeMap::new();
        let mut doc_freq: HashMap<&str, usize> = HashMap::new();
        for doc in &docs {
            let mut seen: Vec<&str> = Vec::new();
            for term in doc {
                *totals.entry(term.as_str()).or_insert(0) += 1;
                if !seen.contains(&term.as_str()) {
                    seen.push(term.as_str());
                    *doc_freq.entry(term.as_str()).or_insert(0) += 1;
                }
            }
        }

        // BTreeMap iteration is alphabetical; the stable sort keeps that
        // order among equal counts.
        let mut ranked: Vec<(&str, usize)> = totals.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(max_features);
        let mut kept: Vec<&str> = ranked.into_iter().map(|(t, _)| t).collect();
        kept.sort_unstable();

        let n = docs.len() as f64;
        let vocabulary: HashMap<String, usize> = kept
            .iter()
            .enumerate()
            .map(|(i, t)| (t.to_string(), i))
            .collect();
        let idf: Vec<f64> = kept
            .iter()
            .map(|t| {
                let df = doc_freq.get(t).copied().unwrap_or(0) as f64;
                ((1.0 + n) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        let mut index = Self {
            vocabulary,
            idf,
            rows: Vec::with_capacity(docs.len()),
            threshold: LEXICAL_THRESHOLD,
        };
        let rows: Vec<SparseRow> = docs.iter().map(|d| index.project(d)).collect();
        index.rows = rows;

        tracing::debug!(
            documents = index.rows.len(),
            vocabulary = index.vocabulary.len(),
            "lexical index fitted"
        );

        Some(index)
    }

    /// Override the acceptance threshold (default [`LEXICAL_THRESHOLD`]).
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of terms kept after the vocabulary cap.
    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn contains_term(&self, term: &str) -> bool {
        self.vocabulary.contains_key(term)
    }

    /// Score `query` against every indexed document.
    ///
    /// The first maximum in corpus order wins ties.
    pub fn score(&self, query: &str) -> LexicalScore {
        let q = self.project(&terms(&normalize(query)));
        if q.is_empty() {
            return LexicalScore {
                index: None,
                similarity: 0.0,
            };
        }
        let q_map: HashMap<usize, f64> = q.into_iter().collect();

        let mut best_idx = 0usize;
        let mut best = f64::NEG_INFINITY;
        for (i, row) in self.rows.iter().enumerate() {
            let sim: f64 = row
                .iter()
                .filter_map(|(t, w)| q_map.get(t).map(|qw| qw * w))
                .sum();
            if sim > best {
                best = sim;
                best_idx = i;
            }
        }

        let similarity = best.clamp(0.0, 1.0);
        LexicalScore {
            index: accept(best_idx, similarity, self.threshold),
            similarity,
        }
    }

    /// Map terms to an L2-normalized TF-IDF row.
    fn project(&self, doc_terms: &[String]) -> SparseRow {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for term in doc_terms {
            if let Some(&i) = self.vocabulary.get(term) {
                *counts.entry(i).or_insert(0.0) += 1.0;
            }
        }
        let mut row: SparseRow = counts
            .into_iter()
            .map(|(i, tf)| (i, tf * self.idf[i]))
            .collect();
        let norm = row.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, w) in row.iter_mut() {
                *w /= norm;
            }
        }
        row
    }
}

/// Threshold gate shared by the scorers: strictly greater is a match.
pub(crate) fn accept<T>(candidate: T, similarity: f64, threshold: f64) -> Option<T> {
    if similarity > threshold {
        Some(candidate)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn faq(id: i64, question: &str) -> FaqRecord {
        FaqRecord {
            id,
            question: question.to_string(),
            answer: format!("answer {}", id),
            category: None,
        }
    }

    fn corpus() -> Vec<FaqRecord> {
        vec![
            faq(1, "How do I reset my password?"),
            faq(2, "How can I request a refund?"),
            faq(3, "Where can I download my invoice?"),
        ]
    }

    #[test]
    fn test_fit_empty_corpus() {
        assert!(LexicalIndex::fit(&[], DEFAULT_MAX_FEATURES).is_none());
    }

    #[test]
    fn test_identical_question_scores_one() {
        let index = LexicalIndex::fit(&corpus(), DEFAULT_MAX_FEATURES).unwrap();
        let score = index.score("how do i reset my password");
        assert_eq!(score.index, Some(0));
        assert!((score.similarity - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_best_document_selected() {
        let index = LexicalIndex::fit(&corpus(), DEFAULT_MAX_FEATURES).unwrap();
        let score = index.score("I want a refund");
        assert_eq!(score.index, Some(1));
    }

    #[test]
    fn test_no_overlap_is_zero() {
        let index = LexicalIndex::fit(&corpus(), DEFAULT_MAX_FEATURES).unwrap();
        let score = index.score("what is the weather today");
        assert_eq!(score.index, None);
        assert_eq!(score.similarity, 0.0);
    }

    #[test]
    fn test_empty_query() {
        let index = LexicalIndex::fit(&corpus(), DEFAULT_MAX_FEATURES).unwrap();
        let score = index.score("");
        assert_eq!(score.index, None);
        assert_eq!(score.similarity, 0.0);
    }

    #[test]
    fn test_threshold_is_strict() {
        assert_eq!(accept(0usize, 0.3, LEXICAL_THRESHOLD), None);
        assert_eq!(accept(0usize, 0.300001, LEXICAL_THRESHOLD), Some(0));
    }

    #[test]
    fn test_similarity_equal_to_threshold_rejected() {
        let docs = vec![faq(1, "reset password"), faq(2, "refund invoice")];
        let s = LexicalIndex::fit(&docs, DEFAULT_MAX_FEATURES)
            .unwrap()
            .score("reset")
            .similarity;
        assert!(s > 0.0 && s < 1.0, "partial overlap scored {}", s);

        let at = LexicalIndex::fit(&docs, DEFAULT_MAX_FEATURES)
            .unwrap()
            .with_threshold(s)
            .score("reset");
        assert_eq!(at.index, None);
        assert_eq!(at.similarity, s);

        let below = LexicalIndex::fit(&docs, DEFAULT_MAX_FEATURES)
            .unwrap()
            .with_threshold(s - 1e-9)
            .score("reset");
        assert_eq!(below.index, Some(0));
        assert_eq!(below.similarity, s);
    }

    #[test]
    fn test_below_threshold_keeps_similarity() {
        let index = LexicalIndex::fit(&corpus(), DEFAULT_MAX_FEATURES)
            .unwrap()
            .with_threshold(1.0);
        let score = index.score("reset my password");
        assert_eq!(score.index, None);
        assert!(score.similarity > 0.9);
    }

    #[test]
    fn test_ties_take_first_document() {
        let docs = vec![faq(1, "billing question"), faq(2, "billing question")];
        let index = LexicalIndex::fit(&docs, DEFAULT_MAX_FEATURES).unwrap();
        assert_eq!(index.score("billing question").index, Some(0));
    }

    #[test]
    fn test_vocabulary_cap_keeps_most_frequent() {
        let docs = vec![
            faq(1, "shipping shipping refund"),
            faq(2, "shipping invoice"),
        ];
        let index = LexicalIndex::fit(&docs, 1).unwrap();
        assert_eq!(index.vocabulary_len(), 1);
        assert!(index.contains_term("shipping"));
        assert!(!index.contains_term("refund"));
    }

    #[test]
    fn test_stopwords_excluded_from_vocabulary() {
        let index = LexicalIndex::fit(&corpus(), DEFAULT_MAX_FEATURES).unwrap();
        assert!(!index.contains_term("how"));
        assert!(!index.contains_term("my"));
        assert!(index.contains_term("reset password"));
    }

    #[test]
    fn test_refit_is_deterministic() {
        let a = LexicalIndex::fit(&corpus(), DEFAULT_MAX_FEATURES).unwrap();
        let b = LexicalIndex::fit(&corpus(), DEFAULT_MAX_FEATURES).unwrap();
        assert_eq!(a, b);
    }
}
