//! Core data models shared by the store, the scorers, and the matcher.
//!
//! These types represent the FAQ records, cached embeddings, match results,
//! and chat history rows that flow between the corpus store and the
//! matching engine.

use serde::{Deserialize, Serialize};

/// A stored question/answer pair.
///
/// Ids are assigned by the store on insert. Records are immutable once
/// created; a changed FAQ arrives as a new import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqRecord {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub category: Option<String>,
}

/// Insert payload for a FAQ. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFaq {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub category: Option<String>,
}

impl NewFaq {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            category: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// A cached embedding joined with its parent FAQ row.
///
/// Produced by [`FaqStore::list_embeddings_joined`](crate::store::FaqStore::list_embeddings_joined).
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedFaq {
    pub faq_id: i64,
    pub vector: Vec<f32>,
    pub question: String,
    pub answer: String,
    pub category: Option<String>,
}

impl EmbeddedFaq {
    /// The FAQ record this embedding belongs to.
    pub fn to_record(&self) -> FaqRecord {
        FaqRecord {
            id: self.faq_id,
            question: self.question.clone(),
            answer: self.answer.clone(),
            category: self.category.clone(),
        }
    }
}

/// Outcome of a single matcher query.
///
/// `matched` is `None` when no record cleared the winning scorer's
/// acceptance threshold. `confidence` is always the winning raw similarity,
/// so callers can still apply their own cutoff or log near misses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub matched: Option<FaqRecord>,
    pub confidence: f64,
}

impl MatchResult {
    /// The result returned before the matcher has been fitted.
    pub fn none() -> Self {
        Self {
            matched: None,
            confidence: 0.0,
        }
    }
}

/// A persisted chat exchange.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatTurn {
    pub id: i64,
    pub user_message: String,
    pub bot_response: String,
    pub confidence_score: Option<f64>,
    /// Unix timestamp (seconds).
    pub created_at: i64,
}

/// Insert payload for a chat exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct NewChatTurn {
    pub user_message: String,
    pub bot_response: String,
    pub confidence_score: Option<f64>,
}
