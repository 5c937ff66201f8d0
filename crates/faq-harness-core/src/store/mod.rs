//! Storage abstraction for the FAQ corpus.
//!
//! The [`FaqStore`] trait defines the storage operations the matcher and
//! the chat boundary need, enabling pluggable backends (SQLite in the app
//! crate, [`memory::InMemoryStore`] here).
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{ChatTurn, EmbeddedFaq, FaqRecord, NewChatTurn, NewFaq};

/// Abstract corpus store.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`list_all_faqs`](FaqStore::list_all_faqs) | Full corpus snapshot, ordered by category then id |
/// | [`insert_faq`](FaqStore::insert_faq) | Insert a FAQ, returning its new id |
/// | [`upsert_embedding`](FaqStore::upsert_embedding) | Insert or replace the cached vector for a FAQ |
/// | [`list_embeddings_joined`](FaqStore::list_embeddings_joined) | Cached vectors joined with their FAQ rows |
/// | [`search_faqs_by_keyword`](FaqStore::search_faqs_by_keyword) | Substring lookup over questions and answers |
/// | [`save_chat_turn`](FaqStore::save_chat_turn) | Persist a chat exchange |
/// | [`chat_history`](FaqStore::chat_history) | Most recent chat exchanges, newest first |
#[async_trait]
pub trait FaqStore: Send + Sync {
    /// Every FAQ, ordered by category (missing categories first) then id.
    async fn list_all_faqs(&self) -> Result<Vec<FaqRecord>>;

    /// Insert a FAQ and return the store-assigned id.
    async fn insert_faq(&self, faq: &NewFaq) -> Result<i64>;

    /// Insert or replace the embedding for `faq_id`.
    async fn upsert_embedding(&self, faq_id: i64, vector: &[f32]) -> Result<()>;

    /// Embeddings joined with their FAQ rows, ordered by `faq_id`.
    ///
    /// Embeddings whose FAQ no longer exists are not returned.
    async fn list_embeddings_joined(&self) -> Result<Vec<EmbeddedFaq>>;

    /// FAQs whose question or answer contains `keyword` (case-insensitive).
    async fn search_faqs_by_keyword(&self, keyword: &str) -> Result<Vec<FaqRecord>>;

    /// Persist a chat exchange and return its id.
    async fn save_chat_turn(&self, turn: &NewChatTurn) -> Result<i64>;

    /// Up to `limit` chat exchanges, newest first.
    async fn chat_history(&self, limit: i64) -> Result<Vec<ChatTurn>>;
}
