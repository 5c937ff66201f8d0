//! In-memory [`FaqStore`] implementation for testing and embedding hosts.
//!
//! Uses `Vec` and `BTreeMap` behind `std::sync::RwLock` for thread safety.
//! Ids are assigned sequentially starting at 1.

use std::collections::BTreeMap;
use std::sync::RwLock;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::models::{ChatTurn, EmbeddedFaq, FaqRecord, NewChatTurn, NewFaq};

use super::FaqStore;

/// In-memory store for tests and hosts without a database.
pub struct InMemoryStore {
    faqs: RwLock<Vec<FaqRecord>>,
    embeddings: RwLock<BTreeMap<i64, Vec<f32>>>,
    history: RwLock<Vec<ChatTurn>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            faqs: RwLock::new(Vec::new()),
            embeddings: RwLock::new(BTreeMap::new()),
            history: RwLock::new(Vec::new()),
        }
    }

    /// Number of cached embeddings, including any whose FAQ is gone.
    pub fn embedding_count(&self) -> Result<usize> {
        Ok(self.embeddings.read().map_err(poisoned)?.len())
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: T) -> anyhow::Error {
    anyhow!("in-memory store lock poisoned")
}

#[async_trait]
impl FaqStore for InMemoryStore {
    async fn list_all_faqs(&self) -> Result<Vec<FaqRecord>> {
        let mut faqs = self.faqs.read().map_err(poisoned)?.clone();
        faqs.sort_by(|a, b| a.category.cmp(&b.category).then(a.id.cmp(&b.id)));
        Ok(faqs)
    }

    async fn insert_faq(&self, faq: &NewFaq) -> Result<i64> {
        let mut faqs = self.faqs.write().map_err(poisoned)?;
        let id = faqs.iter().map(|f| f.id).max().unwrap_or(0) + 1;
        faqs.push(FaqRecord {
            id,
            question: faq.question.clone(),
            answer: faq.answer.clone(),
            category: faq.category.clone(),
        });
        Ok(id)
    }

    async fn upsert_embedding(&self, faq_id: i64, vector: &[f32]) -> Result<()> {
        self.embeddings
            .write()
            .map_err(poisoned)?
            .insert(faq_id, vector.to_vec());
        Ok(())
    }

    async fn list_embeddings_joined(&self) -> Result<Vec<EmbeddedFaq>> {
        let embeddings = self.embeddings.read().map_err(poisoned)?;
        let faqs = self.faqs.read().map_err(poisoned)?;
        Ok(embeddings
            .iter()
            .filter_map(|(faq_id, vector)| {
                faqs.iter().find(|f| f.id == *faq_id).map(|f| EmbeddedFaq {
                    faq_id: *faq_id,
                    vector: vector.clone(),
                    question: f.question.clone(),
                    answer: f.answer.clone(),
                    category: f.category.clone(),
                })
            })
            .collect())
    }

    async fn search_faqs_by_keyword(&self, keyword: &str) -> Result<Vec<FaqRecord>> {
        let needle = keyword.to_lowercase();
        let mut hits: Vec<FaqRecord> = self
            .faqs
            .read()
            .map_err(poisoned)?
            .iter()
            .filter(|f| {
                f.question.to_lowercase().contains(&needle)
                    || f.answer.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
        hits.sort_by(|a, b| a.category.cmp(&b.category).then(a.id.cmp(&b.id)));
        Ok(hits)
    }

    async fn save_chat_turn(&self, turn: &NewChatTurn) -> Result<i64> {
        let mut history = self.history.write().map_err(poisoned)?;
        let id = history.len() as i64 + 1;
        history.push(ChatTurn {
            id,
            user_message: turn.user_message.clone(),
            bot_response: turn.bot_response.clone(),
            confidence_score: turn.confidence_score,
            created_at: chrono::Utc::now().timestamp(),
        });
        Ok(id)
    }

    async fn chat_history(&self, limit: i64) -> Result<Vec<ChatTurn>> {
        let history = self.history.read().map_err(poisoned)?;
        Ok(history
            .iter()
            .rev()
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let store = InMemoryStore::new();
        assert_eq!(store.insert_faq(&NewFaq::new("q1", "a1")).await.unwrap(), 1);
        assert_eq!(store.insert_faq(&NewFaq::new("q2", "a2")).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_list_orders_by_category_then_id() {
        let store = InMemoryStore::new();
        store
            .insert_faq(&NewFaq::new("q1", "a1").with_category("billing"))
            .await
            .unwrap();
        store.insert_faq(&NewFaq::new("q2", "a2")).await.unwrap();
        store
            .insert_faq(&NewFaq::new("q3", "a3").with_category("account"))
            .await
            .unwrap();
        let ids: Vec<i64> = store
            .list_all_faqs()
            .await
            .unwrap()
            .iter()
            .map(|f| f.id)
            .collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[tokio::test]
    async fn test_upsert_replaces_vector() {
        let store = InMemoryStore::new();
        let id = store.insert_faq(&NewFaq::new("q", "a")).await.unwrap();
        store.upsert_embedding(id, &[1.0, 0.0]).await.unwrap();
        store.upsert_embedding(id, &[0.0, 1.0]).await.unwrap();
        let joined = store.list_embeddings_joined().await.unwrap();
        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].vector, vec![0.0, 1.0]);
    }

    #[tokio::test]
    async fn test_join_skips_orphans() {
        let store = InMemoryStore::new();
        store.upsert_embedding(42, &[1.0]).await.unwrap();
        assert!(store.list_embeddings_joined().await.unwrap().is_empty());
        assert_eq!(store.embedding_count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_keyword_search_case_insensitive() {
        let store = InMemoryStore::new();
        store
            .insert_faq(&NewFaq::new("How do I reset my Password?", "Settings."))
            .await
            .unwrap();
        store
            .insert_faq(&NewFaq::new("Refunds?", "Contact billing."))
            .await
            .unwrap();
        let hits = store.search_faqs_by_keyword("password").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 1);
    }

    #[tokio::test]
    async fn test_chat_history_newest_first() {
        let store = InMemoryStore::new();
        for msg in ["first", "second", "third"] {
            store
                .save_chat_turn(&NewChatTurn {
                    user_message: msg.to_string(),
                    bot_response: "ok".to_string(),
                    confidence_score: Some(0.5),
                })
                .await
                .unwrap();
        }
        let history = store.chat_history(2).await.unwrap();
        let msgs: Vec<&str> = history.iter().map(|t| t.user_message.as_str()).collect();
        assert_eq!(msgs, vec!["third", "second"]);
    }

    #[tokio::test]
    async fn test_poisoned_lock_is_an_error() {
        let store = std::sync::Arc::new(InMemoryStore::new());
        store.upsert_embedding(1, &[1.0]).await.unwrap();

        let holder = store.clone();
        let _ = std::thread::spawn(move || {
            let _guard = holder.embeddings.write().unwrap();
            panic!("poison the embedding lock");
        })
        .join();

        assert!(store.embedding_count().is_err());
        assert!(store.list_embeddings_joined().await.is_err());
    }
}
