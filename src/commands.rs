//! CLI command implementations for `faqctl`.
//!
//! Each command opens its own pool, does its work, prints to stdout, and
//! closes the pool. Commands that match questions fit the matcher first,
//! since matcher state is not persisted between runs (only the embedding
//! cache is).

use anyhow::{bail, Result};
use std::path::Path;
use std::sync::Arc;

use faq_harness_core::embedding::Embedder;
use faq_harness_core::matcher::{HybridMatcher, MatchMethod};
use faq_harness_core::store::FaqStore;

use crate::chat;
use crate::config::Config;
use crate::db;
use crate::embedding::create_embedder;
use crate::import;
use crate::sqlite_store::SqliteStore;

async fn open_store(config: &Config) -> Result<Arc<SqliteStore>> {
    let pool = db::connect(config).await?;
    Ok(Arc::new(SqliteStore::new(pool)))
}

async fn fitted_matcher(config: &Config, store: Arc<SqliteStore>) -> Result<HybridMatcher> {
    let embedder: Arc<dyn Embedder> = Arc::from(create_embedder(&config.embedding)?);
    let mut matcher = HybridMatcher::new(store, embedder, config.matcher.params());
    matcher.fit().await?;
    Ok(matcher)
}

/// `faqctl import <file>`: insert FAQs from a JSON file, then refit.
pub async fn run_import(config: &Config, path: &Path, no_fit: bool) -> Result<()> {
    let faqs = import::load_faq_file(path)?;
    let store = open_store(config).await?;
    let count = import::import_faqs(store.as_ref(), &faqs).await?;
    println!("Imported {} FAQs from {}", count, path.display());

    if !no_fit {
        let matcher = fitted_matcher(config, store.clone()).await?;
        println!("Matcher fitted on {} FAQs.", matcher.indexed_len());
    }

    store.pool().close().await;
    Ok(())
}

/// `faqctl fit`: rebuild the embedding cache from the current corpus.
pub async fn run_fit(config: &Config) -> Result<()> {
    let store = open_store(config).await?;
    let matcher = fitted_matcher(config, store.clone()).await?;
    if matcher.is_ready() {
        println!("Matcher fitted on {} FAQs.", matcher.indexed_len());
    } else {
        println!("No FAQs stored; matcher not ready.");
    }
    store.pool().close().await;
    Ok(())
}

/// `faqctl ask "<question>"`: answer one question through the chat boundary.
pub async fn run_ask(config: &Config, question: &str, method: MatchMethod) -> Result<()> {
    let store = open_store(config).await?;
    let matcher = fitted_matcher(config, store.clone()).await?;
    let reply = chat::respond(&matcher, store.as_ref(), &config.chat, question, method).await?;

    println!("{}", reply.response);
    println!();
    println!("confidence: {:.2}", reply.confidence);
    if let Some(q) = &reply.matched_question {
        println!("matched:    {}", q);
    }

    store.pool().close().await;
    Ok(())
}

/// `faqctl faqs [--keyword <k>]`: list stored FAQs.
pub async fn run_faqs(config: &Config, keyword: Option<&str>) -> Result<()> {
    let store = open_store(config).await?;
    let faqs = match keyword {
        Some(k) => store.search_faqs_by_keyword(k).await?,
        None => store.list_all_faqs().await?,
    };

    if faqs.is_empty() {
        println!("No FAQs found.");
    }
    for faq in &faqs {
        println!(
            "[{}] ({}) {}",
            faq.id,
            faq.category.as_deref().unwrap_or("uncategorized"),
            faq.question
        );
        println!("    {}", faq.answer);
    }

    store.pool().close().await;
    Ok(())
}

/// `faqctl history [--limit <n>]`: print recent chat exchanges.
pub async fn run_history(config: &Config, limit: Option<i64>) -> Result<()> {
    let limit = limit.unwrap_or(config.chat.history_limit);
    if limit < 1 {
        bail!("--limit must be >= 1");
    }
    let store = open_store(config).await?;
    let turns = store.chat_history(limit).await?;

    for turn in &turns {
        let confidence = turn
            .confidence_score
            .map(|c| format!("{:.2}", c))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{}  [{}] {}",
            format_ts_iso(turn.created_at),
            confidence,
            turn.user_message
        );
        println!("    {}", turn.bot_response);
    }

    store.pool().close().await;
    Ok(())
}

fn format_ts_iso(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
        .unwrap_or_else(|| ts.to_string())
}
