//! JSON FAQ import.
//!
//! Accepts either a bare array of FAQ objects or an object with a `faqs`
//! array (the `POST /admin/import` body shape):
//!
//! ```json
//! { "faqs": [ { "question": "...", "answer": "...", "category": "billing" } ] }
//! ```
//!
//! Entries with a blank question or answer are skipped; text fields are
//! trimmed. Importing does not refit the matcher; callers do that once
//! after the batch.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use faq_harness_core::models::NewFaq;
use faq_harness_core::store::FaqStore;

#[derive(Deserialize)]
#[serde(untagged)]
enum ImportDocument {
    List(Vec<NewFaq>),
    Wrapped { faqs: Vec<NewFaq> },
}

/// Parse an import document from a JSON string.
pub fn parse_faqs(json: &str) -> Result<Vec<NewFaq>> {
    let doc: ImportDocument =
        serde_json::from_str(json).with_context(|| "Failed to parse FAQ import JSON")?;
    let faqs = match doc {
        ImportDocument::List(faqs) => faqs,
        ImportDocument::Wrapped { faqs } => faqs,
    };
    Ok(clean(faqs))
}

/// Read and parse an import file.
pub fn load_faq_file(path: &Path) -> Result<Vec<NewFaq>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read import file: {}", path.display()))?;
    parse_faqs(&content)
}

/// Drop blank entries and trim text fields.
pub fn clean(faqs: Vec<NewFaq>) -> Vec<NewFaq> {
    faqs.into_iter()
        .filter_map(|f| {
            let question = f.question.trim().to_string();
            let answer = f.answer.trim().to_string();
            if question.is_empty() || answer.is_empty() {
                return None;
            }
            let category = f
                .category
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty());
            Some(NewFaq {
                question,
                answer,
                category,
            })
        })
        .collect()
}

/// Insert every FAQ and return how many were stored.
pub async fn import_faqs(store: &dyn FaqStore, faqs: &[NewFaq]) -> Result<usize> {
    for faq in faqs {
        store.insert_faq(faq).await?;
    }
    tracing::info!(count = faqs.len(), "faqs imported");
    Ok(faqs.len())
}
