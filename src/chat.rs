//! Chat boundary over the matcher.
//!
//! Applies the final confidence cutoff, chooses between the matched answer
//! and the fallback message, and records every exchange in chat history.
//! Shared by the `faqctl ask` command and `POST /chat`.

use anyhow::{bail, Result};
use serde::Serialize;

use faq_harness_core::matcher::{HybridMatcher, MatchMethod};
use faq_harness_core::models::NewChatTurn;
use faq_harness_core::store::FaqStore;

use crate::config::ChatConfig;

/// Response body for a chat message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatReply {
    pub response: String,
    /// Rounded to two decimals.
    pub confidence: f64,
    pub matched_question: Option<String>,
}

/// Answer `message`.
///
/// A reply uses the matched FAQ only when the matcher attached a record and
/// its confidence is strictly above `config.min_confidence`. Both outcomes
/// are saved to chat history with the unrounded confidence.
///
/// # Errors
///
/// Fails when the trimmed message is empty (message contains "must not be
/// empty"), or when the matcher or the store fail.
pub async fn respond(
    matcher: &HybridMatcher,
    store: &dyn FaqStore,
    config: &ChatConfig,
    message: &str,
    method: MatchMethod,
) -> Result<ChatReply> {
    let message = message.trim();
    if message.is_empty() {
        bail!("message must not be empty");
    }

    let result = matcher.find_best_match_with(message, method).await?;

    let reply = match result.matched {
        Some(faq) if result.confidence > config.min_confidence => ChatReply {
            response: faq.answer,
            confidence: round2(result.confidence),
            matched_question: Some(faq.question),
        },
        _ => ChatReply {
            response: config.fallback_response.clone(),
            confidence: round2(result.confidence),
            matched_question: None,
        },
    };

    tracing::info!(
        confidence = result.confidence,
        matched = reply.matched_question.is_some(),
        "chat answered"
    );

    store
        .save_chat_turn(&NewChatTurn {
            user_message: message.to_string(),
            bot_response: reply.response.clone(),
            confidence_score: Some(result.confidence),
        })
        .await?;

    Ok(reply)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
