//! HTTP server tests: chat, import-then-refit, listing, history, errors.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use tempfile::TempDir;

use faq_harness::config::Config;
use faq_harness::server::run_server_with_embedder;
use faq_harness_core::embedding::Embedder;

// ─── Test Embedder ──────────────────────────────────────────────────

struct KeywordEmbedder;

const KEYWORDS: &[&str] = &["reset", "password", "refund", "weather", "invoice"];

#[async_trait]
impl Embedder for KeywordEmbedder {
    fn model_name(&self) -> &str {
        "keyword-test"
    }
    fn dims(&self) -> usize {
        KEYWORDS.len()
    }
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|t| {
                let lower = t.to_lowercase();
                KEYWORDS
                    .iter()
                    .map(|k| lower.matches(k).count() as f32)
                    .collect()
            })
            .collect())
    }
}

// ─── Helpers ────────────────────────────────────────────────────────

fn test_config(tmp: &TempDir, port: u16) -> Config {
    let content = format!(
        r#"[db]
path = "{}/data/faq.sqlite"

[chat]
fallback_response = "No idea, sorry."

[server]
bind = "127.0.0.1:{}"
"#,
        tmp.path().display(),
        port
    );
    toml::from_str(&content).unwrap()
}

fn find_free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

async fn wait_for_server(port: u16) {
    let client = reqwest::Client::new();
    let url = format!("http://127.0.0.1:{}/health", port);
    for _ in 0..50 {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        if let Ok(resp) = client.get(&url).send().await {
            if resp.status().is_success() {
                return;
            }
        }
    }
    panic!("Server did not become ready within 5 seconds");
}

async fn start_server(tmp: &TempDir) -> (u16, tokio::task::JoinHandle<()>) {
    let port = find_free_port();
    let cfg = test_config(tmp, port);
    let handle = tokio::spawn(async move {
        run_server_with_embedder(&cfg, Arc::new(KeywordEmbedder))
            .await
            .ok();
    });
    wait_for_server(port).await;
    (port, handle)
}

// ─── Tests ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_chat_import_history_flow() {
    let tmp = TempDir::new().unwrap();
    let (port, server_handle) = start_server(&tmp).await;
    let base = format!("http://127.0.0.1:{}", port);
    let client = reqwest::Client::new();

    // Empty corpus: not ready, fallback answer.
    let health: Value = client
        .get(format!("{}/health", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["ready"], false);

    let resp = client
        .post(format!("{}/chat", base))
        .json(&json!({"message": "reset my password"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["response"], "No idea, sorry.");
    assert_eq!(body["confidence"], 0.0);
    assert!(body["matched_question"].is_null());

    // Import refits the matcher.
    let resp = client
        .post(format!("{}/admin/import", base))
        .json(&json!({"faqs": [
            {"question": "How do I reset my password?", "answer": "Use the 'Forgot Password' link.", "category": "account"},
            {"question": "How do I request a refund?", "answer": "Email billing within 30 days."},
            {"question": "   ", "answer": "skipped"}
        ]}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["imported_count"], 2);

    let health: Value = client
        .get(format!("{}/health", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["ready"], true);

    let resp = client
        .post(format!("{}/chat", base))
        .json(&json!({"message": "reset my password", "method": "hybrid"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["response"], "Use the 'Forgot Password' link.");
    assert_eq!(body["matched_question"], "How do I reset my password?");
    assert!(body["confidence"].as_f64().unwrap() > 0.3);

    // Listing.
    let faqs: Value = client
        .get(format!("{}/faqs", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(faqs.as_array().unwrap().len(), 2);

    // History, newest first.
    let history: Value = client
        .get(format!("{}/history", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let history = history.as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["bot_response"], "Use the 'Forgot Password' link.");
    assert_eq!(history[1]["bot_response"], "No idea, sorry.");

    server_handle.abort();
}

#[tokio::test]
async fn test_chat_rejects_bad_requests() {
    let tmp = TempDir::new().unwrap();
    let (port, server_handle) = start_server(&tmp).await;
    let client = reqwest::Client::new();
    let url = format!("http://127.0.0.1:{}/chat", port);

    let resp = client
        .post(&url)
        .json(&json!({"message": "   "}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "bad_request");

    let resp = client
        .post(&url)
        .json(&json!({"message": "hello", "method": "telepathy"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let resp = client
        .post(&url)
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "bad_request");

    let resp = client.post(&url).body("message=hello").send().await.unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "bad_request");

    let resp = client
        .post(format!("http://127.0.0.1:{}/admin/import", port))
        .json(&json!({"faqs": "not a list"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "bad_request");
    assert!(!body["error"]["message"].as_str().unwrap().is_empty());

    // Rejected messages are not recorded.
    let history: Value = client
        .get(format!("http://127.0.0.1:{}/history", port))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(history.as_array().unwrap().is_empty());

    server_handle.abort();
}
