//! `faqctl` binary tests. Embeddings are disabled, so only the commands
//! that never fit the matcher are expected to succeed.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    fs::write(
        root.join("faqs.json"),
        r#"[
  {"question": "How do I reset my password?", "answer": "Use the 'Forgot Password' link.", "category": "account"},
  {"question": "How do I request a refund?", "answer": "Email billing within 30 days.", "category": "billing"},
  {"question": "", "answer": "dropped"}
]"#,
    )
    .unwrap();

    let config_content = format!(
        r#"[db]
path = "{}/data/faq.sqlite"

[embedding]
provider = "disabled"

[server]
bind = "127.0.0.1:7341"
"#,
        root.display()
    );

    let config_path = config_dir.join("faq.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_faqctl(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(env!("CARGO_BIN_EXE_faqctl"))
        .arg("--config")
        .arg(config_path)
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run faqctl: {}", e));

    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.success(),
    )
}

#[test]
fn test_init_is_idempotent() {
    let (_tmp, config) = setup_test_env();
    let (stdout, stderr, ok) = run_faqctl(&config, &["init"]);
    assert!(ok, "init failed: {}", stderr);
    assert!(stdout.contains("Database initialized"));

    let (_, stderr, ok) = run_faqctl(&config, &["init"]);
    assert!(ok, "second init failed: {}", stderr);
}

#[test]
fn test_import_and_list() {
    let (tmp, config) = setup_test_env();
    run_faqctl(&config, &["init"]);

    let file = tmp.path().join("faqs.json");
    let (stdout, stderr, ok) =
        run_faqctl(&config, &["import", file.to_str().unwrap(), "--no-fit"]);
    assert!(ok, "import failed: {}", stderr);
    assert!(stdout.contains("Imported 2 FAQs"), "got: {}", stdout);

    let (stdout, _, ok) = run_faqctl(&config, &["faqs"]);
    assert!(ok);
    assert!(stdout.contains("(account) How do I reset my password?"));
    assert!(stdout.contains("(billing) How do I request a refund?"));

    let (stdout, _, ok) = run_faqctl(&config, &["faqs", "--keyword", "refund"]);
    assert!(ok);
    assert!(stdout.contains("refund"));
    assert!(!stdout.contains("password"));
}

#[test]
fn test_fit_fails_without_embeddings() {
    let (tmp, config) = setup_test_env();
    run_faqctl(&config, &["init"]);
    let file = tmp.path().join("faqs.json");
    run_faqctl(&config, &["import", file.to_str().unwrap(), "--no-fit"]);

    let (_, stderr, ok) = run_faqctl(&config, &["fit"]);
    assert!(!ok);
    assert!(stderr.contains("disabled"), "got: {}", stderr);
}

#[test]
fn test_empty_history() {
    let (_tmp, config) = setup_test_env();
    run_faqctl(&config, &["init"]);
    let (stdout, stderr, ok) = run_faqctl(&config, &["history", "--limit", "5"]);
    assert!(ok, "history failed: {}", stderr);
    assert!(stdout.trim().is_empty());
}

#[test]
fn test_history_rejects_non_positive_limit() {
    let (_tmp, config) = setup_test_env();
    run_faqctl(&config, &["init"]);

    let (_, stderr, ok) = run_faqctl(&config, &["history", "--limit", "0"]);
    assert!(!ok);
    assert!(stderr.contains("--limit must be >= 1"), "got: {}", stderr);

    let (_, _, ok) = run_faqctl(&config, &["history", "--limit=-1"]);
    assert!(!ok);
}

#[test]
fn test_invalid_method_rejected() {
    let (_tmp, config) = setup_test_env();
    let (_, _, ok) = run_faqctl(&config, &["ask", "hello", "--method", "telepathy"]);
    assert!(!ok);
}
