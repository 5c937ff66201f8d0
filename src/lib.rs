//! # FAQ Harness
//!
//! **A local-first FAQ answering service.**
//!
//! FAQ Harness stores question/answer pairs in SQLite, matches free-text
//! questions against them with a hybrid TF-IDF + embedding scorer, and
//! answers through a CLI and a small HTTP chat API.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌──────────────────┐   ┌──────────────┐
//! │   Import   │──▶│      SQLite      │◀──│   Embedder   │
//! │   (JSON)   │   │ faqs + vectors   │   │ local/remote │
//! └────────────┘   └────────┬─────────┘   └──────┬───────┘
//!                           │  fit()             │
//!                           ▼                    │
//!                  ┌──────────────────┐          │
//!                  │  HybridMatcher   │◀─────────┘
//!                  │ TF-IDF + cosine  │
//!                  └────────┬─────────┘
//!                  ┌────────┴────────┐
//!                  ▼                 ▼
//!             ┌─────────┐       ┌─────────┐
//!             │   CLI   │       │  HTTP   │
//!             │(faqctl) │       │ (/chat) │
//!             └─────────┘       └─────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! faqctl init                       # create database
//! faqctl import faqs.json           # load FAQs
//! faqctl ask "reset my password"    # one-off question
//! faqctl serve                      # start HTTP server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`db`] | SQLite connection pool with WAL mode |
//! | [`migrate`] | Database schema migrations (idempotent) |
//! | [`sqlite_store`] | SQLite implementation of the corpus store |
//! | [`embedding`] | Embedding backends: disabled, OpenAI, Ollama, local |
//! | [`chat`] | Final cutoff, fallback answer, chat history |
//! | [`import`] | JSON FAQ import |
//! | [`server`] | HTTP chat server (Axum) with CORS |
//! | [`commands`] | CLI command implementations |
//!
//! Matching itself lives in the `faq-harness-core` crate; its main types
//! are re-exported here.

pub mod chat;
pub mod commands;
pub mod config;
pub mod db;
pub mod embedding;
pub mod import;
pub mod migrate;
pub mod server;
pub mod sqlite_store;

pub use faq_harness_core::matcher::{HybridMatcher, MatchMethod, MatcherParams};
pub use faq_harness_core::models::{FaqRecord, MatchResult, NewFaq};
