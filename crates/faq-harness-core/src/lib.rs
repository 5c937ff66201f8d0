//! # FAQ Harness Core
//!
//! Shared logic for FAQ Harness: data models, text normalization, the
//! TF-IDF lexical index, the embedding trait, the store abstraction, and
//! the hybrid matcher.
//!
//! This crate contains no tokio, sqlx, filesystem I/O, or HTTP
//! dependencies. Storage and embedding backends are injected through the
//! [`store::FaqStore`] and [`embedding::Embedder`] traits.

pub mod embedding;
pub mod lexical;
pub mod matcher;
pub mod models;
pub mod semantic;
pub mod store;
pub mod text;
