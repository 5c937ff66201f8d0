//! SQLite-backed [`FaqStore`] implementation.
//!
//! Maps each store operation onto the schema created by
//! [`migrate`](crate::migrate): `faqs`, `faq_embeddings`, `chat_history`.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use faq_harness_core::embedding::{blob_to_vec, vec_to_blob};
use faq_harness_core::models::{ChatTurn, EmbeddedFaq, FaqRecord, NewChatTurn, NewFaq};
use faq_harness_core::store::FaqStore;

/// SQLite implementation of the [`FaqStore`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn faq_from_row(row: &SqliteRow) -> FaqRecord {
    FaqRecord {
        id: row.get("id"),
        question: row.get("question"),
        answer: row.get("answer"),
        category: row.get("category"),
    }
}

/// Escape `\`, `%` and `_` for a `LIKE ... ESCAPE '\'` pattern.
fn escape_like(keyword: &str) -> String {
    let mut out = String::with_capacity(keyword.len());
    for c in keyword.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[async_trait]
impl FaqStore for SqliteStore {
    async fn list_all_faqs(&self) -> Result<Vec<FaqRecord>> {
        let rows = sqlx::query(
            "SELECT id, question, answer, category FROM faqs ORDER BY category ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(faq_from_row).collect())
    }

    async fn insert_faq(&self, faq: &NewFaq) -> Result<i64> {
        let now = chrono::Utc::now().timestamp();
        let result = sqlx::query(
            "INSERT INTO faqs (question, answer, category, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&faq.question)
        .bind(&faq.answer)
        .bind(&faq.category)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn upsert_embedding(&self, faq_id: i64, vector: &[f32]) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        let blob = vec_to_blob(vector);

        sqlx::query(
            r#"
            INSERT INTO faq_embeddings (faq_id, embedding, dims, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(faq_id) DO UPDATE SET
                embedding = excluded.embedding,
                dims = excluded.dims,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(faq_id)
        .bind(&blob)
        .bind(vector.len() as i64)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_embeddings_joined(&self) -> Result<Vec<EmbeddedFaq>> {
        let rows = sqlx::query(
            r#"
            SELECT fe.faq_id, fe.embedding, f.question, f.answer, f.category
            FROM faq_embeddings fe
            JOIN faqs f ON fe.faq_id = f.id
            ORDER BY fe.faq_id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| {
                let blob: Vec<u8> = row.get("embedding");
                EmbeddedFaq {
                    faq_id: row.get("faq_id"),
                    vector: blob_to_vec(&blob),
                    question: row.get("question"),
                    answer: row.get("answer"),
                    category: row.get("category"),
                }
            })
            .collect())
    }

    async fn search_faqs_by_keyword(&self, keyword: &str) -> Result<Vec<FaqRecord>> {
        // SQLite LIKE is case-insensitive for ASCII. Wildcards in the
        // keyword match literally.
        let pattern = format!("%{}%", escape_like(keyword));
        let rows = sqlx::query(
            r#"
            SELECT id, question, answer, category FROM faqs
            WHERE question LIKE ? ESCAPE '\' OR answer LIKE ? ESCAPE '\'
            ORDER BY category ASC, id ASC
            "#,
        )
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(faq_from_row).collect())
    }

    async fn save_chat_turn(&self, turn: &NewChatTurn) -> Result<i64> {
        let now = chrono::Utc::now().timestamp();
        let result = sqlx::query(
            r#"
            INSERT INTO chat_history (user_message, bot_response, confidence_score, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&turn.user_message)
        .bind(&turn.bot_response)
        .bind(turn.confidence_score)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn chat_history(&self, limit: i64) -> Result<Vec<ChatTurn>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_message, bot_response, confidence_score, created_at
            FROM chat_history
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )
        // A negative LIMIT means unlimited in SQLite; treat it as empty.
        .bind(limit.max(0))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| ChatTurn {
                id: row.get("id"),
                user_message: row.get("user_message"),
                bot_response: row.get("bot_response"),
                confidence_score: row.get("confidence_score"),
                created_at: row.get("created_at"),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("password"), "password");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("snake_case"), "snake\\_case");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
    }
}
