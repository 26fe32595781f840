//! Conversation summaries: free text stored per user and replayed as
//! context for oracle calls. Recency-based retrieval only.

use super::TaskStore;
use donna_core::error::DonnaError;

impl TaskStore {
    /// Store a conversation summary.
    pub async fn store_summary(
        &self,
        user_id: i64,
        summary: &str,
        started_at: Option<&str>,
        ended_at: Option<&str>,
    ) -> Result<i64, DonnaError> {
        let result = sqlx::query(
            "INSERT INTO conversation_summaries (user_id, summary, started_at, ended_at) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(summary)
        .bind(started_at)
        .bind(ended_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DonnaError::Store(format!("store summary failed: {e}")))?;

        Ok(result.last_insert_rowid())
    }

    /// The most recent summaries for a user, newest first.
    pub async fn recent_summaries(
        &self,
        user_id: i64,
        limit: usize,
    ) -> Result<Vec<String>, DonnaError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT summary FROM conversation_summaries \
             WHERE user_id = ? ORDER BY id DESC LIMIT ?",
        )
        .bind(user_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DonnaError::Store(format!("summary lookup failed: {e}")))?;

        Ok(rows.into_iter().map(|(s,)| s).collect())
    }
}
