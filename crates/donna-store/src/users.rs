use super::TaskStore;
use donna_core::error::DonnaError;

impl TaskStore {
    /// Look up a user id by username, creating the user on first sight.
    pub async fn get_or_create_user(&self, username: &str) -> Result<i64, DonnaError> {
        let existing: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DonnaError::Store(format!("user lookup failed: {e}")))?;

        if let Some((id,)) = existing {
            return Ok(id);
        }

        let result = sqlx::query("INSERT INTO users (username) VALUES (?)")
            .bind(username)
            .execute(&self.pool)
            .await
            .map_err(|e| DonnaError::Store(format!("create user failed: {e}")))?;

        tracing::info!("new user '{username}' created");
        Ok(result.last_insert_rowid())
    }
}
