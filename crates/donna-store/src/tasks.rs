//! Task CRUD and the conflict lookup.

use super::TaskStore;
use donna_core::error::DonnaError;
use donna_core::task::{Task, TaskStatus};

/// Row shape shared by every task SELECT.
type TaskRow = (
    i64,            // id
    i64,            // user_id
    String,         // title
    Option<String>, // description
    Option<String>, // due_date
    Option<String>, // due_time
    Option<String>, // reminder_date
    Option<String>, // reminder_time
    String,         // status
    String,         // created_at
    String,         // updated_at
);

const TASK_COLUMNS: &str = "id, user_id, title, description, due_date, due_time, \
     reminder_date, reminder_time, status, created_at, updated_at";

fn task_from_row(row: TaskRow) -> Task {
    Task {
        id: row.0,
        user_id: row.1,
        title: row.2,
        description: row.3,
        due_date: row.4,
        due_time: row.5,
        reminder_date: row.6,
        reminder_time: row.7,
        status: TaskStatus::parse(&row.8),
        created_at: row.9,
        updated_at: row.10,
    }
}

/// Fields for a new task row.
#[derive(Debug, Clone, Copy, Default)]
pub struct NewTask<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub due_date: Option<&'a str>,
    pub due_time: Option<&'a str>,
    pub reminder_date: Option<&'a str>,
    pub reminder_time: Option<&'a str>,
}

/// Partial update; only `Some` fields are written. `updated_at` is always
/// refreshed.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub due_time: Option<String>,
    pub reminder_date: Option<String>,
    pub reminder_time: Option<String>,
    pub status: Option<TaskStatus>,
}

impl TaskStore {
    /// Insert a task and return its id.
    pub async fn create_task(&self, user_id: i64, new: &NewTask<'_>) -> Result<i64, DonnaError> {
        let result = sqlx::query(
            "INSERT INTO tasks (user_id, title, description, due_date, due_time, \
             reminder_date, reminder_time) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(new.title)
        .bind(new.description)
        .bind(new.due_date)
        .bind(new.due_time)
        .bind(new.reminder_date)
        .bind(new.reminder_time)
        .execute(&self.pool)
        .await
        .map_err(|e| DonnaError::Store(format!("create task failed: {e}")))?;

        Ok(result.last_insert_rowid())
    }

    /// All tasks for a user, most recently created first.
    pub async fn get_user_tasks(&self, user_id: i64) -> Result<Vec<Task>, DonnaError> {
        let rows: Vec<TaskRow> = sqlx::query_as(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = ? ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DonnaError::Store(format!("get tasks failed: {e}")))?;

        Ok(rows.into_iter().map(task_from_row).collect())
    }

    /// A single task by id.
    pub async fn get_task(&self, task_id: i64) -> Result<Option<Task>, DonnaError> {
        let row: Option<TaskRow> =
            sqlx::query_as(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?"))
                .bind(task_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| DonnaError::Store(format!("get task failed: {e}")))?;

        Ok(row.map(task_from_row))
    }

    /// Existing tasks for `user_id` at exactly the given due date and time.
    ///
    /// Equality, not interval overlap: two tasks one minute apart are not
    /// flagged. Known limitation carried over from the product's v1 conflict
    /// semantics.
    pub async fn find_conflicts(
        &self,
        user_id: i64,
        due_date: &str,
        due_time: &str,
        exclude_task_id: Option<i64>,
    ) -> Result<Vec<Task>, DonnaError> {
        let mut sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks \
             WHERE user_id = ? AND due_date = ? AND due_time = ?"
        );
        if exclude_task_id.is_some() {
            sql.push_str(" AND id != ?");
        }

        let mut query = sqlx::query_as::<_, TaskRow>(&sql)
            .bind(user_id)
            .bind(due_date)
            .bind(due_time);
        if let Some(id) = exclude_task_id {
            query = query.bind(id);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DonnaError::Store(format!("conflict lookup failed: {e}")))?;

        Ok(rows.into_iter().map(task_from_row).collect())
    }

    /// Apply a partial update. Returns `true` if a row was modified.
    pub async fn update_task(&self, task_id: i64, patch: &TaskPatch) -> Result<bool, DonnaError> {
        let mut sets = Vec::new();
        let mut values: Vec<String> = Vec::new();

        if let Some(ref t) = patch.title {
            sets.push("title = ?");
            values.push(t.clone());
        }
        if let Some(ref d) = patch.description {
            sets.push("description = ?");
            values.push(d.clone());
        }
        if let Some(ref d) = patch.due_date {
            sets.push("due_date = ?");
            values.push(d.clone());
        }
        if let Some(ref t) = patch.due_time {
            sets.push("due_time = ?");
            values.push(t.clone());
        }
        if let Some(ref d) = patch.reminder_date {
            sets.push("reminder_date = ?");
            values.push(d.clone());
        }
        if let Some(ref t) = patch.reminder_time {
            sets.push("reminder_time = ?");
            values.push(t.clone());
        }
        if let Some(status) = patch.status {
            sets.push("status = ?");
            values.push(status.as_str().to_string());
        }

        if sets.is_empty() {
            return Ok(false);
        }
        sets.push("updated_at = datetime('now')");

        let sql = format!("UPDATE tasks SET {} WHERE id = ?", sets.join(", "));
        let mut query = sqlx::query(&sql);
        for v in &values {
            query = query.bind(v);
        }
        query = query.bind(task_id);

        let result = query
            .execute(&self.pool)
            .await
            .map_err(|e| DonnaError::Store(format!("update task failed: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Update only the status of a task.
    pub async fn update_task_status(
        &self,
        task_id: i64,
        status: TaskStatus,
    ) -> Result<bool, DonnaError> {
        let result = sqlx::query(
            "UPDATE tasks SET status = ?, updated_at = datetime('now') WHERE id = ?",
        )
        .bind(status.as_str())
        .bind(task_id)
        .execute(&self.pool)
        .await
        .map_err(|e| DonnaError::Store(format!("update status failed: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a task. Returns `true` if a row was removed.
    pub async fn delete_task(&self, task_id: i64) -> Result<bool, DonnaError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(task_id)
            .execute(&self.pool)
            .await
            .map_err(|e| DonnaError::Store(format!("delete task failed: {e}")))?;

        Ok(result.rows_affected() > 0)
    }
}
