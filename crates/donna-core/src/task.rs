use crate::timeutil;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a persisted task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Completed,
}

impl TaskStatus {
    /// Stable string form used in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Completed => "completed",
        }
    }

    /// Parse the database string form. Unknown values fall back to pending.
    pub fn parse(s: &str) -> Self {
        match s {
            "completed" => TaskStatus::Completed,
            _ => TaskStatus::Pending,
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted task record.
///
/// `due_date`/`due_time` and `reminder_date`/`reminder_time` are stored as
/// `YYYY-MM-DD` / `HH:MM` strings and round-trip through the store unchanged.
/// A row never carries only one half of the due pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub due_time: Option<String>,
    pub reminder_date: Option<String>,
    pub reminder_time: Option<String>,
    pub status: TaskStatus,
    /// Set by the store on insert (`YYYY-MM-DD HH:MM:SS`).
    pub created_at: String,
    /// Set by the store on insert and every update.
    pub updated_at: String,
}

impl Task {
    /// Combined due date/time, when both halves are present and parse.
    pub fn due_datetime(&self) -> Option<NaiveDateTime> {
        timeutil::combine(self.due_date.as_deref()?, self.due_time.as_deref()?)
    }

    /// The most recent touch timestamp: `updated_at`, else `created_at`.
    pub fn touched_at(&self) -> &str {
        if self.updated_at.is_empty() {
            &self.created_at
        } else {
            &self.updated_at
        }
    }
}
