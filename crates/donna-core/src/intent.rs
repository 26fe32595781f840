//! Structured intents produced by the intent oracle.
//!
//! These are the wire types the oracle fills from free text. All fields are
//! `#[serde(default)]` because the underlying model omits keys it cannot
//! extract; a missing field is an absent field, never a parse error.

use crate::timeutil;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Coarse classification of an incoming message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    TaskCreation,
    TaskQuery,
    TaskUpdate,
    ClarificationResponse,
    #[default]
    GeneralChat,
}

/// Result of classifying a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageIntent {
    #[serde(rename = "intent", default)]
    pub kind: IntentKind,
    #[serde(default)]
    pub confidence: f32,
    #[serde(default)]
    pub emotional_context: Option<String>,
}

impl MessageIntent {
    /// Default intent when classification yields nothing usable.
    pub fn general_chat() -> Self {
        Self {
            kind: IntentKind::GeneralChat,
            confidence: 0.5,
            emotional_context: None,
        }
    }
}

/// Structured interpretation of a task-creation message.
///
/// Produced by the intent oracle or assembled progressively during
/// clarification. Validated and completed before it becomes a [`Task`];
/// never persisted directly.
///
/// [`Task`]: crate::task::Task
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskIntent {
    #[serde(default)]
    pub is_task_request: bool,
    #[serde(rename = "task_title", default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub due_time: Option<String>,
    #[serde(default)]
    pub reminder_date: Option<String>,
    #[serde(default)]
    pub reminder_time: Option<String>,
    #[serde(default)]
    pub confidence: f32,
}

impl TaskIntent {
    /// Both due halves present.
    pub fn has_due(&self) -> bool {
        self.due_date.is_some() && self.due_time.is_some()
    }

    /// Both reminder halves present.
    pub fn has_reminder(&self) -> bool {
        self.reminder_date.is_some() && self.reminder_time.is_some()
    }

    /// Combined due date/time, when both halves are present and parse.
    pub fn due_datetime(&self) -> Option<NaiveDateTime> {
        timeutil::combine(self.due_date.as_deref()?, self.due_time.as_deref()?)
    }

    /// Mark the intent as user-confirmed.
    ///
    /// A completed clarification cycle is ground truth: the confidence gate
    /// must not reject what the user just spelled out turn by turn.
    pub fn mark_confirmed(&mut self) {
        self.is_task_request = true;
        self.confidence = 1.0;
    }
}

/// Structured interpretation of a task-update message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateIntent {
    #[serde(default)]
    pub is_update_request: bool,
    /// Title/description fragment naming the target task.
    #[serde(default)]
    pub task_identifier: Option<String>,
    #[serde(default)]
    pub new_due_date: Option<String>,
    #[serde(default)]
    pub new_due_time: Option<String>,
    #[serde(default)]
    pub new_reminder_date: Option<String>,
    #[serde(default)]
    pub new_reminder_time: Option<String>,
    /// Relative reminder offset ("30 minutes before"), applied against the
    /// target task's existing due date/time.
    #[serde(default)]
    pub reminder_offset_minutes: Option<i64>,
}
