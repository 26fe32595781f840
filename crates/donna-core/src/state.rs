//! Per-conversation dialogue state.
//!
//! One [`ConversationState`] exists per active user, owned by the
//! orchestrator in a map keyed by user id. It is a plain value: no globals,
//! no interior mutability.

use crate::intent::TaskIntent;
use crate::task::Task;

/// What the assistant is currently asking the user for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClarificationKind {
    /// Waiting for the due date and time of the pending task.
    DueDatetime,
    /// Waiting for a reminder time (or a "no").
    ReminderDatetime,
    /// Waiting for the user to pick which of two colliding tasks to move.
    ConflictResolution,
}

/// Mutable per-conversation record of an in-flight clarification.
///
/// Invariant: a clarification kind is set only through [`begin`] /
/// [`begin_conflict`], which also install the pending task — so "awaiting
/// clarification" always implies a pending task exists.
///
/// [`begin`]: ConversationState::begin
/// [`begin_conflict`]: ConversationState::begin_conflict
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    clarification: Option<ClarificationKind>,
    pending_task: Option<TaskIntent>,
    original_message: Option<String>,
    /// The exact message that triggered the clarification, kept to guard
    /// against the caller resubmitting it and having it consumed as the
    /// answer to its own question.
    trigger_message: Option<String>,
    conflicting_task: Option<Task>,
}

impl ConversationState {
    pub fn awaiting_clarification(&self) -> bool {
        self.clarification.is_some()
    }

    pub fn clarification(&self) -> Option<ClarificationKind> {
        self.clarification
    }

    /// Whether `message` should be routed to the clarification path.
    pub fn is_clarification_reply(&self, message: &str) -> bool {
        self.awaiting_clarification() && self.trigger_message.as_deref() != Some(message)
    }

    pub fn pending_task(&self) -> Option<&TaskIntent> {
        self.pending_task.as_ref()
    }

    pub fn pending_task_mut(&mut self) -> Option<&mut TaskIntent> {
        self.pending_task.as_mut()
    }

    pub fn original_message(&self) -> Option<&str> {
        self.original_message.as_deref()
    }

    pub fn conflicting_task(&self) -> Option<&Task> {
        self.conflicting_task.as_ref()
    }

    /// Enter a due/reminder clarification for `pending`.
    pub fn begin(&mut self, kind: ClarificationKind, pending: TaskIntent, original: &str) {
        self.clarification = Some(kind);
        self.pending_task = Some(pending);
        self.original_message = Some(original.to_string());
        self.trigger_message = None;
        self.conflicting_task = None;
    }

    /// Enter conflict resolution: `pending` collided with `conflicting`.
    ///
    /// Unlike [`begin`], the triggering message is recorded so a resubmission
    /// of it is not mistaken for the user's answer.
    ///
    /// [`begin`]: ConversationState::begin
    pub fn begin_conflict(&mut self, pending: TaskIntent, conflicting: Task, original: &str) {
        self.clarification = Some(ClarificationKind::ConflictResolution);
        self.pending_task = Some(pending);
        self.original_message = Some(original.to_string());
        self.trigger_message = Some(original.to_string());
        self.conflicting_task = Some(conflicting);
    }

    /// Advance to the next clarification step without touching the pending task.
    pub fn advance(&mut self, kind: ClarificationKind) {
        debug_assert!(self.pending_task.is_some());
        self.clarification = Some(kind);
    }

    /// Reset to the empty state. Idempotent.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
