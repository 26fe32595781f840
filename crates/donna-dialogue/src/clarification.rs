//! The clarification state machine.
//!
//! A pending task moves through at most two questions: "when is it due?"
//! and "do you want a reminder?". Each user answer is reparsed together
//! with the original request, because the answer alone ("at 5pm") is not
//! self-describing.

use std::sync::LazyLock;

use donna_core::intent::{MessageIntent, TaskIntent};
use donna_core::state::ClarificationKind;
use donna_core::timeutil;
use donna_core::DonnaError;
use regex::Regex;
use tracing::warn;

use crate::creation::{create_from_intent, CreateOutcome};
use crate::orchestrator::Orchestrator;
use crate::reply;

/// Default reminder lead time for a bare "yes".
const DEFAULT_REMINDER_OFFSET_MIN: i64 = 30;

/// Exact tokens accepted as a bare affirmative.
const AFFIRMATIVES: &[&str] = &["yes", "yeah", "yep", "sure", "ok", "okay"];

// "30 minutes before" / "2 hrs before"
static OFFSET_BEFORE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)\s*(minute|hour|min|hr)s?\s*before").unwrap()
});
// "before 30 minutes" (common phrasing from some speakers)
static BEFORE_OFFSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)before\s+(\d+)\s*(minute|hour|min|hr)s?").unwrap()
});

impl Orchestrator {
    /// Handle a message while a clarification is pending.
    pub(crate) async fn try_clarification(
        &mut self,
        user_id: i64,
        username: &str,
        message: &str,
        context: &str,
    ) -> Result<String, DonnaError> {
        let Some(kind) = self.states.get(&user_id).and_then(|s| s.clarification()) else {
            // Classifier said "clarification" but nothing is pending; treat
            // it as ordinary conversation.
            let intent = MessageIntent::general_chat();
            return Ok(self.general_chat(username, message, &intent, context).await);
        };

        if kind == ClarificationKind::ConflictResolution {
            return self.resolve_conflict(user_id, username, message, context).await;
        }

        // Reparse the answer together with the request that raised the
        // question.
        let original = self
            .states
            .get(&user_id)
            .and_then(|s| s.original_message())
            .unwrap_or_default()
            .to_string();
        let combined = if original.is_empty() {
            message.to_string()
        } else {
            format!("{original}. {message}")
        };
        let timing = match self.intents.parse_task(&combined, context).await {
            Ok(timing) => timing,
            Err(e) => {
                warn!("clarification reparse failed: {e}");
                TaskIntent::default()
            }
        };

        if kind == ClarificationKind::DueDatetime {
            Ok(self.clarify_due(user_id, timing))
        } else {
            self.clarify_reminder(user_id, username, &timing, message).await
        }
    }

    /// Absorb a due date/time answer, or re-ask.
    fn clarify_due(&mut self, user_id: i64, timing: TaskIntent) -> String {
        let state = self.states.entry(user_id).or_default();
        if !timing.has_due() {
            return reply::DUE_REASK.to_string();
        }
        if let Some(pending) = state.pending_task_mut() {
            pending.due_date = timing.due_date;
            pending.due_time = timing.due_time;
        }
        state.advance(ClarificationKind::ReminderDatetime);
        reply::REMINDER_OFFER.to_string()
    }

    /// Absorb a reminder answer (relative, absolute, bare yes, or no), then
    /// finalize. An unintelligible answer re-asks without changing state.
    async fn clarify_reminder(
        &mut self,
        user_id: i64,
        username: &str,
        timing: &TaskIntent,
        message: &str,
    ) -> Result<String, DonnaError> {
        let lower = message.to_lowercase();
        let declined = lower.contains("no") && !lower.contains("yes");

        let state = self.states.entry(user_id).or_default();
        let resolved = match state.pending_task_mut() {
            Some(pending) => {
                if declined {
                    pending.reminder_date = None;
                    pending.reminder_time = None;
                    true
                } else if apply_relative_reminder(pending, message) {
                    true
                } else {
                    apply_absolute_reminder(pending, timing)
                }
            }
            None => {
                state.clear();
                return Ok(reply::CLARIFY_TROUBLE.to_string());
            }
        };

        if !resolved {
            return Ok(reply::REMINDER_REASK.to_string());
        }
        self.finalize_pending(user_id, username, message).await
    }

    /// Create the clarified task. The clarification is consumed up front so
    /// a failed creation never leaves the user trapped in it.
    pub(crate) async fn finalize_pending(
        &mut self,
        user_id: i64,
        username: &str,
        message: &str,
    ) -> Result<String, DonnaError> {
        let pending = self.states.get_mut(&user_id).and_then(|state| {
            let pending = state.pending_task().cloned();
            state.clear();
            pending
        });
        let Some(mut pending) = pending else {
            return Ok(reply::CLARIFY_TROUBLE.to_string());
        };
        // The user answered every question; the confidence gate must not
        // reject what they spelled out.
        pending.mark_confirmed();

        match create_from_intent(&self.store, user_id, &pending).await? {
            CreateOutcome::Created { .. } => {
                self.store_summary_after_creation(user_id, username).await;
                match pending.reminder_time.as_deref().filter(|_| pending.has_reminder()) {
                    Some(time) => Ok(reply::reminder_confirmation(time)),
                    None => Ok(reply::TASK_ADDED.to_string()),
                }
            }
            CreateOutcome::Conflicts(conflicts) => {
                if let Some(conflict) = conflicts.into_iter().next() {
                    let response = reply::conflict_message(&conflict, username);
                    let state = self.states.entry(user_id).or_default();
                    state.begin_conflict(pending, conflict, message);
                    Ok(response)
                } else {
                    Ok(reply::trouble_with("Could you try again?"))
                }
            }
            CreateOutcome::Rejected { reason } => Ok(reply::trouble_with(reason)),
        }
    }
}

/// Apply a relative reminder ("30 minutes before") or the bare-affirmative
/// default against the pending due date/time. Returns `false` when the
/// message carries neither, or the due pair is missing.
fn apply_relative_reminder(pending: &mut TaskIntent, message: &str) -> bool {
    let captures = OFFSET_BEFORE
        .captures(message)
        .or_else(|| BEFORE_OFFSET.captures(message));

    let minutes = if let Some(caps) = captures {
        // An amount that does not fit i64, or overflows when scaled to
        // minutes, is nonsense; re-prompt rather than guess.
        let Ok(amount) = caps[1].parse::<i64>() else {
            return false;
        };
        let unit = caps[2].to_lowercase();
        if unit.starts_with("hour") || unit.starts_with("hr") {
            match amount.checked_mul(60) {
                Some(minutes) => minutes,
                None => return false,
            }
        } else {
            amount
        }
    } else if AFFIRMATIVES.contains(&message.trim().to_lowercase().as_str()) {
        DEFAULT_REMINDER_OFFSET_MIN
    } else {
        return false;
    };

    let (Some(date), Some(time)) = (pending.due_date.clone(), pending.due_time.clone()) else {
        return false;
    };
    match timeutil::minus_minutes(&date, &time, minutes) {
        Some((reminder_date, reminder_time)) => {
            pending.reminder_date = Some(reminder_date);
            pending.reminder_time = Some(reminder_time);
            true
        }
        None => false,
    }
}

/// Apply an absolute reminder time from the reparsed answer. The oracle was
/// asked about timing generally, so its due fields usually carry the
/// reminder answer; its reminder fields are the fallback.
fn apply_absolute_reminder(pending: &mut TaskIntent, timing: &TaskIntent) -> bool {
    if timing.has_due() {
        pending.reminder_date = timing.due_date.clone();
        pending.reminder_time = timing.due_time.clone();
        true
    } else if timing.has_reminder() {
        pending.reminder_date = timing.reminder_date.clone();
        pending.reminder_time = timing.reminder_time.clone();
        true
    } else {
        false
    }
}
