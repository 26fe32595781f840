//! Conflict resolution: two tasks want the same slot and the user's next
//! message decides which one moves.

use donna_core::intent::TaskIntent;
use donna_core::task::Task;
use donna_core::DonnaError;
use donna_store::TaskPatch;
use tracing::{info, warn};

use crate::creation::{create_from_intent, CreateOutcome};
use crate::orchestrator::Orchestrator;
use crate::reply;

/// Which of the two colliding tasks the user wants to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RescheduleTarget {
    /// Move the already-stored task; the new one takes the disputed slot.
    Old,
    /// Move the just-requested task to a different slot.
    New,
    /// Cannot tell; ask again without touching anything.
    Ambiguous,
}

/// Generic scheduling words that, absent an explicit title, bias the reply
/// toward moving the just-requested task.
const RESCHEDULE_KEYWORDS: &[&str] = &["schedule", "then", "at", "to", "change", "move", "shift"];

/// Decide which task a conflict-resolution reply is about.
///
/// An explicit title mention wins; a title mentioned on both sides cancels
/// out. Substring matching is deliberate, so "the dentist one" still hits a
/// task titled "Dentist appointment" when the oracle titled it that way.
pub fn resolve_target(conflicting: &Task, pending: &TaskIntent, message: &str) -> RescheduleTarget {
    let msg = message.to_lowercase();
    let old_title = conflicting.title.to_lowercase();
    let new_title = pending
        .title
        .as_deref()
        .unwrap_or_default()
        .to_lowercase();

    let mentions_old = !old_title.is_empty() && msg.contains(&old_title);
    let mentions_new = !new_title.is_empty() && msg.contains(&new_title);

    if mentions_new && !mentions_old {
        RescheduleTarget::New
    } else if mentions_old && !mentions_new {
        RescheduleTarget::Old
    } else if RESCHEDULE_KEYWORDS.iter().any(|kw| msg.contains(kw)) {
        RescheduleTarget::New
    } else {
        RescheduleTarget::Ambiguous
    }
}

impl Orchestrator {
    /// Handle the user's answer while a conflict is pending.
    pub(crate) async fn resolve_conflict(
        &mut self,
        user_id: i64,
        username: &str,
        message: &str,
        context: &str,
    ) -> Result<String, DonnaError> {
        let (pending, conflicting) = {
            let state = self.states.entry(user_id).or_default();
            match (state.pending_task().cloned(), state.conflicting_task().cloned()) {
                (Some(pending), Some(conflicting)) => (pending, conflicting),
                _ => {
                    state.clear();
                    return Ok(reply::CLARIFY_TROUBLE.to_string());
                }
            }
        };

        match resolve_target(&conflicting, &pending, message) {
            RescheduleTarget::Old => {
                self.reschedule_old(user_id, username, conflicting, pending, message, context)
                    .await
            }
            RescheduleTarget::New => {
                self.reschedule_new(user_id, username, pending, message, context).await
            }
            // Re-ask; the pending conflict survives for the next turn.
            RescheduleTarget::Ambiguous => Ok(reply::CONFLICT_AMBIGUOUS.to_string()),
        }
    }

    /// Move the stored task to the newly given time and create the pending
    /// task in the disputed slot.
    async fn reschedule_old(
        &mut self,
        user_id: i64,
        username: &str,
        conflicting: Task,
        mut pending: TaskIntent,
        message: &str,
        context: &str,
    ) -> Result<String, DonnaError> {
        self.clear_state(user_id);

        let timing = self.parse_timing(message, context).await;
        if timing.due_date.is_none() && timing.due_time.is_none() {
            return Ok(reply::OLD_TIME_MISSING.to_string());
        }

        let patch = TaskPatch {
            due_date: timing.due_date.clone(),
            due_time: timing.due_time.clone(),
            ..Default::default()
        };
        self.store.update_task(conflicting.id, &patch).await?;
        info!(
            "rescheduled task {} for user {user_id} to {:?} {:?}",
            conflicting.id, timing.due_date, timing.due_time
        );

        pending.mark_confirmed();
        match create_from_intent(&self.store, user_id, &pending).await? {
            CreateOutcome::Created { .. } => {
                self.store_summary_after_creation(user_id, username).await;
                let moved_to = timing
                    .due_time
                    .or_else(|| conflicting.due_time.clone())
                    .unwrap_or_default();
                let kept_at = pending.due_time.clone().unwrap_or_default();
                Ok(reply::rescheduled_old_confirmation(
                    &conflicting.title,
                    pending.title.as_deref().unwrap_or("your task"),
                    &moved_to,
                    &kept_at,
                ))
            }
            _ => Ok(reply::old_moved_but_new_failed(&conflicting.title)),
        }
    }

    /// Create the pending task at the newly given time, leaving the stored
    /// task alone.
    async fn reschedule_new(
        &mut self,
        user_id: i64,
        username: &str,
        mut pending: TaskIntent,
        message: &str,
        context: &str,
    ) -> Result<String, DonnaError> {
        self.clear_state(user_id);

        let timing = self.parse_timing(message, context).await;
        let (Some(date), Some(time)) = (timing.due_date, timing.due_time) else {
            return Ok(reply::NEW_TIME_MISSING.to_string());
        };

        pending.due_date = Some(date);
        pending.due_time = Some(time);
        pending.mark_confirmed();
        match create_from_intent(&self.store, user_id, &pending).await? {
            CreateOutcome::Created { .. } => {
                self.store_summary_after_creation(user_id, username).await;
                Ok(reply::rescheduled_new_confirmation(&pending))
            }
            CreateOutcome::Conflicts(_) => {
                Ok(reply::trouble_with("That slot is taken as well."))
            }
            CreateOutcome::Rejected { reason } => Ok(reply::trouble_with(reason)),
        }
    }

    async fn parse_timing(&self, message: &str, context: &str) -> TaskIntent {
        match self.intents.parse_task(message, context).await {
            Ok(timing) => timing,
            Err(e) => {
                warn!("reschedule timing parse failed: {e}");
                TaskIntent::default()
            }
        }
    }

    fn clear_state(&mut self, user_id: i64) {
        if let Some(state) = self.states.get_mut(&user_id) {
            state.clear();
        }
    }
}
