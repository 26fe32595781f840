//! Task creation: validation, persistence, and the conversational entry
//! point that decides between direct creation and clarification.

use donna_core::intent::TaskIntent;
use donna_core::state::ClarificationKind;
use donna_core::task::Task;
use donna_core::DonnaError;
use donna_store::{NewTask, TaskStore};
use tracing::{info, warn};

use crate::orchestrator::Orchestrator;
use crate::reply;

/// Minimum oracle confidence for persisting an intent.
pub const CONFIDENCE_GATE: f32 = 0.6;

/// Outcome of attempting to persist a task intent.
#[derive(Debug)]
pub enum CreateOutcome {
    /// Task persisted.
    Created { task_id: i64 },
    /// Intent failed validation; nothing was persisted.
    Rejected { reason: &'static str },
    /// The due slot is already taken; nothing was persisted.
    Conflicts(Vec<Task>),
}

/// Validate a task intent and persist it if it passes.
///
/// Gates, in order: the oracle must have recognized a task request with
/// confidence at or above [`CONFIDENCE_GATE`]; a non-empty title must exist;
/// the due pair must be complete or wholly absent; the slot must be free.
pub async fn create_from_intent(
    store: &TaskStore,
    user_id: i64,
    intent: &TaskIntent,
) -> Result<CreateOutcome, DonnaError> {
    if !intent.is_task_request || intent.confidence < CONFIDENCE_GATE {
        return Ok(CreateOutcome::Rejected {
            reason: "not recognized as a task request",
        });
    }
    let Some(title) = intent.title.as_deref().filter(|t| !t.trim().is_empty()) else {
        return Ok(CreateOutcome::Rejected {
            reason: "no task title",
        });
    };
    // A task is never persisted with only half of its due pair.
    if intent.due_date.is_some() != intent.due_time.is_some() {
        return Ok(CreateOutcome::Rejected {
            reason: "incomplete due date/time",
        });
    }

    if let (Some(date), Some(time)) = (intent.due_date.as_deref(), intent.due_time.as_deref()) {
        let conflicts = store.find_conflicts(user_id, date, time, None).await?;
        if !conflicts.is_empty() {
            return Ok(CreateOutcome::Conflicts(conflicts));
        }
    }

    let task_id = store
        .create_task(
            user_id,
            &NewTask {
                title,
                description: intent.description.as_deref(),
                due_date: intent.due_date.as_deref(),
                due_time: intent.due_time.as_deref(),
                reminder_date: intent.reminder_date.as_deref(),
                reminder_time: intent.reminder_time.as_deref(),
            },
        )
        .await?;
    info!("created task {task_id} for user {user_id}: {title}");
    Ok(CreateOutcome::Created { task_id })
}

/// Joiners that suggest a message carries more than one task.
const MULTI_JOINERS: &[&str] = &[" and ", " & ", " plus "];

/// Timing words counted to tell "gym and call mom at 5" (one slot) from
/// "gym at 5 and call mom at 7" (two slots). Substring counts, on purpose.
const TIME_WORDS: &[&str] = &["at ", " pm", " am", "o'clock"];

pub(crate) fn is_multi_task_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    if !MULTI_JOINERS.iter().any(|j| lower.contains(j)) {
        return false;
    }
    let timing_mentions: usize = TIME_WORDS.iter().map(|w| lower.matches(w).count()).sum();
    timing_mentions >= 2
}

impl Orchestrator {
    pub(crate) async fn try_task_creation(
        &mut self,
        user_id: i64,
        username: &str,
        message: &str,
        context: &str,
    ) -> Result<String, DonnaError> {
        if is_multi_task_message(message) {
            return self.create_multiple(user_id, username, message, context).await;
        }

        let intent = match self.intents.parse_task(message, context).await {
            Ok(intent) => intent,
            Err(e) => {
                warn!("task parse failed: {e}");
                TaskIntent::default()
            }
        };

        if intent.title.as_deref().map_or(true, |t| t.trim().is_empty()) {
            return Ok(reply::ASK_WHAT_TASK.to_string());
        }
        if !intent.has_due() {
            return Ok(self.request_due_clarification(user_id, intent, message).await);
        }
        self.create_and_confirm(user_id, username, intent, message).await
    }

    /// Persist a complete intent, or enter conflict resolution.
    pub(crate) async fn create_and_confirm(
        &mut self,
        user_id: i64,
        username: &str,
        intent: TaskIntent,
        message: &str,
    ) -> Result<String, DonnaError> {
        match create_from_intent(&self.store, user_id, &intent).await? {
            CreateOutcome::Created { .. } => {
                self.store_summary_after_creation(user_id, username).await;
                Ok(reply::task_confirmation(&intent))
            }
            CreateOutcome::Conflicts(conflicts) => {
                if let Some(conflict) = conflicts.into_iter().next() {
                    let response = reply::conflict_message(&conflict, username);
                    let state = self.states.entry(user_id).or_default();
                    state.begin_conflict(intent, conflict, message);
                    Ok(response)
                } else {
                    Ok(reply::CREATION_RETRY.to_string())
                }
            }
            CreateOutcome::Rejected { .. } => Ok(reply::CREATION_RETRY.to_string()),
        }
    }

    /// Park the intent and ask for the missing due date/time.
    async fn request_due_clarification(
        &mut self,
        user_id: i64,
        intent: TaskIntent,
        message: &str,
    ) -> String {
        let title = intent.title.clone().unwrap_or_default();
        let question = match self
            .phrasing
            .compose(
                "The user wants to create a task but did not say when it is due. \
                 Ask one short friendly question for the due date and time.",
                &format!("Task: {title}"),
            )
            .await
        {
            Ok(q) if !q.trim().is_empty() => q,
            _ => reply::due_question(&title),
        };

        let state = self.states.entry(user_id).or_default();
        state.begin(ClarificationKind::DueDatetime, intent, message);
        question
    }

    /// Split a multi-task message and create each fragment independently.
    async fn create_multiple(
        &mut self,
        user_id: i64,
        username: &str,
        message: &str,
        context: &str,
    ) -> Result<String, DonnaError> {
        let fragments = match self.intents.split_tasks(message).await {
            Ok(fragments) if !fragments.is_empty() => fragments,
            Ok(_) => return Ok(reply::MULTI_TASK_FALLBACK.to_string()),
            Err(e) => {
                warn!("task split failed: {e}");
                return Ok(reply::MULTI_TASK_FALLBACK.to_string());
            }
        };

        let mut created = Vec::new();
        for fragment in &fragments {
            let intent = match self.intents.parse_task(fragment, context).await {
                Ok(intent) => intent,
                Err(e) => {
                    warn!("fragment parse failed: {e}");
                    continue;
                }
            };
            if let CreateOutcome::Created { .. } =
                create_from_intent(&self.store, user_id, &intent).await?
            {
                if let Some(title) = intent.title {
                    created.push(title);
                }
            }
        }

        if created.is_empty() {
            Ok(reply::MULTI_TASK_NEED_DETAILS.to_string())
        } else {
            self.store_summary_after_creation(user_id, username).await;
            Ok(reply::multi_task_confirmation(&created))
        }
    }
}
