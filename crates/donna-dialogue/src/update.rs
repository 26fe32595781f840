//! Updates to existing tasks: reschedules and reminder changes.

use chrono::{Duration, NaiveDateTime, Utc};
use donna_core::intent::UpdateIntent;
use donna_core::task::Task;
use donna_core::timeutil;
use donna_core::DonnaError;
use donna_store::TaskPatch;
use tracing::{info, warn};

use crate::orchestrator::Orchestrator;
use crate::reply;

/// Timestamp format of SQLite's `datetime('now')`.
const DB_DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

/// How recently a task must have been touched to be "the task we were just
/// talking about".
const RECENT_WINDOW_MIN: i64 = 5;

impl Orchestrator {
    pub(crate) async fn try_task_update(
        &mut self,
        user_id: i64,
        message: &str,
        context: &str,
    ) -> Result<String, DonnaError> {
        let tasks = self.store.get_user_tasks(user_id).await?;
        let recent = find_recent_task(&tasks);

        let update = match self.intents.parse_update(message, context, recent).await {
            Ok(update) => update,
            Err(e) => {
                warn!("update parse failed: {e}");
                UpdateIntent::default()
            }
        };

        let target = if update.is_update_request {
            find_update_target(&tasks, &update, recent)
        } else {
            None
        };
        let Some(target) = target else {
            if tasks.len() > 1 {
                let names: Vec<&str> = tasks.iter().take(3).map(|t| t.title.as_str()).collect();
                return Ok(reply::task_list_prompt(&names));
            }
            return Ok(reply::WHICH_TASK.to_string());
        };

        let patch = build_update_patch(target, &update);
        self.store.update_task(target.id, &patch).await?;
        info!("updated task {} for user {user_id}", target.id);

        if message.to_lowercase().contains("reminder") {
            Ok(reply::reminder_updated(&target.title))
        } else {
            Ok(reply::task_updated(&target.title))
        }
    }
}

/// The task the conversation is "about": the most recently touched task if
/// it was touched within the last few minutes, else the most recent overall.
pub(crate) fn find_recent_task(tasks: &[Task]) -> Option<&Task> {
    let mut sorted: Vec<&Task> = tasks.iter().collect();
    sorted.sort_by(|a, b| b.touched_at().cmp(a.touched_at()));

    let now = Utc::now().naive_utc();
    for task in &sorted {
        if let Ok(touched) = NaiveDateTime::parse_from_str(task.touched_at(), DB_DATETIME_FMT) {
            if now.signed_duration_since(touched) < Duration::minutes(RECENT_WINDOW_MIN) {
                return Some(task);
            }
        }
    }
    sorted.first().copied()
}

/// Match the oracle's task identifier against titles and descriptions,
/// falling back to the recent task.
fn find_update_target<'a>(
    tasks: &'a [Task],
    update: &UpdateIntent,
    recent: Option<&'a Task>,
) -> Option<&'a Task> {
    if let Some(ident) = update
        .task_identifier
        .as_deref()
        .map(str::to_lowercase)
        .filter(|s| !s.trim().is_empty())
    {
        for task in tasks {
            let in_title = task.title.to_lowercase().contains(&ident);
            let in_description = task
                .description
                .as_deref()
                .map(|d| d.to_lowercase().contains(&ident))
                .unwrap_or(false);
            if in_title || in_description {
                return Some(task);
            }
        }
    }
    recent
}

/// Translate an update intent into a store patch. A relative reminder
/// offset is resolved against the target's existing due date/time and wins
/// over any absolute reminder fields.
fn build_update_patch(target: &Task, update: &UpdateIntent) -> TaskPatch {
    let mut reminder_date = update.new_reminder_date.clone();
    let mut reminder_time = update.new_reminder_time.clone();

    if let Some(offset) = update.reminder_offset_minutes {
        if let (Some(date), Some(time)) = (target.due_date.as_deref(), target.due_time.as_deref()) {
            if let Some((date, time)) = timeutil::minus_minutes(date, time, offset) {
                reminder_date = Some(date);
                reminder_time = Some(time);
            }
        }
    }

    TaskPatch {
        due_date: update.new_due_date.clone(),
        due_time: update.new_due_time.clone(),
        reminder_date,
        reminder_time,
        ..Default::default()
    }
}
