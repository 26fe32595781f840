//! Deterministic user-facing replies.
//!
//! The phrasing oracle dresses up some responses, but every decision point
//! has a fixed sentence here so a dead oracle degrades wording, never
//! behavior.

use crate::query::TimeFrame;
use donna_core::intent::TaskIntent;
use donna_core::task::Task;
use donna_core::timeutil;

pub const APOLOGY: &str = "I'm sorry, I encountered an error. Could you try rephrasing that?";

pub const ASK_WHAT_TASK: &str = "What task would you like me to track? 🤔";

pub const CREATION_TROUBLE: &str =
    "I'm having trouble creating that task. Could you tell me more?";

pub const CREATION_RETRY: &str = "Hmm, had trouble with that. Could you try again? 🤔";

pub const CLARIFY_TROUBLE: &str = "Sorry, I didn't quite get that. Could you clarify? 🤔";

pub const QUERY_FALLBACK: &str = "Let me check your tasks for you...";

pub const UPDATE_FALLBACK: &str = "Which task should I update? 🤔";

pub const WHICH_TASK: &str = "Which task would you like to update? 🤔";

pub const REMINDER_OFFER: &str =
    "Got it! I've added it to your calendar. Do you need a reminder before you leave?";

pub const DUE_REASK: &str =
    "Hmm, I didn't catch the date and time. Could you tell me when? 🤔";

pub const REMINDER_REASK: &str =
    "When should I remind you? (e.g., 30 minutes before, or a specific time)";

pub const TASK_ADDED: &str = "Perfect! Task added successfully ✅";

pub const CONFLICT_AMBIGUOUS: &str =
    "Would you like to reschedule one of the tasks? Just let me know the new time.";

pub const NEW_TIME_MISSING: &str =
    "I didn't catch the new time. Could you specify when? (e.g., 6 PM)";

pub const OLD_TIME_MISSING: &str =
    "I didn't catch the new time. Could you specify when to reschedule? (e.g., 7 AM)";

pub const MULTI_TASK_FALLBACK: &str =
    "I see you mentioned multiple tasks. Let me add them one by one - what's the first one? 😊";

pub const MULTI_TASK_NEED_DETAILS: &str =
    "I found multiple tasks but need more details. Could you add them one at a time? 🤔";

/// Fallback question when the phrasing oracle cannot produce one.
pub fn due_question(title: &str) -> String {
    format!("When should I schedule \"{title}\"? A date and time would be perfect.")
}

/// Confirmation after a direct (no-clarification) task creation.
pub fn task_confirmation(intent: &TaskIntent) -> String {
    let title = intent.title.as_deref().unwrap_or("task").to_lowercase();
    let mut out = format!("Got it! I've added your {title} ");

    if let (Some(date), Some(time)) = (intent.due_date.as_deref(), intent.due_time.as_deref()) {
        out.push_str(&format!(
            "for {} at {}. ",
            timeutil::day_name(date),
            timeutil::time_12h(time)
        ));
    }
    if intent.has_reminder() {
        out.push_str("Reminder set! ");
    }
    out.push_str("You're all set! ✅");
    out
}

/// Announce a scheduling collision and offer to resolve it.
pub fn conflict_message(conflict: &Task, username: &str) -> String {
    format!(
        "By the way, {username}: looks like you've got {} scheduled at {}. Want me to handle that overlap?",
        conflict.title,
        conflict
            .due_time
            .as_deref()
            .map(timeutil::time_12h)
            .unwrap_or_else(|| "the same time".to_string()),
    )
}

/// Confirmation after a clarified task with a reminder was created.
pub fn reminder_confirmation(reminder_time: &str) -> String {
    format!("Perfect! I'll remind you at {} ✅", timeutil::time_12h(reminder_time))
}

pub fn trouble_with(reason: &str) -> String {
    format!("Hmm, had trouble with that. {reason} 🤔")
}

/// The old task moved, the new one kept its original slot.
pub fn rescheduled_old_confirmation(
    old_title: &str,
    new_title: &str,
    old_new_time: &str,
    new_orig_time: &str,
) -> String {
    format!(
        "Perfect! ✅ I've rescheduled {old_title} to {} and kept {new_title} at {}.",
        timeutil::time_12h(old_new_time),
        timeutil::time_12h(new_orig_time),
    )
}

/// The new task moved to a free slot.
pub fn rescheduled_new_confirmation(intent: &TaskIntent) -> String {
    let title = intent.title.as_deref().unwrap_or("Your task");
    match (intent.due_date.as_deref(), intent.due_time.as_deref()) {
        (Some(date), Some(time)) => format!(
            "Perfect! ✅ {title} scheduled for {} at {}.",
            timeutil::day_name(date),
            timeutil::time_12h(time),
        ),
        _ => format!("Perfect! ✅ {title} rescheduled."),
    }
}

pub fn old_moved_but_new_failed(old_title: &str) -> String {
    format!("I rescheduled {old_title}, but had trouble creating the new task. 🤔")
}

/// Up to three task titles for the user to pick from.
pub fn task_list_prompt(names: &[&str]) -> String {
    format!(
        "I have these tasks: {}. Which one would you like to update? 🤔",
        names.join(", ")
    )
}

pub fn reminder_updated(title: &str) -> String {
    format!("Done! I've updated the reminder for your {} ✅", title.to_lowercase())
}

pub fn task_updated(title: &str) -> String {
    format!("All done ✅ I've updated your {}.", title.to_lowercase())
}

pub fn multi_task_confirmation(titles: &[String]) -> String {
    format!("Perfect! I've added {} tasks: {} ✅", titles.len(), titles.join(", "))
}

pub fn empty_query_response(frame: TimeFrame, username: &str) -> String {
    match frame {
        TimeFrame::Today => {
            format!("You're all clear for today, {username}! No tasks scheduled 😊")
        }
        TimeFrame::Tomorrow => {
            format!("Nothing on your schedule for tomorrow, {username}! 📅")
        }
        _ => format!("No tasks found for that time frame, {username}! 👍"),
    }
}

/// Bullet-list summary of tasks, relative to `today`.
pub fn task_summary(tasks: &[&Task], today: chrono::NaiveDate) -> String {
    let today_str = today.format(timeutil::DATE_FMT).to_string();
    let mut lines = Vec::new();
    for task in tasks.iter().take(10) {
        let mut line = format!("• {}", task.title);
        if let (Some(date), Some(time)) = (task.due_date.as_deref(), task.due_time.as_deref()) {
            if date == today_str {
                line.push_str(&format!(" at {}", timeutil::time_12h(time)));
            } else {
                line.push_str(&format!(
                    " on {} at {}",
                    timeutil::day_name(date),
                    timeutil::time_12h(time)
                ));
            }
        }
        if task.reminder_date.is_some() && task.reminder_time.is_some() {
            line.push_str(" (Reminder set)");
        }
        lines.push(line);
    }
    lines.join("\n")
}

pub fn general_chat_fallback(username: &str) -> String {
    format!("Thanks for sharing, {username}! How can I help you stay organized today?")
}
