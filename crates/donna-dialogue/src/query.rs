//! Schedule queries: "what's on today?"

use chrono::{Duration, Local, NaiveDate};
use donna_core::task::Task;
use donna_core::timeutil;
use donna_core::DonnaError;
use tracing::warn;

use crate::orchestrator::Orchestrator;
use crate::reply;

/// Timeframe a query asks about, recognized by keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFrame {
    Today,
    Tomorrow,
    ThisWeek,
    All,
}

impl TimeFrame {
    pub fn label(self) -> &'static str {
        match self {
            TimeFrame::Today => "today",
            TimeFrame::Tomorrow => "tomorrow",
            TimeFrame::ThisWeek => "this week",
            TimeFrame::All => "all upcoming",
        }
    }
}

/// Keep the tasks falling inside the timeframe the message asks about.
/// Undated tasks only show up in the unfiltered view.
pub(crate) fn filter_by_timeframe<'a>(
    tasks: &'a [Task],
    message: &str,
    today: NaiveDate,
) -> (Vec<&'a Task>, TimeFrame) {
    let lower = message.to_lowercase();
    let today_str = today.format(timeutil::DATE_FMT).to_string();

    if lower.contains("today") {
        let kept = tasks
            .iter()
            .filter(|t| t.due_date.as_deref() == Some(today_str.as_str()))
            .collect();
        (kept, TimeFrame::Today)
    } else if lower.contains("tomorrow") {
        let tomorrow = (today + Duration::days(1)).format(timeutil::DATE_FMT).to_string();
        let kept = tasks
            .iter()
            .filter(|t| t.due_date.as_deref() == Some(tomorrow.as_str()))
            .collect();
        (kept, TimeFrame::Tomorrow)
    } else if lower.contains("week") {
        let end = (today + Duration::days(7)).format(timeutil::DATE_FMT).to_string();
        // Date strings compare correctly as strings.
        let kept = tasks
            .iter()
            .filter(|t| {
                t.due_date
                    .as_deref()
                    .map(|d| d >= today_str.as_str() && d <= end.as_str())
                    .unwrap_or(false)
            })
            .collect();
        (kept, TimeFrame::ThisWeek)
    } else {
        (tasks.iter().collect(), TimeFrame::All)
    }
}

impl Orchestrator {
    pub(crate) async fn try_task_query(
        &mut self,
        user_id: i64,
        username: &str,
        message: &str,
    ) -> Result<String, DonnaError> {
        let tasks = self.store.get_user_tasks(user_id).await?;
        let today = Local::now().date_naive();
        let (filtered, frame) = filter_by_timeframe(&tasks, message, today);

        if filtered.is_empty() {
            return Ok(reply::empty_query_response(frame, username));
        }

        let summary = reply::task_summary(&filtered, today);
        let instruction = format!(
            "The user asked about their schedule ({}). Present these tasks \
             conversationally in one or two sentences, addressing {username} by name.",
            frame.label()
        );
        match self.phrasing.compose(&instruction, &summary).await {
            Ok(text) if !text.trim().is_empty() => Ok(text),
            Ok(_) => Ok(summary),
            Err(e) => {
                warn!("phrasing failed for task query: {e}");
                Ok(summary)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task_due(id: i64, date: &str) -> Task {
        Task {
            id,
            user_id: 1,
            title: format!("Task {id}"),
            description: None,
            due_date: Some(date.into()),
            due_time: Some("09:00".into()),
            reminder_date: None,
            reminder_time: None,
            status: Default::default(),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_today_filter() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        let tasks = vec![task_due(1, "2025-01-10"), task_due(2, "2025-01-11")];
        let (kept, frame) = filter_by_timeframe(&tasks, "what's on today?", today);
        assert_eq!(frame, TimeFrame::Today);
        assert_eq!(kept.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_tomorrow_filter() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        let tasks = vec![task_due(1, "2025-01-10"), task_due(2, "2025-01-11")];
        let (kept, frame) = filter_by_timeframe(&tasks, "anything tomorrow?", today);
        assert_eq!(frame, TimeFrame::Tomorrow);
        assert_eq!(kept.iter().map(|t| t.id).collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_week_filter_spans_seven_days() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        let tasks = vec![
            task_due(1, "2025-01-10"),
            task_due(2, "2025-01-17"),
            task_due(3, "2025-01-20"),
        ];
        let (kept, frame) = filter_by_timeframe(&tasks, "show me this week", today);
        assert_eq!(frame, TimeFrame::ThisWeek);
        assert_eq!(kept.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_no_keyword_returns_everything() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        let mut tasks = vec![task_due(1, "2025-01-10"), task_due(2, "2030-06-01")];
        tasks[1].due_date = None;
        let (kept, frame) = filter_by_timeframe(&tasks, "show my tasks", today);
        assert_eq!(frame, TimeFrame::All);
        assert_eq!(kept.len(), 2);
    }
}
