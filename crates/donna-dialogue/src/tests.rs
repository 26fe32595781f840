//! End-to-end dialogue tests with scripted oracles and an in-memory store.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use donna_core::intent::{IntentKind, MessageIntent, TaskIntent, UpdateIntent};
use donna_core::state::ClarificationKind;
use donna_core::task::Task;
use donna_core::traits::{IntentOracle, PhrasingOracle};
use donna_core::DonnaError;
use donna_store::TaskStore;

use crate::creation::{create_from_intent, CreateOutcome};
use crate::orchestrator::Orchestrator;
use crate::reply;

fn unscripted() -> DonnaError {
    DonnaError::Oracle("unscripted call".into())
}

/// Intent oracle driven by scripted response queues. An empty queue behaves
/// like an unreachable oracle, which exercises the fallback paths.
#[derive(Default)]
struct MockIntents {
    classifications: Mutex<VecDeque<MessageIntent>>,
    parses: Mutex<VecDeque<TaskIntent>>,
    updates: Mutex<VecDeque<UpdateIntent>>,
    splits: Mutex<VecDeque<Vec<String>>>,
    parse_inputs: Mutex<Vec<String>>,
}

impl MockIntents {
    fn script_classification(&self, kind: IntentKind, confidence: f32) {
        self.classifications.lock().unwrap().push_back(MessageIntent {
            kind,
            confidence,
            emotional_context: None,
        });
    }

    fn script_parse(&self, intent: TaskIntent) {
        self.parses.lock().unwrap().push_back(intent);
    }

    fn script_update(&self, update: UpdateIntent) {
        self.updates.lock().unwrap().push_back(update);
    }

    fn script_split(&self, fragments: &[&str]) {
        self.splits
            .lock()
            .unwrap()
            .push_back(fragments.iter().map(|s| s.to_string()).collect());
    }

    fn last_parse_input(&self) -> Option<String> {
        self.parse_inputs.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl IntentOracle for MockIntents {
    fn name(&self) -> &str {
        "mock"
    }

    async fn classify(&self, _text: &str, _context: &str) -> Result<MessageIntent, DonnaError> {
        self.classifications.lock().unwrap().pop_front().ok_or_else(unscripted)
    }

    async fn parse_task(&self, text: &str, _context: &str) -> Result<TaskIntent, DonnaError> {
        self.parse_inputs.lock().unwrap().push(text.to_string());
        self.parses.lock().unwrap().pop_front().ok_or_else(unscripted)
    }

    async fn parse_update(
        &self,
        _text: &str,
        _context: &str,
        _recent: Option<&Task>,
    ) -> Result<UpdateIntent, DonnaError> {
        self.updates.lock().unwrap().pop_front().ok_or_else(unscripted)
    }

    async fn split_tasks(&self, _text: &str) -> Result<Vec<String>, DonnaError> {
        self.splits.lock().unwrap().pop_front().ok_or_else(unscripted)
    }
}

/// Phrasing oracle that is always offline, forcing deterministic replies.
struct SilentPhrasing;

#[async_trait]
impl PhrasingOracle for SilentPhrasing {
    async fn compose(&self, _instruction: &str, _situation: &str) -> Result<String, DonnaError> {
        Err(DonnaError::Oracle("offline".into()))
    }
}

async fn setup() -> (Orchestrator, Arc<MockIntents>, TaskStore, i64) {
    let store = TaskStore::in_memory().await.unwrap();
    let user_id = store.get_or_create_user("maya").await.unwrap();
    let intents = Arc::new(MockIntents::default());
    let orchestrator = Orchestrator::new(
        store.clone(),
        intents.clone(),
        Arc::new(SilentPhrasing),
        3,
    );
    (orchestrator, intents, store, user_id)
}

fn task_intent(title: &str, due: Option<(&str, &str)>, confidence: f32) -> TaskIntent {
    TaskIntent {
        is_task_request: true,
        title: Some(title.into()),
        due_date: due.map(|(d, _)| d.into()),
        due_time: due.map(|(_, t)| t.into()),
        confidence,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_low_confidence_intent_is_never_persisted() {
    let (_, _, store, user_id) = setup().await;

    let intent = task_intent("Dentist", Some(("2025-01-10", "14:00")), 0.4);
    let outcome = create_from_intent(&store, user_id, &intent).await.unwrap();
    assert!(matches!(outcome, CreateOutcome::Rejected { .. }));

    let mut refused = task_intent("Dentist", Some(("2025-01-10", "14:00")), 0.9);
    refused.is_task_request = false;
    let outcome = create_from_intent(&store, user_id, &refused).await.unwrap();
    assert!(matches!(outcome, CreateOutcome::Rejected { .. }));

    assert!(store.get_user_tasks(user_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_half_a_due_pair_is_never_persisted() {
    let (_, _, store, user_id) = setup().await;

    let mut intent = task_intent("Dentist", None, 0.9);
    intent.due_date = Some("2025-01-10".into());
    let outcome = create_from_intent(&store, user_id, &intent).await.unwrap();
    assert!(matches!(outcome, CreateOutcome::Rejected { .. }));

    let mut intent = task_intent("Dentist", None, 0.9);
    intent.due_time = Some("14:00".into());
    let outcome = create_from_intent(&store, user_id, &intent).await.unwrap();
    assert!(matches!(outcome, CreateOutcome::Rejected { .. }));

    assert!(store.get_user_tasks(user_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_untitled_request_asks_what_to_track() {
    let (mut orchestrator, intents, store, user_id) = setup().await;
    intents.script_classification(IntentKind::TaskCreation, 0.9);
    intents.script_parse(TaskIntent {
        is_task_request: true,
        confidence: 0.9,
        ..Default::default()
    });

    let response = orchestrator.process_message(user_id, "maya", "remind me").await;
    assert_eq!(response, reply::ASK_WHAT_TASK);
    assert!(store.get_user_tasks(user_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_clarification_flow_due_then_default_reminder() {
    let (mut orchestrator, intents, store, user_id) = setup().await;

    // Turn 1: task without a time. Donna parks it and asks when.
    intents.script_classification(IntentKind::TaskCreation, 0.9);
    intents.script_parse(task_intent("Call mom", None, 0.9));
    let response = orchestrator
        .process_message(user_id, "maya", "remind me to call mom")
        .await;
    assert_eq!(response, reply::due_question("Call mom"));
    let state = orchestrator.conversation_state(user_id).unwrap();
    assert_eq!(state.clarification(), Some(ClarificationKind::DueDatetime));

    // Turn 2: the answer is reparsed together with the original request.
    intents.script_parse(task_intent("Call mom", Some(("2025-01-11", "17:00")), 0.9));
    let response = orchestrator
        .process_message(user_id, "maya", "tomorrow at 5pm")
        .await;
    assert_eq!(response, reply::REMINDER_OFFER);
    assert_eq!(
        intents.last_parse_input().as_deref(),
        Some("remind me to call mom. tomorrow at 5pm")
    );
    let state = orchestrator.conversation_state(user_id).unwrap();
    assert_eq!(state.clarification(), Some(ClarificationKind::ReminderDatetime));

    // Turn 3: bare "yes" defaults the reminder to 30 minutes before.
    intents.script_parse(TaskIntent::default());
    let response = orchestrator.process_message(user_id, "maya", "yes").await;
    assert_eq!(response, "Perfect! I'll remind you at 4:30 PM ✅");

    let tasks = store.get_user_tasks(user_id).await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].due_date.as_deref(), Some("2025-01-11"));
    assert_eq!(tasks[0].due_time.as_deref(), Some("17:00"));
    assert_eq!(tasks[0].reminder_date.as_deref(), Some("2025-01-11"));
    assert_eq!(tasks[0].reminder_time.as_deref(), Some("16:30"));
    assert!(!orchestrator
        .conversation_state(user_id)
        .map(|s| s.awaiting_clarification())
        .unwrap_or(false));
}

#[tokio::test]
async fn test_declined_reminder_creates_task_without_one() {
    let (mut orchestrator, intents, store, user_id) = setup().await;

    intents.script_classification(IntentKind::TaskCreation, 0.9);
    intents.script_parse(task_intent("Water plants", None, 0.9));
    orchestrator
        .process_message(user_id, "maya", "remind me to water plants")
        .await;

    intents.script_parse(task_intent("Water plants", Some(("2025-01-11", "08:00")), 0.9));
    orchestrator.process_message(user_id, "maya", "tomorrow at 8am").await;

    intents.script_parse(TaskIntent::default());
    let response = orchestrator.process_message(user_id, "maya", "no thanks").await;
    assert_eq!(response, reply::TASK_ADDED);

    let tasks = store.get_user_tasks(user_id).await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert!(tasks[0].reminder_date.is_none());
    assert!(tasks[0].reminder_time.is_none());
}

#[tokio::test]
async fn test_unintelligible_reminder_answer_reasks_without_losing_state() {
    let (mut orchestrator, intents, _, user_id) = setup().await;

    intents.script_classification(IntentKind::TaskCreation, 0.9);
    intents.script_parse(task_intent("Pack bags", None, 0.9));
    orchestrator.process_message(user_id, "maya", "remind me to pack bags").await;
    intents.script_parse(task_intent("Pack bags", Some(("2025-01-11", "20:00")), 0.9));
    orchestrator.process_message(user_id, "maya", "tomorrow at 8pm").await;

    intents.script_parse(TaskIntent::default());
    let response = orchestrator.process_message(user_id, "maya", "maybe later").await;
    assert_eq!(response, reply::REMINDER_REASK);
    let state = orchestrator.conversation_state(user_id).unwrap();
    assert_eq!(state.clarification(), Some(ClarificationKind::ReminderDatetime));
}

#[tokio::test]
async fn test_overflowing_reminder_offset_reasks_and_keeps_session_alive() {
    let (mut orchestrator, intents, store, user_id) = setup().await;

    intents.script_classification(IntentKind::TaskCreation, 0.9);
    intents.script_parse(task_intent("Catch flight", None, 0.9));
    orchestrator.process_message(user_id, "maya", "remind me to catch my flight").await;
    intents.script_parse(task_intent("Catch flight", Some(("2025-01-11", "14:00")), 0.9));
    orchestrator.process_message(user_id, "maya", "tomorrow at 2pm").await;

    intents.script_parse(TaskIntent::default());
    let response = orchestrator
        .process_message(user_id, "maya", "9000000000000000000 minutes before")
        .await;
    assert_eq!(response, reply::REMINDER_REASK);
    let state = orchestrator.conversation_state(user_id).unwrap();
    assert_eq!(state.clarification(), Some(ClarificationKind::ReminderDatetime));
    assert!(store.get_user_tasks(user_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_conflict_detected_and_resolved_by_moving_old_task() {
    let (mut orchestrator, intents, store, user_id) = setup().await;
    let dentist_intent = task_intent("Dentist", Some(("2025-01-10", "14:00")), 0.9);
    create_from_intent(&store, user_id, &dentist_intent).await.unwrap();

    // New task lands on the same slot.
    intents.script_classification(IntentKind::TaskCreation, 0.9);
    intents.script_parse(task_intent("Gym", Some(("2025-01-10", "14:00")), 0.9));
    let response = orchestrator
        .process_message(user_id, "maya", "schedule gym friday at 2pm")
        .await;
    assert!(response.contains("Dentist"), "conflict reply: {response}");
    let state = orchestrator.conversation_state(user_id).unwrap();
    assert_eq!(state.clarification(), Some(ClarificationKind::ConflictResolution));
    assert_eq!(
        state.conflicting_task().map(|t| t.title.as_str()),
        Some("Dentist")
    );
    assert_eq!(store.get_user_tasks(user_id).await.unwrap().len(), 1);

    // An unclear answer re-asks and mutates nothing.
    let response = orchestrator.process_message(user_id, "maya", "hmm").await;
    assert_eq!(response, reply::CONFLICT_AMBIGUOUS);
    let state = orchestrator.conversation_state(user_id).unwrap();
    assert_eq!(state.clarification(), Some(ClarificationKind::ConflictResolution));
    assert_eq!(store.get_user_tasks(user_id).await.unwrap().len(), 1);

    // Naming the old task moves it and frees the slot for the new one.
    intents.script_parse(TaskIntent {
        due_time: Some("15:00".into()),
        ..Default::default()
    });
    let response = orchestrator
        .process_message(user_id, "maya", "move the dentist to 3pm")
        .await;
    assert_eq!(
        response,
        "Perfect! ✅ I've rescheduled Dentist to 3:00 PM and kept Gym at 2:00 PM."
    );

    let tasks = store.get_user_tasks(user_id).await.unwrap();
    assert_eq!(tasks.len(), 2);
    let dentist = tasks.iter().find(|t| t.title == "Dentist").unwrap();
    let gym = tasks.iter().find(|t| t.title == "Gym").unwrap();
    assert_eq!(dentist.due_time.as_deref(), Some("15:00"));
    assert_eq!(gym.due_time.as_deref(), Some("14:00"));
    assert!(!orchestrator
        .conversation_state(user_id)
        .map(|s| s.awaiting_clarification())
        .unwrap_or(false));
}

#[tokio::test]
async fn test_conflict_resolved_by_moving_new_task() {
    let (mut orchestrator, intents, store, user_id) = setup().await;
    let dentist_intent = task_intent("Dentist", Some(("2025-01-10", "14:00")), 0.9);
    create_from_intent(&store, user_id, &dentist_intent).await.unwrap();

    intents.script_classification(IntentKind::TaskCreation, 0.9);
    intents.script_parse(task_intent("Gym", Some(("2025-01-10", "14:00")), 0.9));
    orchestrator
        .process_message(user_id, "maya", "schedule gym friday at 2pm")
        .await;

    // Generic scheduling words with a full new time move the new task.
    intents.script_parse(TaskIntent {
        due_date: Some("2025-01-10".into()),
        due_time: Some("18:00".into()),
        ..Default::default()
    });
    let response = orchestrator
        .process_message(user_id, "maya", "just move it to 6pm")
        .await;
    assert_eq!(response, "Perfect! ✅ Gym scheduled for Friday at 6:00 PM.");

    let tasks = store.get_user_tasks(user_id).await.unwrap();
    let gym = tasks.iter().find(|t| t.title == "Gym").unwrap();
    assert_eq!(gym.due_time.as_deref(), Some("18:00"));
    let dentist = tasks.iter().find(|t| t.title == "Dentist").unwrap();
    assert_eq!(dentist.due_time.as_deref(), Some("14:00"));
}

#[tokio::test]
async fn test_update_with_relative_reminder_offset() {
    let (mut orchestrator, intents, store, user_id) = setup().await;
    let dentist_intent = task_intent("Dentist appointment", Some(("2025-01-10", "14:00")), 0.9);
    create_from_intent(&store, user_id, &dentist_intent).await.unwrap();

    intents.script_classification(IntentKind::TaskUpdate, 0.9);
    intents.script_update(UpdateIntent {
        is_update_request: true,
        task_identifier: Some("dentist".into()),
        reminder_offset_minutes: Some(30),
        ..Default::default()
    });
    let response = orchestrator
        .process_message(user_id, "maya", "set a reminder 30 minutes before my dentist appointment")
        .await;
    assert_eq!(response, reply::reminder_updated("Dentist appointment"));

    let tasks = store.get_user_tasks(user_id).await.unwrap();
    assert_eq!(tasks[0].reminder_date.as_deref(), Some("2025-01-10"));
    assert_eq!(tasks[0].reminder_time.as_deref(), Some("13:30"));
}

#[tokio::test]
async fn test_update_without_target_lists_tasks() {
    let (mut orchestrator, intents, store, user_id) = setup().await;
    // No recent-window match applies; created_at is datetime('now') so both
    // are fresh, but the oracle refuses the update outright.
    create_from_intent(&store, user_id, &task_intent("Dentist", Some(("2025-01-10", "14:00")), 0.9))
        .await
        .unwrap();
    create_from_intent(&store, user_id, &task_intent("Gym", Some(("2025-01-11", "09:00")), 0.9))
        .await
        .unwrap();

    intents.script_classification(IntentKind::TaskUpdate, 0.9);
    intents.script_update(UpdateIntent::default());
    let response = orchestrator.process_message(user_id, "maya", "change it").await;
    assert!(response.starts_with("I have these tasks:"), "{response}");
    assert!(response.contains("Dentist") && response.contains("Gym"));
}

#[tokio::test]
async fn test_multi_task_message_creates_each_fragment() {
    let (mut orchestrator, intents, store, user_id) = setup().await;

    intents.script_classification(IntentKind::TaskCreation, 0.9);
    intents.script_split(&["gym at 5pm", "call mom at 7pm"]);
    intents.script_parse(task_intent("Gym", Some(("2025-01-10", "17:00")), 0.9));
    intents.script_parse(task_intent("Call mom", Some(("2025-01-10", "19:00")), 0.9));

    let response = orchestrator
        .process_message(user_id, "maya", "gym at 5pm and call mom at 7pm")
        .await;
    assert_eq!(response, "Perfect! I've added 2 tasks: Gym, Call mom ✅");
    assert_eq!(store.get_user_tasks(user_id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_oracle_outage_falls_back_to_keyword_routing() {
    let (mut orchestrator, _, _, user_id) = setup().await;

    // Nothing scripted: every oracle call fails. Query keywords still route
    // to the task list.
    let response = orchestrator.process_message(user_id, "maya", "show my tasks").await;
    assert_eq!(response, "No tasks found for that time frame, maya! 👍");

    // And anything else degrades to the canned chat reply.
    let response = orchestrator.process_message(user_id, "maya", "hello there").await;
    assert_eq!(response, reply::general_chat_fallback("maya"));
}

#[tokio::test]
async fn test_query_lists_tasks_when_phrasing_is_down() {
    let (mut orchestrator, intents, store, user_id) = setup().await;
    create_from_intent(&store, user_id, &task_intent("Dentist", Some(("2025-01-10", "14:00")), 0.9))
        .await
        .unwrap();

    intents.script_classification(IntentKind::TaskQuery, 0.9);
    let response = orchestrator.process_message(user_id, "maya", "list everything").await;
    assert!(response.contains("• Dentist"), "{response}");
}

#[tokio::test]
async fn test_reset_conversation_is_idempotent() {
    let (mut orchestrator, intents, _, user_id) = setup().await;

    intents.script_classification(IntentKind::TaskCreation, 0.9);
    intents.script_parse(task_intent("Call mom", None, 0.9));
    orchestrator.process_message(user_id, "maya", "remind me to call mom").await;
    assert!(orchestrator.conversation_state(user_id).is_some());

    orchestrator.reset_conversation(user_id);
    assert!(orchestrator.conversation_state(user_id).is_none());
    orchestrator.reset_conversation(user_id);
    assert!(orchestrator.conversation_state(user_id).is_none());
}
