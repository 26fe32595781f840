//! Top-level message dispatch.
//!
//! One [`Orchestrator`] owns all per-user dialogue state. It takes `&mut
//! self` per message, so messages are processed strictly one at a time; the
//! binary drives it from a single loop and no two turns for the same user
//! ever interleave.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use donna_core::intent::{IntentKind, MessageIntent};
use donna_core::state::ConversationState;
use donna_core::traits::{IntentOracle, PhrasingOracle};
use donna_core::DonnaError;
use donna_store::TaskStore;
use tracing::{debug, error, info, warn};

use crate::reply;

/// Exchanges kept per user before the buffer is summarized or trimmed.
pub(crate) const MAX_EXCHANGES: usize = 10;

/// Keywords that bias an unclassifiable message toward a task query.
const QUERY_KEYWORDS: &[&str] = &[
    "show", "what", "list", "display", "my tasks", "schedule", "what's",
];

/// One user turn and the assistant's reply.
pub(crate) struct Exchange {
    pub user: String,
    pub assistant: String,
    pub at: DateTime<Utc>,
}

/// Routes each incoming message to the right handler and owns all
/// conversation state.
pub struct Orchestrator {
    pub(crate) store: TaskStore,
    pub(crate) intents: Arc<dyn IntentOracle>,
    pub(crate) phrasing: Arc<dyn PhrasingOracle>,
    pub(crate) states: HashMap<i64, ConversationState>,
    buffers: HashMap<i64, VecDeque<Exchange>>,
    context_summaries: usize,
}

impl Orchestrator {
    pub fn new(
        store: TaskStore,
        intents: Arc<dyn IntentOracle>,
        phrasing: Arc<dyn PhrasingOracle>,
        context_summaries: usize,
    ) -> Self {
        Self {
            store,
            intents,
            phrasing,
            states: HashMap::new(),
            buffers: HashMap::new(),
            context_summaries,
        }
    }

    /// Process one user message and produce a reply.
    ///
    /// Never fails: any error that escapes the handlers is logged and turned
    /// into a generic apology, and dialogue state survives for the next turn.
    pub async fn process_message(&mut self, user_id: i64, username: &str, message: &str) -> String {
        let response = match self.dispatch(user_id, username, message).await {
            Ok(text) => text,
            Err(e) => {
                error!("[{username}] message processing failed: {e}");
                reply::APOLOGY.to_string()
            }
        };
        self.track_exchange(user_id, message, &response);
        response
    }

    /// Drop all dialogue state for a user. Idempotent.
    pub fn reset_conversation(&mut self, user_id: i64) {
        self.states.remove(&user_id);
        self.buffers.remove(&user_id);
    }

    /// Dialogue state for a user, if any turn has created one.
    pub fn conversation_state(&self, user_id: i64) -> Option<&ConversationState> {
        self.states.get(&user_id)
    }

    async fn dispatch(
        &mut self,
        user_id: i64,
        username: &str,
        message: &str,
    ) -> Result<String, DonnaError> {
        let context = self.build_context(user_id).await;

        let awaiting = self
            .states
            .get(&user_id)
            .map(|s| s.is_clarification_reply(message))
            .unwrap_or(false);
        if awaiting {
            return Ok(self
                .try_clarification(user_id, username, message, &context)
                .await
                .unwrap_or_else(|e| {
                    warn!("[{username}] clarification failed: {e}");
                    reply::CLARIFY_TROUBLE.to_string()
                }));
        }

        let intent = self.classify(message, &context).await;
        info!(
            "[{username}] intent: {:?} (confidence {:.2})",
            intent.kind, intent.confidence
        );

        let response = match intent.kind {
            IntentKind::TaskCreation => self
                .try_task_creation(user_id, username, message, &context)
                .await
                .unwrap_or_else(|e| {
                    warn!("[{username}] task creation failed: {e}");
                    reply::CREATION_TROUBLE.to_string()
                }),
            IntentKind::TaskQuery => self
                .try_task_query(user_id, username, message)
                .await
                .unwrap_or_else(|e| {
                    warn!("[{username}] task query failed: {e}");
                    reply::QUERY_FALLBACK.to_string()
                }),
            IntentKind::TaskUpdate => self
                .try_task_update(user_id, message, &context)
                .await
                .unwrap_or_else(|e| {
                    warn!("[{username}] task update failed: {e}");
                    reply::UPDATE_FALLBACK.to_string()
                }),
            IntentKind::ClarificationResponse => self
                .try_clarification(user_id, username, message, &context)
                .await
                .unwrap_or_else(|e| {
                    warn!("[{username}] clarification failed: {e}");
                    reply::CLARIFY_TROUBLE.to_string()
                }),
            IntentKind::GeneralChat => {
                self.general_chat(username, message, &intent, &context).await
            }
        };
        Ok(response)
    }

    /// Classify with the oracle, falling back to keyword heuristics when the
    /// oracle is unreachable.
    async fn classify(&self, message: &str, context: &str) -> MessageIntent {
        match self.intents.classify(message, context).await {
            Ok(intent) => intent,
            Err(e) => {
                warn!("intent classification failed, using keyword fallback: {e}");
                fallback_intent(message)
            }
        }
    }

    pub(crate) async fn general_chat(
        &self,
        username: &str,
        message: &str,
        intent: &MessageIntent,
        context: &str,
    ) -> String {
        let mut instruction = format!(
            "Reply to the user's message conversationally. The user's name is {username}."
        );
        if let Some(emotion) = intent.emotional_context.as_deref() {
            instruction.push_str(&format!(" The user seems {emotion}; acknowledge that."));
        }
        if !context.is_empty() {
            instruction.push_str(&format!("\n\n{context}"));
        }

        match self
            .phrasing
            .compose(&instruction, &format!("{username}: {message}"))
            .await
        {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => reply::general_chat_fallback(username),
            Err(e) => {
                warn!("[{username}] phrasing failed for general chat: {e}");
                reply::general_chat_fallback(username)
            }
        }
    }

    /// Past-conversation context for oracle prompts. Empty on any failure.
    async fn build_context(&self, user_id: i64) -> String {
        let summaries = match self
            .store
            .recent_summaries(user_id, self.context_summaries)
            .await
        {
            Ok(s) => s,
            Err(e) => {
                warn!("failed to load conversation summaries: {e}");
                return String::new();
            }
        };
        if summaries.is_empty() {
            return String::new();
        }
        let mut out = String::from("Relevant past context:\n");
        for summary in &summaries {
            out.push_str(&format!("- {summary}\n"));
        }
        out
    }

    fn track_exchange(&mut self, user_id: i64, message: &str, response: &str) {
        let buffer = self.buffers.entry(user_id).or_default();
        buffer.push_back(Exchange {
            user: message.to_string(),
            assistant: response.to_string(),
            at: Utc::now(),
        });
        while buffer.len() > MAX_EXCHANGES {
            buffer.pop_front();
        }
    }

    /// Summarize and persist the conversation buffer after a task was
    /// created. Cosmetic: failures are logged and never affect the reply.
    pub(crate) async fn store_summary_after_creation(&mut self, user_id: i64, username: &str) {
        let Some(buffer) = self.buffers.get(&user_id).filter(|b| !b.is_empty()) else {
            return;
        };

        let mut transcript = String::new();
        for exchange in buffer {
            transcript.push_str(&format!(
                "User: {}\nAssistant: {}\n",
                exchange.user, exchange.assistant
            ));
        }
        let timestamp = |e: &Exchange| e.at.format("%Y-%m-%d %H:%M:%S").to_string();
        let started = buffer.front().map(timestamp);
        let ended = buffer.back().map(timestamp);

        let instruction = format!(
            "Summarize this conversation with {username} in two or three sentences, \
             third person, focusing on tasks created and preferences mentioned."
        );
        let summary = match self.phrasing.compose(&instruction, &transcript).await {
            Ok(s) if !s.trim().is_empty() => s,
            Ok(_) => return,
            Err(e) => {
                debug!("summary generation failed: {e}");
                return;
            }
        };

        if let Err(e) = self
            .store
            .store_summary(user_id, &summary, started.as_deref(), ended.as_deref())
            .await
        {
            warn!("failed to store conversation summary: {e}");
            return;
        }
        if let Some(buffer) = self.buffers.get_mut(&user_id) {
            buffer.clear();
        }
    }
}

/// Keyword heuristic used when the oracle is down.
fn fallback_intent(message: &str) -> MessageIntent {
    let lower = message.to_lowercase();
    if QUERY_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        MessageIntent {
            kind: IntentKind::TaskQuery,
            confidence: 0.8,
            emotional_context: None,
        }
    } else {
        MessageIntent::general_chat()
    }
}
