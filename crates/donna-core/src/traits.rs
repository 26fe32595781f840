use crate::{
    error::DonnaError,
    intent::{MessageIntent, TaskIntent, UpdateIntent},
    task::Task,
};
use async_trait::async_trait;

/// Intent oracle trait — free text in, structured intent out.
///
/// Backed by a language model and therefore unreliable: implementations
/// return `Err` on transport or malformed-output failures, and callers
/// substitute an empty intent (confidence 0.0) or a keyword fallback rather
/// than propagating the error.
#[async_trait]
pub trait IntentOracle: Send + Sync {
    /// Human-readable oracle name.
    fn name(&self) -> &str;

    /// Classify a message into a coarse intent kind.
    async fn classify(&self, text: &str, context: &str) -> Result<MessageIntent, DonnaError>;

    /// Extract a task-creation intent from a message.
    async fn parse_task(&self, text: &str, context: &str) -> Result<TaskIntent, DonnaError>;

    /// Extract a task-update intent. `recent` is an advisory hint about the
    /// most recently touched task.
    async fn parse_update(
        &self,
        text: &str,
        context: &str,
        recent: Option<&Task>,
    ) -> Result<UpdateIntent, DonnaError>;

    /// Split a message that mentions several tasks into standalone fragments.
    async fn split_tasks(&self, text: &str) -> Result<Vec<String>, DonnaError>;
}

/// Phrasing oracle trait — turns a short instruction plus situational data
/// into a user-facing sentence.
///
/// Purely cosmetic: the state machine never inspects or branches on its
/// output, and every call site has a deterministic fallback sentence.
#[async_trait]
pub trait PhrasingOracle: Send + Sync {
    async fn compose(&self, instruction: &str, situation: &str) -> Result<String, DonnaError>;
}
