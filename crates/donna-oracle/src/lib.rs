//! # donna-oracle
//!
//! OpenAI-compatible implementation of the intent and phrasing oracles.
//!
//! Works with OpenAI's API and any compatible endpoint. Every structured
//! call demands bare JSON, strips markdown fences defensively, and surfaces
//! transport or parse problems as [`DonnaError::Oracle`] — callers recover
//! with empty intents, never with a crash.

pub mod json;
pub mod prompts;

use async_trait::async_trait;
use donna_core::{
    config::OracleConfig,
    error::DonnaError,
    intent::{MessageIntent, TaskIntent, UpdateIntent},
    task::Task,
    traits::{IntentOracle, PhrasingOracle},
};
use json::clean_json_response;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// OpenAI-compatible oracle.
pub struct OpenAiOracle {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    parse_temperature: f32,
    chat_temperature: f32,
}

impl OpenAiOracle {
    /// Create from config values. Fails when no API key is configured.
    pub fn from_config(config: &OracleConfig) -> Result<Self, DonnaError> {
        let api_key = config.resolve_api_key().ok_or_else(|| {
            DonnaError::Config(
                "no oracle API key: set [oracle].api_key or the OPENAI_API_KEY env var".into(),
            )
        })?;

        Ok(Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.clone(),
            api_key,
            model: config.model.clone(),
            parse_temperature: config.parse_temperature,
            chat_temperature: config.chat_temperature,
        })
    }

    /// One chat-completion round trip, returning the raw assistant text.
    async fn chat(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
    ) -> Result<String, DonnaError> {
        let body = ChatCompletionRequest {
            model: self.model.clone(),
            temperature,
            messages: vec![
                ChatMessage { role: "system".into(), content: system.into() },
                ChatMessage { role: "user".into(), content: user.into() },
            ],
        };

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        debug!("oracle: POST {url} model={}", self.model);

        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| DonnaError::Oracle(format!("request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(DonnaError::Oracle(format!("oracle returned {status}: {text}")));
        }

        let parsed: ChatCompletionResponse = resp
            .json()
            .await
            .map_err(|e| DonnaError::Oracle(format!("failed to parse response: {e}")))?;

        parsed
            .choices
            .and_then(|mut c| c.pop())
            .and_then(|c| c.message)
            .map(|m| m.content)
            .ok_or_else(|| DonnaError::Oracle("empty completion".into()))
    }

    /// Structured call: chat, clean fences, deserialize.
    async fn parse_json<T: serde::de::DeserializeOwned>(
        &self,
        system: &str,
        user: &str,
    ) -> Result<T, DonnaError> {
        let raw = self.chat(system, user, self.parse_temperature).await?;
        let cleaned = clean_json_response(&raw);
        serde_json::from_str(cleaned)
            .map_err(|e| DonnaError::Oracle(format!("malformed oracle JSON: {e}")))
    }
}

#[derive(Serialize, Deserialize, Clone)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    temperature: f32,
    messages: Vec<ChatMessage>,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Option<Vec<ChatChoice>>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatMessage>,
}

#[derive(Deserialize)]
struct SplitFragment {
    #[serde(default)]
    task_text: String,
}

#[async_trait]
impl IntentOracle for OpenAiOracle {
    fn name(&self) -> &str {
        "openai"
    }

    async fn classify(&self, text: &str, context: &str) -> Result<MessageIntent, DonnaError> {
        self.parse_json(&prompts::intent_analysis(context), &format!("User message: {text}"))
            .await
    }

    async fn parse_task(&self, text: &str, context: &str) -> Result<TaskIntent, DonnaError> {
        self.parse_json(&prompts::task_parsing(context), &format!("User message: {text}"))
            .await
    }

    async fn parse_update(
        &self,
        text: &str,
        context: &str,
        recent: Option<&Task>,
    ) -> Result<UpdateIntent, DonnaError> {
        let recent_info = match recent {
            Some(task) => format!(
                "Recently touched task:\n- Title: {}\n- Due: {} at {}\n",
                task.title,
                task.due_date.as_deref().unwrap_or("unscheduled"),
                task.due_time.as_deref().unwrap_or("unscheduled"),
            ),
            None => String::new(),
        };
        self.parse_json(
            &prompts::task_update(context, &recent_info),
            &format!("User message: {text}"),
        )
        .await
    }

    async fn split_tasks(&self, text: &str) -> Result<Vec<String>, DonnaError> {
        let fragments: Vec<SplitFragment> = self
            .parse_json(&prompts::split_tasks(), &format!("Split tasks: {text}"))
            .await?;
        Ok(fragments
            .into_iter()
            .map(|f| f.task_text)
            .filter(|t| !t.trim().is_empty())
            .collect())
    }
}

#[async_trait]
impl PhrasingOracle for OpenAiOracle {
    async fn compose(&self, instruction: &str, situation: &str) -> Result<String, DonnaError> {
        let system = format!("{}\n\n{instruction}", prompts::PERSONA);
        let text = self.chat(&system, situation, self.chat_temperature).await?;
        Ok(text.trim().to_string())
    }
}
