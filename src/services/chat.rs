//! Chat completion collaborator.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::ChatConfig;

pub const SYSTEM_PROMPT: &str =
    "You are a chatbot, Please reply politely to the following questions.";
pub const MAX_COMPLETION_TOKENS: u32 = 500;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("chat API key is not configured")]
    MissingApiKey,
    #[error("chat request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("chat API returned status {0}")]
    Status(u16),
    #[error("chat API returned no choices")]
    NoChoices,
}

#[async_trait]
pub trait ChatCompleter: Send + Sync {
    /// Complete `text` and return the reply. An empty reply is `Ok("")`.
    async fn complete(&self, text: &str) -> Result<String, ChatError>;
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct OpenAiChatClient {
    base_url: String,
    api_key: Option<String>,
    model: String,
    client: reqwest::Client,
}

impl OpenAiChatClient {
    pub fn new(config: &ChatConfig, client: reqwest::Client) -> Self {
        Self {
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            client,
        }
    }
}

#[async_trait]
impl ChatCompleter for OpenAiChatClient {
    async fn complete(&self, text: &str) -> Result<String, ChatError> {
        let api_key = self.api_key.as_deref().ok_or(ChatError::MissingApiKey)?;

        let request = ChatCompletionRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
            max_tokens: MAX_COMPLETION_TOKENS,
        };

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::Status(status.as_u16()));
        }

        let body: ChatCompletionResponse = response.json().await?;
        let choice = body.choices.into_iter().next().ok_or(ChatError::NoChoices)?;
        let reply = choice.message.content.unwrap_or_default();

        debug!(model = %self.model, reply_len = reply.len(), "Chat completion received");
        Ok(reply)
    }
}
