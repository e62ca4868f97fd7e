// Threadchat Engine — Assistant API Client
// Thin wrappers over the hosted thread/run HTTP API: create conversation,
// append message, start run, fetch run status, list messages.
//
// Error classification is structural: HTTP 401/403 → Auth, 429 → RateLimited
// (honouring Retry-After), other non-2xx → Api, connection-level failures →
// Network. Nothing is classified by matching substrings of an error string.
// There is no retry loop here — the only thing this crate ever repeats is
// the run-status poll, which is a wait, not a retry.

use async_trait::async_trait;
use log::{error, info};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

use crate::atoms::constants::ASSISTANTS_BETA_HEADER;
use crate::atoms::error::{ChatError, ChatResult};
use crate::atoms::types::{
    truncate_utf8, ContentSegment, ConversationId, Role, RunId, RunStatus, ThreadMessage,
};
use crate::engine::credentials::Credentials;

// ── Client seam ────────────────────────────────────────────────────────────

/// The five remote operations a chat turn is built from. The orchestrator
/// and poller depend on this trait, so tests can script a fake service.
#[async_trait]
pub trait AssistantApi: Send + Sync {
    async fn create_conversation(&self) -> ChatResult<ConversationId>;
    async fn send_message(&self, conversation: &ConversationId, text: &str) -> ChatResult<()>;
    async fn start_run(&self, conversation: &ConversationId) -> ChatResult<RunId>;
    async fn run_status(&self, conversation: &ConversationId, run: &RunId)
        -> ChatResult<RunStatus>;
    /// Messages ordered newest first, as the service lists them.
    async fn list_messages(&self, conversation: &ConversationId)
        -> ChatResult<Vec<ThreadMessage>>;
}

// ── HTTP implementation ────────────────────────────────────────────────────

pub struct HttpAssistantClient {
    client: Client,
    base_url: String,
    api_key: String,
    assistant_id: String,
}

impl HttpAssistantClient {
    pub fn new(credentials: &Credentials, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        HttpAssistantClient {
            client: Client::builder()
                .connect_timeout(Duration::from_secs(10))
                .timeout(Duration::from_secs(120))
                .build()
                .unwrap_or_default(),
            base_url,
            api_key: credentials.api_key.clone(),
            assistant_id: credentials.assistant_id.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json(&self, path: &str, body: Value) -> ChatResult<Value> {
        let response = self
            .client
            .post(self.url(path))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("OpenAI-Beta", ASSISTANTS_BETA_HEADER)
            .json(&body)
            .send()
            .await?;
        Self::read_json(path, response).await
    }

    async fn get_json(&self, path: &str) -> ChatResult<Value> {
        let response = self
            .client
            .get(self.url(path))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("OpenAI-Beta", ASSISTANTS_BETA_HEADER)
            .send()
            .await?;
        Self::read_json(path, response).await
    }

    async fn read_json(path: &str, response: reqwest::Response) -> ChatResult<Value> {
        let status = response.status().as_u16();
        if !response.status().is_success() {
            // Parse Retry-After before consuming the body.
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            let body_text = response.text().await.unwrap_or_default();
            error!(
                "[engine] {} returned {}: {}",
                path,
                status,
                truncate_utf8(&body_text, 500)
            );
            let message = truncate_utf8(&body_text, 200).to_string();
            return Err(match status {
                401 | 403 => ChatError::Auth(message),
                429 => ChatError::RateLimited { message, retry_after_secs: retry_after },
                _ => ChatError::Api { status, message },
            });
        }
        Ok(response.json::<Value>().await?)
    }

    /// Pull a required string field out of a response, or fail the turn.
    fn require_str(v: &Value, field: &str, context: &str) -> ChatResult<String> {
        v[field]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| {
                ChatError::Transport(format!("{} response missing `{}`", context, field))
            })
    }

    fn parse_message(item: &Value) -> ThreadMessage {
        let role = Role::parse(item["role"].as_str().unwrap_or_default());
        let segments = item["content"]
            .as_array()
            .map(|parts| {
                parts
                    .iter()
                    .map(|part| match part["type"].as_str() {
                        Some("text") => ContentSegment::Text(
                            part["text"]["value"].as_str().unwrap_or_default().to_string(),
                        ),
                        other => ContentSegment::Unsupported(
                            other.unwrap_or("unknown").to_string(),
                        ),
                    })
                    .collect()
            })
            .unwrap_or_default();
        ThreadMessage { role, segments }
    }
}

#[async_trait]
impl AssistantApi for HttpAssistantClient {
    async fn create_conversation(&self) -> ChatResult<ConversationId> {
        let v = self.post_json("/threads", json!({})).await?;
        let id = Self::require_str(&v, "id", "thread creation")?;
        info!("[engine] created conversation {}", id);
        Ok(ConversationId(id))
    }

    async fn send_message(&self, conversation: &ConversationId, text: &str) -> ChatResult<()> {
        let path = format!("/threads/{}/messages", conversation);
        self.post_json(&path, json!({ "role": "user", "content": text })).await?;
        Ok(())
    }

    async fn start_run(&self, conversation: &ConversationId) -> ChatResult<RunId> {
        let path = format!("/threads/{}/runs", conversation);
        let v = self
            .post_json(&path, json!({ "assistant_id": self.assistant_id }))
            .await?;
        let id = Self::require_str(&v, "id", "run creation")?;
        info!("[engine] started run {} on conversation {}", id, conversation);
        Ok(RunId(id))
    }

    async fn run_status(
        &self,
        conversation: &ConversationId,
        run: &RunId,
    ) -> ChatResult<RunStatus> {
        let path = format!("/threads/{}/runs/{}", conversation, run);
        let v = self.get_json(&path).await?;
        let status = Self::require_str(&v, "status", "run status")?;
        Ok(RunStatus::parse(&status))
    }

    async fn list_messages(
        &self,
        conversation: &ConversationId,
    ) -> ChatResult<Vec<ThreadMessage>> {
        let path = format!("/threads/{}/messages", conversation);
        let v = self.get_json(&path).await?;
        let data = v["data"].as_array().ok_or_else(|| {
            ChatError::Transport("message listing response missing `data`".into())
        })?;
        Ok(data.iter().map(Self::parse_message).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_message_extracts_text_segments() {
        let item = json!({
            "role": "assistant",
            "content": [
                { "type": "text", "text": { "value": "Hi " } },
                { "type": "image_file", "image_file": { "file_id": "f1" } },
                { "type": "text", "text": { "value": "there!" } },
            ]
        });
        let msg = HttpAssistantClient::parse_message(&item);
        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(msg.text(), "Hi there!");
        assert_eq!(msg.segments.len(), 3);
        assert_eq!(msg.segments[1], ContentSegment::Unsupported("image_file".into()));
    }

    #[test]
    fn parse_message_tolerates_unknown_roles_and_empty_content() {
        let item = json!({ "role": "tool", "content": [] });
        let msg = HttpAssistantClient::parse_message(&item);
        assert_eq!(msg.role, Role::Other);
        assert!(msg.segments.is_empty());
        assert_eq!(msg.text(), "");
    }

    #[test]
    fn require_str_reports_the_missing_field() {
        let v = json!({ "status": "queued" });
        let err = HttpAssistantClient::require_str(&v, "id", "run creation").unwrap_err();
        match err {
            ChatError::Transport(msg) => assert!(msg.contains("`id`")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
