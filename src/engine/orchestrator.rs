// Threadchat Engine — Conversation Orchestrator
// Sequences one chat turn: ensure conversation → append message → start run
// → poll to terminal → extract the newest assistant reply. Any failing step
// ends the turn; the session keeps only the already-appended user message,
// so the next turn starts from clean state.

use log::info;
use tokio_util::sync::CancellationToken;

use crate::atoms::error::{ChatError, ChatResult};
use crate::atoms::types::{Role, ThreadMessage};
use crate::engine::client::AssistantApi;
use crate::engine::poller::{poll_run, PollConfig};
use crate::engine::session::ChatSession;

/// Run one user turn to completion and return the assistant's reply text.
///
/// Invariant: at most one outbound message and at most one consumed run per
/// call — fully synchronous, no overlap with other turns on this session.
pub async fn run_turn(
    api: &dyn AssistantApi,
    session: &mut ChatSession,
    input: &str,
    poll: &PollConfig,
    cancel: &CancellationToken,
) -> ChatResult<String> {
    session.push_user(input);

    // Lazily create the conversation — exactly once per session, and
    // always before the first send.
    let conversation = match session.conversation_id() {
        Some(id) => id.clone(),
        None => {
            let id = api.create_conversation().await?;
            session.set_conversation(id.clone());
            id
        }
    };

    api.send_message(&conversation, input).await?;

    let run = api.start_run(&conversation).await?;
    session.set_last_run(run.clone());

    poll_run(api, &conversation, &run, poll, cancel).await?;

    let messages = api.list_messages(&conversation).await?;
    let reply = extract_latest_reply(&messages).ok_or(ChatError::ResponseNotFound)?;

    info!(
        "[engine] turn complete on conversation {} ({} chars)",
        conversation,
        reply.len()
    );
    session.push_assistant(&reply);
    Ok(reply)
}

/// Select the most recently produced assistant message — the first match
/// scanning a newest-first listing — and concatenate its text segments.
pub fn extract_latest_reply(messages: &[ThreadMessage]) -> Option<String> {
    messages
        .iter()
        .find(|m| m.role == Role::Assistant)
        .map(ThreadMessage::text)
}
