// Threadchat — chat session engine for thread/run style assistant APIs.
//
// A turn flows: ensure a server-side conversation exists → append the user
// message → start a run → poll the run to a terminal state (bounded and
// cancellable) → extract the newest assistant reply. Session state lives in
// an explicit `ChatSession` owned by the caller.

pub mod atoms;
pub mod engine;

pub use atoms::constants::DEFAULT_BASE_URL;
pub use atoms::error::{ChatError, ChatResult};
pub use atoms::types::{
    ChatEntry, ContentSegment, ConversationId, Role, RunId, RunStatus, ThreadMessage,
};
pub use engine::client::{AssistantApi, HttpAssistantClient};
pub use engine::credentials::Credentials;
pub use engine::orchestrator::{extract_latest_reply, run_turn};
pub use engine::poller::{poll_run, PollConfig};
pub use engine::session::ChatSession;
