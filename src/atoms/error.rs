// ── Threadchat Atoms: Error Types ──────────────────────────────────────────
// Single canonical error enum for the crate, built with `thiserror`.
//
// Design rules:
//   • Variants are classified from structured signals (HTTP status codes,
//     run states) — never by string-matching a failure description.
//   • The `#[from]` attribute wires std/external error conversions
//     automatically.
//   • Every variant maps to a distinct user-facing message via
//     `user_message()`; the raw Display form is for logs.
//   • No variant carries secret material (API keys) in its message.

use thiserror::Error;

use crate::atoms::types::RunStatus;

// ── Primary error enum ─────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ChatError {
    /// The service rejected our credentials (HTTP 401 / 403).
    #[error("Auth error: {0}")]
    Auth(String),

    /// Request quota exceeded (HTTP 429).
    #[error("Rate limited: {message}")]
    RateLimited {
        message: String,
        /// Server-suggested wait, when a Retry-After header was present.
        retry_after_secs: Option<u64>,
    },

    /// Any other non-success HTTP response from the service.
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Connection-level failure (DNS, TLS, timeout) or a response body
    /// that does not carry the fields the protocol promises.
    #[error("Transport error: {0}")]
    Transport(String),

    /// HTTP / network failure (reqwest layer).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization / deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The assistant run reached a non-success terminal state.
    #[error("Run failed: run ended in state `{status}`")]
    RunFailed { status: RunStatus },

    /// The poll budget was exhausted before the run reached a terminal state.
    #[error("Run timed out after {attempts} status checks")]
    RunTimedOut { attempts: u32 },

    /// The caller cancelled the turn mid-poll.
    #[error("Cancelled")]
    Cancelled,

    /// The run completed but no assistant-authored message was found.
    #[error("Response not found")]
    ResponseNotFound,

    /// Required configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// OS keychain / credential store failure.
    #[error("Keyring error: {0}")]
    Keyring(String),
}

impl ChatError {
    /// The message shown to the person chatting. Deliberately free of
    /// status codes, backtraces, and anything resembling a key.
    pub fn user_message(&self) -> String {
        match self {
            ChatError::Auth(_) => {
                "Your API key was rejected. Check the configured credentials.".into()
            }
            ChatError::RateLimited { retry_after_secs, .. } => match retry_after_secs {
                Some(secs) => format!(
                    "Request limit exceeded. Try again in about {} seconds.",
                    secs
                ),
                None => "Request limit exceeded. Wait a moment and try again.".into(),
            },
            ChatError::Api { .. } | ChatError::Transport(_) | ChatError::Network(_) => {
                "The assistant service returned an error. Please try again.".into()
            }
            ChatError::Serialization(_) => {
                "The assistant service sent a response we could not read.".into()
            }
            ChatError::RunFailed { .. } => {
                "The assistant failed to generate a response.".into()
            }
            ChatError::RunTimedOut { .. } => {
                "The assistant took too long to respond. Please try again.".into()
            }
            ChatError::Cancelled => "Request cancelled.".into(),
            ChatError::ResponseNotFound => "No assistant response was found.".into(),
            ChatError::Config(msg) => msg.clone(),
            ChatError::Keyring(_) => {
                "Could not read credentials from the system keychain.".into()
            }
        }
    }
}

// ── Convenience alias ──────────────────────────────────────────────────────

/// All fallible operations in this crate return this type.
pub type ChatResult<T> = Result<T, ChatError>;
