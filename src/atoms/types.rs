// ── Threadchat Atoms: Pure Data Types ──────────────────────────────────────
// All plain struct/enum definitions with no I/O.
// These are the data structures that flow through the whole engine; they are
// independent of the HTTP client and of the terminal front-end.

use serde::{Deserialize, Serialize};
use std::fmt;

// ── Opaque server-side identifiers ─────────────────────────────────────────

/// Server-held context grouping a sequence of messages ("thread" on the
/// wire). Created once per session, never deleted client-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(pub String);

/// One assistant-invocation attempt over a conversation's message history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub String);

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── Run status ─────────────────────────────────────────────────────────────

/// Status of a run as reported by the service. The service vocabulary is
/// wider than we act on, so unknown values are preserved in `Other` rather
/// than rejected — an unknown status is simply "not terminal yet".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Completed,
    Failed,
    Cancelled,
    Expired,
    Other(String),
}

impl RunStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "queued" => RunStatus::Queued,
            "in_progress" => RunStatus::InProgress,
            "requires_action" => RunStatus::RequiresAction,
            "completed" => RunStatus::Completed,
            "failed" => RunStatus::Failed,
            "cancelled" => RunStatus::Cancelled,
            "expired" => RunStatus::Expired,
            other => RunStatus::Other(other.to_string()),
        }
    }

    /// A terminal status is one after which no further transitions occur.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunStatus::Completed | RunStatus::Failed | RunStatus::Cancelled | RunStatus::Expired
        )
    }

    pub fn as_str(&self) -> &str {
        match self {
            RunStatus::Queued => "queued",
            RunStatus::InProgress => "in_progress",
            RunStatus::RequiresAction => "requires_action",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
            RunStatus::Cancelled => "cancelled",
            RunStatus::Expired => "expired",
            RunStatus::Other(s) => s,
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Messages on the wire ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    /// Anything else the service may add (e.g. system/tool roles); never
    /// selected by reply extraction.
    Other,
}

impl Role {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "user" => Role::User,
            "assistant" => Role::Assistant,
            _ => Role::Other,
        }
    }
}

/// One ordered content segment of a remote message. Only text segments are
/// consumed; other kinds (images, files) are carried so callers can at
/// least see they were skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSegment {
    Text(String),
    /// Unconsumed segment — holds the wire `type` discriminant.
    Unsupported(String),
}

/// A message as it exists inside a remote conversation. Immutable once
/// created; ordering within the listing is newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadMessage {
    pub role: Role,
    pub segments: Vec<ContentSegment>,
}

impl ThreadMessage {
    /// Concatenate all text segments in order. Non-text segments are
    /// skipped, not stringified.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            if let ContentSegment::Text(t) = segment {
                out.push_str(t);
            }
        }
        out
    }
}

// ── Local transcript entries ───────────────────────────────────────────────

/// One line of the locally displayed transcript. Local-only — never sent
/// back to the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatEntry {
    pub id: String,
    pub role: Role,
    pub text: String,
    pub created_at: String,
}

impl ChatEntry {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        ChatEntry {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            text: text.into(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

// ── Small text utility ─────────────────────────────────────────────────────

/// Truncate a string to at most `max` bytes without splitting a UTF-8
/// sequence. Used to keep remote error bodies short in logs and errors.
pub fn truncate_utf8(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
