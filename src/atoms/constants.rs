// ── Threadchat Atoms: Constants ────────────────────────────────────────────
// All named constants for the crate live here.
// Rationale: collecting constants in one place eliminates magic strings,
// makes auditing easier, and keeps every layer's code self-documenting.

// ── Credential identifiers ─────────────────────────────────────────────────
// The keychain entry is keyed on (service, user) — changing either value
// would cause existing entries to become unreachable. Treat as stable
// identifiers.
pub(crate) const KEYRING_SERVICE: &str = "threadchat";
pub(crate) const KEYRING_API_KEY_USER: &str = "api-key";
pub(crate) const KEYRING_ASSISTANT_USER: &str = "assistant-id";

// Environment fallbacks, consulted when the keychain has no entry.
pub(crate) const ENV_API_KEY: &str = "OPENAI_API_KEY";
pub(crate) const ENV_ASSISTANT_ID: &str = "ASSISTANT_ID";

// ── Remote service ─────────────────────────────────────────────────────────

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Thread/run endpoints are gated behind this beta header on the hosted API.
pub(crate) const ASSISTANTS_BETA_HEADER: &str = "assistants=v2";

// ── Run polling budget ─────────────────────────────────────────────────────
// A run that is still non-terminal after MAX_POLL_ATTEMPTS × POLL_DELAY_MS
// is reported as timed out. There is no unbounded variant: a poll loop
// without a cap can hang the calling turn forever.
pub const MAX_POLL_ATTEMPTS: u32 = 30;
pub const POLL_DELAY_MS: u64 = 1_000;
