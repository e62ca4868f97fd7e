// Threadchat Engine — Credential Loader
// Resolves the API key and assistant identifier: OS keychain first,
// environment variables second. A missing API key is fatal at startup;
// a missing assistant id falls back to nothing — the caller decides
// whether to supply one on the command line instead.

use log::warn;

use crate::atoms::constants::{
    ENV_API_KEY, ENV_ASSISTANT_ID, KEYRING_API_KEY_USER, KEYRING_ASSISTANT_USER, KEYRING_SERVICE,
};
use crate::atoms::error::{ChatError, ChatResult};

#[derive(Debug, Clone)]
pub struct Credentials {
    pub api_key: String,
    pub assistant_id: String,
}

impl Credentials {
    /// Load credentials from the keychain, falling back to the environment.
    ///
    /// `assistant_override` wins over both sources when set (CLI flag).
    pub fn load(assistant_override: Option<String>) -> ChatResult<Self> {
        let api_key = keyring_lookup(KEYRING_API_KEY_USER)?
            .or_else(|| env_lookup(ENV_API_KEY))
            .ok_or_else(|| {
                ChatError::Config(format!(
                    "No API key configured. Store one in the system keychain \
                     (service `{}`) or set the {} environment variable.",
                    KEYRING_SERVICE, ENV_API_KEY
                ))
            })?;

        let assistant_id = match assistant_override {
            Some(id) => id,
            None => keyring_lookup(KEYRING_ASSISTANT_USER)?
                .or_else(|| env_lookup(ENV_ASSISTANT_ID))
                .ok_or_else(|| {
                    ChatError::Config(format!(
                        "No assistant id configured. Store one in the system keychain \
                         (service `{}`), set the {} environment variable, or pass --assistant.",
                        KEYRING_SERVICE, ENV_ASSISTANT_ID
                    ))
                })?,
        };

        Ok(Credentials { api_key, assistant_id })
    }
}

/// Read one keychain entry. `NoEntry` and an unavailable keychain daemon
/// both fall through to the environment rather than aborting startup —
/// headless machines routinely have no keychain at all.
fn keyring_lookup(user: &str) -> ChatResult<Option<String>> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, user)
        .map_err(|e| ChatError::Keyring(e.to_string()))?;
    match entry.get_password() {
        Ok(value) if !value.trim().is_empty() => Ok(Some(value)),
        Ok(_) => Ok(None),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => {
            warn!("[engine] keychain lookup for `{}` failed: {}", user, e);
            Ok(None)
        }
    }
}

fn env_lookup(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}
