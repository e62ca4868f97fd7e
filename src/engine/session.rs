// Threadchat Engine — Session State
// Process-local, in-memory state for one chat session: the displayed
// transcript, the server-side conversation id, and the most recent run id.
// An explicit context object with caller-managed lifetime — there is no
// process-wide session global.

use crate::atoms::types::{ChatEntry, ConversationId, Role, RunId};

#[derive(Debug, Default)]
pub struct ChatSession {
    entries: Vec<ChatEntry>,
    conversation_id: Option<ConversationId>,
    last_run_id: Option<RunId>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// The displayed transcript, oldest first.
    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    pub fn conversation_id(&self) -> Option<&ConversationId> {
        self.conversation_id.as_ref()
    }

    pub fn last_run_id(&self) -> Option<&RunId> {
        self.last_run_id.as_ref()
    }

    pub fn push_user(&mut self, text: &str) {
        self.entries.push(ChatEntry::new(Role::User, text));
    }

    pub fn push_assistant(&mut self, text: &str) {
        self.entries.push(ChatEntry::new(Role::Assistant, text));
    }

    pub(crate) fn set_conversation(&mut self, id: ConversationId) {
        self.conversation_id = Some(id);
    }

    pub(crate) fn set_last_run(&mut self, id: RunId) {
        self.last_run_id = Some(id);
    }

    /// "New conversation": wholesale reset. The next turn will create a
    /// fresh server-side conversation.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.conversation_id = None;
        self.last_run_id = None;
    }
}
