// Threadchat Engine — synchronous chat turns against a thread/run API.
// One turn = ensure conversation → append message → start run → poll to a
// terminal state → extract the newest assistant reply.

pub mod client;
pub mod credentials;
pub mod orchestrator;
pub mod poller;
pub mod session;
