// Threadchat Engine — Run Poller
// Queries run status until a terminal state, the poll budget runs out, or
// the caller cancels. Always bounded: a loop with no cap would hang the
// turn whenever the service wedges a run in `queued`.

use log::{debug, info};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::atoms::constants::{MAX_POLL_ATTEMPTS, POLL_DELAY_MS};
use crate::atoms::error::{ChatError, ChatResult};
use crate::atoms::types::{ConversationId, RunId, RunStatus};
use crate::engine::client::AssistantApi;

#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Maximum number of status queries before giving up.
    pub max_attempts: u32,
    /// Fixed wait between consecutive queries.
    pub delay: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        PollConfig {
            max_attempts: MAX_POLL_ATTEMPTS,
            delay: Duration::from_millis(POLL_DELAY_MS),
        }
    }
}

/// Poll `run` to a terminal state.
///
/// Returns `Ok(RunStatus::Completed)` on success. Every other outcome is an
/// error: a non-success terminal status (`RunFailed`), an exhausted budget
/// (`RunTimedOut` — exactly `max_attempts` queries are issued, never more),
/// cancellation, or a propagated client failure. The cancellation token is
/// consulted before each query and while sleeping between queries.
pub async fn poll_run(
    api: &dyn AssistantApi,
    conversation: &ConversationId,
    run: &RunId,
    config: &PollConfig,
    cancel: &CancellationToken,
) -> ChatResult<RunStatus> {
    for attempt in 1..=config.max_attempts {
        if cancel.is_cancelled() {
            return Err(ChatError::Cancelled);
        }

        let status = api.run_status(conversation, run).await?;
        match status {
            RunStatus::Completed => {
                info!("[engine] run {} completed after {} checks", run, attempt);
                return Ok(RunStatus::Completed);
            }
            s if s.is_terminal() => {
                return Err(ChatError::RunFailed { status: s });
            }
            s => {
                debug!(
                    "[engine] run {} still `{}` (check {}/{})",
                    run, s, attempt, config.max_attempts
                );
            }
        }

        // No sleep after the final query — the budget is on queries, not
        // on wall-clock padding.
        if attempt < config.max_attempts {
            tokio::select! {
                _ = cancel.cancelled() => return Err(ChatError::Cancelled),
                _ = tokio::time::sleep(config.delay) => {}
            }
        }
    }

    Err(ChatError::RunTimedOut { attempts: config.max_attempts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::types::ThreadMessage;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Scripted service: returns the queued statuses in order and counts
    /// how many times it was asked.
    struct ScriptedApi {
        statuses: Mutex<Vec<RunStatus>>,
        queries: Mutex<u32>,
    }

    impl ScriptedApi {
        fn new(statuses: Vec<RunStatus>) -> Self {
            ScriptedApi { statuses: Mutex::new(statuses), queries: Mutex::new(0) }
        }

        fn query_count(&self) -> u32 {
            *self.queries.lock().unwrap()
        }
    }

    #[async_trait]
    impl AssistantApi for ScriptedApi {
        async fn create_conversation(&self) -> ChatResult<ConversationId> {
            unimplemented!("not used by poller tests")
        }
        async fn send_message(&self, _: &ConversationId, _: &str) -> ChatResult<()> {
            unimplemented!("not used by poller tests")
        }
        async fn start_run(&self, _: &ConversationId) -> ChatResult<RunId> {
            unimplemented!("not used by poller tests")
        }
        async fn run_status(&self, _: &ConversationId, _: &RunId) -> ChatResult<RunStatus> {
            *self.queries.lock().unwrap() += 1;
            let mut statuses = self.statuses.lock().unwrap();
            if statuses.is_empty() {
                Ok(RunStatus::InProgress)
            } else {
                Ok(statuses.remove(0))
            }
        }
        async fn list_messages(&self, _: &ConversationId) -> ChatResult<Vec<ThreadMessage>> {
            unimplemented!("not used by poller tests")
        }
    }

    fn fast_config(max_attempts: u32) -> PollConfig {
        PollConfig { max_attempts, delay: Duration::ZERO }
    }

    fn ids() -> (ConversationId, RunId) {
        (ConversationId("thread_1".into()), RunId("run_1".into()))
    }

    #[tokio::test]
    async fn completes_on_nth_check_and_stops_querying() {
        let api = ScriptedApi::new(vec![
            RunStatus::Queued,
            RunStatus::InProgress,
            RunStatus::Completed,
        ]);
        let (conversation, run) = ids();
        let status = poll_run(&api, &conversation, &run, &fast_config(30), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(status, RunStatus::Completed);
        assert_eq!(api.query_count(), 3);
    }

    #[tokio::test]
    async fn fails_on_first_failed_status_with_no_further_queries() {
        let api = ScriptedApi::new(vec![RunStatus::Failed, RunStatus::Completed]);
        let (conversation, run) = ids();
        let err = poll_run(&api, &conversation, &run, &fast_config(30), &CancellationToken::new())
            .await
            .unwrap_err();
        match err {
            ChatError::RunFailed { status } => assert_eq!(status, RunStatus::Failed),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(api.query_count(), 1);
    }

    #[tokio::test]
    async fn expired_run_is_a_failure_not_a_timeout() {
        let api = ScriptedApi::new(vec![RunStatus::Queued, RunStatus::Expired]);
        let (conversation, run) = ids();
        let err = poll_run(&api, &conversation, &run, &fast_config(30), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::RunFailed { status: RunStatus::Expired }));
        assert_eq!(api.query_count(), 2);
    }

    #[tokio::test]
    async fn times_out_after_exactly_max_attempts_queries() {
        let api = ScriptedApi::new(vec![]); // always in_progress
        let (conversation, run) = ids();
        let err = poll_run(&api, &conversation, &run, &fast_config(5), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::RunTimedOut { attempts: 5 }));
        assert_eq!(api.query_count(), 5);
    }

    #[tokio::test]
    async fn cancelled_token_aborts_before_the_first_query() {
        let api = ScriptedApi::new(vec![RunStatus::Completed]);
        let (conversation, run) = ids();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = poll_run(&api, &conversation, &run, &fast_config(30), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Cancelled));
        assert_eq!(api.query_count(), 0);
    }

    #[tokio::test]
    async fn cancellation_interrupts_the_inter_query_sleep() {
        let api = ScriptedApi::new(vec![]); // never terminal
        let (conversation, run) = ids();
        let cancel = CancellationToken::new();
        let config = PollConfig { max_attempts: 30, delay: Duration::from_secs(60) };
        let cancel_clone = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            cancel_clone.cancel();
        });
        let err = poll_run(&api, &conversation, &run, &config, &cancel).await.unwrap_err();
        assert!(matches!(err, ChatError::Cancelled));
        // One query happened, then the sleep was interrupted.
        assert_eq!(api.query_count(), 1);
    }

    #[tokio::test]
    async fn client_errors_propagate_out_of_the_loop() {
        struct BrokenApi;
        #[async_trait]
        impl AssistantApi for BrokenApi {
            async fn create_conversation(&self) -> ChatResult<ConversationId> {
                unimplemented!()
            }
            async fn send_message(&self, _: &ConversationId, _: &str) -> ChatResult<()> {
                unimplemented!()
            }
            async fn start_run(&self, _: &ConversationId) -> ChatResult<RunId> {
                unimplemented!()
            }
            async fn run_status(&self, _: &ConversationId, _: &RunId) -> ChatResult<RunStatus> {
                Err(ChatError::Api { status: 500, message: "boom".into() })
            }
            async fn list_messages(&self, _: &ConversationId) -> ChatResult<Vec<ThreadMessage>> {
                unimplemented!()
            }
        }
        let (conversation, run) = ids();
        let err = poll_run(&BrokenApi, &conversation, &run, &fast_config(30), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Api { status: 500, .. }));
    }
}
