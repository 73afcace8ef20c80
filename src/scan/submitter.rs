//! Submits task completions.

use reqwest::StatusCode;
use tracing::{error, info, instrument};

use crate::domain::TaskCompletionRequest;
use crate::services::TaskCompleter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Success,
    Failure {
        /// Backend status, when the backend answered at all
        status: Option<StatusCode>,
        message: String,
    },
}

impl SubmitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Single-attempt completion submitter. Duplicate completions are not
/// filtered locally; the backend decides whether to accept them.
pub struct Submitter<'a> {
    completer: &'a dyn TaskCompleter,
}

impl<'a> Submitter<'a> {
    pub fn new(completer: &'a dyn TaskCompleter) -> Self {
        Self { completer }
    }

    #[instrument(skip(self))]
    pub async fn submit(
        &self,
        user_id: &str,
        task_id: &str,
        mission_id: &str,
        quest_id: &str,
        request_id: Option<&str>,
    ) -> SubmitOutcome {
        let request = TaskCompletionRequest::new(task_id, mission_id, quest_id);

        match self.completer.complete_task(user_id, &request, request_id).await {
            Ok(()) => {
                info!("Task completed");
                SubmitOutcome::Success
            }
            Err(e) => {
                error!(error = %e, code = e.error_code(), "Task completion failed");
                SubmitOutcome::Failure {
                    status: e.status(),
                    message: format!("Failed to complete task: {}", e.user_message()),
                }
            }
        }
    }
}
