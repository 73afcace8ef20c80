//! One QR scan, end to end.
//!
//! `Idle -> Decoding -> Resolving -> Submitting -> {Completed, Failed}`.
//! Each run starts at `Idle` and shares nothing with other runs. Dropping
//! the future abandons whatever request is in flight; gating repeated scans
//! is left to the caller.

use reqwest::StatusCode;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::auth::Session;
use crate::domain::TaskCompletionRequest;
use crate::scan::qr::decode_task_id;
use crate::scan::resolver::{Resolution, Resolver, SearchPhase};
use crate::scan::submitter::{SubmitOutcome, Submitter};
use crate::services::MusesBackend;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStage {
    Idle,
    Decoding,
    Resolving,
    Submitting,
    Completed,
    Failed,
}

/// Why a scan failed. The display text is meant for the user.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScanFailure {
    #[error("You need to log in before scanning")]
    NotAuthenticated,

    #[error("Task {task_id} not found in any of your missions")]
    TaskNotFound { task_id: String },

    #[error("Could not load your missions: {0}")]
    MissionsUnavailable(String),

    #[error("{message}")]
    Rejected {
        status: Option<StatusCode>,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Completed {
        request: TaskCompletionRequest,
        phase: SearchPhase,
    },
    Failed {
        /// Last stage entered before failing
        stage: ScanStage,
        failure: ScanFailure,
    },
}

impl ScanOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    /// Text to show once the scan is over.
    pub fn message(&self) -> String {
        match self {
            Self::Completed { .. } => "Task completed successfully!".to_string(),
            Self::Failed { failure, .. } => failure.to_string(),
        }
    }
}

/// Tracks the current stage and logs each transition.
struct StageTracker {
    stage: ScanStage,
}

impl StageTracker {
    fn new() -> Self {
        Self {
            stage: ScanStage::Idle,
        }
    }

    fn enter(&mut self, next: ScanStage) {
        debug!(from = ?self.stage, to = ?next, "Scan stage");
        self.stage = next;
    }

    fn fail(mut self, failure: ScanFailure) -> ScanOutcome {
        let stage = self.stage;
        self.enter(ScanStage::Failed);
        warn!(?stage, %failure, "Scan failed");
        ScanOutcome::Failed { stage, failure }
    }
}

/// QR-driven task completion: decode, resolve, submit.
pub struct ScanPipeline<B> {
    backend: Arc<B>,
}

impl<B> Clone for ScanPipeline<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
        }
    }
}

impl<B: MusesBackend> ScanPipeline<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// Runs one scan for `user_id`.
    #[instrument(skip(self, raw), fields(request_id = tracing::field::Empty))]
    pub async fn run(&self, user_id: &str, raw: &str) -> ScanOutcome {
        let request_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("request_id", request_id.as_str());

        let mut tracker = StageTracker::new();

        tracker.enter(ScanStage::Decoding);
        let task_id = decode_task_id(raw);
        if task_id.is_empty() {
            return tracker.fail(ScanFailure::TaskNotFound { task_id });
        }
        info!(task_id = %task_id, "QR decoded");

        tracker.enter(ScanStage::Resolving);
        let resolver = Resolver::new(self.backend.as_ref(), self.backend.as_ref());
        let resolution = resolver.resolve(user_id, &task_id, Some(&request_id)).await;
        let (mission_id, quest_id, phase) = match resolution {
            Ok(Resolution::Found {
                mission_id,
                quest_id,
                phase,
            }) => (mission_id, quest_id, phase),
            Ok(Resolution::NotFound) => {
                return tracker.fail(ScanFailure::TaskNotFound { task_id });
            }
            Err(e) => {
                return tracker.fail(ScanFailure::MissionsUnavailable(e.user_message()));
            }
        };

        tracker.enter(ScanStage::Submitting);
        let submitter = Submitter::new(self.backend.as_ref());
        let submitted = submitter
            .submit(user_id, &task_id, &mission_id, &quest_id, Some(&request_id))
            .await;
        match submitted {
            SubmitOutcome::Success => {
                tracker.enter(ScanStage::Completed);
                info!(task_id = %task_id, mission_id = %mission_id, quest_id = %quest_id, "Scan completed");
                ScanOutcome::Completed {
                    request: TaskCompletionRequest::new(task_id, mission_id, quest_id),
                    phase,
                }
            }
            SubmitOutcome::Failure { status, message } => {
                tracker.fail(ScanFailure::Rejected { status, message })
            }
        }
    }

    /// Runs one scan for the user logged into `session`.
    pub async fn run_for_session(&self, session: &Session, raw: &str) -> ScanOutcome {
        match session.entity_id() {
            Some(user_id) if session.is_authenticated() => self.run(&user_id, raw).await,
            _ => StageTracker::new().fail(ScanFailure::NotAuthenticated),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{MockBackend, MockCall, MockFailure};

    const MISSIONS: &str = r#"[[
        {"_id":"m1","status":"ACTIVE","steps":[{"step_id":"q1","completed":true},{"step_id":"q2","completed":false}],"user_id":"u1"},
        {"_id":"m0","status":"COMPLETE","steps":[{"step_id":"q9","completed":true}],"user_id":"u1"}
    ],200]"#;

    fn backend() -> MockBackend {
        MockBackend::new()
            .with_missions_body(MISSIONS)
            .with_quest("q1", &["T1"])
            .with_quest("q2", &["T42"])
            .with_quest("q9", &["T99"])
    }

    #[tokio::test]
    async fn json_qr_completes_task_in_active_mission() {
        let backend = Arc::new(backend());
        let pipeline = ScanPipeline::new(backend.clone());

        let outcome = pipeline.run("u1", r#"{"task_id":"T42"}"#).await;

        assert_eq!(
            outcome,
            ScanOutcome::Completed {
                request: TaskCompletionRequest::new("T42", "m1", "q2"),
                phase: SearchPhase::ActiveMission,
            }
        );
        assert_eq!(
            backend.calls().last(),
            Some(&MockCall::Complete("u1".into(), TaskCompletionRequest::new("T42", "m1", "q2")))
        );
    }

    #[tokio::test]
    async fn raw_qr_falls_back_to_completed_mission() {
        let backend = Arc::new(backend());
        let outcome = ScanPipeline::new(backend.clone()).run("u1", "  T99 \n").await;

        assert_eq!(
            outcome,
            ScanOutcome::Completed {
                request: TaskCompletionRequest::new("T99", "m0", "q9"),
                phase: SearchPhase::Fallback,
            }
        );
    }

    #[tokio::test]
    async fn unknown_task_fails_while_resolving_without_submitting() {
        let backend = Arc::new(backend());
        let outcome = ScanPipeline::new(backend.clone()).run("u1", "T000").await;

        assert_eq!(
            outcome,
            ScanOutcome::Failed {
                stage: ScanStage::Resolving,
                failure: ScanFailure::TaskNotFound {
                    task_id: "T000".into()
                },
            }
        );
        assert!(backend.completions().is_empty());
        assert_eq!(outcome.message(), "Task T000 not found in any of your missions");
    }

    #[tokio::test]
    async fn blank_qr_fails_without_network() {
        let backend = Arc::new(backend());
        let outcome = ScanPipeline::new(backend.clone()).run("u1", "   ").await;

        assert!(matches!(
            outcome,
            ScanOutcome::Failed {
                stage: ScanStage::Decoding,
                failure: ScanFailure::TaskNotFound { .. }
            }
        ));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn rejected_completion_reports_submitting_stage() {
        let backend = Arc::new(backend().with_completion_failure(MockFailure::Status(
            StatusCode::NOT_ACCEPTABLE,
            Some("Cannot complete task because this quest must not be done yet".into()),
        )));

        let outcome = ScanPipeline::new(backend).run("u1", "T42").await;

        match outcome {
            ScanOutcome::Failed {
                stage: ScanStage::Submitting,
                failure: ScanFailure::Rejected { status, message },
            } => {
                assert_eq!(status, Some(StatusCode::NOT_ACCEPTABLE));
                assert!(message.contains("must not be done yet"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missions_outage_fails_resolution() {
        let backend = Arc::new(
            backend().with_missions_failure(MockFailure::Transport("dns failure".into())),
        );

        let outcome = ScanPipeline::new(backend).run("u1", "T42").await;

        assert!(matches!(
            outcome,
            ScanOutcome::Failed {
                stage: ScanStage::Resolving,
                failure: ScanFailure::MissionsUnavailable(ref msg)
            } if msg == "dns failure"
        ));
    }

    #[tokio::test]
    async fn session_without_entity_is_rejected() {
        let pipeline = ScanPipeline::new(Arc::new(backend()));

        let outcome = pipeline
            .run_for_session(&Session::with_token("tok", None), "T42")
            .await;
        assert!(matches!(
            outcome,
            ScanOutcome::Failed {
                failure: ScanFailure::NotAuthenticated,
                ..
            }
        ));

        let outcome = pipeline
            .run_for_session(&Session::with_token("tok", Some("u1".into())), "T42")
            .await;
        assert!(outcome.is_completed());
    }

    #[tokio::test]
    async fn repeated_scans_are_not_short_circuited() {
        let backend = Arc::new(backend());
        let pipeline = ScanPipeline::new(backend.clone());

        assert!(pipeline.run("u1", "T42").await.is_completed());
        assert!(pipeline.run("u1", "T42").await.is_completed());
        assert_eq!(backend.completions().len(), 2);
    }
}
