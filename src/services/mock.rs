//! In-memory MuSES backend for tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::StatusCode;
use std::collections::HashMap;

use crate::domain::{
    Quest, QuestResponse, Reward, RewardResponse, TaskCompletionRequest, UseRewardResponse,
};
use crate::error::{ClientError, ClientResult};
use crate::services::backend::{MissionFetcher, QuestFetcher, RewardDesk, TaskCompleter};

/// How a mocked call should fail.
#[derive(Debug, Clone)]
pub enum MockFailure {
    /// Backend answered with this status and optional error body
    Status(StatusCode, Option<String>),
    /// Connection never completed
    Transport(String),
}

impl MockFailure {
    fn to_error(&self) -> ClientError {
        match self {
            Self::Status(status, body) => ClientError::from_status(*status, body.clone()),
            Self::Transport(msg) => ClientError::Transport(msg.clone()),
        }
    }
}

/// A backend call, as recorded by [`MockBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Missions(String),
    Quest(String),
    Complete(String, TaskCompletionRequest),
    RewardDetails(String),
    UseReward(String),
}

/// Configurable in-memory backend.
///
/// Quests that were never registered answer 404. Every call is recorded in
/// order so tests can check scan order and early exit.
#[derive(Default)]
pub struct MockBackend {
    missions_body: String,
    missions_failure: Option<MockFailure>,
    quests: HashMap<String, Option<QuestResponse>>,
    quest_failures: HashMap<String, MockFailure>,
    quest_failures_once: Mutex<HashMap<String, MockFailure>>,
    completion_failure: Option<MockFailure>,
    rewards: HashMap<String, (Reward, String)>,
    calls: Mutex<Vec<MockCall>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw body returned by the missions endpoint.
    pub fn with_missions_body(mut self, body: impl Into<String>) -> Self {
        self.missions_body = body.into();
        self
    }

    pub fn with_missions_failure(mut self, failure: MockFailure) -> Self {
        self.missions_failure = Some(failure);
        self
    }

    /// Register a quest whose tasks have the given ids.
    pub fn with_quest(mut self, quest_id: &str, task_ids: &[&str]) -> Self {
        let tasks = task_ids
            .iter()
            .map(|id| (id.to_string(), Default::default()))
            .collect();
        let quest = Quest {
            id: quest_id.to_string(),
            title: format!("Quest {quest_id}"),
            description: String::new(),
            status: "PENDING".to_string(),
            subject_id: String::new(),
            tasks,
        };
        let total_tasks = task_ids.len() as u32;

        self.quests.insert(
            quest_id.to_string(),
            Some(QuestResponse {
                quest,
                tasks_completed: 0,
                total_tasks,
            }),
        );
        self
    }

    /// Register a quest that answers 200 with a `null` body.
    pub fn with_null_quest(mut self, quest_id: &str) -> Self {
        self.quests.insert(quest_id.to_string(), None);
        self
    }

    pub fn with_quest_failure(mut self, quest_id: &str, failure: MockFailure) -> Self {
        self.quest_failures.insert(quest_id.to_string(), failure);
        self
    }

    /// Fail the next fetch of `quest_id` only; later fetches answer normally.
    pub fn with_quest_failure_once(self, quest_id: &str, failure: MockFailure) -> Self {
        self.quest_failures_once
            .lock()
            .insert(quest_id.to_string(), failure);
        self
    }

    pub fn with_completion_failure(mut self, failure: MockFailure) -> Self {
        self.completion_failure = Some(failure);
        self
    }

    /// Register a reward and the confirmation code returned when it is used.
    pub fn with_reward(mut self, reward_id: &str, reward: Reward, code: &str) -> Self {
        self.rewards
            .insert(reward_id.to_string(), (reward, code.to_string()));
        self
    }

    /// All calls so far, oldest first.
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }

    /// Quest ids fetched so far, in order.
    pub fn quest_calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                MockCall::Quest(id) => Some(id.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn completions(&self) -> Vec<TaskCompletionRequest> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                MockCall::Complete(_, request) => Some(request.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: MockCall) {
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl MissionFetcher for MockBackend {
    async fn fetch_missions_raw(&self, user_id: &str, _request_id: Option<&str>) -> ClientResult<String> {
        self.record(MockCall::Missions(user_id.to_string()));

        match &self.missions_failure {
            Some(failure) => Err(failure.to_error()),
            None => Ok(self.missions_body.clone()),
        }
    }
}

#[async_trait]
impl QuestFetcher for MockBackend {
    async fn fetch_quest(
        &self,
        quest_id: &str,
        _request_id: Option<&str>,
    ) -> ClientResult<Option<QuestResponse>> {
        self.record(MockCall::Quest(quest_id.to_string()));

        if let Some(failure) = self.quest_failures_once.lock().remove(quest_id) {
            return Err(failure.to_error());
        }
        if let Some(failure) = self.quest_failures.get(quest_id) {
            return Err(failure.to_error());
        }

        match self.quests.get(quest_id) {
            Some(quest) => Ok(quest.clone()),
            None => Err(ClientError::from_status(StatusCode::NOT_FOUND, None)),
        }
    }
}

#[async_trait]
impl TaskCompleter for MockBackend {
    async fn complete_task(
        &self,
        user_id: &str,
        request: &TaskCompletionRequest,
        _request_id: Option<&str>,
    ) -> ClientResult<()> {
        self.record(MockCall::Complete(user_id.to_string(), request.clone()));

        match &self.completion_failure {
            Some(failure) => Err(failure.to_error()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RewardDesk for MockBackend {
    async fn reward_details(&self, reward_id: &str) -> ClientResult<RewardResponse> {
        self.record(MockCall::RewardDetails(reward_id.to_string()));

        self.rewards
            .get(reward_id)
            .map(|(reward, _)| RewardResponse {
                reward: reward.clone(),
            })
            .ok_or_else(|| ClientError::from_status(StatusCode::NOT_FOUND, Some("Reward not found".to_string())))
    }

    async fn use_reward(&self, reward_id: &str) -> ClientResult<UseRewardResponse> {
        self.record(MockCall::UseReward(reward_id.to_string()));

        self.rewards
            .get(reward_id)
            .map(|(_, code)| UseRewardResponse { code: code.clone() })
            .ok_or_else(|| ClientError::from_status(StatusCode::NOT_FOUND, Some("Reward not found".to_string())))
    }
}
