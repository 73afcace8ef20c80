//! Collaborator traits for the MuSES backend.
//!
//! The scan pipeline only talks to these traits, so it can run against the
//! real [`super::MusesClient`] or the in-memory [`super::MockBackend`].

use async_trait::async_trait;

use crate::domain::{QuestResponse, RewardResponse, TaskCompletionRequest, UseRewardResponse};
use crate::error::ClientResult;

/// Fetches the raw missions document of a user.
#[async_trait]
pub trait MissionFetcher: Send + Sync {
    /// Body of `GET missions/user/{user_id}` exactly as received.
    ///
    /// Shape normalisation is left to [`crate::domain::MissionList::from_payload`].
    async fn fetch_missions_raw(&self, user_id: &str, request_id: Option<&str>) -> ClientResult<String>;
}

/// Fetches a single quest.
#[async_trait]
pub trait QuestFetcher: Send + Sync {
    /// `Ok(None)` when the backend answered successfully with a `null` body.
    async fn fetch_quest(
        &self,
        quest_id: &str,
        request_id: Option<&str>,
    ) -> ClientResult<Option<QuestResponse>>;
}

/// Marks a task as completed.
#[async_trait]
pub trait TaskCompleter: Send + Sync {
    async fn complete_task(
        &self,
        user_id: &str,
        request: &TaskCompletionRequest,
        request_id: Option<&str>,
    ) -> ClientResult<()>;
}

/// Point-of-sale reward operations used by the admin app.
#[async_trait]
pub trait RewardDesk: Send + Sync {
    async fn reward_details(&self, reward_id: &str) -> ClientResult<RewardResponse>;

    async fn use_reward(&self, reward_id: &str) -> ClientResult<UseRewardResponse>;
}

/// Everything the task scan pipeline needs.
pub trait MusesBackend: MissionFetcher + QuestFetcher + TaskCompleter {}

impl<T> MusesBackend for T where T: MissionFetcher + QuestFetcher + TaskCompleter + ?Sized {}
