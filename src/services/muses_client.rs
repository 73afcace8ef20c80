//! HTTP client for the MuSES backend.
//!
//! Provides type-safe methods for:
//! - Login / logout against the auth service
//! - Mission listing, generation and start
//! - Quest lookup
//! - Task completion (QR recognition)
//! - Museums, artworks and user profiles
//! - Owned rewards (visitor app), reward inspection and redemption (admin app)

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize};
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::auth::Session;
use crate::domain::{
    Artwork, LoginResult, MissionList, Museum, OwnedRewardsResponse, Quest, QuestResponse,
    RegisterRequest, RewardResponse, TaskCompletionRequest, TokenResponse, UseRewardResponse, User,
};
use crate::error::{ClientError, ClientResult};
use crate::services::backend::{MissionFetcher, QuestFetcher, RewardDesk, TaskCompleter};

/// Client for the MuSES backend.
///
/// Cloning shares the connection pool and the session.
#[derive(Clone)]
pub struct MusesClient {
    client: Client,
    base_url: Url,
    session: Session,
}

/// Error body shapes used by the backend services.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: Option<String>,
    error: Option<String>,
}

impl MusesClient {
    /// Create a new backend client bound to `session`.
    pub fn new(base_url: &Url, session: Session, timeout_seconds: u64) -> Result<Self> {
        if base_url.cannot_be_a_base() {
            bail!("Base URL cannot carry a path: {base_url}");
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        info!(base_url = %base_url, "MuSES client initialized");

        Ok(Self {
            client,
            base_url: base_url.clone(),
            session,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Base URL joined with percent-encoded path segments.
    fn endpoint(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::Internal(anyhow::anyhow!("Base URL cannot carry a path")))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Start a request carrying the session token and the request id.
    fn prepare(
        &self,
        method: Method,
        segments: &[&str],
        request_id: Option<&str>,
    ) -> ClientResult<RequestBuilder> {
        let url = self.endpoint(segments)?;
        Ok(self.prepare_url(method, url, request_id))
    }

    /// Same as [`Self::prepare`] for an already built URL.
    fn prepare_url(&self, method: Method, url: Url, request_id: Option<&str>) -> RequestBuilder {
        debug!(method = %method, url = %url, "MuSES request");

        let mut req = self.client.request(method, url);

        if let Some(token) = self.session.token() {
            req = req.bearer_auth(token);
        }
        if let Some(rid) = request_id {
            req = req.header("x-request-id", rid);
        }

        req
    }

    /// Send a request, turning non-success statuses into [`ClientError`].
    async fn send(&self, req: RequestBuilder) -> ClientResult<Response> {
        let response = req.send().await.map_err(|e| {
            error!(error = %e, "MuSES request failed");
            ClientError::Transport(format!("MuSES backend unavailable: {e}"))
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = error_body(response).await;
        warn!(status = %status, body = ?body, "MuSES backend returned an error");
        Err(ClientError::from_status(status, body))
    }

    /// Check backend health.
    pub async fn health_check(&self) -> Result<()> {
        let url = self.endpoint(&["health"])?;

        self.client
            .get(url)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .context("MuSES health check failed")?
            .error_for_status()
            .context("MuSES backend unhealthy")?;

        Ok(())
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Log in with HTTP Basic credentials and establish the session.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str, role: &str) -> ClientResult<LoginResult> {
        let url = self.endpoint(&["auth", "login"])?;
        debug!(url = %url, "MuSES login request");

        let req = self
            .client
            .get(url)
            .basic_auth(username, Some(password))
            .header("RBAC-Name", role);

        let response = self.send(req).await?;

        let entity_id = response
            .headers()
            .get("entityid")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        let body: TokenResponse = read_json(response).await?;

        self.session.establish(body.token.clone(), entity_id.clone());
        info!(has_entity_id = entity_id.is_some(), "Logged in");

        Ok(LoginResult {
            token: body.token,
            entity_id,
        })
    }

    /// Create a visitor account. `role` goes out as the `RBAC-Request` header.
    #[instrument(skip(self, password))]
    pub async fn register(&self, username: &str, password: &str, role: &str) -> ClientResult<()> {
        let url = self.endpoint(&["auth", "register"])?;
        let body = RegisterRequest {
            username: username.to_string(),
            password: password.to_string(),
        };

        let req = self
            .client
            .post(url)
            .header("RBAC-Request", role)
            .json(&body);
        self.send(req).await?;

        info!("Account registered");
        Ok(())
    }

    /// Forget the session token. Purely local.
    pub fn logout(&self) {
        self.session.clear();
        info!("Logged out");
    }

    // =========================================================================
    // Missions
    // =========================================================================

    /// Missions of a user, normalised and in received order.
    #[instrument(skip(self))]
    pub async fn list_missions(&self, user_id: &str, request_id: Option<&str>) -> ClientResult<MissionList> {
        let raw = self.fetch_missions_raw(user_id, request_id).await?;
        let list = MissionList::from_payload(&raw);

        debug!(count = list.len(), skipped = list.skipped, "Missions listed");
        Ok(list)
    }

    /// Ask the mission tracker to build a new mission for the user.
    #[instrument(skip(self))]
    pub async fn generate_mission(&self, user_id: &str, request_id: Option<&str>) -> ClientResult<()> {
        let req = self.prepare(Method::POST, &["missions", user_id], request_id)?;
        self.send(req).await?;

        info!("Mission generated");
        Ok(())
    }

    /// Move a mission to the in-progress state.
    #[instrument(skip(self))]
    pub async fn start_mission(&self, mission_id: &str, request_id: Option<&str>) -> ClientResult<()> {
        let req = self.prepare(Method::POST, &["missions", "start", mission_id], request_id)?;
        self.send(req).await?;

        info!("Mission started");
        Ok(())
    }

    // =========================================================================
    // Catalogue
    // =========================================================================

    pub async fn list_quests(&self) -> ClientResult<Vec<Quest>> {
        let req = self.prepare(Method::GET, &["quests"], None)?;
        read_json(self.send(req).await?).await
    }

    #[instrument(skip(self))]
    pub async fn list_museums(&self) -> ClientResult<Vec<Museum>> {
        let req = self.prepare(Method::GET, &["museums"], None)?;
        let museums: Vec<Museum> = read_json(self.send(req).await?).await?;

        debug!(count = museums.len(), "Museums listed");
        Ok(museums)
    }

    #[instrument(skip(self))]
    pub async fn get_museum(&self, museum_id: &str) -> ClientResult<Museum> {
        let req = self.prepare(Method::GET, &["museums", museum_id], None)?;
        read_json(self.send(req).await?).await
    }

    /// Artworks of one museum.
    #[instrument(skip(self))]
    pub async fn search_artworks(&self, museum_id: &str) -> ClientResult<Vec<Artwork>> {
        let mut url = self.endpoint(&["artworks", "search"])?;
        url.query_pairs_mut().append_pair("museum", museum_id);

        let req = self.prepare_url(Method::GET, url, None);
        let artworks: Vec<Artwork> = read_json(self.send(req).await?).await?;

        debug!(count = artworks.len(), "Artworks found");
        Ok(artworks)
    }

    // =========================================================================
    // Users
    // =========================================================================

    #[instrument(skip(self))]
    pub async fn get_user(&self, user_id: &str) -> ClientResult<User> {
        let req = self.prepare(Method::GET, &["users", user_id], None)?;
        read_json(self.send(req).await?).await
    }

    /// Rewards a visitor has earned, used ones included.
    #[instrument(skip(self))]
    pub async fn owned_rewards(&self, user_id: &str) -> ClientResult<OwnedRewardsResponse> {
        let req = self.prepare(Method::GET, &["user", "rewards", "owned", user_id], None)?;
        let owned: OwnedRewardsResponse = read_json(self.send(req).await?).await?;

        debug!(count = owned.rewards.len(), "Owned rewards listed");
        Ok(owned)
    }
}

#[async_trait]
impl MissionFetcher for MusesClient {
    #[instrument(skip(self))]
    async fn fetch_missions_raw(&self, user_id: &str, request_id: Option<&str>) -> ClientResult<String> {
        let req = self.prepare(Method::GET, &["missions", "user", user_id], request_id)?;
        let response = self.send(req).await?;

        let body = response.text().await?;
        debug!(bytes = body.len(), "Raw missions response");
        Ok(body)
    }
}

#[async_trait]
impl QuestFetcher for MusesClient {
    #[instrument(skip(self))]
    async fn fetch_quest(
        &self,
        quest_id: &str,
        request_id: Option<&str>,
    ) -> ClientResult<Option<QuestResponse>> {
        let req = self.prepare(Method::GET, &["quests", quest_id], request_id)?;
        let response = self.send(req).await?;

        let text = response.text().await?;
        let body = text.trim();
        if body.is_empty() || body == "null" {
            warn!("Quest response body is null");
            return Ok(None);
        }

        let quest: QuestResponse = serde_json::from_str(body).map_err(|e| {
            error!(error = %e, "Failed to parse quest response");
            ClientError::InvalidResponse(format!("Invalid quest response: {e}"))
        })?;

        debug!(
            tasks = quest.quest.tasks.len(),
            tasks_completed = quest.tasks_completed,
            total_tasks = quest.total_tasks,
            "Quest fetched"
        );
        Ok(Some(quest))
    }
}

#[async_trait]
impl TaskCompleter for MusesClient {
    #[instrument(skip(self, request), fields(task_id = %request.task_id, mission_id = %request.mission_id, quest_id = %request.quest_id))]
    async fn complete_task(
        &self,
        user_id: &str,
        request: &TaskCompletionRequest,
        request_id: Option<&str>,
    ) -> ClientResult<()> {
        let req = self.prepare(Method::POST, &["recognition", user_id], request_id)?;
        self.send(req.json(request)).await?;

        info!("Task completion accepted");
        Ok(())
    }
}

#[async_trait]
impl RewardDesk for MusesClient {
    #[instrument(skip(self))]
    async fn reward_details(&self, reward_id: &str) -> ClientResult<RewardResponse> {
        let req = self.prepare(Method::GET, &["user", "rewards", "details", reward_id], None)?;
        let response = self.send(req).await?;

        read_json(response).await
    }

    #[instrument(skip(self))]
    async fn use_reward(&self, reward_id: &str) -> ClientResult<UseRewardResponse> {
        let req = self.prepare(Method::POST, &["user", "rewards", reward_id], None)?;
        let response = self.send(req).await?;

        let used: UseRewardResponse = read_json(response).await?;
        info!("Reward used");
        Ok(used)
    }
}

async fn read_json<R: DeserializeOwned>(response: Response) -> ClientResult<R> {
    response.json::<R>().await.map_err(|e| {
        error!(error = %e, "Failed to parse MuSES response");
        ClientError::InvalidResponse(format!("Invalid MuSES response: {e}"))
    })
}

/// Best-effort extraction of the backend's error message.
async fn error_body(response: Response) -> Option<String> {
    let text = response.text().await.ok()?;
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    match serde_json::from_str::<ErrorResponse>(text) {
        Ok(ErrorResponse {
            message: Some(message),
            ..
        }) => Some(message),
        Ok(ErrorResponse {
            error: Some(error), ..
        }) => Some(error),
        _ => Some(text.to_string()),
    }
}
