//! Reward redemption at the point of sale.
//!
//! Visitor reward QR codes carry the bare reward id. Staff look the reward up
//! first and redeem it once the visitor has been served.

use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::domain::Reward;
use crate::error::ClientError;
use crate::services::RewardDesk;

#[derive(Debug, Error)]
pub enum RewardScanError {
    #[error("QR code does not contain a reward id")]
    EmptyCode,

    #[error("Reward {0} not found")]
    NotFound(String),

    #[error("{0}")]
    Backend(String),
}

impl RewardScanError {
    fn from_client(reward_id: &str, e: ClientError) -> Self {
        match e {
            ClientError::NotFound { .. } => Self::NotFound(reward_id.to_string()),
            other => Self::Backend(other.user_message()),
        }
    }
}

/// A reward that was found for a scanned code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardLookup {
    pub reward_id: String,
    pub reward: Reward,
}

pub struct RewardScanner<D> {
    desk: Arc<D>,
}

impl<D: RewardDesk> RewardScanner<D> {
    pub fn new(desk: Arc<D>) -> Self {
        Self { desk }
    }

    /// Fetches the reward behind a scanned code.
    #[instrument(skip(self))]
    pub async fn lookup(&self, raw: &str) -> Result<RewardLookup, RewardScanError> {
        let reward_id = raw.trim();
        if reward_id.is_empty() {
            return Err(RewardScanError::EmptyCode);
        }

        let response = self.desk.reward_details(reward_id).await.map_err(|e| {
            warn!(error = %e, "Reward lookup failed");
            RewardScanError::from_client(reward_id, e)
        })?;

        info!(reward_id, museum_id = %response.reward.museum_id, "Reward found");
        Ok(RewardLookup {
            reward_id: reward_id.to_string(),
            reward: response.reward,
        })
    }

    /// Marks the reward as used and returns the confirmation code.
    #[instrument(skip(self))]
    pub async fn redeem(&self, reward_id: &str) -> Result<String, RewardScanError> {
        let used = self.desk.use_reward(reward_id).await.map_err(|e| {
            warn!(error = %e, "Reward redemption failed");
            RewardScanError::from_client(reward_id, e)
        })?;

        info!(reward_id, "Reward redeemed");
        Ok(used.code)
    }
}
