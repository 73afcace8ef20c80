//! Reward domain types
//!
//! Rewards are redeemed at a museum point of sale by scanning the QR code
//! the visitor shows.

use serde::{Deserialize, Serialize};

/// Reward entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Reward {
    pub amount: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub museum_id: String,
    /// e.g. percentage or fixed discount
    #[serde(default)]
    pub reduction_type: String,
    #[serde(default)]
    pub subject: String,
}

/// Body of `GET user/rewards/details/{reward_id}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RewardResponse {
    pub reward: Reward,
}

/// Body of `POST user/rewards/{reward_id}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UseRewardResponse {
    pub code: String,
}

/// A reward owned by a visitor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserReward {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub reward_id: String,
    #[serde(default)]
    pub used: bool,
    #[serde(default)]
    pub user_id: String,
}

impl UserReward {
    pub fn is_available(&self) -> bool {
        !self.used
    }
}

/// Body of `GET user/rewards/owned/{user_id}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OwnedRewardsResponse {
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub rewards: Vec<UserReward>,
}

impl OwnedRewardsResponse {
    /// Rewards not yet used, in received order.
    pub fn available(&self) -> impl Iterator<Item = &UserReward> {
        self.rewards.iter().filter(|r| r.is_available())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owned_rewards_filter_used_ones() {
        let owned: OwnedRewardsResponse = serde_json::from_str(
            r#"{"count":2,"rewards":[
                {"_id":"ur1","reward_id":"r1","used":true,"user_id":"u1"},
                {"_id":"ur2","reward_id":"r2","used":false,"user_id":"u1"}
            ]}"#,
        )
        .unwrap();

        let available: Vec<&str> = owned.available().map(|r| r.reward_id.as_str()).collect();
        assert_eq!(available, ["r2"]);
    }
}
