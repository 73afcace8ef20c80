//! User profile types

use serde::{Deserialize, Serialize};

/// Body of `GET users/{user_id}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    /// Kept as sent by the backend
    #[serde(default)]
    pub birthday: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub preferences: Option<Vec<String>>,
    /// Search radius for nearby museums, in km
    #[serde(default)]
    pub range_preferences: Option<f32>,
}

impl User {
    pub fn display_name(&self) -> String {
        match (self.firstname.is_empty(), self.lastname.is_empty()) {
            (true, true) => self.username.clone(),
            (false, true) => self.firstname.clone(),
            (true, false) => self.lastname.clone(),
            (false, false) => format!("{} {}", self.firstname, self.lastname),
        }
    }
}
