//! Auth domain types

use serde::{Deserialize, Serialize};

/// Body of a successful `GET auth/login`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Body of `POST auth/register`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

/// Outcome of a login, as stored in the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginResult {
    pub token: String,
    /// From the `EntityID` response header; absent for accounts without an entity
    pub entity_id: Option<String>,
}
