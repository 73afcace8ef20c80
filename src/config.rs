use anyhow::{bail, Context, Result};
use std::env;
use url::Url;

pub const DEFAULT_API_URL: &str = "https://muses.services.ding.unisannio.it/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Staging,
    Prod,
}

impl Environment {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "prod" | "production" => Self::Prod,
            "staging" => Self::Staging,
            _ => Self::Dev,
        }
    }

    pub fn is_dev(&self) -> bool {
        matches!(self, Self::Dev)
    }

    pub fn is_prod(&self) -> bool {
        matches!(self, Self::Prod)
    }
}

/// Username/password pair used for `auth/login`.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub env: Environment,

    // Backend
    pub api_url: Url,
    pub http_timeout_seconds: u64,

    // Auth
    pub credentials: Option<Credentials>,
    pub token: Option<String>,
    pub user_id: Option<String>,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let env = Environment::from_str(&env::var("MUSES_ENV").unwrap_or_else(|_| "dev".to_string()));

        // Backend
        let raw_url = env::var("MUSES_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let api_url = parse_api_url(&raw_url)?;
        let http_timeout_seconds = env::var("MUSES_HTTP_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        // Auth
        let role = env::var("MUSES_RBAC_ROLE").unwrap_or_else(|_| "USER".to_string());
        let credentials = match (non_empty_var("MUSES_USERNAME"), non_empty_var("MUSES_PASSWORD")) {
            (Some(username), Some(password)) => Some(Credentials {
                username,
                password,
                role,
            }),
            _ => None,
        };
        let token = non_empty_var("MUSES_TOKEN");
        let user_id = non_empty_var("MUSES_USER_ID");

        Ok(Settings {
            env,
            api_url,
            http_timeout_seconds,
            credentials,
            token,
            user_id,
        })
    }
}

/// Parses the backend base URL, rejecting anything that cannot carry path segments.
pub fn parse_api_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).with_context(|| format!("MUSES_API_URL is not a valid URL: {raw}"))?;

    if !matches!(url.scheme(), "http" | "https") {
        bail!("MUSES_API_URL must use http or https, got {}", url.scheme());
    }
    if url.cannot_be_a_base() {
        bail!("MUSES_API_URL cannot be used as a base URL: {raw}");
    }

    Ok(url)
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
