use parking_lot::RwLock;
use std::sync::Arc;

/// Authenticated state captured at login.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SessionState {
    /// Bearer token issued by `auth/login`
    token: String,

    /// Entity (user) id from the `EntityID` login header
    entity_id: Option<String>,
}

/// Shared handle to the caller's session.
///
/// Cloning is cheap and every clone observes the same state, so the handle
/// given to [`crate::services::MusesClient`] sees a login or logout performed
/// through any other clone. The state is set by [`Session::establish`] and
/// removed by [`Session::clear`].
#[derive(Debug, Clone, Default)]
pub struct Session {
    state: Arc<RwLock<Option<SessionState>>>,
}

impl Session {
    /// An empty session; requests go out without an `Authorization` header.
    pub fn new() -> Self {
        Self::default()
    }

    /// A session that already holds a pre-issued token.
    pub fn with_token(token: impl Into<String>, entity_id: Option<String>) -> Self {
        let session = Self::new();
        session.establish(token, entity_id);
        session
    }

    pub fn establish(&self, token: impl Into<String>, entity_id: Option<String>) {
        let token = token.into();
        *self.state.write() = Some(SessionState { token, entity_id });
        tracing::debug!("Session established");
    }

    pub fn clear(&self) {
        if self.state.write().take().is_some() {
            tracing::debug!("Session cleared");
        }
    }

    /// Current bearer token, if any. Empty tokens are treated as absent.
    pub fn token(&self) -> Option<String> {
        self.state
            .read()
            .as_ref()
            .map(|s| s.token.clone())
            .filter(|t| !t.is_empty())
    }

    pub fn entity_id(&self) -> Option<String> {
        self.state.read().as_ref().and_then(|s| s.entity_id.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }
}
