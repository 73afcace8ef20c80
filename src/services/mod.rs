//! Service layer modules for external integrations.
//!
//! Contains the collaborator traits, the HTTP client for the MuSES backend,
//! and an in-memory backend used by tests.

pub mod backend;
pub mod mock;
pub mod muses_client;

pub use backend::{MissionFetcher, MusesBackend, QuestFetcher, RewardDesk, TaskCompleter};
pub use mock::{MockBackend, MockCall, MockFailure};
pub use muses_client::MusesClient;
