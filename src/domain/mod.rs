//! Domain types and DTOs
//!
//! Wire shapes of the MuSES backend. Entities are transient: they are built
//! fresh from each response and never cached.

pub mod auth;
pub mod missions;
pub mod museums;
pub mod quests;
pub mod rewards;
pub mod tasks;
pub mod users;

// Re-export commonly used types
pub use auth::*;
pub use missions::*;
pub use museums::*;
pub use quests::*;
pub use rewards::*;
pub use tasks::*;
pub use users::*;
