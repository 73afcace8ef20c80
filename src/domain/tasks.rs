//! Task completion DTOs

use serde::{Deserialize, Serialize};

/// Body of `POST recognition/{user_id}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskCompletionRequest {
    pub task_id: String,
    pub mission_id: String,
    pub quest_id: String,
}

impl TaskCompletionRequest {
    pub fn new(
        task_id: impl Into<String>,
        mission_id: impl Into<String>,
        quest_id: impl Into<String>,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            mission_id: mission_id.into(),
            quest_id: quest_id.into(),
        }
    }
}
