//! Quest and task domain types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A completable unit inside a quest. Identified by its key in [`Quest::tasks`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Task {
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub title: String,
}

/// Quest entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Quest {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub subject_id: String,
    /// Task id -> task; ids are only unique within this quest
    #[serde(default)]
    pub tasks: HashMap<String, Task>,
}

impl Quest {
    pub fn contains_task(&self, task_id: &str) -> bool {
        self.tasks.contains_key(task_id)
    }
}

/// Body of `GET quests/{quest_id}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestResponse {
    pub quest: Quest,
    #[serde(default)]
    pub tasks_completed: u32,
    #[serde(default, rename = "tot_tasks")]
    pub total_tasks: u32,
}
