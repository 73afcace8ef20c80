//! Locates the mission and quest that own a scanned task.
//!
//! The search runs in two phases:
//!
//! 1. [`SearchPhase::ActiveMission`]: the first mission whose status is
//!    ACTIVE, IN_PROGRESS or STARTED has its quests fetched in step order.
//! 2. [`SearchPhase::Fallback`]: when there is no active mission, or it does
//!    not own the task, every mission is scanned the same way, in received
//!    order. The active mission is included, so a quest whose fetch failed in
//!    phase one gets a second attempt.
//!
//! The first quest containing the task wins. Quests are fetched one at a
//! time and nothing is cached between resolutions.

use tracing::{debug, info, instrument, warn};

use crate::domain::{Mission, MissionList};
use crate::error::ClientResult;
use crate::services::{MissionFetcher, QuestFetcher};

/// Which phase of the search produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    ActiveMission,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found {
        mission_id: String,
        quest_id: String,
        phase: SearchPhase,
    },
    NotFound,
}

pub struct Resolver<'a> {
    missions: &'a dyn MissionFetcher,
    quests: &'a dyn QuestFetcher,
}

impl<'a> Resolver<'a> {
    pub fn new(missions: &'a dyn MissionFetcher, quests: &'a dyn QuestFetcher) -> Self {
        Self { missions, quests }
    }

    /// Fetches the user's missions and searches them for `task_id`.
    ///
    /// Only a failed missions fetch is an error; quest lookups that fail are
    /// logged and count as "not in this quest".
    #[instrument(skip(self))]
    pub async fn resolve(
        &self,
        user_id: &str,
        task_id: &str,
        request_id: Option<&str>,
    ) -> ClientResult<Resolution> {
        let raw = self.missions.fetch_missions_raw(user_id, request_id).await?;
        let missions = MissionList::from_payload(&raw);

        info!(
            count = missions.len(),
            skipped = missions.skipped,
            "Missions loaded for resolution"
        );

        Ok(self.search(&missions, task_id, request_id).await)
    }

    /// Two-phase search over an already normalised mission list.
    pub async fn search(&self, missions: &MissionList, task_id: &str, request_id: Option<&str>) -> Resolution {
        match missions.active() {
            Some((_, mission)) => {
                debug!(mission_id = %mission.id, status = %mission.status, "Searching active mission");
                if let Some(quest_id) = self.find_quest(mission, task_id, request_id).await {
                    return found(mission, quest_id, SearchPhase::ActiveMission);
                }
                info!(mission_id = %mission.id, "Task not in active mission, falling back to all missions");
            }
            None => {
                let statuses: Vec<&str> = missions.missions.iter().map(|m| m.status.as_str()).collect();
                info!(?statuses, "No active mission, searching all missions");
            }
        }

        for mission in &missions.missions {
            debug!(mission_id = %mission.id, status = %mission.status, "Searching mission");
            if let Some(quest_id) = self.find_quest(mission, task_id, request_id).await {
                return found(mission, quest_id, SearchPhase::Fallback);
            }
        }

        info!("Task not found in any mission");
        Resolution::NotFound
    }

    /// Id of the first quest of `mission`, in step order, whose tasks include `task_id`.
    async fn find_quest(&self, mission: &Mission, task_id: &str, request_id: Option<&str>) -> Option<String> {
        for quest_id in mission.quest_ids() {
            match self.quests.fetch_quest(quest_id, request_id).await {
                Ok(Some(response)) if response.quest.contains_task(task_id) => {
                    debug!(quest_id = %response.quest.id, "Task found in quest");
                    return Some(response.quest.id);
                }
                Ok(Some(response)) => {
                    debug!(
                        quest_id = %response.quest.id,
                        tasks = response.quest.tasks.len(),
                        "Task not in quest"
                    );
                }
                Ok(None) => {
                    warn!(quest_id, "Quest body is null, skipping");
                }
                Err(e) => {
                    warn!(quest_id, error = %e, "Failed to fetch quest, skipping");
                }
            }
        }

        None
    }
}

fn found(mission: &Mission, quest_id: String, phase: SearchPhase) -> Resolution {
    info!(mission_id = %mission.id, quest_id = %quest_id, ?phase, "Task resolved");
    Resolution::Found {
        mission_id: mission.id.clone(),
        quest_id,
        phase,
    }
}
