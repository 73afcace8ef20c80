//! Mission domain types
//!
//! A mission is a user's ordered sequence of quests. The mission tracker is
//! known to answer `GET missions/user/{id}` either with the mission array or
//! with `[missions, status_code]`; [`MissionList::from_payload`] normalises
//! both shapes before any business logic sees them.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Statuses that mark a mission as the one currently being played.
pub const ACTIVE_STATUSES: [&str; 3] = ["ACTIVE", "IN_PROGRESS", "STARTED"];

/// Mission step; `step_id` references a quest id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MissionStep {
    #[serde(default)]
    pub completed: bool,
    pub step_id: String,
}

/// Mission entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Mission {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub steps: Vec<MissionStep>,
    #[serde(default)]
    pub user_id: String,
}

impl Mission {
    /// ACTIVE, IN_PROGRESS or STARTED, compared case-insensitively.
    /// The status must match exactly otherwise; padding is not stripped.
    pub fn is_active(&self) -> bool {
        ACTIVE_STATUSES
            .iter()
            .any(|candidate| self.status.eq_ignore_ascii_case(candidate))
    }

    /// Quest ids referenced by this mission, in step order.
    pub fn quest_ids(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|step| step.step_id.as_str())
    }
}

/// Top-level shapes the missions endpoint is known to produce.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MissionsPayload {
    /// `[missions, status_code]`
    Wrapped(Value, Number),
    /// `[mission, ...]`
    Plain(Vec<Value>),
    /// `null`
    Null,
    /// Objects, strings, numbers
    Other(Value),
}

/// Normalised, ordered list of missions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MissionList {
    pub missions: Vec<Mission>,
    /// Elements that failed to deserialize and were dropped
    pub skipped: usize,
}

impl MissionList {
    /// Normalises a raw missions body.
    ///
    /// Empty bodies, `null`, `[]`, invalid JSON and non-array documents all
    /// produce an empty list. Individual missions that fail to parse are
    /// skipped and counted in [`MissionList::skipped`].
    pub fn from_payload(raw: &str) -> Self {
        let body = raw.trim();
        if body.is_empty() {
            tracing::debug!("Empty missions body");
            return Self::default();
        }

        let payload: MissionsPayload = match serde_json::from_str(body) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(error = %e, "Missions body is not valid JSON, treating as empty");
                return Self::default();
            }
        };

        let elements = match payload {
            MissionsPayload::Wrapped(Value::Array(missions), status_code) => {
                tracing::debug!(
                    %status_code,
                    count = missions.len(),
                    "Unwrapped [missions, status_code] payload"
                );
                missions
            }
            MissionsPayload::Wrapped(first, second) => {
                // Not really a wrapper: a two element plain array.
                vec![first, Value::Number(second)]
            }
            MissionsPayload::Plain(missions) => missions,
            MissionsPayload::Null => Vec::new(),
            MissionsPayload::Other(value) => {
                tracing::warn!(kind = json_kind(&value), "Missions body is not an array, treating as empty");
                Vec::new()
            }
        };

        Self::from_elements(elements)
    }

    fn from_elements(elements: Vec<Value>) -> Self {
        let mut list = Self::default();

        for (index, element) in elements.into_iter().enumerate() {
            match serde_json::from_value::<Mission>(element) {
                Ok(mission) => {
                    tracing::debug!(mission_id = %mission.id, status = %mission.status, "Parsed mission");
                    list.missions.push(mission);
                }
                Err(e) => {
                    tracing::warn!(index, error = %e, "Skipping mission that failed to parse");
                    list.skipped += 1;
                }
            }
        }

        list
    }

    /// First mission, in received order, whose status counts as active.
    pub fn active(&self) -> Option<(usize, &Mission)> {
        self.missions.iter().enumerate().find(|(_, m)| m.is_active())
    }

    pub fn is_empty(&self) -> bool {
        self.missions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.missions.len()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
