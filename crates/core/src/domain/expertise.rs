use serde::{Deserialize, Serialize};

use crate::fields::{ExpertiseFields, FIELD_SEPARATOR};

/// Slack workspace identifier (`T...`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TeamId(pub String);

/// Slack user identifier, unique within a workspace (`U...`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ExpertiseKey {
    pub team_id: TeamId,
    pub user_id: UserId,
}

impl ExpertiseKey {
    pub fn new(team_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self { team_id: TeamId(team_id.into()), user_id: UserId(user_id.into()) }
    }
}

/// One member's declared areas of expertise. At most one exists per
/// `(team_id, user_id)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpertiseRecord {
    pub team_id: TeamId,
    pub user_id: UserId,
    pub user_name: String,
    pub expertise: Vec<String>,
}

impl ExpertiseRecord {
    pub fn key(&self) -> ExpertiseKey {
        ExpertiseKey { team_id: self.team_id.clone(), user_id: self.user_id.clone() }
    }

    /// The name shown to other members, falling back to the raw user id.
    pub fn display_name(&self) -> &str {
        if self.user_name.trim().is_empty() {
            &self.user_id.0
        } else {
            &self.user_name
        }
    }

    /// Fields re-joined exactly as they were submitted.
    pub fn expertise_list(&self) -> String {
        self.expertise.join(&FIELD_SEPARATOR.to_string())
    }
}

/// Full replacement of a member's record, applied as a single upsert.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpertiseUpdate {
    pub key: ExpertiseKey,
    pub user_name: String,
    pub fields: ExpertiseFields,
}

impl ExpertiseUpdate {
    pub fn into_record(self) -> ExpertiseRecord {
        ExpertiseRecord {
            team_id: self.key.team_id,
            user_id: self.key.user_id,
            user_name: self.user_name,
            expertise: self.fields.into_vec(),
        }
    }
}
