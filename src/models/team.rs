// teamcal-service/src/models/team.rs
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Team {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing)]
    pub created_at: NaiveDateTime,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct TeamData {
    pub name: String,
}

// Browser clients send `{"team": {"name": ..}}`
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum TeamBody {
    Rooted { team: TeamData },
    Bare(TeamData),
}

impl TeamBody {
    pub fn into_inner(self) -> TeamData {
        match self {
            TeamBody::Rooted { team } => team,
            TeamBody::Bare(team) => team,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct JoinTeamRequest {
    pub team_id: TeamIdInput,
}

// The join form posts the id straight from a text input
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum TeamIdInput {
    Number(i64),
    Text(String),
}

impl TeamIdInput {
    // None when the text is not a number; such an id matches no team
    pub fn as_id(&self) -> Option<i64> {
        match self {
            TeamIdInput::Number(id) => Some(*id),
            TeamIdInput::Text(raw) => raw.trim().parse().ok(),
        }
    }
}
