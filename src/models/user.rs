// teamcal-service/src/models/user.rs
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// Stored user account
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub team_id: Option<i64>,
    pub created_at: NaiveDateTime,
}

impl User {
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

// The `{id, name}` shape used for creators, participants and team members
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    pub id: i64,
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct UserCredentials {
    pub email: String,
    pub password: String,
}

// Registration and sign-in forms nest their fields under a `user` key
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum RegisterBody {
    Rooted { user: RegisterRequest },
    Bare(RegisterRequest),
}

impl RegisterBody {
    pub fn into_inner(self) -> RegisterRequest {
        match self {
            RegisterBody::Rooted { user } => user,
            RegisterBody::Bare(user) => user,
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum CredentialsBody {
    Rooted { user: UserCredentials },
    Bare(UserCredentials),
}

impl CredentialsBody {
    pub fn into_inner(self) -> UserCredentials {
        match self {
            CredentialsBody::Rooted { user } => user,
            CredentialsBody::Bare(user) => user,
        }
    }
}

// Public part of an account returned after register/login
#[derive(Serialize, Deserialize, Debug)]
pub struct AccountInfo {
    pub id: i64,
    pub email: String,
    pub name: String,
}

impl From<&User> for AccountInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
        }
    }
}

// Response for GET /api/me
#[derive(Serialize, Deserialize, Debug)]
pub struct CurrentIdentity {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub team_id: Option<i64>,
    pub team_name: Option<String>,
}
