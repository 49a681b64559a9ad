use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use super::identity::Identity;

pub const DEFAULT_FULL_NAME: &str = "User";
pub const DEFAULT_AVATAR_URL: &str = "/placeholder.svg";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Role {
    Admin,
    #[default]
    Member,
    Editor,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Admin => "admin",
            Role::Member => "member",
            Role::Editor => "editor",
        };
        write!(f, "{name}")
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "member" => Ok(Role::Member),
            "editor" => Ok(Role::Editor),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Row of the application `users` table.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// Whether this row agrees with the provider identity it mirrors.
    pub fn matches(&self, identity: &Identity) -> bool {
        self.id == identity.id && self.email == identity.email_or_empty()
    }
}

/// Candidate row derived from a provider identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProfile {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub avatar_url: String,
    pub role: Role,
}

impl NewProfile {
    pub fn from_identity(identity: &Identity) -> Self {
        let email = identity.email_or_empty().to_string();

        let full_name = identity
            .metadata_str("full_name")
            .or_else(|| identity.metadata_str("name"))
            .or_else(|| email.split('@').next().filter(|local| !local.is_empty()))
            .unwrap_or(DEFAULT_FULL_NAME)
            .to_string();

        let avatar_url = identity
            .metadata_str("avatar_url")
            .or_else(|| identity.metadata_str("picture"))
            .unwrap_or(DEFAULT_AVATAR_URL)
            .to_string();

        Self { id: identity.id.clone(), email, full_name, avatar_url, role: Role::Member }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdatePayload {
    pub id: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}
