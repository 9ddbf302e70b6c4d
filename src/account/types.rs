//! Identity type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned identity id
pub type IdentityId = u64;

/// A staff principal able to log in.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Identity {
    pub id: IdentityId,
    pub username: String,
    pub password_hash: String, // Argon2id PHC string, salt embedded
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl Identity {
    /// Build an identity that has not been stored yet (`id` is assigned on insert).
    pub fn new(username: &str, password_hash: String, role: Role) -> Self {
        Self {
            id: 0,
            username: username.to_string(),
            password_hash,
            role,
            created_at: Utc::now(),
        }
    }

    pub fn view(&self) -> IdentityView {
        IdentityView {
            id: self.id,
            username: self.username.clone(),
            role: self.role,
        }
    }
}

/// Public projection of an identity. Never carries the hash.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct IdentityView {
    pub id: IdentityId,
    pub username: String,
    pub role: Role,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Administrator,
    Manager,
    Analyst,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Administrator => write!(f, "Administrator"),
            Role::Manager => write!(f, "Manager"),
            Role::Analyst => write!(f, "Analyst"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "administrator" | "admin" => Ok(Role::Administrator),
            "manager" => Ok(Role::Manager),
            "analyst" => Ok(Role::Analyst),
            _ => Err(format!(
                "Invalid role: {}. Allowed: Administrator, Manager, Analyst",
                s
            )),
        }
    }
}
