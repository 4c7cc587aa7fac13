// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::repository::RepositoryError;

/// Unique identifier for a catalogue user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The single role a user holds.
///
/// Astronomer and Admin carry the moderator capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Visitor,
    Researcher,
    Astronomer,
    Admin,
}

impl Role {
    pub fn is_moderator(&self) -> bool {
        matches!(self, Self::Astronomer | Self::Admin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Visitor => "visitor",
            Self::Researcher => "researcher",
            Self::Astronomer => "astronomer",
            Self::Admin => "admin",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "visitor" | "user" => Ok(Self::Visitor),
            "researcher" => Ok(Self::Researcher),
            "astronomer" => Ok(Self::Astronomer),
            "admin" => Ok(Self::Admin),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolves the role of an acting user.
///
/// Authentication lives outside this crate; implementations only answer
/// "which role does this user hold right now".
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn role_of(&self, user_id: UserId) -> Result<Role, RepositoryError>;
}
