// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Discovery Aggregate
//!
//! A user-submitted candidate astronomical object moving through community
//! voting and astronomer review.
//!
//! ```text
//! Pending → CommunityReview → AstronomerReview → Approved
//!    │             │                  │
//!    └─────────────┴──────────────────┴──────→ Rejected
//! ```
//!
//! `Approved` and `Rejected` are absorbing. Authorization is not checked here;
//! the application layer consults [`crate::domain::moderation`] before calling
//! the aggregate commands.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::user::UserId;

pub const MAX_NAME_LEN: usize = 200;
pub const MAX_DESCRIPTION_LEN: usize = 10_000;

// ============================================================================
// Value Objects
// ============================================================================

/// Unique identifier for a discovery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiscoveryId(pub Uuid);

impl DiscoveryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for DiscoveryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DiscoveryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of object the reporter believes they found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    Star,
    Planet,
    Galaxy,
    Nebula,
    Comet,
    Asteroid,
    Exoplanet,
    Other,
}

impl ObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Star => "star",
            Self::Planet => "planet",
            Self::Galaxy => "galaxy",
            Self::Nebula => "nebula",
            Self::Comet => "comet",
            Self::Asteroid => "asteroid",
            Self::Exoplanet => "exoplanet",
            Self::Other => "other",
        }
    }
}

impl std::str::FromStr for ObjectType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "star" => Ok(Self::Star),
            "planet" => Ok(Self::Planet),
            "galaxy" => Ok(Self::Galaxy),
            "nebula" => Ok(Self::Nebula),
            "comet" => Ok(Self::Comet),
            "asteroid" => Ok(Self::Asteroid),
            "exoplanet" => Ok(Self::Exoplanet),
            "other" => Ok(Self::Other),
            other => Err(format!("Unknown object type: {}", other)),
        }
    }
}

/// Equatorial coordinates in degrees.
///
/// Right ascension is in `[0, 360)`, declination in `[-90, 90]`. Deserializing
/// goes through [`Coordinates::new`], so out-of-range input is rejected there too.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinates")]
pub struct Coordinates {
    right_ascension: f64,
    declination: f64,
}

#[derive(Deserialize)]
struct RawCoordinates {
    right_ascension: f64,
    declination: f64,
}

impl TryFrom<RawCoordinates> for Coordinates {
    type Error = DiscoveryError;

    fn try_from(raw: RawCoordinates) -> Result<Self, Self::Error> {
        Coordinates::new(raw.right_ascension, raw.declination)
    }
}

impl Coordinates {
    pub fn new(right_ascension: f64, declination: f64) -> Result<Self, DiscoveryError> {
        if !(0.0..360.0).contains(&right_ascension) {
            return Err(DiscoveryError::InvalidCoordinates(format!(
                "Right ascension must be in [0, 360), got {}",
                right_ascension
            )));
        }
        if !(-90.0..=90.0).contains(&declination) {
            return Err(DiscoveryError::InvalidCoordinates(format!(
                "Declination must be in [-90, 90], got {}",
                declination
            )));
        }
        Ok(Self {
            right_ascension,
            declination,
        })
    }

    pub fn right_ascension(&self) -> f64 {
        self.right_ascension
    }

    pub fn declination(&self) -> f64 {
        self.declination
    }
}

/// Discovery lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryState {
    /// Submitted, not yet open for votes
    Pending,
    /// Open for community votes
    CommunityReview,
    /// Awaiting an astronomer's verdict
    AstronomerReview,
    Approved,
    Rejected,
}

impl DiscoveryState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::CommunityReview => "community_review",
            Self::AstronomerReview => "astronomer_review",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl std::str::FromStr for DiscoveryState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "community_review" => Ok(Self::CommunityReview),
            "astronomer_review" => Ok(Self::AstronomerReview),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(format!("Unknown discovery state: {}", other)),
        }
    }
}

impl std::fmt::Display for DiscoveryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Commands
// ============================================================================

/// Input for [`Discovery::submit`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDiscovery {
    pub reporter_id: UserId,
    pub object_type: ObjectType,
    pub suggested_name: String,
    pub right_ascension: f64,
    pub declination: f64,
    pub description: String,
    #[serde(default)]
    pub attachments: Option<String>,
}

/// Field edits for [`Discovery::apply_changes`]. `None` leaves a field as is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscoveryChanges {
    #[serde(default)]
    pub object_type: Option<ObjectType>,
    #[serde(default)]
    pub suggested_name: Option<String>,
    #[serde(default)]
    pub right_ascension: Option<f64>,
    #[serde(default)]
    pub declination: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub attachments: Option<String>,
}

// ============================================================================
// Aggregate Root: Discovery
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discovery {
    pub id: DiscoveryId,
    pub reporter_id: UserId,
    pub object_type: ObjectType,
    pub suggested_name: String,
    pub coordinates: Coordinates,
    pub description: String,
    pub attachments: Option<String>,
    pub state: DiscoveryState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub verified_at: Option<DateTime<Utc>>,
    pub verified_by: Option<UserId>,
}

impl Discovery {
    /// Validate and create a discovery in `Pending`
    pub fn submit(new: NewDiscovery) -> Result<Self, DiscoveryError> {
        let coordinates = Coordinates::new(new.right_ascension, new.declination)?;
        let suggested_name = validate_name(&new.suggested_name)?;
        validate_description(&new.description)?;

        let now = Utc::now();
        Ok(Self {
            id: DiscoveryId::new(),
            reporter_id: new.reporter_id,
            object_type: new.object_type,
            suggested_name,
            coordinates,
            description: new.description,
            attachments: new.attachments,
            state: DiscoveryState::Pending,
            created_at: now,
            updated_at: now,
            verified_at: None,
            verified_by: None,
        })
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    // ========================================================================
    // Aggregate Commands (State Mutations)
    // ========================================================================

    /// Open the discovery for community votes
    pub fn open_community_review(&mut self) -> Result<(), DiscoveryError> {
        self.transition(DiscoveryState::Pending, DiscoveryState::CommunityReview)
    }

    /// Hand the discovery to astronomers once community engagement is met
    pub fn advance_to_astronomer_review(&mut self) -> Result<(), DiscoveryError> {
        self.transition(DiscoveryState::CommunityReview, DiscoveryState::AstronomerReview)
    }

    /// Record a positive verdict
    pub fn approve(&mut self, verifier: UserId) -> Result<(), DiscoveryError> {
        self.transition(DiscoveryState::AstronomerReview, DiscoveryState::Approved)?;
        self.verified_by = Some(verifier);
        self.verified_at = Some(self.updated_at);
        Ok(())
    }

    /// Reject from any non-terminal state, appending the reason to the description
    pub fn reject(&mut self, reason: &str) -> Result<(), DiscoveryError> {
        if self.is_terminal() {
            return Err(DiscoveryError::AlreadyReviewed(self.state));
        }
        let reason = reason.trim();
        if !reason.is_empty() {
            self.description = format!("{}\n\nRejection reason: {}", self.description, reason);
        }
        self.state = DiscoveryState::Rejected;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Apply field edits. Never changes `state`.
    pub fn apply_changes(&mut self, changes: DiscoveryChanges) -> Result<(), DiscoveryError> {
        let ra = changes
            .right_ascension
            .unwrap_or(self.coordinates.right_ascension());
        let dec = changes.declination.unwrap_or(self.coordinates.declination());
        let coordinates = Coordinates::new(ra, dec)?;
        let suggested_name = match changes.suggested_name {
            Some(name) => Some(validate_name(&name)?),
            None => None,
        };
        if let Some(description) = &changes.description {
            validate_description(description)?;
        }

        // all fields validated, commit
        self.coordinates = coordinates;
        if let Some(name) = suggested_name {
            self.suggested_name = name;
        }
        if let Some(object_type) = changes.object_type {
            self.object_type = object_type;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(attachments) = changes.attachments {
            self.attachments = Some(attachments);
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    fn transition(&mut self, from: DiscoveryState, to: DiscoveryState) -> Result<(), DiscoveryError> {
        if self.state != from {
            return Err(DiscoveryError::InvalidStateTransition {
                from: self.state,
                to,
            });
        }
        self.state = to;
        self.updated_at = Utc::now();
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<String, DiscoveryError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DiscoveryError::InvalidField(
            "Suggested name cannot be empty".to_string(),
        ));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(DiscoveryError::InvalidField(format!(
            "Suggested name too long (max {} characters)",
            MAX_NAME_LEN
        )));
    }
    Ok(name.to_string())
}

fn validate_description(description: &str) -> Result<(), DiscoveryError> {
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(DiscoveryError::InvalidField(format!(
            "Description too long (max {} characters)",
            MAX_DESCRIPTION_LEN
        )));
    }
    Ok(())
}

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Invalid field: {0}")]
    InvalidField(String),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition {
        from: DiscoveryState,
        to: DiscoveryState,
    },

    #[error("Discovery has already been reviewed ({0})")]
    AlreadyReviewed(DiscoveryState),
}

// ============================================================================
// Tests
// ============================================================================
