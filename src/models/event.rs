//! Event (tournament instance), its lifecycle and format tag.

use crate::models::error::BracketError;
use crate::models::team::{Team, TeamId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for an event.
pub type EventId = Uuid;

/// Bracket format of an event.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    SingleElimination,
    DoubleElimination,
    Swiss,
    RoundRobin,
    GroupStage,
}

impl Format {
    pub const ALL: [Format; 5] = [
        Format::SingleElimination,
        Format::DoubleElimination,
        Format::Swiss,
        Format::RoundRobin,
        Format::GroupStage,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            Format::SingleElimination => "single_elimination",
            Format::DoubleElimination => "double_elimination",
            Format::Swiss => "swiss",
            Format::RoundRobin => "round_robin",
            Format::GroupStage => "group_stage",
        }
    }

    /// Standings are ranked by progression rather than points.
    pub fn is_elimination(self) -> bool {
        matches!(self, Format::SingleElimination | Format::DoubleElimination)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Format {
    type Err = BracketError;

    /// Accepts the canonical tags plus `swiss_system`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single_elimination" => Ok(Format::SingleElimination),
            "double_elimination" => Ok(Format::DoubleElimination),
            "swiss" | "swiss_system" => Ok(Format::Swiss),
            "round_robin" => Ok(Format::RoundRobin),
            "group_stage" => Ok(Format::GroupStage),
            other => Err(BracketError::InvalidFormat(other.to_string())),
        }
    }
}

/// Lifecycle of an event.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    /// Registered teams, no bracket yet.
    #[default]
    Upcoming,
    /// Bracket generated; matches being played.
    Ongoing,
    Completed,
}

/// A tournament instance. Owns exactly one active match set at a time (held by the store).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    /// Selected format; set when a bracket is generated.
    pub format: Option<Format>,
    pub status: EventStatus,
    /// Participating teams.
    pub teams: Vec<Team>,
    pub bracket_generated_at: Option<DateTime<Utc>>,
}

impl Event {
    /// Create a new event in Upcoming state with the given participants.
    pub fn new(name: impl Into<String>, teams: Vec<Team>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            format: None,
            status: EventStatus::Upcoming,
            teams,
            bracket_generated_at: None,
        }
    }

    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    pub fn team_name(&self, id: TeamId) -> Option<&str> {
        self.team(id).map(|t| t.name.as_str())
    }

    /// Format of the generated bracket, or `BracketNotFound` before generation.
    pub fn bracket_format(&self) -> Result<Format, BracketError> {
        self.format.ok_or(BracketError::BracketNotFound(self.id))
    }
}
