//! Match row, slot addressing, bracket types and best-of formats.

use crate::models::event::EventId;
use crate::models::team::TeamId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// One of the two team slots of a match.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    #[default]
    One,
    Two,
}

impl Side {
    /// Slot fed by the match at `position` of the previous round: odd positions feed team 1.
    pub fn for_position(position: u32) -> Self {
        if position % 2 == 1 {
            Side::One
        } else {
            Side::Two
        }
    }

    pub fn other(self) -> Self {
        match self {
            Side::One => Side::Two,
            Side::Two => Side::One,
        }
    }
}

/// Structural sub-bracket a match belongs to.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketType {
    Main,
    Upper,
    Lower,
    GrandFinal,
    RoundRobin,
    GroupStage,
    Swiss,
}

impl fmt::Display for BracketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            BracketType::Main => "main",
            BracketType::Upper => "upper",
            BracketType::Lower => "lower",
            BracketType::GrandFinal => "grand_final",
            BracketType::RoundRobin => "round_robin",
            BracketType::GroupStage => "group_stage",
            BracketType::Swiss => "swiss",
        };
        f.write_str(tag)
    }
}

/// Lifecycle of a match row.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// At least one team slot is still empty.
    #[default]
    Pending,
    /// Both slots filled, not started.
    Scheduled,
    Live,
    Completed,
}

/// Best-of-N match format, written as `bo3`, `bo5`, ...
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct BestOf(pub u8);

impl BestOf {
    pub const BO1: BestOf = BestOf(1);
    pub const BO3: BestOf = BestOf(3);
    pub const BO5: BestOf = BestOf(5);
    pub const BO7: BestOf = BestOf(7);

    /// Map wins needed to take the match.
    pub fn maps_to_win(self) -> u32 {
        u32::from(self.0) / 2 + 1
    }
}

impl fmt::Display for BestOf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bo{}", self.0)
    }
}

impl From<BestOf> for String {
    fn from(value: BestOf) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for BestOf {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value
            .strip_prefix("bo")
            .and_then(|n| n.parse::<u8>().ok())
            .filter(|n| *n > 0)
            .map(BestOf)
            .ok_or_else(|| format!("invalid match format: {value}"))
    }
}

/// Round detail for one map of a match.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MapResult {
    #[serde(default)]
    pub map_name: Option<String>,
    pub team1_rounds: u32,
    pub team2_rounds: u32,
}

/// Final scores reported for a match.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub team1_score: u32,
    pub team2_score: u32,
    #[serde(default)]
    pub maps: Option<Vec<MapResult>>,
}

/// Address of a bracket slot: unique per event.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct SlotKey {
    pub event_id: EventId,
    pub bracket_type: BracketType,
    pub round: u32,
    pub position: u32,
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} round {} position {}",
            self.bracket_type, self.round, self.position
        )
    }
}

/// A single match row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub event_id: EventId,
    /// 1-based.
    pub round: u32,
    /// 1-based, unique within round + bracket type.
    pub bracket_position: u32,
    pub bracket_type: BracketType,
    /// Group stage only.
    pub group_number: Option<u32>,
    pub team1_id: Option<TeamId>,
    pub team2_id: Option<TeamId>,
    pub status: MatchStatus,
    pub format: BestOf,
    pub team1_score: Option<u32>,
    pub team2_score: Option<u32>,
    pub maps_data: Option<Vec<MapResult>>,
    pub round_name: String,
    /// Completed without being played (bye).
    #[serde(default)]
    pub walkover: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Match {
    /// Empty placeholder slot awaiting teams from earlier matches.
    pub fn new(
        event_id: EventId,
        bracket_type: BracketType,
        round: u32,
        bracket_position: u32,
        format: BestOf,
        round_name: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_id,
            round,
            bracket_position,
            bracket_type,
            group_number: None,
            team1_id: None,
            team2_id: None,
            status: MatchStatus::Pending,
            format,
            team1_score: None,
            team2_score: None,
            maps_data: None,
            round_name: round_name.into(),
            walkover: false,
            completed_at: None,
        }
    }

    /// Set both slots and derive the status from them.
    pub fn with_teams(mut self, team1: Option<TeamId>, team2: Option<TeamId>) -> Self {
        self.team1_id = team1;
        self.team2_id = team2;
        self.status = self.status_for_slots();
        self
    }

    pub fn in_group(mut self, group_number: u32) -> Self {
        self.group_number = Some(group_number);
        self
    }

    pub fn key(&self) -> SlotKey {
        SlotKey {
            event_id: self.event_id,
            bracket_type: self.bracket_type,
            round: self.round,
            position: self.bracket_position,
        }
    }

    pub fn team(&self, side: Side) -> Option<TeamId> {
        match side {
            Side::One => self.team1_id,
            Side::Two => self.team2_id,
        }
    }

    pub fn set_team(&mut self, side: Side, team_id: TeamId) {
        match side {
            Side::One => self.team1_id = Some(team_id),
            Side::Two => self.team2_id = Some(team_id),
        }
    }

    /// Pending while a slot is empty, scheduled once both are filled.
    pub fn status_for_slots(&self) -> MatchStatus {
        if self.team1_id.is_some() && self.team2_id.is_some() {
            MatchStatus::Scheduled
        } else {
            MatchStatus::Pending
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }

    pub fn has_team(&self, team_id: TeamId) -> bool {
        self.team1_id == Some(team_id) || self.team2_id == Some(team_id)
    }

    pub fn side_of(&self, team_id: TeamId) -> Option<Side> {
        if self.team1_id == Some(team_id) {
            Some(Side::One)
        } else if self.team2_id == Some(team_id) {
            Some(Side::Two)
        } else {
            None
        }
    }

    pub fn opponent_of(&self, team_id: TeamId) -> Option<TeamId> {
        self.side_of(team_id).and_then(|side| self.team(side.other()))
    }

    /// Scores from `team_id`'s perspective: (own, opponent).
    pub fn scores_for(&self, team_id: TeamId) -> Option<(u32, u32)> {
        let (s1, s2) = (self.team1_score?, self.team2_score?);
        match self.side_of(team_id)? {
            Side::One => Some((s1, s2)),
            Side::Two => Some((s2, s1)),
        }
    }

    /// Winner of a completed match; `None` for draws and unfinished matches.
    pub fn winner_id(&self) -> Option<TeamId> {
        if !self.is_completed() {
            return None;
        }
        if self.walkover {
            return self.team1_id.or(self.team2_id);
        }
        let (s1, s2) = (self.team1_score?, self.team2_score?);
        if s1 > s2 {
            self.team1_id
        } else if s2 > s1 {
            self.team2_id
        } else {
            None
        }
    }

    /// Loser of a completed, decided match.
    pub fn loser_id(&self) -> Option<TeamId> {
        let winner = self.winner_id()?;
        self.opponent_of(winner)
    }

    pub fn is_draw(&self) -> bool {
        self.is_completed() && !self.walkover && self.winner_id().is_none()
    }
}
