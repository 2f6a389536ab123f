//! Standings rows. Computed on demand from match rows, never stored.

use crate::models::team::TeamId;
use serde::{Deserialize, Serialize};

/// Points-table row for round robin and group stage.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TableStanding {
    pub team_id: TeamId,
    pub team_name: String,
    pub group_number: Option<u32>,
    pub matches_played: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub map_wins: u32,
    pub map_losses: u32,
    pub map_diff: i64,
    pub round_wins: u32,
    pub round_losses: u32,
    pub round_diff: i64,
    pub points: u32,
    pub win_percentage: f64,
}

/// Progression row for single and double elimination.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct EliminationStanding {
    pub team_id: TeamId,
    pub team_name: String,
    pub wins: u32,
    pub losses: u32,
    /// Deepest round in which the team completed a match (grand final counts past every round).
    pub last_round_reached: u32,
    pub eliminated: bool,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct SwissStanding {
    pub team_id: TeamId,
    pub team_name: String,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub byes: u32,
    /// 3 per win, 1 per draw.
    pub score: u32,
    /// Sum of the scores of every opponent faced.
    pub buchholz: u32,
    pub map_diff: i64,
}

/// Ordered standings in the shape the format produces.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "rows", rename_all = "snake_case")]
pub enum Standings {
    Elimination(Vec<EliminationStanding>),
    Table(Vec<TableStanding>),
    Swiss(Vec<SwissStanding>),
}

impl Standings {
    /// Team ids in ranking order.
    pub fn team_order(&self) -> Vec<TeamId> {
        match self {
            Standings::Elimination(rows) => rows.iter().map(|r| r.team_id).collect(),
            Standings::Table(rows) => rows.iter().map(|r| r.team_id).collect(),
            Standings::Swiss(rows) => rows.iter().map(|r| r.team_id).collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Standings::Elimination(rows) => rows.len(),
            Standings::Table(rows) => rows.len(),
            Standings::Swiss(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A team that finished in an advancing position of its group.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GroupQualifier {
    pub team_id: TeamId,
    pub team_name: String,
    pub group_number: u32,
    /// 1-based position within the group.
    pub group_position: usize,
    pub points: u32,
    pub map_diff: i64,
}
