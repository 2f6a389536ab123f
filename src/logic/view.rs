//! Read-time bracket projections. Built from match rows on every request; never stored.

use crate::logic::standings::TiebreakKey;
use crate::models::{
    BestOf, Event, Match, MatchId, MatchStatus, SwissStanding, TableStanding, TeamId,
};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SlotView {
    pub team_id: Option<TeamId>,
    pub team_name: Option<String>,
    pub score: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MatchView {
    pub id: MatchId,
    pub round: u32,
    pub position: u32,
    pub group_number: Option<u32>,
    pub team1: SlotView,
    pub team2: SlotView,
    pub status: MatchStatus,
    pub format: BestOf,
    pub round_name: String,
    pub winner_id: Option<TeamId>,
    pub walkover: bool,
}

impl MatchView {
    pub fn project(event: &Event, m: &Match) -> Self {
        let slot = |team_id: Option<TeamId>, score: Option<u32>| SlotView {
            team_id,
            team_name: team_id.and_then(|id| event.team_name(id)).map(str::to_string),
            score,
        };
        Self {
            id: m.id,
            round: m.round,
            position: m.bracket_position,
            group_number: m.group_number,
            team1: slot(m.team1_id, m.team1_score),
            team2: slot(m.team2_id, m.team2_score),
            status: m.status,
            format: m.format,
            round_name: m.round_name.clone(),
            winner_id: m.winner_id(),
            walkover: m.walkover,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RoundView {
    pub round: u32,
    pub name: String,
    pub matches: Vec<MatchView>,
}

/// Group `matches` by round, ascending, each round ordered by position.
pub fn rounds_view<'a>(event: &Event, matches: impl IntoIterator<Item = &'a Match>) -> Vec<RoundView> {
    let mut by_round: BTreeMap<u32, Vec<&Match>> = BTreeMap::new();
    for m in matches {
        by_round.entry(m.round).or_default().push(m);
    }
    by_round
        .into_iter()
        .map(|(round, mut ms)| {
            ms.sort_by_key(|m| m.bracket_position);
            RoundView {
                round,
                name: ms.first().map(|m| m.round_name.clone()).unwrap_or_default(),
                matches: ms.into_iter().map(|m| MatchView::project(event, m)).collect(),
            }
        })
        .collect()
}

/// "Group A" for group 1, and so on.
pub fn group_name(group_number: u32) -> String {
    match group_number {
        1..=26 => format!("Group {}", char::from(b'A' + (group_number - 1) as u8)),
        n => format!("Group {n}"),
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GroupView {
    pub group_number: u32,
    pub group_name: String,
    pub matches: Vec<MatchView>,
    pub standings: Vec<TableStanding>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AdvancementRules {
    pub teams_advance_per_group: usize,
    pub advancement_criteria: Vec<TiebreakKey>,
    pub description: String,
}

/// Format-specific nested view of a bracket.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BracketView {
    SingleElimination {
        rounds: Vec<RoundView>,
    },
    DoubleElimination {
        upper_bracket: Vec<RoundView>,
        lower_bracket: Vec<RoundView>,
        grand_final: Option<MatchView>,
    },
    RoundRobin {
        rounds: Vec<RoundView>,
        standings: Vec<TableStanding>,
    },
    GroupStage {
        groups: Vec<GroupView>,
        overall_standings: Vec<TableStanding>,
        advancement_rules: AdvancementRules,
    },
    Swiss {
        rounds: Vec<RoundView>,
        standings: Vec<SwissStanding>,
        total_rounds: u32,
    },
}
