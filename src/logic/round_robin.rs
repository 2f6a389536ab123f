//! Round robin: every pair of teams meets once, best-of-3, points 3/1/0.

use crate::config::GenerationOptions;
use crate::logic::format::{all_completed, FormatInfo, FormatStrategy};
use crate::logic::seeding::generate_round_robin_schedule;
use crate::logic::standings::{table_standings, TABLE_TIEBREAKS};
use crate::logic::view::{rounds_view, BracketView};
use crate::models::{
    BestOf, BracketError, BracketType, Event, EventId, Format, Match, Standings, TableStanding,
    Team,
};
use serde::{Deserialize, Serialize};

/// How pairings are spread over rounds.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundRobinScheduling {
    /// Pairs in input order, at most ceil(n/2) per round. Can need more than n-1 rounds.
    #[default]
    Packed,
    /// Circle method: n-1 rounds for even n, n for odd n, nobody plays twice in a round.
    Circle,
}

pub struct RoundRobin;

fn round_name(round: u32) -> String {
    format!("Round {round}")
}

fn packed(event_id: EventId, teams: &[Team]) -> Vec<Match> {
    let capacity = teams.len().div_ceil(2) as u32;
    let mut matches = Vec::with_capacity(teams.len() * (teams.len() - 1) / 2);
    let (mut round, mut position) = (1, 1);
    for (i, a) in teams.iter().enumerate() {
        for b in &teams[i + 1..] {
            matches.push(
                Match::new(
                    event_id,
                    BracketType::RoundRobin,
                    round,
                    position,
                    BestOf::BO3,
                    round_name(round),
                )
                .with_teams(Some(a.id), Some(b.id)),
            );
            position += 1;
            if position > capacity {
                round += 1;
                position = 1;
            }
        }
    }
    matches
}

fn circle(event_id: EventId, teams: &[Team]) -> Vec<Match> {
    generate_round_robin_schedule(teams)
        .into_iter()
        .zip(1..)
        .flat_map(|(pairs, round)| {
            pairs.into_iter().zip(1..).map(move |((a, b), position)| {
                Match::new(
                    event_id,
                    BracketType::RoundRobin,
                    round,
                    position,
                    BestOf::BO3,
                    round_name(round),
                )
                .with_teams(Some(a.id), Some(b.id))
            })
        })
        .collect()
}

impl RoundRobin {
    fn table(event: &Event, matches: &[Match]) -> Vec<TableStanding> {
        let entrants: Vec<&Team> = event.teams.iter().collect();
        let played: Vec<&Match> = matches
            .iter()
            .filter(|m| m.bracket_type == BracketType::RoundRobin)
            .collect();
        table_standings(&entrants, &played, None, &TABLE_TIEBREAKS)
    }
}

impl FormatStrategy for RoundRobin {
    fn format(&self) -> Format {
        Format::RoundRobin
    }

    fn info(&self) -> FormatInfo {
        FormatInfo {
            name: "Round Robin",
            description: "Every team plays every other team once. Comprehensive format for smaller groups.",
            min_teams: 3,
            supports_seeding: false,
            has_standings: true,
            stage_names: &["Round Robin"],
            match_format: BestOf::BO3,
        }
    }

    fn generate(
        &self,
        event_id: EventId,
        teams: &[Team],
        options: &GenerationOptions,
    ) -> Result<Vec<Match>, BracketError> {
        self.validate_team_count(teams.len())?;
        Ok(match options.round_robin_scheduling {
            RoundRobinScheduling::Packed => packed(event_id, teams),
            RoundRobinScheduling::Circle => circle(event_id, teams),
        })
    }

    fn standings(&self, event: &Event, matches: &[Match]) -> Standings {
        Standings::Table(Self::table(event, matches))
    }

    fn bracket_view(&self, event: &Event, matches: &[Match]) -> BracketView {
        BracketView::RoundRobin {
            rounds: rounds_view(event, matches),
            standings: Self::table(event, matches),
        }
    }

    fn is_complete(&self, _event: &Event, matches: &[Match]) -> bool {
        all_completed(matches)
    }

    fn allows_draws(&self) -> bool {
        true
    }
}
