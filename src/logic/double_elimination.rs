//! Double elimination: upper tree, lower bracket fed by upper losers, best-of-7 grand final.
//!
//! Team counts must be a power of two (at least 4). Lower round 1 takes the losers of upper
//! round 1 two at a time. Every even lower round takes the losers of one upper round at the
//! same position, while odd lower rounds after the first only merge lower-bracket winners.

use crate::config::GenerationOptions;
use crate::logic::format::{no_open_matches, FormatInfo, FormatStrategy};
use crate::logic::single_elimination::{
    advance_through_tree, elimination_tree, final_round, round_count,
};
use crate::logic::standings::elimination_standings;
use crate::logic::view::{rounds_view, BracketView, MatchView};
use crate::models::{
    BestOf, BracketError, BracketType, Event, EventId, Format, Match, Side, SlotKey, Standings,
    Team, TeamId,
};
use crate::store::{MatchStore, SlotTarget};

pub struct DoubleElimination;

/// Lower bracket rounds for an upper bracket of `upper_rounds`.
pub fn lower_round_count(upper_rounds: u32) -> u32 {
    upper_rounds.saturating_sub(1) * 2
}

/// Match counts of the lower rounds: n/4 first, unchanged into even rounds, halved into odd ones.
pub fn lower_round_sizes(team_count: usize) -> Vec<u32> {
    let rounds = lower_round_count(round_count(team_count));
    let mut sizes = Vec::with_capacity(rounds as usize);
    let mut current = (team_count / 4) as u32;
    for round in 1..=rounds {
        if round > 1 && round % 2 == 1 {
            current = (current / 2).max(1);
        }
        sizes.push(current);
    }
    sizes
}

fn upper_round_name(round: u32, total_rounds: u32) -> String {
    match total_rounds - round {
        0 => "Upper Final".to_string(),
        1 => "Upper Semi-Finals".to_string(),
        _ => format!("Upper Round {round}"),
    }
}

fn lower_round_name(round: u32, total_rounds: u32) -> String {
    match total_rounds - round {
        0 => "Lower Final".to_string(),
        1 => "Lower Semi-Final".to_string(),
        _ => format!("Lower Round {round}"),
    }
}

/// Lower slot that receives the loser of upper match (round, position).
fn lower_drop_slot(upper_round: u32, upper_position: u32) -> (u32, u32) {
    if upper_round == 1 {
        (1, upper_position.div_ceil(2))
    } else {
        ((upper_round - 1) * 2, upper_position)
    }
}

impl DoubleElimination {
    fn grand_final_key(event_id: EventId) -> SlotKey {
        SlotKey {
            event_id,
            bracket_type: BracketType::GrandFinal,
            round: 1,
            position: 1,
        }
    }

    fn send_to_grand_final(
        store: &dyn MatchStore,
        event_id: EventId,
        side: Side,
        team: TeamId,
    ) -> Result<(), BracketError> {
        let key = Self::grand_final_key(event_id);
        store.fill_slot(key, SlotTarget::Side(side), team)?;
        log::debug!("team {team} reached the grand final of event {event_id}");
        Ok(())
    }
}

impl FormatStrategy for DoubleElimination {
    fn format(&self) -> Format {
        Format::DoubleElimination
    }

    fn info(&self) -> FormatInfo {
        FormatInfo {
            name: "Double Elimination",
            description: "Teams must lose twice to be eliminated. Upper and lower bracket system like Marvel Rivals Championship.",
            min_teams: 4,
            supports_seeding: true,
            has_standings: false,
            stage_names: &["Upper Bracket", "Lower Bracket", "Grand Final"],
            match_format: BestOf::BO5,
        }
    }

    fn validate_team_count(&self, team_count: usize) -> Result<(), BracketError> {
        if team_count < 4 {
            return Err(BracketError::InsufficientTeams {
                required: 4,
                actual: team_count,
            });
        }
        if !team_count.is_power_of_two() {
            return Err(BracketError::InvalidTeamParity(format!(
                "Double elimination requires a power-of-two team count (got {team_count})"
            )));
        }
        Ok(())
    }

    fn generate(
        &self,
        event_id: EventId,
        teams: &[Team],
        _options: &GenerationOptions,
    ) -> Result<Vec<Match>, BracketError> {
        self.validate_team_count(teams.len())?;
        let mut matches = elimination_tree(event_id, BracketType::Upper, teams, upper_round_name)?;

        let lower_sizes = lower_round_sizes(teams.len());
        let lower_rounds = lower_sizes.len() as u32;
        for (round, &size) in (1..=lower_rounds).zip(lower_sizes.iter()) {
            let format = if round == lower_rounds {
                BestOf::BO5
            } else {
                BestOf::BO3
            };
            for position in 1..=size {
                matches.push(Match::new(
                    event_id,
                    BracketType::Lower,
                    round,
                    position,
                    format,
                    lower_round_name(round, lower_rounds),
                ));
            }
        }

        matches.push(Match::new(
            event_id,
            BracketType::GrandFinal,
            1,
            1,
            BestOf::BO7,
            "Grand Final",
        ));
        Ok(matches)
    }

    fn advance_winner(
        &self,
        store: &dyn MatchStore,
        finished: &Match,
        winner: TeamId,
    ) -> Result<(), BracketError> {
        let bracket = store.matches(finished.event_id)?;
        match finished.bracket_type {
            BracketType::Upper => {
                if !advance_through_tree(store, &bracket, finished, winner)? {
                    Self::send_to_grand_final(store, finished.event_id, Side::One, winner)?;
                }
                Ok(())
            }
            BracketType::Lower => {
                let round = finished.round;
                if round >= final_round(&bracket, BracketType::Lower) {
                    return Self::send_to_grand_final(store, finished.event_id, Side::Two, winner);
                }
                let position = if round % 2 == 0 {
                    finished.bracket_position.div_ceil(2)
                } else {
                    finished.bracket_position
                };
                let key = SlotKey {
                    event_id: finished.event_id,
                    bracket_type: BracketType::Lower,
                    round: round + 1,
                    position,
                };
                store.fill_slot(key, SlotTarget::FirstEmpty, winner)?;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn move_loser(
        &self,
        store: &dyn MatchStore,
        finished: &Match,
        loser: TeamId,
    ) -> Result<(), BracketError> {
        if finished.bracket_type != BracketType::Upper {
            return Ok(());
        }
        let (round, position) = lower_drop_slot(finished.round, finished.bracket_position);
        let key = SlotKey {
            event_id: finished.event_id,
            bracket_type: BracketType::Lower,
            round,
            position,
        };
        store.fill_slot(key, SlotTarget::FirstEmpty, loser)?;
        log::debug!("team {loser} dropped to {key}");
        Ok(())
    }

    fn standings(&self, event: &Event, matches: &[Match]) -> Standings {
        elimination_standings(event, matches, 2)
    }

    fn bracket_view(&self, event: &Event, matches: &[Match]) -> BracketView {
        let of_type = |bracket_type: BracketType| {
            matches.iter().filter(move |m| m.bracket_type == bracket_type)
        };
        BracketView::DoubleElimination {
            upper_bracket: rounds_view(event, of_type(BracketType::Upper)),
            lower_bracket: rounds_view(event, of_type(BracketType::Lower)),
            grand_final: of_type(BracketType::GrandFinal)
                .next()
                .map(|m| MatchView::project(event, m)),
        }
    }

    fn is_complete(&self, _event: &Event, matches: &[Match]) -> bool {
        no_open_matches(matches)
    }
}
