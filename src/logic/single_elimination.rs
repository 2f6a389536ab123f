//! Single elimination, plus the elimination tree it shares with the upper bracket of double elimination.
//!
//! Round 1 folds the seed list in steps of two: seed `i` meets seed `n-1-i` for every even `i`,
//! so the top seed draws the bottom seed. Later rounds are empty placeholders, each half the size of the
//! previous one (rounded up). The final is best-of-5, every other round best-of-3.
//!
//! With an odd team count the top seed skips round 1 and waits in the first later slot that
//! no earlier match feeds. For counts like 5, 9 or 17 every round before the final halves
//! evenly, so that slot is team 2 of the final itself. Any other slot without a feeder turns
//! into a walkover as soon as its opponent arrives.

use crate::config::GenerationOptions;
use crate::logic::format::{no_open_matches, FormatInfo, FormatStrategy};
use crate::logic::seeding::next_power_of_two;
use crate::logic::standings::elimination_standings;
use crate::logic::view::{rounds_view, BracketView};
use crate::models::{
    BestOf, BracketError, BracketType, Event, EventId, Format, Match, MatchStatus, Side, SlotKey,
    Standings, Team, TeamId,
};
use crate::store::{MatchStore, SlotTarget};

pub struct SingleElimination;

/// ceil(log2(n)).
pub fn round_count(team_count: usize) -> u32 {
    next_power_of_two(team_count).trailing_zeros()
}

/// Match count of every round: floor(n/2) first, then ceil(previous/2).
pub fn round_sizes(team_count: usize) -> Vec<u32> {
    let rounds = round_count(team_count) as usize;
    let mut sizes = Vec::with_capacity(rounds);
    let mut current = (team_count / 2) as u32;
    for _ in 0..rounds {
        sizes.push(current);
        current = current.div_ceil(2);
    }
    sizes
}

/// Display name by distance from the final.
pub fn round_name(round: u32, total_rounds: u32) -> String {
    match total_rounds - round {
        0 => "Grand Final".to_string(),
        1 => "Semi-Finals".to_string(),
        2 => "Quarter-Finals".to_string(),
        3 => "Round of 16".to_string(),
        4 => "Round of 32".to_string(),
        _ => format!("Round {round}"),
    }
}

fn round_format(round: u32, total_rounds: u32) -> BestOf {
    if round == total_rounds {
        BestOf::BO5
    } else {
        BestOf::BO3
    }
}

/// First slot in rounds 2.. that no earlier match feeds: team 2 of the last match of a round
/// whose predecessor has an odd match count.
fn first_feederless_slot(sizes: &[u32]) -> Option<(u32, u32)> {
    sizes
        .windows(2)
        .enumerate()
        .find(|(_, pair)| pair[1] * 2 > pair[0])
        .map(|(i, pair)| (i as u32 + 2, pair[1]))
}

/// Build a complete elimination tree of `bracket_type` matches for `teams` in seed order.
pub(crate) fn elimination_tree(
    event_id: EventId,
    bracket_type: BracketType,
    teams: &[Team],
    name_round: impl Fn(u32, u32) -> String,
) -> Result<Vec<Match>, BracketError> {
    let sizes = round_sizes(teams.len());
    let total_rounds = sizes.len() as u32;
    let (bye_team, contenders) = match teams.split_first() {
        Some((top, rest)) if teams.len() % 2 == 1 => (Some(top), rest),
        _ => (None, teams),
    };

    let m = contenders.len();
    let mut matches: Vec<Match> = (0..m)
        .step_by(2)
        .enumerate()
        .map(|(idx, i)| {
            Match::new(
                event_id,
                bracket_type,
                1,
                idx as u32 + 1,
                round_format(1, total_rounds),
                name_round(1, total_rounds),
            )
            .with_teams(Some(contenders[i].id), Some(contenders[m - 1 - i].id))
        })
        .collect();

    for (round, &size) in (2..=total_rounds).zip(sizes.iter().skip(1)) {
        for position in 1..=size {
            matches.push(Match::new(
                event_id,
                bracket_type,
                round,
                position,
                round_format(round, total_rounds),
                name_round(round, total_rounds),
            ));
        }
    }

    if let Some(top) = bye_team {
        let (round, position) = first_feederless_slot(&sizes).ok_or_else(|| {
            BracketError::InvalidTeamParity(format!("no bye slot for {} teams", teams.len()))
        })?;
        if let Some(slot) = matches
            .iter_mut()
            .find(|m| m.round == round && m.bracket_position == position)
        {
            slot.set_team(Side::Two, top.id);
        }
    }
    Ok(matches)
}

fn matches_in_round(bracket: &[Match], bracket_type: BracketType, round: u32) -> u32 {
    bracket
        .iter()
        .filter(|m| m.bracket_type == bracket_type && m.round == round)
        .count() as u32
}

/// Last round of the `bracket_type` tree.
pub(crate) fn final_round(bracket: &[Match], bracket_type: BracketType) -> u32 {
    bracket
        .iter()
        .filter(|m| m.bracket_type == bracket_type)
        .map(|m| m.round)
        .max()
        .unwrap_or(0)
}

/// Whether some match of the previous round writes into `side` of `target`.
fn has_feeder(bracket: &[Match], target: &Match, side: Side) -> bool {
    if target.round < 2 {
        return false;
    }
    let feeder_position = match side {
        Side::One => target.bracket_position * 2 - 1,
        Side::Two => target.bracket_position * 2,
    };
    feeder_position <= matches_in_round(bracket, target.bracket_type, target.round - 1)
}

/// Write `winner` into the next round of `finished`'s tree, completing walkovers on the way.
/// Returns `false` without writing when `finished` is the tree's final.
pub(crate) fn advance_through_tree(
    store: &dyn MatchStore,
    bracket: &[Match],
    finished: &Match,
    winner: TeamId,
) -> Result<bool, BracketError> {
    if finished.round >= final_round(bracket, finished.bracket_type) {
        return Ok(false);
    }
    let key = SlotKey {
        event_id: finished.event_id,
        bracket_type: finished.bracket_type,
        round: finished.round + 1,
        position: finished.bracket_position.div_ceil(2),
    };
    let side = Side::for_position(finished.bracket_position);
    let target = store.fill_slot(key, SlotTarget::Side(side), winner)?;

    let other = side.other();
    if target.status == MatchStatus::Pending
        && target.team(other).is_none()
        && !has_feeder(bracket, &target, other)
    {
        let walkover = store.mark_walkover(key)?;
        log::debug!("walkover for team {winner} in {key}");
        advance_through_tree(store, bracket, &walkover, winner)?;
    }
    Ok(true)
}

impl FormatStrategy for SingleElimination {
    fn format(&self) -> Format {
        Format::SingleElimination
    }

    fn info(&self) -> FormatInfo {
        FormatInfo {
            name: "Single Elimination",
            description: "Teams are eliminated after one loss. Fast-paced format commonly used in playoffs.",
            min_teams: 2,
            supports_seeding: true,
            has_standings: false,
            stage_names: &["Round of 32", "Round of 16", "Quarter-Finals", "Semi-Finals", "Grand Final"],
            match_format: BestOf::BO3,
        }
    }

    fn generate(
        &self,
        event_id: EventId,
        teams: &[Team],
        _options: &GenerationOptions,
    ) -> Result<Vec<Match>, BracketError> {
        self.validate_team_count(teams.len())?;
        elimination_tree(event_id, BracketType::Main, teams, round_name)
    }

    fn advance_winner(
        &self,
        store: &dyn MatchStore,
        finished: &Match,
        winner: TeamId,
    ) -> Result<(), BracketError> {
        let bracket = store.matches(finished.event_id)?;
        if !advance_through_tree(store, &bracket, finished, winner)? {
            log::debug!("team {winner} won the final of event {}", finished.event_id);
        }
        Ok(())
    }

    fn standings(&self, event: &Event, matches: &[Match]) -> Standings {
        elimination_standings(event, matches, 1)
    }

    fn bracket_view(&self, event: &Event, matches: &[Match]) -> BracketView {
        BracketView::SingleElimination {
            rounds: rounds_view(event, matches),
        }
    }

    fn is_complete(&self, _event: &Event, matches: &[Match]) -> bool {
        no_open_matches(matches)
    }
}
