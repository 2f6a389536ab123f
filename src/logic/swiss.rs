//! Swiss system: one round at a time, paired from the current standings.
//!
//! Planned length is `max(3, ceil(log2 n))` rounds. Byes (odd team counts) are walkovers that
//! count as a win and go to the lowest-ranked team that has not had one yet.

use crate::config::GenerationOptions;
use crate::logic::format::{FormatInfo, FormatStrategy};
use crate::logic::seeding::generate_swiss_initial_pairing;
use crate::logic::single_elimination::round_count;
use crate::logic::standings::{DRAW_POINTS, WIN_POINTS};
use crate::logic::view::{rounds_view, BracketView};
use crate::models::{
    BestOf, BracketError, BracketType, Event, EventId, Format, Match, MatchStatus, Standings,
    SwissStanding, Team, TeamId,
};
use chrono::Utc;
use std::collections::{HashMap, HashSet};

pub struct Swiss;

pub fn planned_rounds(team_count: usize) -> u32 {
    round_count(team_count).max(3)
}

fn round_name(round: u32) -> String {
    format!("Swiss Round {round}")
}

fn pairing_match(event_id: EventId, round: u32, position: u32, a: TeamId, b: TeamId) -> Match {
    Match::new(
        event_id,
        BracketType::Swiss,
        round,
        position,
        BestOf::BO3,
        round_name(round),
    )
    .with_teams(Some(a), Some(b))
}

fn bye_match(event_id: EventId, round: u32, position: u32, team: TeamId) -> Match {
    let mut m = Match::new(
        event_id,
        BracketType::Swiss,
        round,
        position,
        BestOf::BO3,
        round_name(round),
    )
    .with_teams(Some(team), None);
    m.status = MatchStatus::Completed;
    m.team1_score = Some(1);
    m.team2_score = Some(0);
    m.walkover = true;
    m.completed_at = Some(Utc::now());
    m
}

fn swiss_matches(matches: &[Match]) -> impl Iterator<Item = &Match> {
    matches.iter().filter(|m| m.bracket_type == BracketType::Swiss)
}

/// Rounds in which every match is completed.
pub fn completed_rounds(matches: &[Match]) -> u32 {
    let mut finished: HashMap<u32, bool> = HashMap::new();
    for m in swiss_matches(matches) {
        let done = finished.entry(m.round).or_insert(true);
        *done &= m.is_completed();
    }
    finished.values().filter(|done| **done).count() as u32
}

/// Standings by score, Buchholz, wins, then fewest losses. Remaining ties keep seed order.
pub fn swiss_standings(event: &Event, matches: &[Match]) -> Vec<SwissStanding> {
    let mut rows: Vec<SwissStanding> = event
        .teams
        .iter()
        .map(|t| SwissStanding {
            team_id: t.id,
            team_name: t.name.clone(),
            ..Default::default()
        })
        .collect();
    let index: HashMap<TeamId, usize> = rows.iter().enumerate().map(|(i, r)| (r.team_id, i)).collect();
    let mut opponents: HashMap<TeamId, Vec<TeamId>> = HashMap::new();

    for m in swiss_matches(matches).filter(|m| m.is_completed()) {
        if m.walkover {
            if let Some(&i) = m.winner_id().and_then(|w| index.get(&w)) {
                rows[i].wins += 1;
                rows[i].byes += 1;
            }
            continue;
        }
        let (Some(t1), Some(t2)) = (m.team1_id, m.team2_id) else { continue };
        let (s1, s2) = (m.team1_score.unwrap_or(0), m.team2_score.unwrap_or(0));
        for (team, own, opp, opponent) in [(t1, s1, s2, t2), (t2, s2, s1, t1)] {
            let Some(&i) = index.get(&team) else { continue };
            let row = &mut rows[i];
            row.map_diff += i64::from(own) - i64::from(opp);
            if own > opp {
                row.wins += 1;
            } else if own < opp {
                row.losses += 1;
            } else {
                row.draws += 1;
            }
            opponents.entry(team).or_default().push(opponent);
        }
    }

    for row in &mut rows {
        row.score = row.wins * WIN_POINTS + row.draws * DRAW_POINTS;
    }
    let scores: HashMap<TeamId, u32> = rows.iter().map(|r| (r.team_id, r.score)).collect();
    for row in &mut rows {
        row.buchholz = opponents
            .get(&row.team_id)
            .into_iter()
            .flatten()
            .filter_map(|o| scores.get(o))
            .sum();
    }

    rows.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then(b.buchholz.cmp(&a.buchholz))
            .then(b.wins.cmp(&a.wins))
            .then(a.losses.cmp(&b.losses))
    });
    rows
}

fn pair_key(a: TeamId, b: TeamId) -> (TeamId, TeamId) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Upper bound on branches tried by the rematch-free search before the greedy pass takes over.
const PAIRING_SEARCH_STEPS: usize = 100_000;

/// Pair the round down the standings. Each team prefers the closest-scored opponent it has not
/// met, backtracking when a choice leaves the rest of the pool without a rematch-free pairing.
/// Rematches are only accepted when no rematch-free pairing exists.
fn pair_round(
    standings: &[SwissStanding],
    matches: &[Match],
) -> (Vec<(TeamId, TeamId)>, Option<TeamId>) {
    let met: HashSet<(TeamId, TeamId)> = swiss_matches(matches)
        .filter_map(|m| Some(pair_key(m.team1_id?, m.team2_id?)))
        .collect();
    let had_bye: HashSet<TeamId> = swiss_matches(matches)
        .filter(|m| m.walkover)
        .filter_map(|m| m.winner_id())
        .collect();
    let score: HashMap<TeamId, u32> = standings.iter().map(|s| (s.team_id, s.score)).collect();

    let mut pool: Vec<TeamId> = standings.iter().map(|s| s.team_id).collect();
    let bye = if pool.len() % 2 == 1 {
        let idx = pool
            .iter()
            .rposition(|t| !had_bye.contains(t))
            .unwrap_or(pool.len() - 1);
        Some(pool.remove(idx))
    } else {
        None
    };

    let distance = |a: TeamId, b: TeamId| {
        let sa = score.get(&a).copied().unwrap_or(0);
        let sb = score.get(&b).copied().unwrap_or(0);
        sa.abs_diff(sb)
    };

    let mut steps = PAIRING_SEARCH_STEPS;
    let pairs = match rematch_free(&pool, &met, &distance, &mut steps) {
        Some(pairs) => pairs,
        None => {
            log::debug!("no rematch-free pairing for {} teams, allowing rematches", pool.len());
            greedy_pairs(pool, &met, &distance)
        }
    };
    (pairs, bye)
}

fn rematch_free(
    pool: &[TeamId],
    met: &HashSet<(TeamId, TeamId)>,
    distance: &dyn Fn(TeamId, TeamId) -> u32,
    steps: &mut usize,
) -> Option<Vec<(TeamId, TeamId)>> {
    let Some((&team, rest)) = pool.split_first() else {
        return Some(Vec::new());
    };
    let mut candidates: Vec<usize> = (0..rest.len())
        .filter(|&i| !met.contains(&pair_key(team, rest[i])))
        .collect();
    candidates.sort_by_key(|&i| (distance(team, rest[i]), i));

    for i in candidates {
        if *steps == 0 {
            return None;
        }
        *steps -= 1;
        let mut remaining = rest.to_vec();
        let opponent = remaining.remove(i);
        if let Some(mut pairs) = rematch_free(&remaining, met, distance, steps) {
            pairs.insert(0, (team, opponent));
            return Some(pairs);
        }
    }
    None
}

/// Each team takes the closest-scored unmet opponent, or the closest one at all.
fn greedy_pairs(
    mut pool: Vec<TeamId>,
    met: &HashSet<(TeamId, TeamId)>,
    distance: &dyn Fn(TeamId, TeamId) -> u32,
) -> Vec<(TeamId, TeamId)> {
    let mut pairs = Vec::with_capacity(pool.len() / 2);
    while !pool.is_empty() {
        let team = pool.remove(0);
        let fresh = pool
            .iter()
            .enumerate()
            .filter(|(_, o)| !met.contains(&pair_key(team, **o)))
            .min_by_key(|(i, o)| (distance(team, **o), *i))
            .map(|(i, _)| i);
        let pick = fresh.or_else(|| {
            pool.iter()
                .enumerate()
                .min_by_key(|(i, o)| (distance(team, **o), *i))
                .map(|(i, _)| i)
        });
        let Some(i) = pick else { break };
        let opponent = pool.remove(i);
        pairs.push((team, opponent));
    }
    pairs
}

impl FormatStrategy for Swiss {
    fn format(&self) -> Format {
        Format::Swiss
    }

    fn info(&self) -> FormatInfo {
        FormatInfo {
            name: "Swiss System",
            description: "Teams play multiple rounds with pairings based on performance. Used in Marvel Rivals Invitational.",
            min_teams: 4,
            supports_seeding: true,
            has_standings: true,
            stage_names: &["Swiss Rounds"],
            match_format: BestOf::BO3,
        }
    }

    fn validate_team_count(&self, team_count: usize) -> Result<(), BracketError> {
        if team_count < 4 {
            return Err(BracketError::InsufficientTeams {
                required: 4,
                actual: team_count,
            });
        }
        if team_count % 2 == 1 && team_count < 8 {
            return Err(BracketError::InvalidTeamParity(
                "Swiss system works best with even number of teams".to_string(),
            ));
        }
        Ok(())
    }

    fn generate(
        &self,
        event_id: EventId,
        teams: &[Team],
        options: &GenerationOptions,
    ) -> Result<Vec<Match>, BracketError> {
        self.validate_team_count(teams.len())?;
        let pairing = generate_swiss_initial_pairing(teams, options.swiss_pairing);
        let mut matches: Vec<Match> = pairing
            .pairs
            .iter()
            .zip(1..)
            .map(|((a, b), position)| pairing_match(event_id, 1, position, a.id, b.id))
            .collect();
        if let Some(team) = pairing.unpaired {
            let position = matches.len() as u32 + 1;
            matches.push(bye_match(event_id, 1, position, team.id));
        }
        Ok(matches)
    }

    fn standings(&self, event: &Event, matches: &[Match]) -> Standings {
        Standings::Swiss(swiss_standings(event, matches))
    }

    fn bracket_view(&self, event: &Event, matches: &[Match]) -> BracketView {
        BracketView::Swiss {
            rounds: rounds_view(event, swiss_matches(matches)),
            standings: swiss_standings(event, matches),
            total_rounds: planned_rounds(event.teams.len()),
        }
    }

    fn is_complete(&self, event: &Event, matches: &[Match]) -> bool {
        completed_rounds(matches) >= planned_rounds(event.teams.len())
    }

    fn allows_draws(&self) -> bool {
        true
    }

    fn next_round(
        &self,
        event: &Event,
        matches: &[Match],
        _options: &GenerationOptions,
    ) -> Result<Vec<Match>, BracketError> {
        let current = swiss_matches(matches).map(|m| m.round).max().unwrap_or(0);
        if current == 0 {
            return Err(BracketError::BracketNotFound(event.id));
        }
        if swiss_matches(matches).any(|m| m.round == current && !m.is_completed()) {
            return Err(BracketError::RoundInProgress { round: current });
        }
        if current >= planned_rounds(event.teams.len()) {
            return Ok(Vec::new());
        }

        let next = current + 1;
        let standings = swiss_standings(event, matches);
        let (pairs, bye) = pair_round(&standings, matches);
        let mut round: Vec<Match> = pairs
            .into_iter()
            .zip(1..)
            .map(|((a, b), position)| pairing_match(event.id, next, position, a, b))
            .collect();
        if let Some(team) = bye {
            let position = round.len() as u32 + 1;
            round.push(bye_match(event.id, next, position, team));
        }
        Ok(round)
    }
}
