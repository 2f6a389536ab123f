//! Standings shared by the table formats and the elimination formats.
//!
//! Table ranking walks an ordered list of [`TiebreakKey`]s: teams are sorted by the first key,
//! each block of teams still tied is re-ranked by the next key, and so on. Head-to-head is
//! evaluated only among the teams of the tied block. Teams tied on every key keep their seed order.

use crate::models::{BracketType, EliminationStanding, Event, Match, Standings, TableStanding, Team, TeamId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const WIN_POINTS: u32 = 3;
pub const DRAW_POINTS: u32 = 1;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TiebreakKey {
    Points,
    MapDiff,
    RoundDiff,
    /// Points earned in matches among the tied teams only.
    HeadToHead,
}

/// Tie-break chain used by round robin and group standings.
pub const TABLE_TIEBREAKS: [TiebreakKey; 4] = [
    TiebreakKey::Points,
    TiebreakKey::MapDiff,
    TiebreakKey::RoundDiff,
    TiebreakKey::HeadToHead,
];

/// Played, decided or drawn matches between two present teams; byes are excluded.
fn played(m: &Match) -> Option<(TeamId, TeamId)> {
    if !m.is_completed() || m.walkover {
        return None;
    }
    Some((m.team1_id?, m.team2_id?))
}

/// Points table over `entrants` (in seed order) from the completed matches among `matches`.
pub fn table_standings(
    entrants: &[&Team],
    matches: &[&Match],
    group_number: Option<u32>,
    keys: &[TiebreakKey],
) -> Vec<TableStanding> {
    let mut rows: Vec<TableStanding> = entrants
        .iter()
        .map(|t| TableStanding {
            team_id: t.id,
            team_name: t.name.clone(),
            group_number,
            ..Default::default()
        })
        .collect();
    let index: HashMap<TeamId, usize> = rows.iter().enumerate().map(|(i, r)| (r.team_id, i)).collect();

    for m in matches {
        let Some((t1, t2)) = played(m) else { continue };
        let (Some(&i1), Some(&i2)) = (index.get(&t1), index.get(&t2)) else {
            continue;
        };
        let s1 = m.team1_score.unwrap_or(0);
        let s2 = m.team2_score.unwrap_or(0);
        let (r1, r2) = m
            .maps_data
            .iter()
            .flatten()
            .fold((0, 0), |(a, b), map| (a + map.team1_rounds, b + map.team2_rounds));
        tally(&mut rows[i1], s1, s2, r1, r2);
        tally(&mut rows[i2], s2, s1, r2, r1);
    }

    for row in &mut rows {
        row.map_diff = i64::from(row.map_wins) - i64::from(row.map_losses);
        row.round_diff = i64::from(row.round_wins) - i64::from(row.round_losses);
        row.win_percentage = if row.matches_played > 0 {
            f64::from(row.wins) / f64::from(row.matches_played) * 100.0
        } else {
            0.0
        };
    }

    refine(rows, keys, matches)
}

fn tally(row: &mut TableStanding, own: u32, opp: u32, own_rounds: u32, opp_rounds: u32) {
    row.matches_played += 1;
    row.map_wins += own;
    row.map_losses += opp;
    row.round_wins += own_rounds;
    row.round_losses += opp_rounds;
    if own > opp {
        row.wins += 1;
        row.points += WIN_POINTS;
    } else if own < opp {
        row.losses += 1;
    } else {
        row.draws += 1;
        row.points += DRAW_POINTS;
    }
}

fn refine(block: Vec<TableStanding>, keys: &[TiebreakKey], matches: &[&Match]) -> Vec<TableStanding> {
    let Some((key, rest)) = keys.split_first() else {
        return block;
    };
    if block.len() < 2 {
        return block;
    }
    let values = key_values(*key, &block, matches);
    let mut keyed: Vec<(i64, TableStanding)> = values.into_iter().zip(block).collect();
    keyed.sort_by(|a, b| b.0.cmp(&a.0));

    let mut out = Vec::with_capacity(keyed.len());
    let mut iter = keyed.into_iter().peekable();
    while let Some((value, row)) = iter.next() {
        let mut tied = vec![row];
        while let Some((_, next)) = iter.next_if(|(v, _)| *v == value) {
            tied.push(next);
        }
        out.extend(refine(tied, rest, matches));
    }
    out
}

fn key_values(key: TiebreakKey, block: &[TableStanding], matches: &[&Match]) -> Vec<i64> {
    match key {
        TiebreakKey::Points => block.iter().map(|r| i64::from(r.points)).collect(),
        TiebreakKey::MapDiff => block.iter().map(|r| r.map_diff).collect(),
        TiebreakKey::RoundDiff => block.iter().map(|r| r.round_diff).collect(),
        TiebreakKey::HeadToHead => {
            let members: Vec<TeamId> = block.iter().map(|r| r.team_id).collect();
            let mut points: HashMap<TeamId, i64> = HashMap::new();
            for m in matches {
                let Some((t1, t2)) = played(m) else { continue };
                if !members.contains(&t1) || !members.contains(&t2) {
                    continue;
                }
                match m.winner_id() {
                    Some(winner) => *points.entry(winner).or_default() += i64::from(WIN_POINTS),
                    None => {
                        *points.entry(t1).or_default() += i64::from(DRAW_POINTS);
                        *points.entry(t2).or_default() += i64::from(DRAW_POINTS);
                    }
                }
            }
            members
                .iter()
                .map(|id| points.get(id).copied().unwrap_or(0))
                .collect()
        }
    }
}

/// Results of the completed meetings between two teams.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct HeadToHead {
    pub team1_wins: u32,
    pub team2_wins: u32,
    pub draws: u32,
    pub total_matches: u32,
}

pub fn head_to_head(matches: &[Match], team1: TeamId, team2: TeamId) -> HeadToHead {
    let mut record = HeadToHead::default();
    for m in matches {
        let Some((a, b)) = played(m) else { continue };
        if !((a == team1 && b == team2) || (a == team2 && b == team1)) {
            continue;
        }
        record.total_matches += 1;
        match m.winner_id() {
            Some(w) if w == team1 => record.team1_wins += 1,
            Some(_) => record.team2_wins += 1,
            None => record.draws += 1,
        }
    }
    record
}

/// Progression standings: deepest round reached, then wins. A grand final counts one round
/// past the deepest bracket round. Teams with `lives` losses are eliminated.
pub fn elimination_standings(event: &Event, matches: &[Match], lives: u32) -> Standings {
    let deepest = matches.iter().map(|m| m.round).max().unwrap_or(0);
    let mut rows: Vec<EliminationStanding> = event
        .teams
        .iter()
        .map(|t| EliminationStanding {
            team_id: t.id,
            team_name: t.name.clone(),
            ..Default::default()
        })
        .collect();
    let index: HashMap<TeamId, usize> = rows.iter().enumerate().map(|(i, r)| (r.team_id, i)).collect();

    for m in matches.iter().filter(|m| m.is_completed()) {
        let depth = match m.bracket_type {
            BracketType::GrandFinal => deepest + 1,
            _ => m.round,
        };
        for team in [m.team1_id, m.team2_id].into_iter().flatten() {
            if let Some(&i) = index.get(&team) {
                rows[i].last_round_reached = rows[i].last_round_reached.max(depth);
            }
        }
        if m.walkover {
            continue;
        }
        if let Some(&i) = m.winner_id().and_then(|w| index.get(&w)) {
            rows[i].wins += 1;
        }
        if let Some(&i) = m.loser_id().and_then(|l| index.get(&l)) {
            rows[i].losses += 1;
        }
    }
    for row in &mut rows {
        row.eliminated = row.losses >= lives;
    }
    rows.sort_by(|a, b| {
        b.last_round_reached
            .cmp(&a.last_round_reached)
            .then(b.wins.cmp(&a.wins))
    });
    Standings::Elimination(rows)
}
