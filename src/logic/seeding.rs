//! Seeding: ordering teams before generation, bracket seed patterns, initial pairings.

use crate::config::GenerationOptions;
use crate::models::{Format, Team, TeamId};
use crate::store::{MatchHistory, PastResult};
use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// How teams are ordered before a generator sees them.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedingMethod {
    /// Rating descending, with optional limited randomization.
    #[default]
    Rating,
    /// Existing seed ascending; unseeded teams last.
    Manual,
    Random,
    /// Four rating tiers interleaved.
    Balanced,
    /// Regions interleaved, rating order within each region.
    Regional,
    /// Recency-weighted results over a look-back window.
    Performance,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwissPairingMethod {
    /// Top half against bottom half: i vs i + ceil(n/2).
    #[default]
    Folding,
    /// 1v2, 3v4, ...
    Adjacent,
    Random,
}

/// Order `teams` with `method`. The input slice is left untouched.
pub fn apply_seeding_method(
    teams: &[Team],
    method: SeedingMethod,
    options: &GenerationOptions,
    history: &dyn MatchHistory,
) -> Vec<Team> {
    let mut ordered = teams.to_vec();
    match method {
        SeedingMethod::Rating => {
            sort_by_rating(&mut ordered);
            if options.randomize_seeds {
                apply_limited_randomization(&mut ordered, options.randomization_factor);
            }
        }
        SeedingMethod::Manual => ordered.sort_by_key(|t| t.seed.unwrap_or(u32::MAX)),
        SeedingMethod::Random => ordered.shuffle(&mut rand::thread_rng()),
        SeedingMethod::Balanced => ordered = balanced(ordered),
        SeedingMethod::Regional => ordered = regional(ordered),
        SeedingMethod::Performance => {
            ordered = by_performance(ordered, options, history, Utc::now())
        }
    }
    ordered
}

/// Stable: equal ratings keep their input order.
fn sort_by_rating(teams: &mut [Team]) {
    teams.sort_by(|a, b| b.rating.total_cmp(&a.rating));
}

/// Swap `max(1, n·factor)` pairs, each partner at most `max(1, n·0.3)` places away.
fn apply_limited_randomization(teams: &mut [Team], factor: f64) {
    let n = teams.len();
    if n < 2 {
        return;
    }
    let swaps = ((n as f64 * factor).floor() as usize).max(1);
    let range = ((n as f64 * 0.3).floor() as i64).max(1);
    let mut rng = rand::thread_rng();
    for _ in 0..swaps {
        let pos1 = rng.gen_range(0..n);
        let offset = rng.gen_range(-range..=range);
        let pos2 = (pos1 as i64 + offset).clamp(0, n as i64 - 1) as usize;
        teams.swap(pos1, pos2);
    }
}

fn balanced(mut teams: Vec<Team>) -> Vec<Team> {
    sort_by_rating(&mut teams);
    let tier_size = teams.len().div_ceil(4).max(1);
    let tiers: Vec<&[Team]> = teams.chunks(tier_size).collect();
    let mut out = Vec::with_capacity(teams.len());
    for i in 0..tier_size {
        for tier in &tiers {
            if let Some(team) = tier.get(i) {
                out.push(team.clone());
            }
        }
    }
    out
}

fn regional(teams: Vec<Team>) -> Vec<Team> {
    let mut regions: Vec<(String, Vec<Team>)> = Vec::new();
    for team in teams {
        match regions.iter_mut().find(|(region, _)| *region == team.region) {
            Some((_, members)) => members.push(team),
            None => regions.push((team.region.clone(), vec![team])),
        }
    }
    for (_, members) in &mut regions {
        sort_by_rating(members);
    }
    let longest = regions.iter().map(|(_, m)| m.len()).max().unwrap_or(0);
    let mut out = Vec::new();
    for i in 0..longest {
        for (_, members) in &regions {
            if let Some(team) = members.get(i) {
                out.push(team.clone());
            }
        }
    }
    out
}

fn by_performance(
    teams: Vec<Team>,
    options: &GenerationOptions,
    history: &dyn MatchHistory,
    now: DateTime<Utc>,
) -> Vec<Team> {
    let since = now - Duration::weeks(options.performance_weeks);
    let scores: HashMap<TeamId, f64> = teams
        .iter()
        .map(|t| {
            let results = history.recent_results(t.id, since, options.performance_match_limit);
            (t.id, performance_score(&results, now))
        })
        .collect();
    let mut teams = teams;
    teams.sort_by(|a, b| {
        let sa = scores.get(&a.id).copied().unwrap_or(0.0);
        let sb = scores.get(&b.id).copied().unwrap_or(0.0);
        sb.total_cmp(&sa)
    });
    teams
}

/// Recency-weighted share of points won. 0 with no usable results.
///
/// Each result scores `own / max(own, opponent)` and weighs `max(0.1, 2 - days_ago/30)`.
pub fn performance_score(results: &[PastResult], now: DateTime<Utc>) -> f64 {
    let mut total = 0.0;
    let mut weights = 0.0;
    for r in results {
        let best = r.own_score.max(r.opponent_score);
        if best == 0 {
            continue;
        }
        let performance = f64::from(r.own_score) / f64::from(best);
        let days_ago = (now - r.completed_at).num_days().abs() as f64;
        let weight = (2.0 - days_ago / 30.0).max(0.1);
        total += performance * weight;
        weights += weight;
    }
    if weights > 0.0 {
        total / weights
    } else {
        0.0
    }
}

/// Smallest power of two holding `n` entrants.
pub fn next_power_of_two(n: usize) -> usize {
    n.max(1).next_power_of_two()
}

/// Classical bracket order of seeds 1..=bracket_size.
pub fn generate_seeding_pattern(bracket_size: usize) -> Vec<usize> {
    let mut pattern = vec![1];
    while pattern.len() < bracket_size {
        let max = pattern.len() * 2 + 1;
        pattern = pattern.iter().flat_map(|&seed| [seed, max - seed]).collect();
    }
    pattern.truncate(bracket_size);
    pattern
}

/// Map the seed pattern onto `teams` (already in seed order). `None` marks a bye slot.
pub fn generate_single_elimination_seeds(teams: &[Team]) -> Vec<Option<Team>> {
    generate_seeding_pattern(next_power_of_two(teams.len()))
        .into_iter()
        .map(|seed| teams.get(seed - 1).cloned())
        .collect()
}

#[derive(Clone, Debug, PartialEq)]
pub struct InitialPairing {
    pub pairs: Vec<(Team, Team)>,
    /// Left over when the team count is odd.
    pub unpaired: Option<Team>,
}

pub fn generate_swiss_initial_pairing(teams: &[Team], method: SwissPairingMethod) -> InitialPairing {
    match method {
        SwissPairingMethod::Folding => {
            let half = teams.len().div_ceil(2);
            let mut pairs = Vec::new();
            let mut unpaired = None;
            for i in 0..half {
                match teams.get(i + half) {
                    Some(opponent) => pairs.push((teams[i].clone(), opponent.clone())),
                    None => unpaired = Some(teams[i].clone()),
                }
            }
            InitialPairing { pairs, unpaired }
        }
        SwissPairingMethod::Adjacent => adjacent_pairs(teams),
        SwissPairingMethod::Random => {
            let mut shuffled = teams.to_vec();
            shuffled.shuffle(&mut rand::thread_rng());
            adjacent_pairs(&shuffled)
        }
    }
}

fn adjacent_pairs(teams: &[Team]) -> InitialPairing {
    let mut pairs = Vec::new();
    let mut unpaired = None;
    for chunk in teams.chunks(2) {
        match chunk {
            [a, b] => pairs.push((a.clone(), b.clone())),
            [a] => unpaired = Some(a.clone()),
            _ => {}
        }
    }
    InitialPairing { pairs, unpaired }
}

/// Circle method. Pairings with the bye placeholder (odd counts) are dropped from their round.
pub fn generate_round_robin_schedule(teams: &[Team]) -> Vec<Vec<(Team, Team)>> {
    let mut slots: Vec<Option<&Team>> = teams.iter().map(Some).collect();
    if slots.len() % 2 == 1 {
        slots.push(None);
    }
    let n = slots.len();
    if n < 2 {
        return Vec::new();
    }
    let fixed = slots[0];
    let mut rotating = slots[1..].to_vec();
    let mut schedule = Vec::with_capacity(n - 1);
    for _ in 0..n - 1 {
        let mut round = Vec::with_capacity(n / 2);
        push_pair(&mut round, fixed, rotating[n - 2]);
        for i in 0..(n - 2) / 2 {
            push_pair(&mut round, rotating[i], rotating[n - 3 - i]);
        }
        schedule.push(round);
        rotating.rotate_right(1);
    }
    schedule
}

fn push_pair(round: &mut Vec<(Team, Team)>, a: Option<&Team>, b: Option<&Team>) {
    if let (Some(a), Some(b)) = (a, b) {
        round.push((a.clone(), b.clone()));
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ByeDistribution {
    pub bracket_size: usize,
    pub byes: usize,
    /// 0-based bracket slots that receive a bye, evenly spaced.
    pub positions: Vec<usize>,
}

pub fn calculate_bye_distribution(team_count: usize) -> ByeDistribution {
    let bracket_size = next_power_of_two(team_count);
    let byes = bracket_size - team_count.min(bracket_size);
    let positions = (0..byes).map(|i| i * bracket_size / byes).collect();
    ByeDistribution {
        bracket_size,
        byes,
        positions,
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct SeedingValidation {
    pub valid: bool,
    pub issues: Vec<String>,
}

/// Check manual seeds for duplicates and gaps, plus a per-format team count sanity check.
pub fn validate_seeding(teams: &[Team], format: Format) -> SeedingValidation {
    let mut issues = Vec::new();
    let mut seen = HashSet::new();
    for seed in teams.iter().filter_map(|t| t.seed) {
        if !seen.insert(seed) {
            issues.push(format!("Duplicate seed found: {seed}"));
        }
    }
    for expected in 1..=teams.len() as u32 {
        if !seen.contains(&expected) {
            issues.push(format!("Missing seed: {expected}"));
        }
    }
    let n = teams.len();
    match format {
        Format::SingleElimination | Format::DoubleElimination if n < 2 => {
            issues.push("Need at least 2 teams for elimination format".to_string())
        }
        Format::RoundRobin if n < 3 => {
            issues.push("Need at least 3 teams for round-robin".to_string())
        }
        Format::RoundRobin if n > 20 => {
            issues.push("Too many teams for round-robin (max 20)".to_string())
        }
        Format::Swiss if n < 4 => issues.push("Need at least 4 teams for Swiss system".to_string()),
        Format::GroupStage if n < 4 => {
            issues.push("Need at least 4 teams for group stage".to_string())
        }
        _ => {}
    }
    SeedingValidation {
        valid: issues.is_empty(),
        issues,
    }
}
