//! Shared helpers for the integration tests.
#![allow(dead_code)]

use bracket_engine::{
    BracketOrchestrator, BracketType, Event, EventId, Format, GenerationOptions, Match,
    MatchStore, MemoryCache, MemoryStore, ScoreReport, Side, Team,
};

pub type Orchestrator = BracketOrchestrator<MemoryStore, MemoryCache>;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// `n` teams with strictly descending ratings, so rating seeding keeps their order.
pub fn teams(n: usize) -> Vec<Team> {
    (0..n)
        .map(|i| Team::new(format!("Team {}", i + 1), 2000.0 - i as f64 * 10.0))
        .collect()
}

/// Orchestrator with one event holding `n` teams and a generated `format` bracket.
pub fn generated(format: Format, n: usize) -> (Orchestrator, EventId, Vec<Team>) {
    init_logging();
    let orch = BracketOrchestrator::new(MemoryStore::new(), MemoryCache::new());
    let roster = teams(n);
    let event = Event::new("Test Cup", roster.clone());
    let event_id = event.id;
    orch.store().insert_event(event).unwrap();
    orch.generate_bracket(event_id, format, roster.clone(), &GenerationOptions::default())
        .unwrap();
    (orch, event_id, roster)
}

pub fn find(matches: &[Match], bracket_type: BracketType, round: u32, position: u32) -> Match {
    matches
        .iter()
        .find(|m| m.bracket_type == bracket_type && m.round == round && m.bracket_position == position)
        .cloned()
        .unwrap_or_else(|| panic!("no {bracket_type} match at round {round} position {position}"))
}

pub fn slot(orch: &Orchestrator, event_id: EventId, bracket_type: BracketType, round: u32, position: u32) -> Match {
    let matches = orch.store().matches(event_id).unwrap();
    find(&matches, bracket_type, round, position)
}

/// Report a 2-0 win for `winner` in the match at the given slot.
pub fn play(
    orch: &Orchestrator,
    event_id: EventId,
    bracket_type: BracketType,
    round: u32,
    position: u32,
    winner: Side,
) -> Match {
    let m = slot(orch, event_id, bracket_type, round, position);
    orch.report_result(m.id, score(winner, 2, 0)).unwrap()
}

pub fn score(winner: Side, winning: u32, losing: u32) -> ScoreReport {
    let (team1_score, team2_score) = match winner {
        Side::One => (winning, losing),
        Side::Two => (losing, winning),
    };
    ScoreReport {
        team1_score,
        team2_score,
        maps: None,
    }
}

pub fn report(orch: &Orchestrator, m: &Match, team1_score: u32, team2_score: u32) -> Match {
    orch.report_result(
        m.id,
        ScoreReport {
            team1_score,
            team2_score,
            maps: None,
        },
    )
    .unwrap()
}
