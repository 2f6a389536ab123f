//! Integration tests for single elimination: generation, advancement, byes and standings.

mod common;

use bracket_engine::logic::{round_sizes, SingleElimination};
use bracket_engine::{
    BestOf, BracketError, BracketType, Format, FormatStrategy, GenerationOptions, MatchStatus,
    MatchStore, Side, Standings,
};
use common::{generated, play, slot, teams};
use uuid::Uuid;

fn generate(n: usize) -> Vec<bracket_engine::Match> {
    SingleElimination
        .generate(Uuid::new_v4(), &teams(n), &GenerationOptions::default())
        .unwrap()
}

#[test]
fn round_counts_halve_for_every_team_count() {
    for n in 2..=40usize {
        let matches = generate(n);
        let rounds = matches.iter().map(|m| m.round).max().unwrap();
        let expected_rounds = (n as f64).log2().ceil() as u32;
        assert_eq!(rounds, expected_rounds, "n = {n}");

        let per_round: Vec<u32> = (1..=rounds)
            .map(|r| matches.iter().filter(|m| m.round == r).count() as u32)
            .collect();
        assert_eq!(per_round[0], (n / 2) as u32, "n = {n}");
        for pair in per_round.windows(2) {
            assert_eq!(pair[1], pair[0].div_ceil(2), "n = {n}: {per_round:?}");
        }
        assert_eq!(per_round, round_sizes(n));
    }
}

#[test]
fn first_round_folds_the_seed_list() {
    let roster = teams(8);
    let matches = SingleElimination
        .generate(Uuid::new_v4(), &roster, &GenerationOptions::default())
        .unwrap();
    let first: Vec<_> = matches.iter().filter(|m| m.round == 1).collect();
    let expected = [(0, 7), (2, 5), (4, 3), (6, 1)];
    for (m, (a, b)) in first.iter().zip(expected) {
        assert_eq!(m.team1_id, Some(roster[a].id));
        assert_eq!(m.team2_id, Some(roster[b].id));
        assert_eq!(m.status, MatchStatus::Scheduled);
    }
    assert!(matches
        .iter()
        .filter(|m| m.round > 1)
        .all(|m| m.status == MatchStatus::Pending && m.team1_id.is_none() && m.team2_id.is_none()));
}

#[test]
fn final_is_best_of_five_and_rounds_are_named() {
    let matches = generate(8);
    for m in &matches {
        let (format, name) = match m.round {
            1 => (BestOf::BO3, "Quarter-Finals"),
            2 => (BestOf::BO3, "Semi-Finals"),
            _ => (BestOf::BO5, "Grand Final"),
        };
        assert_eq!(m.format, format);
        assert_eq!(m.round_name, name);
        assert_eq!(m.bracket_type, BracketType::Main);
    }
}

#[test]
fn requires_two_teams() {
    let err = SingleElimination
        .generate(Uuid::new_v4(), &teams(1), &GenerationOptions::default())
        .unwrap_err();
    assert_eq!(
        err,
        BracketError::InsufficientTeams {
            required: 2,
            actual: 1
        }
    );
}

#[test]
fn winners_fill_team1_then_team2_of_next_round() {
    let (orch, event_id, roster) = generated(Format::SingleElimination, 4);

    play(&orch, event_id, BracketType::Main, 1, 1, Side::One);
    let next = slot(&orch, event_id, BracketType::Main, 2, 1);
    assert_eq!(next.team1_id, Some(roster[0].id));
    assert_eq!(next.team2_id, None);
    assert_eq!(next.status, MatchStatus::Pending);

    play(&orch, event_id, BracketType::Main, 1, 2, Side::Two);
    let next = slot(&orch, event_id, BracketType::Main, 2, 1);
    assert_eq!(next.team1_id, Some(roster[0].id));
    assert_eq!(next.team2_id, Some(roster[1].id));
    assert_eq!(next.status, MatchStatus::Scheduled);
}

#[test]
fn winning_the_final_completes_the_event() {
    let (orch, event_id, roster) = generated(Format::SingleElimination, 4);
    play(&orch, event_id, BracketType::Main, 1, 1, Side::One);
    play(&orch, event_id, BracketType::Main, 1, 2, Side::One);
    assert!(!orch.is_complete(event_id, Format::SingleElimination).unwrap());

    let final_match = play(&orch, event_id, BracketType::Main, 2, 1, Side::One);
    assert_eq!(final_match.winner_id(), Some(roster[0].id));
    assert!(orch.is_complete(event_id, Format::SingleElimination).unwrap());

    let Standings::Elimination(rows) = orch
        .calculate_standings(event_id, Format::SingleElimination)
        .unwrap()
    else {
        panic!("expected elimination standings");
    };
    assert_eq!(rows[0].team_id, roster[0].id);
    assert_eq!(rows[0].wins, 2);
    assert!(!rows[0].eliminated);
    assert_eq!(rows[1].team_id, roster[2].id);
    assert!(rows[1].eliminated);
    assert!(rows[2..].iter().all(|r| r.last_round_reached == 1 && r.eliminated));
}

#[test]
fn odd_count_gives_top_seed_a_bye_into_a_feederless_slot() {
    let (orch, event_id, roster) = generated(Format::SingleElimination, 5);
    let first_round: Vec<_> = orch
        .store()
        .matches(event_id)
        .unwrap()
        .into_iter()
        .filter(|m| m.round == 1)
        .collect();
    assert_eq!(first_round.len(), 2);
    assert!(first_round.iter().all(|m| !m.has_team(roster[0].id)));

    let waiting = slot(&orch, event_id, BracketType::Main, 3, 1);
    assert_eq!(waiting.team2_id, Some(roster[0].id));
    assert_eq!(waiting.status, MatchStatus::Pending);

    play(&orch, event_id, BracketType::Main, 1, 1, Side::One);
    play(&orch, event_id, BracketType::Main, 1, 2, Side::One);
    play(&orch, event_id, BracketType::Main, 2, 1, Side::One);
    let final_match = slot(&orch, event_id, BracketType::Main, 3, 1);
    assert_eq!(final_match.team1_id, Some(roster[1].id));
    assert_eq!(final_match.status, MatchStatus::Scheduled);

    play(&orch, event_id, BracketType::Main, 3, 1, Side::Two);
    assert!(orch.is_complete(event_id, Format::SingleElimination).unwrap());
}

#[test]
fn nine_teams_park_the_top_seed_in_the_final() {
    // Rounds of 4, 2, 1, 1: the only slot without a feeder is team 2 of the final.
    let (orch, event_id, roster) = generated(Format::SingleElimination, 9);
    let matches = orch.store().matches(event_id).unwrap();
    assert_eq!(matches.len(), 8);
    assert!(matches
        .iter()
        .filter(|m| m.round < 4)
        .all(|m| !m.has_team(roster[0].id)));

    let final_match = slot(&orch, event_id, BracketType::Main, 4, 1);
    assert_eq!(final_match.team2_id, Some(roster[0].id));
    assert_eq!(final_match.status, MatchStatus::Pending);

    for position in 1..=4 {
        play(&orch, event_id, BracketType::Main, 1, position, Side::One);
    }
    for position in 1..=2 {
        play(&orch, event_id, BracketType::Main, 2, position, Side::One);
    }
    play(&orch, event_id, BracketType::Main, 3, 1, Side::One);

    let final_match = slot(&orch, event_id, BracketType::Main, 4, 1);
    assert_eq!(final_match.team1_id, Some(roster[1].id));
    assert_eq!(final_match.team2_id, Some(roster[0].id));
    assert_eq!(final_match.status, MatchStatus::Scheduled);
}

#[test]
fn feederless_slot_becomes_a_walkover() {
    // 6 teams: rounds of 3, 2, 1. Round 2 position 2 has no feeder for team 2.
    let (orch, event_id, roster) = generated(Format::SingleElimination, 6);
    let won = play(&orch, event_id, BracketType::Main, 1, 3, Side::One);
    let winner = won.winner_id().unwrap();
    assert_eq!(winner, roster[4].id);

    let walkover = slot(&orch, event_id, BracketType::Main, 2, 2);
    assert!(walkover.walkover);
    assert_eq!(walkover.status, MatchStatus::Completed);
    assert_eq!(walkover.winner_id(), Some(winner));

    let final_match = slot(&orch, event_id, BracketType::Main, 3, 1);
    assert_eq!(final_match.team2_id, Some(winner));
    assert_eq!(final_match.team1_id, None);
}

#[test]
fn draws_are_rejected() {
    let (orch, event_id, _) = generated(Format::SingleElimination, 4);
    let m = slot(&orch, event_id, BracketType::Main, 1, 1);
    let err = orch
        .report_result(m.id, common::score(Side::One, 1, 1))
        .unwrap_err();
    assert!(matches!(err, BracketError::InvalidResult(_)));
    assert_eq!(slot(&orch, event_id, BracketType::Main, 1, 1).status, MatchStatus::Scheduled);
}

#[test]
fn results_cannot_be_reported_on_pending_matches() {
    let (orch, event_id, _) = generated(Format::SingleElimination, 4);
    let pending = slot(&orch, event_id, BracketType::Main, 2, 1);
    let err = orch
        .report_result(pending.id, common::score(Side::One, 2, 0))
        .unwrap_err();
    assert!(matches!(err, BracketError::InvalidResult(_)));
}
