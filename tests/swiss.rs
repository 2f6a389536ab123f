//! Integration tests for the Swiss system: first-round folding, round pairing, byes and Buchholz.

mod common;

use bracket_engine::logic::{planned_rounds, Swiss};
use bracket_engine::{
    BestOf, BracketError, BracketView, Event, EventId, Format, FormatStrategy, GenerationOptions,
    Match, MatchStatus, MatchStore, Side, Standings, SwissStanding, TeamId,
};
use common::{generated, score, teams, Orchestrator};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

fn swiss_table(orch: &Orchestrator, event_id: EventId) -> Vec<SwissStanding> {
    match orch.calculate_standings(event_id, Format::Swiss).unwrap() {
        Standings::Swiss(rows) => rows,
        other => panic!("expected swiss standings, got {other:?}"),
    }
}

fn row(rows: &[SwissStanding], team: TeamId) -> &SwissStanding {
    rows.iter().find(|r| r.team_id == team).unwrap()
}

/// Team 1 wins every open match of the given round.
fn play_round(orch: &Orchestrator, event_id: EventId, round: u32) {
    let open: Vec<Match> = orch
        .store()
        .matches(event_id)
        .unwrap()
        .into_iter()
        .filter(|m| m.round == round && !m.is_completed())
        .collect();
    for m in open {
        orch.report_result(m.id, score(Side::One, 2, 0)).unwrap();
    }
}

fn pair_key(m: &Match) -> (TeamId, TeamId) {
    let (a, b) = (m.team1_id.unwrap(), m.team2_id.unwrap());
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

#[test]
fn first_round_folds_top_half_against_bottom_half() {
    let roster = teams(8);
    let matches = Swiss
        .generate(Uuid::new_v4(), &roster, &GenerationOptions::default())
        .unwrap();
    assert_eq!(matches.len(), 4);
    for (i, m) in matches.iter().enumerate() {
        assert_eq!(m.team1_id, Some(roster[i].id));
        assert_eq!(m.team2_id, Some(roster[i + 4].id));
        assert_eq!(m.round, 1);
        assert_eq!(m.round_name, "Swiss Round 1");
        assert_eq!(m.format, BestOf::BO3);
        assert_eq!(m.status, MatchStatus::Scheduled);
    }
}

#[test]
fn planned_round_counts() {
    assert_eq!(planned_rounds(4), 3);
    assert_eq!(planned_rounds(8), 3);
    assert_eq!(planned_rounds(16), 4);
    assert_eq!(planned_rounds(32), 5);
}

#[test]
fn team_count_validation() {
    assert!(matches!(
        Swiss.validate_team_count(5),
        Err(BracketError::InvalidTeamParity(_))
    ));
    assert_eq!(
        Swiss.validate_team_count(3),
        Err(BracketError::InsufficientTeams {
            required: 4,
            actual: 3
        })
    );
    assert!(Swiss.validate_team_count(9).is_ok());
    assert!(Swiss.validate_team_count(6).is_ok());
}

#[test]
fn odd_count_gives_the_middle_team_a_bye() {
    let roster = teams(9);
    let matches = Swiss
        .generate(Uuid::new_v4(), &roster, &GenerationOptions::default())
        .unwrap();
    assert_eq!(matches.len(), 5);
    let bye = &matches[4];
    assert!(bye.walkover);
    assert_eq!(bye.status, MatchStatus::Completed);
    assert_eq!(bye.team1_id, Some(roster[4].id));
    assert_eq!(bye.team2_id, None);
    assert_eq!(bye.winner_id(), Some(roster[4].id));
}

#[test]
fn next_round_waits_for_the_current_one() {
    let (orch, event_id, _) = generated(Format::Swiss, 8);
    let err = orch
        .next_swiss_round(event_id, &GenerationOptions::default())
        .unwrap_err();
    assert_eq!(err, BracketError::RoundInProgress { round: 1 });
}

#[test]
fn second_round_pairs_equal_scores_without_rematches() {
    let (orch, event_id, roster) = generated(Format::Swiss, 8);
    play_round(&orch, event_id, 1);

    let rows = swiss_table(&orch, event_id);
    for winner in &roster[..4] {
        let r = row(&rows, winner.id);
        assert_eq!((r.wins, r.score, r.buchholz), (1, 3, 0));
    }
    for loser in &roster[4..] {
        let r = row(&rows, loser.id);
        assert_eq!((r.losses, r.score, r.buchholz), (1, 0, 3));
    }

    let round = orch
        .next_swiss_round(event_id, &GenerationOptions::default())
        .unwrap();
    assert_eq!(round.len(), 4);
    assert!(round.iter().all(|m| m.round == 2 && m.round_name == "Swiss Round 2"));

    let scores: HashMap<TeamId, u32> =
        rows.iter().map(|r| (r.team_id, r.score)).collect();
    for m in &round {
        assert_eq!(scores[&m.team1_id.unwrap()], scores[&m.team2_id.unwrap()]);
    }

    let all = orch.store().matches(event_id).unwrap();
    let pairs: HashSet<(TeamId, TeamId)> = all.iter().map(pair_key).collect();
    assert_eq!(pairs.len(), all.len(), "rematch paired");
}

#[test]
fn three_rounds_complete_eight_teams() {
    let (orch, event_id, _) = generated(Format::Swiss, 8);
    let options = GenerationOptions::default();
    for round in 1..=3 {
        assert!(!orch.is_complete(event_id, Format::Swiss).unwrap());
        play_round(&orch, event_id, round);
        let next = orch.next_swiss_round(event_id, &options).unwrap();
        if round < 3 {
            assert_eq!(next.len(), 4);
        } else {
            assert!(next.is_empty());
        }
    }
    assert!(orch.is_complete(event_id, Format::Swiss).unwrap());
    assert_eq!(orch.store().matches(event_id).unwrap().len(), 12);

    let rows = swiss_table(&orch, event_id);
    assert_eq!(rows[0].wins, 3);
    assert!(rows.windows(2).all(|w| w[0].score >= w[1].score));

    let BracketView::Swiss {
        rounds,
        total_rounds,
        ..
    } = orch.bracket_structure(event_id, Format::Swiss).unwrap()
    else {
        panic!("expected swiss view");
    };
    assert_eq!(total_rounds, 3);
    assert_eq!(rounds.len(), 3);
}

#[test]
fn byes_count_as_wins_and_rotate() {
    let (orch, event_id, roster) = generated(Format::Swiss, 9);
    play_round(&orch, event_id, 1);

    let rows = swiss_table(&orch, event_id);
    let bye_team = row(&rows, roster[4].id);
    assert_eq!((bye_team.wins, bye_team.byes, bye_team.score), (1, 1, 3));

    let round = orch
        .next_swiss_round(event_id, &GenerationOptions::default())
        .unwrap();
    assert_eq!(round.len(), 5);
    let byes: Vec<&Match> = round.iter().filter(|m| m.walkover).collect();
    assert_eq!(byes.len(), 1);
    let second_bye = byes[0].team1_id.unwrap();
    assert_ne!(second_bye, roster[4].id);
    // Lowest-ranked team without a bye: a first-round loser.
    assert_eq!(second_bye, roster[8].id);
}

#[test]
fn next_round_requires_a_generated_bracket() {
    let event = Event::new("Empty", teams(8));
    let err = Swiss
        .next_round(&event, &[], &GenerationOptions::default())
        .unwrap_err();
    assert_eq!(err, BracketError::BracketNotFound(event.id));
}

#[test]
fn pairing_backtracks_to_avoid_a_rematch() {
    let (orch, event_id, roster) = generated(Format::Swiss, 6);
    let options = GenerationOptions::default();
    play_round(&orch, event_id, 1);
    orch.next_swiss_round(event_id, &options).unwrap();
    play_round(&orch, event_id, 2);

    // Taking Team 4 for Team 2 would leave Team 5 against Team 6 again.
    let round = orch.next_swiss_round(event_id, &options).unwrap();
    let paired: HashSet<(TeamId, TeamId)> = round.iter().map(pair_key).collect();
    let expected: HashSet<(TeamId, TeamId)> = [(0, 2), (1, 5), (4, 3)]
        .into_iter()
        .map(|(a, b)| {
            let (a, b) = (roster[a].id, roster[b].id);
            if a < b {
                (a, b)
            } else {
                (b, a)
            }
        })
        .collect();
    assert_eq!(paired, expected);

    let all = orch.store().matches(event_id).unwrap();
    assert_eq!(all.len(), 9);
    let pairs: HashSet<(TeamId, TeamId)> = all.iter().map(pair_key).collect();
    assert_eq!(pairs.len(), all.len(), "rematch paired");
}
