//! Integration tests for the group stage: snake draft, group scheduling, standings and qualifiers.

mod common;

use bracket_engine::logic::{distribute_into_groups, group_count, GroupStage};
use bracket_engine::{
    BracketError, BracketType, BracketView, Format, FormatStrategy, GenerationOptions, MapResult,
    Match, MatchStore, ScoreReport, Standings, TeamId,
};
use common::{generated, report, teams, Orchestrator};
use std::collections::HashSet;
use uuid::Uuid;

fn names_in(groups: &[Vec<bracket_engine::Team>], index: usize) -> Vec<&str> {
    groups[index].iter().map(|t| t.name.as_str()).collect()
}

fn result(orch: &Orchestrator, event_id: Uuid, a: TeamId, b: TeamId, a_score: u32, b_score: u32) {
    let matches = orch.store().matches(event_id).unwrap();
    let m: &Match = matches
        .iter()
        .find(|m| m.has_team(a) && m.has_team(b))
        .unwrap();
    if m.team1_id == Some(a) {
        report(orch, m, a_score, b_score);
    } else {
        report(orch, m, b_score, a_score);
    }
}

#[test]
fn group_count_follows_team_count() {
    assert_eq!(group_count(4), 2);
    assert_eq!(group_count(8), 2);
    assert_eq!(group_count(9), 4);
    assert_eq!(group_count(16), 4);
    assert_eq!(group_count(24), 6);
    assert_eq!(group_count(25), 8);
    assert_eq!(group_count(32), 8);
}

#[test]
fn snake_draft_balances_groups() {
    let groups = distribute_into_groups(&teams(8), 2);
    assert_eq!(names_in(&groups, 0), ["Team 1", "Team 4", "Team 5", "Team 8"]);
    assert_eq!(names_in(&groups, 1), ["Team 2", "Team 3", "Team 6", "Team 7"]);

    let groups = distribute_into_groups(&teams(16), 4);
    assert_eq!(names_in(&groups, 3), ["Team 4", "Team 5", "Team 12", "Team 13"]);
}

#[test]
fn eight_teams_make_two_groups_of_six_matches() {
    let matches = GroupStage
        .generate(Uuid::new_v4(), &teams(8), &GenerationOptions::default())
        .unwrap();
    assert_eq!(matches.len(), 12);
    for group in 1..=2 {
        let in_group: Vec<&Match> = matches
            .iter()
            .filter(|m| m.group_number == Some(group))
            .collect();
        assert_eq!(in_group.len(), 6);
        for round in 1..=3 {
            assert_eq!(in_group.iter().filter(|m| m.round == round).count(), 2);
        }
    }
    let positions: HashSet<u32> = matches.iter().map(|m| m.bracket_position).collect();
    assert_eq!(positions.len(), matches.len());
    assert!(matches.iter().all(|m| m.bracket_type == BracketType::GroupStage));
    assert_eq!(matches[0].round_name, "Group A - Round 1");
    assert_eq!(matches[11].round_name, "Group B - Round 3");
}

#[test]
fn sixteen_teams_make_four_groups() {
    let matches = GroupStage
        .generate(Uuid::new_v4(), &teams(16), &GenerationOptions::default())
        .unwrap();
    assert_eq!(matches.len(), 24);
    let groups: HashSet<u32> = matches.iter().filter_map(|m| m.group_number).collect();
    assert_eq!(groups.len(), 4);
}

#[test]
fn requires_four_teams() {
    let err = GroupStage
        .generate(Uuid::new_v4(), &teams(3), &GenerationOptions::default())
        .unwrap_err();
    assert_eq!(
        err,
        BracketError::InsufficientTeams {
            required: 4,
            actual: 3
        }
    );
}

#[test]
fn group_standings_break_ties_on_map_difference_then_qualify_top_two() {
    let (orch, event_id, roster) = generated(Format::GroupStage, 8);
    // Group A: Team 1, Team 4, Team 5, Team 8.
    let [t1, t4, t5, t8] = [roster[0].id, roster[3].id, roster[4].id, roster[7].id];
    result(&orch, event_id, t1, t4, 2, 1);
    result(&orch, event_id, t1, t5, 2, 1);
    result(&orch, event_id, t1, t8, 0, 2);
    result(&orch, event_id, t4, t5, 2, 0);
    result(&orch, event_id, t4, t8, 2, 1);
    result(&orch, event_id, t5, t8, 2, 0);

    let Standings::Table(rows) = orch.calculate_standings(event_id, Format::GroupStage).unwrap() else {
        panic!("expected table standings");
    };
    assert_eq!(rows.len(), 8);
    let group_a: Vec<TeamId> = rows
        .iter()
        .filter(|r| r.group_number == Some(1))
        .map(|r| r.team_id)
        .collect();
    // Team 1 and Team 4 both have 6 points; Team 4 has the better map difference.
    assert_eq!(group_a, [t4, t1, t5, t8]);
    assert_eq!(rows[0].group_number, Some(1));
    assert_eq!(rows[4].group_number, Some(2));

    let qualifiers = orch
        .group_qualifiers(event_id, &GenerationOptions::default())
        .unwrap();
    assert_eq!(qualifiers.len(), 4);
    assert_eq!(qualifiers[0].team_id, t4);
    assert_eq!(qualifiers[0].group_position, 1);
    assert_eq!(qualifiers[1].team_id, t1);
    assert_eq!(qualifiers[1].group_position, 2);
    // Group B has no results yet, so seed order decides.
    assert_eq!(qualifiers[2].team_id, roster[1].id);
    assert_eq!(qualifiers[3].team_id, roster[2].id);

    let three = GenerationOptions {
        teams_advance_per_group: 3,
        ..GenerationOptions::default()
    };
    assert_eq!(orch.group_qualifiers(event_id, &three).unwrap().len(), 6);
}

#[test]
fn round_difference_splits_a_drawn_group() {
    let (orch, event_id, roster) = generated(Format::GroupStage, 4);
    // Group A: Team 1 and Team 4.
    let (t1, t4) = (roster[0].id, roster[3].id);
    let matches = orch.store().matches(event_id).unwrap();
    let m = matches.iter().find(|m| m.has_team(t1) && m.has_team(t4)).unwrap();
    // Team 1 takes the first map 13-11, Team 4 the second 13-2.
    let maps = [(13, 11), (2, 13)]
        .into_iter()
        .map(|(t1_rounds, t4_rounds)| {
            let (team1_rounds, team2_rounds) = if m.team1_id == Some(t1) {
                (t1_rounds, t4_rounds)
            } else {
                (t4_rounds, t1_rounds)
            };
            MapResult {
                map_name: None,
                team1_rounds,
                team2_rounds,
            }
        })
        .collect();
    orch.report_result(
        m.id,
        ScoreReport {
            team1_score: 1,
            team2_score: 1,
            maps: Some(maps),
        },
    )
    .unwrap();

    let Standings::Table(rows) = orch.calculate_standings(event_id, Format::GroupStage).unwrap() else {
        panic!("expected table standings");
    };
    let group_a: Vec<_> = rows.iter().filter(|r| r.group_number == Some(1)).collect();
    assert_eq!(group_a.len(), 2);
    assert_eq!(group_a[0].team_id, t4);
    assert_eq!(group_a[1].team_id, t1);
    for row in &group_a {
        assert_eq!((row.points, row.map_diff), (1, 0));
    }
    assert_eq!(group_a[0].round_diff, 9);
    assert_eq!(group_a[1].round_diff, -9);
}

#[test]
fn bracket_view_lists_named_groups() {
    let (orch, event_id, _) = generated(Format::GroupStage, 8);
    let BracketView::GroupStage {
        groups,
        overall_standings,
        advancement_rules,
    } = orch.bracket_structure(event_id, Format::GroupStage).unwrap()
    else {
        panic!("expected group stage view");
    };
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].group_name, "Group A");
    assert_eq!(groups[1].group_name, "Group B");
    assert_eq!(groups[0].matches.len(), 6);
    assert_eq!(groups[0].standings.len(), 4);
    assert_eq!(overall_standings.len(), 8);
    assert_eq!(advancement_rules.teams_advance_per_group, 2);
}

#[test]
fn complete_only_when_every_group_match_is_played() {
    let (orch, event_id, _) = generated(Format::GroupStage, 4);
    let matches = orch.store().matches(event_id).unwrap();
    assert_eq!(matches.len(), 2);
    report(&orch, &matches[0], 2, 0);
    assert!(!orch.is_complete(event_id, Format::GroupStage).unwrap());
    report(&orch, &matches[1], 1, 1);
    assert!(orch.is_complete(event_id, Format::GroupStage).unwrap());
}

#[test]
fn qualifiers_need_a_group_stage_event() {
    let (orch, event_id, _) = generated(Format::RoundRobin, 4);
    let err = orch
        .group_qualifiers(event_id, &GenerationOptions::default())
        .unwrap_err();
    assert_eq!(err, BracketError::InvalidFormat("round_robin".to_string()));
}
