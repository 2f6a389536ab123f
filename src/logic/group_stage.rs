//! Group stage: snake-drafted groups, each playing an internal round robin.

use crate::config::{GenerationOptions, DEFAULT_TEAMS_ADVANCE_PER_GROUP};
use crate::logic::format::{all_completed, FormatInfo, FormatStrategy};
use crate::logic::standings::{table_standings, TABLE_TIEBREAKS};
use crate::logic::view::{group_name, AdvancementRules, BracketView, GroupView, MatchView};
use crate::models::{
    BestOf, BracketError, BracketType, Event, EventId, Format, GroupQualifier, Match, Standings,
    TableStanding, Team, TeamId,
};
use std::collections::{BTreeMap, HashMap};

/// Matches scheduled per round inside one group.
const MATCHES_PER_GROUP_ROUND: u32 = 2;

pub struct GroupStage;

pub fn group_count(team_count: usize) -> usize {
    match team_count {
        0..=8 => 2,
        9..=16 => 4,
        17..=24 => 6,
        _ => 8,
    }
}

/// Serpentine draft: 0, 1, .., g-1, then g-1, .., 0, and so on.
pub fn distribute_into_groups(teams: &[Team], groups: usize) -> Vec<Vec<Team>> {
    let mut out = vec![Vec::new(); groups];
    if groups == 0 {
        return out;
    }
    for (i, team) in teams.iter().enumerate() {
        let lap = i / groups;
        let offset = i % groups;
        let group = if lap % 2 == 0 {
            offset
        } else {
            groups - 1 - offset
        };
        out[group].push(team.clone());
    }
    out
}

/// Group number of each team, from the matches it appears in.
fn membership(matches: &[Match]) -> HashMap<TeamId, u32> {
    let mut groups = HashMap::new();
    for m in matches.iter().filter(|m| m.bracket_type == BracketType::GroupStage) {
        let Some(group) = m.group_number else { continue };
        for team in [m.team1_id, m.team2_id].into_iter().flatten() {
            groups.entry(team).or_insert(group);
        }
    }
    groups
}

/// Standings of every group, keyed by group number.
pub fn group_standings(event: &Event, matches: &[Match]) -> BTreeMap<u32, Vec<TableStanding>> {
    let groups = membership(matches);
    let mut entrants: BTreeMap<u32, Vec<&Team>> = BTreeMap::new();
    for team in &event.teams {
        if let Some(&group) = groups.get(&team.id) {
            entrants.entry(group).or_default().push(team);
        }
    }
    entrants
        .into_iter()
        .map(|(group, teams)| {
            let played: Vec<&Match> = matches
                .iter()
                .filter(|m| m.bracket_type == BracketType::GroupStage && m.group_number == Some(group))
                .collect();
            (group, table_standings(&teams, &played, Some(group), &TABLE_TIEBREAKS))
        })
        .collect()
}

/// Top `per_group` teams of every group, in group order.
pub fn qualifiers(event: &Event, matches: &[Match], per_group: usize) -> Vec<GroupQualifier> {
    group_standings(event, matches)
        .into_iter()
        .flat_map(|(group, rows)| {
            rows.into_iter()
                .take(per_group)
                .enumerate()
                .map(move |(i, row)| GroupQualifier {
                    team_id: row.team_id,
                    team_name: row.team_name,
                    group_number: group,
                    group_position: i + 1,
                    points: row.points,
                    map_diff: row.map_diff,
                })
        })
        .collect()
}

impl FormatStrategy for GroupStage {
    fn format(&self) -> Format {
        Format::GroupStage
    }

    fn info(&self) -> FormatInfo {
        FormatInfo {
            name: "Group Stage",
            description: "Teams divided into groups with round robin within each group. Top teams advance.",
            min_teams: 4,
            supports_seeding: true,
            has_standings: true,
            stage_names: &["Group Stage"],
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
        let groups = distribute_into_groups(teams, group_count(teams.len()));
        let mut matches = Vec::new();
        // Positions are unique across all groups so slot keys stay unique per event.
        let mut position = 1;
        for (group, members) in (1..).zip(&groups) {
            let letter = group_name(group);
            let (mut round, mut in_round) = (1, 0);
            for (i, a) in members.iter().enumerate() {
                for b in &members[i + 1..] {
                    matches.push(
                        Match::new(
                            event_id,
                            BracketType::GroupStage,
                            round,
                            position,
                            BestOf::BO3,
                            format!("{letter} - Round {round}"),
                        )
                        .with_teams(Some(a.id), Some(b.id))
                        .in_group(group),
                    );
                    position += 1;
                    in_round += 1;
                    if in_round >= MATCHES_PER_GROUP_ROUND {
                        round += 1;
                        in_round = 0;
                    }
                }
            }
        }
        Ok(matches)
    }

    fn standings(&self, event: &Event, matches: &[Match]) -> Standings {
        Standings::Table(group_standings(event, matches).into_values().flatten().collect())
    }

    fn bracket_view(&self, event: &Event, matches: &[Match]) -> BracketView {
        let standings = group_standings(event, matches);
        let groups: Vec<GroupView> = standings
            .iter()
            .map(|(&group, rows)| {
                let mut group_matches: Vec<&Match> = matches
                    .iter()
                    .filter(|m| m.group_number == Some(group))
                    .collect();
                group_matches.sort_by_key(|m| (m.round, m.bracket_position));
                GroupView {
                    group_number: group,
                    group_name: group_name(group),
                    matches: group_matches
                        .into_iter()
                        .map(|m| MatchView::project(event, m))
                        .collect(),
                    standings: rows.clone(),
                }
            })
            .collect();
        BracketView::GroupStage {
            groups,
            overall_standings: standings.into_values().flatten().collect(),
            advancement_rules: AdvancementRules {
                teams_advance_per_group: DEFAULT_TEAMS_ADVANCE_PER_GROUP,
                advancement_criteria: TABLE_TIEBREAKS.to_vec(),
                description: format!(
                    "Top {DEFAULT_TEAMS_ADVANCE_PER_GROUP} teams from each group advance"
                ),
            },
        }
    }

    fn is_complete(&self, _event: &Event, matches: &[Match]) -> bool {
        all_completed(matches)
    }

    fn allows_draws(&self) -> bool {
        true
    }
}
