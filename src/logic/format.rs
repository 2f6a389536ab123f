//! The contract every bracket format implements, and the registry the orchestrator dispatches through.

use crate::config::GenerationOptions;
use crate::logic::double_elimination::DoubleElimination;
use crate::logic::group_stage::GroupStage;
use crate::logic::round_robin::RoundRobin;
use crate::logic::single_elimination::SingleElimination;
use crate::logic::swiss::Swiss;
use crate::logic::view::BracketView;
use crate::models::{BestOf, BracketError, Event, EventId, Format, Match, MatchStatus, Standings, Team, TeamId};
use crate::store::MatchStore;
use serde::Serialize;
use std::collections::HashMap;

/// Static description of a format.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FormatInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub min_teams: usize,
    pub supports_seeding: bool,
    pub has_standings: bool,
    pub stage_names: &'static [&'static str],
    pub match_format: BestOf,
}

/// Generation, advancement and read-side logic for one format.
///
/// Generators are pure: they build the full initial match set without touching the store.
/// Advancement writes through [`MatchStore::fill_slot`] so concurrent sibling completions
/// cannot overwrite each other.
pub trait FormatStrategy: Send + Sync {
    fn format(&self) -> Format;

    fn info(&self) -> FormatInfo;

    fn validate_team_count(&self, team_count: usize) -> Result<(), BracketError> {
        let required = self.info().min_teams;
        if team_count < required {
            return Err(BracketError::InsufficientTeams {
                required,
                actual: team_count,
            });
        }
        Ok(())
    }

    /// Initial match set for `teams`, already in seed order.
    fn generate(
        &self,
        event_id: EventId,
        teams: &[Team],
        options: &GenerationOptions,
    ) -> Result<Vec<Match>, BracketError>;

    /// Propagate the winner of `finished`. No-op where the format has no downstream slot.
    fn advance_winner(
        &self,
        _store: &dyn MatchStore,
        _finished: &Match,
        _winner: TeamId,
    ) -> Result<(), BracketError> {
        Ok(())
    }

    /// Propagate the loser of `finished` (double elimination only).
    fn move_loser(
        &self,
        _store: &dyn MatchStore,
        _finished: &Match,
        _loser: TeamId,
    ) -> Result<(), BracketError> {
        Ok(())
    }

    fn standings(&self, event: &Event, matches: &[Match]) -> Standings;

    fn bracket_view(&self, event: &Event, matches: &[Match]) -> BracketView;

    fn is_complete(&self, event: &Event, matches: &[Match]) -> bool;

    fn allows_draws(&self) -> bool {
        false
    }

    /// Matches of the next round for formats paired round by round. Empty when there is none.
    fn next_round(
        &self,
        _event: &Event,
        _matches: &[Match],
        _options: &GenerationOptions,
    ) -> Result<Vec<Match>, BracketError> {
        Ok(Vec::new())
    }
}

/// Elimination completion: nothing left scheduled or live.
pub(crate) fn no_open_matches(matches: &[Match]) -> bool {
    !matches
        .iter()
        .any(|m| matches!(m.status, MatchStatus::Scheduled | MatchStatus::Live))
}

/// Table-format completion: every match completed.
pub(crate) fn all_completed(matches: &[Match]) -> bool {
    !matches.is_empty() && matches.iter().all(Match::is_completed)
}

pub struct FormatRegistry {
    strategies: HashMap<Format, Box<dyn FormatStrategy>>,
}

impl FormatRegistry {
    pub fn empty() -> Self {
        Self {
            strategies: HashMap::new(),
        }
    }

    /// All five built-in formats.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(SingleElimination));
        registry.register(Box::new(DoubleElimination));
        registry.register(Box::new(Swiss));
        registry.register(Box::new(RoundRobin));
        registry.register(Box::new(GroupStage));
        registry
    }

    pub fn register(&mut self, strategy: Box<dyn FormatStrategy>) {
        self.strategies.insert(strategy.format(), strategy);
    }

    pub fn get(&self, format: Format) -> Result<&dyn FormatStrategy, BracketError> {
        self.strategies
            .get(&format)
            .map(|s| &**s)
            .ok_or_else(|| BracketError::InvalidFormat(format.tag().to_string()))
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
