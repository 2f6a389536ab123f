//! Entry point for callers: dispatches to the format strategies, persists through the store and
//! invalidates cached bracket data after every mutation.

use crate::config::GenerationOptions;
use crate::logic::format::{FormatInfo, FormatRegistry, FormatStrategy};
use crate::logic::group_stage;
use crate::logic::seeding::apply_seeding_method;
use crate::logic::view::BracketView;
use crate::models::{
    BracketError, Event, EventId, Format, GroupQualifier, Match, MatchId, ScoreReport, Standings,
    Team, TeamId,
};
use crate::store::{bracket_cache_keys, CacheInvalidator, MatchHistory, MatchStore};
use chrono::Utc;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GenerationSummary {
    pub success: bool,
    pub matches_created: usize,
    pub format: Format,
    pub teams_count: usize,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct TeamCountCheck {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TournamentProgress {
    pub format: Format,
    pub total_matches: usize,
    pub completed_matches: usize,
    pub progress_percentage: f64,
    pub is_complete: bool,
}

pub struct BracketOrchestrator<S, C> {
    store: S,
    cache: C,
    registry: FormatRegistry,
}

impl<S, C> BracketOrchestrator<S, C>
where
    S: MatchStore + MatchHistory,
    C: CacheInvalidator,
{
    pub fn new(store: S, cache: C) -> Self {
        Self::with_registry(store, cache, FormatRegistry::standard())
    }

    pub fn with_registry(store: S, cache: C, registry: FormatRegistry) -> Self {
        Self {
            store,
            cache,
            registry,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    fn invalidate(&self, event_id: EventId) {
        let keys = bracket_cache_keys(event_id);
        log::debug!("invalidating {keys:?}");
        self.cache.invalidate(&keys);
    }

    /// Strategy for the format the event's bracket was generated with.
    fn strategy_for_event(&self, event_id: EventId) -> Result<&dyn FormatStrategy, BracketError> {
        let format = self.store.event(event_id)?.bracket_format()?;
        self.registry.get(format)
    }

    /// Seed, generate and persist a fresh bracket, replacing any previous one. Nothing is
    /// written when validation or generation fails.
    pub fn generate_bracket(
        &self,
        event_id: EventId,
        format: Format,
        teams: Vec<Team>,
        options: &GenerationOptions,
    ) -> Result<GenerationSummary, BracketError> {
        let strategy = self.registry.get(format)?;
        self.store.event(event_id)?;
        if let Err(e) = strategy.validate_team_count(teams.len()) {
            log::warn!("rejected {format} bracket for event {event_id}: {e}");
            return Err(e);
        }
        let teams_count = teams.len();
        let ordered = if strategy.info().supports_seeding {
            apply_seeding_method(&teams, options.seeding_method, options, &self.store)
        } else {
            teams
        };
        let matches = strategy.generate(event_id, &ordered, options)?;
        let matches_created = matches.len();
        self.store
            .replace_bracket(event_id, format, ordered, matches, Utc::now())?;
        self.invalidate(event_id);
        log::info!(
            "generated {format} bracket for event {event_id}: {teams_count} teams, {matches_created} matches"
        );
        Ok(GenerationSummary {
            success: true,
            matches_created,
            format,
            teams_count,
        })
    }

    /// Event and match rows of a bracket generated in `format`.
    fn generated_bracket(&self, event_id: EventId, format: Format) -> Result<(Event, Vec<Match>), BracketError> {
        let event = self.store.event(event_id)?;
        let generated = event.bracket_format()?;
        if generated != format {
            log::warn!("event {event_id} holds a {generated} bracket, not {format}");
            return Err(BracketError::InvalidFormat(format.tag().to_string()));
        }
        let matches = self.store.matches(event_id)?;
        if matches.is_empty() {
            return Err(BracketError::BracketNotFound(event_id));
        }
        Ok((event, matches))
    }

    pub fn bracket_structure(&self, event_id: EventId, format: Format) -> Result<BracketView, BracketError> {
        let (event, matches) = self.generated_bracket(event_id, format)?;
        Ok(self.registry.get(format)?.bracket_view(&event, &matches))
    }

    pub fn advance_winner(&self, finished: &Match, winner: TeamId) -> Result<(), BracketError> {
        if !finished.has_team(winner) {
            return Err(BracketError::TeamNotInMatch {
                team_id: winner,
                match_id: finished.id,
            });
        }
        let strategy = self.strategy_for_event(finished.event_id)?;
        strategy.advance_winner(&self.store, finished, winner)?;
        self.invalidate(finished.event_id);
        Ok(())
    }

    pub fn move_loser_to_lower_bracket(&self, finished: &Match, loser: TeamId) -> Result<(), BracketError> {
        if !finished.has_team(loser) {
            return Err(BracketError::TeamNotInMatch {
                team_id: loser,
                match_id: finished.id,
            });
        }
        let strategy = self.strategy_for_event(finished.event_id)?;
        strategy.move_loser(&self.store, finished, loser)?;
        self.invalidate(finished.event_id);
        Ok(())
    }

    /// Record final scores, then move the winner (and a double elimination loser) on.
    /// When either move fails the recorded result is rolled back, so the report can be retried.
    pub fn report_result(&self, match_id: MatchId, report: ScoreReport) -> Result<Match, BracketError> {
        let current = self.store.find_match(match_id)?;
        let strategy = self.strategy_for_event(current.event_id)?;
        if report.team1_score == report.team2_score && !strategy.allows_draws() {
            return Err(BracketError::InvalidResult(format!(
                "draws are not allowed in {}",
                strategy.format()
            )));
        }
        let completed = self.store.record_result(match_id, &report, Utc::now())?;
        if let Err(e) = self.propagate(strategy, &completed) {
            log::error!("advancing from match {match_id} failed, restoring its previous state: {e}");
            self.store.restore_result(&current)?;
            self.invalidate(completed.event_id);
            return Err(e);
        }
        self.invalidate(completed.event_id);
        Ok(completed)
    }

    fn propagate(&self, strategy: &dyn FormatStrategy, completed: &Match) -> Result<(), BracketError> {
        if let Some(winner) = completed.winner_id() {
            strategy.advance_winner(&self.store, completed, winner)?;
        }
        if let Some(loser) = completed.loser_id() {
            strategy.move_loser(&self.store, completed, loser)?;
        }
        Ok(())
    }

    pub fn start_match(&self, match_id: MatchId) -> Result<Match, BracketError> {
        let started = self.store.start_match(match_id)?;
        self.invalidate(started.event_id);
        Ok(started)
    }

    pub fn calculate_standings(&self, event_id: EventId, format: Format) -> Result<Standings, BracketError> {
        let (event, matches) = self.generated_bracket(event_id, format)?;
        Ok(self.registry.get(format)?.standings(&event, &matches))
    }

    pub fn is_complete(&self, event_id: EventId, format: Format) -> Result<bool, BracketError> {
        let event = self.store.event(event_id)?;
        let matches = self.store.matches(event_id)?;
        if matches.is_empty() {
            return Ok(false);
        }
        Ok(self.registry.get(format)?.is_complete(&event, &matches))
    }

    /// Pair and persist the next Swiss round. Empty once the planned rounds are played.
    pub fn next_swiss_round(&self, event_id: EventId, options: &GenerationOptions) -> Result<Vec<Match>, BracketError> {
        let event = self.store.event(event_id)?;
        let strategy = self.registry.get(event.bracket_format()?)?;
        let matches = self.store.matches(event_id)?;
        let round = strategy.next_round(&event, &matches, options)?;
        if round.is_empty() {
            return Ok(round);
        }
        self.store.append_matches(event_id, round.clone())?;
        self.invalidate(event_id);
        log::info!(
            "paired round {} for event {event_id}: {} matches",
            round[0].round,
            round.len()
        );
        Ok(round)
    }

    pub fn group_qualifiers(&self, event_id: EventId, options: &GenerationOptions) -> Result<Vec<GroupQualifier>, BracketError> {
        let event = self.store.event(event_id)?;
        let format = event.bracket_format()?;
        if format != Format::GroupStage {
            return Err(BracketError::InvalidFormat(format.tag().to_string()));
        }
        let matches = self.store.matches(event_id)?;
        Ok(group_stage::qualifiers(&event, &matches, options.teams_advance_per_group))
    }

    pub fn progress(&self, event_id: EventId) -> Result<TournamentProgress, BracketError> {
        let event = self.store.event(event_id)?;
        let format = event.bracket_format()?;
        let matches = self.store.matches(event_id)?;
        let total_matches = matches.len();
        let completed_matches = matches.iter().filter(|m| m.is_completed()).count();
        let progress_percentage = if total_matches > 0 {
            (completed_matches as f64 / total_matches as f64 * 1000.0).round() / 10.0
        } else {
            0.0
        };
        Ok(TournamentProgress {
            format,
            total_matches,
            completed_matches,
            progress_percentage,
            is_complete: total_matches > 0 && self.registry.get(format)?.is_complete(&event, &matches),
        })
    }

    pub fn format_info(&self, tag: &str) -> Option<FormatInfo> {
        let format: Format = tag.parse().ok()?;
        self.registry.get(format).ok().map(|s| s.info())
    }

    /// Check a team count against a format before generation is attempted.
    pub fn validate_team_count(&self, tag: &str, team_count: usize) -> TeamCountCheck {
        let strategy = match tag.parse().and_then(|format| self.registry.get(format)) {
            Ok(s) => s,
            Err(_) => {
                return TeamCountCheck {
                    valid: false,
                    error: Some("Invalid format".to_string()),
                }
            }
        };
        match strategy.validate_team_count(team_count) {
            Ok(()) => TeamCountCheck {
                valid: true,
                error: None,
            },
            Err(BracketError::InsufficientTeams { required, .. }) => TeamCountCheck {
                valid: false,
                error: Some(format!(
                    "Minimum {required} teams required for {}",
                    strategy.info().name
                )),
            },
            Err(e) => TeamCountCheck {
                valid: false,
                error: Some(e.to_string()),
            },
        }
    }
}
