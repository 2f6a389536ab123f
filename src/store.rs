//! Persistence and cache seams, with the in-memory implementations used by default.
//!
//! `MemoryStore` keeps every event behind one `RwLock`. All mutations of an event's match set
//! happen under a single write guard, so a bracket replacement is all-or-nothing and filling a
//! slot is a compare-and-set.

use crate::models::{
    BracketError, BracketType, Event, EventId, EventStatus, Format, Match, MatchId, MatchStatus,
    ScoreReport, Side, SlotKey, Team, TeamId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Which slot of the target match a team should be written into.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SlotTarget {
    Side(Side),
    /// Team 1 if empty, else team 2.
    FirstEmpty,
}

pub trait MatchStore: Send + Sync {
    fn insert_event(&self, event: Event) -> Result<(), BracketError>;

    fn event(&self, event_id: EventId) -> Result<Event, BracketError>;

    /// All match rows of the event, ordered by bracket type, group, round and position.
    fn matches(&self, event_id: EventId) -> Result<Vec<Match>, BracketError>;

    fn find_match(&self, match_id: MatchId) -> Result<Match, BracketError>;

    /// Atomically drop the event's matches, insert `matches`, and mark the event ongoing
    /// with the given format, participants and generation time.
    fn replace_bracket(
        &self,
        event_id: EventId,
        format: Format,
        teams: Vec<Team>,
        matches: Vec<Match>,
        generated_at: DateTime<Utc>,
    ) -> Result<(), BracketError>;

    /// Add rows (a new Swiss round) to an existing bracket.
    fn append_matches(&self, event_id: EventId, matches: Vec<Match>) -> Result<(), BracketError>;

    /// Write `team_id` into an empty slot of the match at `key` and return the updated row.
    /// Idempotent when the team is already in the match; `MatchSlotConflict` when the
    /// targeted slot holds another team.
    fn fill_slot(&self, key: SlotKey, target: SlotTarget, team_id: TeamId)
        -> Result<Match, BracketError>;

    /// Complete a one-team match as a walkover for the team present.
    fn mark_walkover(&self, key: SlotKey) -> Result<Match, BracketError>;

    fn start_match(&self, match_id: MatchId) -> Result<Match, BracketError>;

    fn record_result(
        &self,
        match_id: MatchId,
        report: &ScoreReport,
        completed_at: DateTime<Utc>,
    ) -> Result<Match, BracketError>;

    /// Put the result fields of `previous` back onto its row, undoing a `record_result`.
    fn restore_result(&self, previous: &Match) -> Result<Match, BracketError>;
}

struct EventEntry {
    event: Event,
    matches: Vec<Match>,
}

#[derive(Default)]
pub struct MemoryStore {
    events: RwLock<HashMap<EventId, EventEntry>>,
}

fn lock_error() -> BracketError {
    BracketError::Storage("lock error".to_string())
}

fn sort_key(m: &Match) -> (BracketType, Option<u32>, u32, u32) {
    (m.bracket_type, m.group_number, m.round, m.bracket_position)
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<EventId, EventEntry>>, BracketError> {
        self.events.read().map_err(|_| lock_error())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<EventId, EventEntry>>, BracketError> {
        self.events.write().map_err(|_| lock_error())
    }
}

/// Entry whose bracket has been generated, for updates against existing rows.
fn bracketed_entry(
    g: &mut HashMap<EventId, EventEntry>,
    event_id: EventId,
) -> Result<&mut EventEntry, BracketError> {
    let entry = g
        .get_mut(&event_id)
        .ok_or(BracketError::EventNotFound(event_id))?;
    if entry.event.format.is_none() {
        return Err(BracketError::BracketNotFound(event_id));
    }
    Ok(entry)
}

fn match_at(entry: &mut EventEntry, key: SlotKey) -> Result<&mut Match, BracketError> {
    entry
        .matches
        .iter_mut()
        .find(|m| m.key() == key)
        .ok_or(BracketError::BracketNotFound(key.event_id))
}

fn match_by_id(
    g: &mut HashMap<EventId, EventEntry>,
    match_id: MatchId,
) -> Result<&mut Match, BracketError> {
    g.values_mut()
        .flat_map(|entry| entry.matches.iter_mut())
        .find(|m| m.id == match_id)
        .ok_or(BracketError::MatchNotFound(match_id))
}

impl MatchStore for MemoryStore {
    fn insert_event(&self, event: Event) -> Result<(), BracketError> {
        let mut g = self.write()?;
        g.insert(
            event.id,
            EventEntry {
                event,
                matches: Vec::new(),
            },
        );
        Ok(())
    }

    fn event(&self, event_id: EventId) -> Result<Event, BracketError> {
        let g = self.read()?;
        g.get(&event_id)
            .map(|entry| entry.event.clone())
            .ok_or(BracketError::EventNotFound(event_id))
    }

    fn matches(&self, event_id: EventId) -> Result<Vec<Match>, BracketError> {
        let g = self.read()?;
        let entry = g.get(&event_id).ok_or(BracketError::EventNotFound(event_id))?;
        let mut matches = entry.matches.clone();
        matches.sort_by_key(sort_key);
        Ok(matches)
    }

    fn find_match(&self, match_id: MatchId) -> Result<Match, BracketError> {
        let g = self.read()?;
        g.values()
            .flat_map(|entry| entry.matches.iter())
            .find(|m| m.id == match_id)
            .cloned()
            .ok_or(BracketError::MatchNotFound(match_id))
    }

    fn replace_bracket(
        &self,
        event_id: EventId,
        format: Format,
        teams: Vec<Team>,
        matches: Vec<Match>,
        generated_at: DateTime<Utc>,
    ) -> Result<(), BracketError> {
        let mut g = self.write()?;
        let entry = g
            .get_mut(&event_id)
            .ok_or(BracketError::EventNotFound(event_id))?;
        entry.matches = matches;
        entry.event.format = Some(format);
        entry.event.status = EventStatus::Ongoing;
        entry.event.teams = teams;
        entry.event.bracket_generated_at = Some(generated_at);
        Ok(())
    }

    fn append_matches(&self, event_id: EventId, matches: Vec<Match>) -> Result<(), BracketError> {
        let mut g = self.write()?;
        let entry = bracketed_entry(&mut g, event_id)?;
        if let Some(taken) = matches
            .iter()
            .find(|new| entry.matches.iter().any(|m| m.key() == new.key()))
        {
            return Err(BracketError::MatchSlotConflict { slot: taken.key() });
        }
        entry.matches.extend(matches);
        Ok(())
    }

    fn fill_slot(
        &self,
        key: SlotKey,
        target: SlotTarget,
        team_id: TeamId,
    ) -> Result<Match, BracketError> {
        let mut g = self.write()?;
        let entry = bracketed_entry(&mut g, key.event_id)?;
        let m = match_at(entry, key)?;
        if m.has_team(team_id) {
            return Ok(m.clone());
        }
        let side = match target {
            SlotTarget::Side(side) if m.team(side).is_none() => Some(side),
            SlotTarget::Side(_) => None,
            SlotTarget::FirstEmpty => [Side::One, Side::Two]
                .into_iter()
                .find(|side| m.team(*side).is_none()),
        };
        let Some(side) = side else {
            log::error!("slot conflict: {key} already holds {:?} / {:?}", m.team1_id, m.team2_id);
            return Err(BracketError::MatchSlotConflict { slot: key });
        };
        m.set_team(side, team_id);
        if m.status == MatchStatus::Pending {
            m.status = m.status_for_slots();
        }
        log::debug!("filled {key} {side:?} with team {team_id}");
        Ok(m.clone())
    }

    fn mark_walkover(&self, key: SlotKey) -> Result<Match, BracketError> {
        let mut g = self.write()?;
        let entry = bracketed_entry(&mut g, key.event_id)?;
        let m = match_at(entry, key)?;
        let (score1, score2) = match (m.team1_id, m.team2_id) {
            (Some(_), None) => (1, 0),
            (None, Some(_)) => (0, 1),
            _ => {
                return Err(BracketError::InvalidResult(format!(
                    "walkover needs exactly one team in {key}"
                )))
            }
        };
        m.team1_score = Some(score1);
        m.team2_score = Some(score2);
        m.walkover = true;
        m.status = MatchStatus::Completed;
        m.completed_at = Some(Utc::now());
        Ok(m.clone())
    }

    fn start_match(&self, match_id: MatchId) -> Result<Match, BracketError> {
        let mut g = self.write()?;
        let m = match_by_id(&mut g, match_id)?;
        if m.status != MatchStatus::Scheduled {
            log::warn!("match {match_id} cannot start from {:?}", m.status);
            return Err(BracketError::InvalidResult(format!(
                "match {match_id} is not scheduled"
            )));
        }
        m.status = MatchStatus::Live;
        Ok(m.clone())
    }

    fn record_result(
        &self,
        match_id: MatchId,
        report: &ScoreReport,
        completed_at: DateTime<Utc>,
    ) -> Result<Match, BracketError> {
        let mut g = self.write()?;
        let m = match_by_id(&mut g, match_id)?;
        if !matches!(m.status, MatchStatus::Scheduled | MatchStatus::Live) {
            log::warn!("result reported for match {match_id} in state {:?}", m.status);
            return Err(BracketError::InvalidResult(format!(
                "match {match_id} is not ready for a result"
            )));
        }
        m.team1_score = Some(report.team1_score);
        m.team2_score = Some(report.team2_score);
        m.maps_data = report.maps.clone();
        m.status = MatchStatus::Completed;
        m.completed_at = Some(completed_at);
        Ok(m.clone())
    }

    fn restore_result(&self, previous: &Match) -> Result<Match, BracketError> {
        let mut g = self.write()?;
        let m = match_by_id(&mut g, previous.id)?;
        m.team1_score = previous.team1_score;
        m.team2_score = previous.team2_score;
        m.maps_data = previous.maps_data.clone();
        m.status = previous.status;
        m.completed_at = previous.completed_at;
        m.walkover = previous.walkover;
        Ok(m.clone())
    }
}

/// A completed match seen from one team's side.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PastResult {
    pub own_score: u32,
    pub opponent_score: u32,
    pub completed_at: DateTime<Utc>,
}

/// Source of recent results for performance seeding.
pub trait MatchHistory {
    /// At most `limit` results completed at or after `since`, newest first.
    fn recent_results(&self, team_id: TeamId, since: DateTime<Utc>, limit: usize) -> Vec<PastResult>;
}

impl MatchHistory for MemoryStore {
    fn recent_results(&self, team_id: TeamId, since: DateTime<Utc>, limit: usize) -> Vec<PastResult> {
        let g = match self.read() {
            Ok(g) => g,
            Err(e) => {
                log::warn!("match history unavailable: {e}");
                return Vec::new();
            }
        };
        let mut results: Vec<PastResult> = g
            .values()
            .flat_map(|entry| entry.matches.iter())
            .filter(|m| m.is_completed() && !m.walkover)
            .filter_map(|m| {
                let completed_at = m.completed_at.filter(|at| *at >= since)?;
                let (own_score, opponent_score) = m.scores_for(team_id)?;
                Some(PastResult {
                    own_score,
                    opponent_score,
                    completed_at,
                })
            })
            .collect();
        results.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        results.truncate(limit);
        results
    }
}

impl MatchHistory for HashMap<TeamId, Vec<PastResult>> {
    fn recent_results(&self, team_id: TeamId, since: DateTime<Utc>, limit: usize) -> Vec<PastResult> {
        let mut results: Vec<PastResult> = self
            .get(&team_id)
            .map(|all| all.iter().filter(|r| r.completed_at >= since).cloned().collect())
            .unwrap_or_default();
        results.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        results.truncate(limit);
        results
    }
}

/// Cache keys holding derived bracket data for an event.
pub fn bracket_cache_keys(event_id: EventId) -> Vec<String> {
    vec![
        format!("bracket_data_{event_id}"),
        format!("bracket_metadata_{event_id}"),
        format!("event_{event_id}"),
    ]
}

pub trait CacheInvalidator: Send + Sync {
    fn invalidate(&self, keys: &[String]);
}

/// Records every invalidated key, in order.
#[derive(Default)]
pub struct MemoryCache {
    invalidated: Mutex<Vec<String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invalidated(&self) -> Vec<String> {
        match self.invalidated.lock() {
            Ok(keys) => keys.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl CacheInvalidator for MemoryCache {
    fn invalidate(&self, keys: &[String]) {
        let mut g = match self.invalidated.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        g.extend(keys.iter().cloned());
    }
}
