//! Errors raised by bracket generation, advancement and storage.

use crate::models::event::EventId;
use crate::models::game::{MatchId, SlotKey};
use crate::models::team::TeamId;

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum BracketError {
    /// Unrecognized format tag.
    #[error("unsupported tournament format: {0}")]
    InvalidFormat(String),
    /// Below the format minimum.
    #[error("minimum {required} teams required (got {actual})")]
    InsufficientTeams { required: usize, actual: usize },
    /// Format-specific count constraint (e.g. Swiss preferring even counts).
    #[error("{0}")]
    InvalidTeamParity(String),
    #[error("event {0} not found")]
    EventNotFound(EventId),
    /// Advancement or update attempted before any generation.
    #[error("no bracket generated for event {0}")]
    BracketNotFound(EventId),
    #[error("match {0} not found")]
    MatchNotFound(MatchId),
    /// The downstream slot an advancement targets is already taken by another team.
    #[error("no free slot in {slot}")]
    MatchSlotConflict { slot: SlotKey },
    #[error("team {team_id} is not playing in match {match_id}")]
    TeamNotInMatch { team_id: TeamId, match_id: MatchId },
    #[error("invalid result: {0}")]
    InvalidResult(String),
    /// Next Swiss round requested before the current one finished.
    #[error("round {round} is still in progress")]
    RoundInProgress { round: u32 },
    #[error("invalid options: {0}")]
    InvalidOptions(String),
    #[error("invalid roster: {0}")]
    Roster(String),
    #[error("storage error: {0}")]
    Storage(String),
}
