//! Data structures for the bracket engine: teams, events, matches, standings.

mod error;
mod event;
mod game;
mod standing;
mod team;

pub use error::BracketError;
pub use event::{Event, EventId, EventStatus, Format};
pub use game::{BestOf, BracketType, MapResult, Match, MatchId, MatchStatus, ScoreReport, Side, SlotKey};
pub use standing::{EliminationStanding, GroupQualifier, Standings, SwissStanding, TableStanding};
pub use team::{Team, TeamId};
