//! Tournament bracket engine: seeding, generation, advancement and standings for single
//! elimination, double elimination, Swiss, round robin and group stage events.

pub mod config;
pub mod logic;
pub mod models;
pub mod roster;
pub mod store;

pub use config::GenerationOptions;
pub use logic::{
    BracketOrchestrator, BracketView, FormatInfo, FormatRegistry, FormatStrategy,
    GenerationSummary, SeedingMethod, SwissPairingMethod, TeamCountCheck, TournamentProgress,
};
pub use models::{
    BestOf, BracketError, BracketType, EliminationStanding, Event, EventId, EventStatus, Format,
    GroupQualifier, MapResult, Match, MatchId, MatchStatus, ScoreReport, Side, Standings,
    SwissStanding, TableStanding, Team, TeamId,
};
pub use store::{MatchStore, MemoryCache, MemoryStore};
