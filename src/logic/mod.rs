//! Bracket business logic: seeding, the five formats, standings and the orchestrator.

mod double_elimination;
mod format;
mod group_stage;
mod orchestrator;
mod round_robin;
mod seeding;
mod single_elimination;
mod standings;
mod swiss;
mod view;

pub use double_elimination::{lower_round_count, lower_round_sizes, DoubleElimination};
pub use format::{FormatInfo, FormatRegistry, FormatStrategy};
pub use group_stage::{distribute_into_groups, group_count, group_standings, GroupStage};
pub use orchestrator::{BracketOrchestrator, GenerationSummary, TeamCountCheck, TournamentProgress};
pub use round_robin::{RoundRobin, RoundRobinScheduling};
pub use seeding::{
    apply_seeding_method, calculate_bye_distribution, generate_round_robin_schedule,
    generate_seeding_pattern, generate_single_elimination_seeds, generate_swiss_initial_pairing,
    next_power_of_two, performance_score, validate_seeding, ByeDistribution, InitialPairing,
    SeedingMethod, SeedingValidation, SwissPairingMethod,
};
pub use single_elimination::{round_count, round_sizes, SingleElimination};
pub use standings::{
    elimination_standings, head_to_head, table_standings, HeadToHead, TiebreakKey, DRAW_POINTS,
    TABLE_TIEBREAKS, WIN_POINTS,
};
pub use swiss::{completed_rounds, planned_rounds, swiss_standings, Swiss};
pub use view::{AdvancementRules, BracketView, GroupView, MatchView, RoundView, SlotView};
