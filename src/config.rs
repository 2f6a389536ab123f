//! Options controlling bracket generation. Every field has a default, so `{}` is a valid options document.

use crate::logic::{RoundRobinScheduling, SeedingMethod, SwissPairingMethod};
use crate::models::BracketError;
use serde::{Deserialize, Serialize};

/// Default number of teams advancing out of each group.
pub const DEFAULT_TEAMS_ADVANCE_PER_GROUP: usize = 2;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    #[serde(default)]
    pub seeding_method: SeedingMethod,
    /// Apply limited swaps after rating seeding.
    #[serde(default)]
    pub randomize_seeds: bool,
    #[serde(default = "default_randomization_factor")]
    pub randomization_factor: f64,
    /// Look-back window for performance seeding.
    #[serde(default = "default_performance_weeks")]
    pub performance_weeks: i64,
    #[serde(default = "default_performance_match_limit")]
    pub performance_match_limit: usize,
    #[serde(default)]
    pub swiss_pairing: SwissPairingMethod,
    #[serde(default)]
    pub round_robin_scheduling: RoundRobinScheduling,
    #[serde(default = "default_teams_advance_per_group")]
    pub teams_advance_per_group: usize,
}

fn default_randomization_factor() -> f64 {
    0.2
}

fn default_performance_weeks() -> i64 {
    8
}

fn default_performance_match_limit() -> usize {
    20
}

fn default_teams_advance_per_group() -> usize {
    DEFAULT_TEAMS_ADVANCE_PER_GROUP
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            seeding_method: SeedingMethod::default(),
            randomize_seeds: false,
            randomization_factor: default_randomization_factor(),
            performance_weeks: default_performance_weeks(),
            performance_match_limit: default_performance_match_limit(),
            swiss_pairing: SwissPairingMethod::default(),
            round_robin_scheduling: RoundRobinScheduling::default(),
            teams_advance_per_group: default_teams_advance_per_group(),
        }
    }
}

impl GenerationOptions {
    pub fn from_json(s: &str) -> Result<Self, BracketError> {
        let options: Self =
            serde_json::from_str(s).map_err(|e| BracketError::InvalidOptions(e.to_string()))?;
        if !(0.0..=1.0).contains(&options.randomization_factor) {
            return Err(BracketError::InvalidOptions(format!(
                "randomization_factor must be within 0..=1 (got {})",
                options.randomization_factor
            )));
        }
        Ok(options)
    }

    pub fn with_seeding(mut self, method: SeedingMethod) -> Self {
        self.seeding_method = method;
        self
    }
}
