//! Team data structure.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a team (used in match slots and lookups).
pub type TeamId = Uuid;

/// A competing team. Immutable for the duration of a bracket computation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    /// Numeric strength used by rating-based seeding.
    pub rating: f64,
    pub region: String,
    /// Manually assigned seed (1 = best); `None` sorts last.
    pub seed: Option<u32>,
}

impl Team {
    /// Create a team with the given name and rating. Region defaults to "Unknown", no seed.
    pub fn new(name: impl Into<String>, rating: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            rating,
            region: "Unknown".to_string(),
            seed: None,
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = Some(seed);
        self
    }
}
