//! CSV roster import.
//!
//! Expected headers: `name,rating,region,seed` with an optional `id` column. Empty `region`
//! becomes "Unknown"; empty `seed` leaves the team unseeded.

use crate::models::{BracketError, Team};
use serde::Deserialize;
use std::collections::HashSet;
use std::io::Read;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
struct TeamRecord {
    #[serde(default)]
    id: Option<Uuid>,
    name: String,
    rating: f64,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    seed: Option<u32>,
}

pub fn read_teams<R: Read>(reader: R) -> Result<Vec<Team>, BracketError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut teams = Vec::new();
    let mut names = HashSet::new();
    for (row, result) in rdr.deserialize::<TeamRecord>().enumerate() {
        let record = result.map_err(|e| BracketError::Roster(format!("row {}: {e}", row + 1)))?;
        let name = record.name.trim().to_string();
        if name.is_empty() {
            return Err(BracketError::Roster(format!("row {}: empty team name", row + 1)));
        }
        if !names.insert(name.to_lowercase()) {
            return Err(BracketError::Roster(format!("duplicate team name: {name}")));
        }
        let mut team = Team::new(name, record.rating);
        if let Some(id) = record.id {
            team.id = id;
        }
        if let Some(region) = record.region.filter(|r| !r.is_empty()) {
            team = team.with_region(region);
        }
        team.seed = record.seed;
        teams.push(team);
    }
    Ok(teams)
}
