//! Player records
//!
//! One entry per player name, merged at the end of every run and persisted
//! as a plain JSON object (`{ "name": { ...stats } }`).

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::persistence::{self, PersistenceError};
use crate::sim::FinalStats;

/// Lifetime stats for one player
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerStats {
    /// Best single-run distance, in meters
    pub max_distance: f32,
    /// Total coins over all runs
    pub coins: u64,
    /// Total flips over all runs
    pub flips: u64,
    pub runs: u32,
}

/// Name → stats mapping
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerRecords {
    players: BTreeMap<String, PlayerStats>,
}

impl PlayerRecords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&PlayerStats> {
        self.players.get(name)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Fold a finished run into the player's record, creating it if needed
    pub fn merge(&mut self, name: &str, run: &FinalStats) -> PlayerStats {
        let entry = self.players.entry(name.to_string()).or_default();
        entry.max_distance = entry.max_distance.max(run.distance_m);
        entry.coins += u64::from(run.coins);
        entry.flips += u64::from(run.flips);
        entry.runs += 1;
        *entry
    }

    /// Top `n` players by best distance (ties by name)
    pub fn leaderboard(&self, n: usize) -> Vec<(&str, &PlayerStats)> {
        let mut rows: Vec<_> = self
            .players
            .iter()
            .map(|(name, stats)| (name.as_str(), stats))
            .collect();
        rows.sort_by(|a, b| {
            b.1.max_distance
                .total_cmp(&a.1.max_distance)
                .then_with(|| a.0.cmp(b.0))
        });
        rows.truncate(n);
        rows
    }

    /// Rank a run by `name` would take among the other players (1-indexed)
    ///
    /// The player's own earlier best never counts against the run.
    pub fn rank_for(&self, name: &str, distance_m: f32) -> usize {
        self.players
            .iter()
            .filter(|(other, stats)| other.as_str() != name && stats.max_distance > distance_m)
            .count()
            + 1
    }

    /// Load records, degrading to an empty set if the file is missing or bad
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(records) => {
                log::info!("Loaded {} player records", records.len());
                records
            }
            Err(PersistenceError::NotFound { .. }) => {
                log::info!("No player records found, starting fresh");
                Self::new()
            }
            Err(e) => {
                log::warn!("Discarding player records: {}", e);
                Self::new()
            }
        }
    }

    pub fn try_load(path: &Path) -> Result<Self, PersistenceError> {
        persistence::read_json(path)
    }

    pub fn save(&self, path: &Path) -> Result<(), PersistenceError> {
        persistence::write_json_atomic(path, self)?;
        log::info!("Player records saved ({} players)", self.len());
        Ok(())
    }
}
