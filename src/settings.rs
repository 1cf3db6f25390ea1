//! Player settings and vehicle presets
//!
//! Persisted as JSON next to the player records.

use std::path::Path;
use std::str::FromStr;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::persistence::{self, PersistenceError};

/// Selectable cars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum VehiclePreset {
    #[default]
    Jeep,
    Truck,
    Buggy,
}

impl VehiclePreset {
    pub const ALL: [VehiclePreset; 3] = [VehiclePreset::Jeep, VehiclePreset::Truck, VehiclePreset::Buggy];

    pub fn as_str(&self) -> &'static str {
        match self {
            VehiclePreset::Jeep => "jeep",
            VehiclePreset::Truck => "truck",
            VehiclePreset::Buggy => "buggy",
        }
    }

    /// Sprite footprint in world units; the collision box derives from it
    pub fn sprite_size(&self) -> Vec2 {
        match self {
            VehiclePreset::Jeep => Vec2::new(120.0, 60.0),
            VehiclePreset::Truck => Vec2::new(150.0, 72.0),
            VehiclePreset::Buggy => Vec2::new(100.0, 50.0),
        }
    }

    pub fn mass(&self) -> f32 {
        match self {
            VehiclePreset::Jeep => 8.0,
            VehiclePreset::Truck => 11.0,
            VehiclePreset::Buggy => 6.0,
        }
    }
}

impl FromStr for VehiclePreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jeep" => Ok(VehiclePreset::Jeep),
            "truck" => Ok(VehiclePreset::Truck),
            "buggy" => Ok(VehiclePreset::Buggy),
            other => Err(format!(
                "unknown vehicle `{other}` (expected one of: jeep, truck, buggy)"
            )),
        }
    }
}

/// Player preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Key into the player records
    pub player_name: String,
    pub vehicle: VehiclePreset,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            player_name: "Player".to_string(),
            vehicle: VehiclePreset::Jeep,
        }
    }
}

impl Settings {
    /// Load settings, falling back to defaults if the file is missing or bad
    pub fn load(path: &Path) -> Self {
        match persistence::read_json::<Settings>(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(PersistenceError::NotFound { .. }) => {
                log::info!("No settings at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                log::warn!("Ignoring settings: {}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), PersistenceError> {
        persistence::write_json_atomic(path, self)?;
        log::info!("Settings saved");
        Ok(())
    }
}
