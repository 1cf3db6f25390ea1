//! Data-driven game balance
//!
//! Every constant the simulation reads lives here, grouped by subsystem.
//! Each section is `#[serde(default)]`, so a tuning file only has to name
//! the values it overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::TerrainProfile;

/// Errors raised while loading a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed tuning: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Physics world parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsTuning {
    /// Downward acceleration (world is y-down)
    pub gravity: f32,
    /// World units per meter, for solver tolerances and distance display
    pub pixels_per_meter: f32,
    pub ground_friction: f32,
    pub ground_restitution: f32,
    /// Radius of the capsule around each terrain edge
    pub ground_thickness: f32,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            gravity: 900.0,
            pixels_per_meter: 30.0,
            ground_friction: 1.0,
            ground_restitution: 0.1,
            ground_thickness: 4.0,
        }
    }
}

/// Terrain window parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamTuning {
    /// Horizontal spacing between terrain samples
    pub step: f32,
    /// Ground kept generated ahead of the vehicle
    pub buffer_ahead: f32,
    /// Ground (and pickups) kept behind the vehicle
    pub buffer_behind: f32,
}

impl Default for StreamTuning {
    fn default() -> Self {
        Self {
            step: 30.0,
            buffer_ahead: 1800.0,
            buffer_behind: 600.0,
        }
    }
}

/// Vehicle body and drive parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleTuning {
    pub start_x: f32,
    pub start_y: f32,
    /// Collision box height as a fraction of the sprite height
    pub body_height_ratio: f32,
    pub corner_radius: f32,
    pub friction: f32,
    pub restitution: f32,
    /// Drive forces only apply while |v_x| is below this
    pub speed_limit: f32,
    pub accel_force: f32,
    /// Scaled by `dt * 60` so it feels the same at any tick rate
    pub boost_force: f32,
    /// Steady extra push that helps on climbs
    pub hill_assist_force: f32,
    /// Angular velocity added per tick of air control (rad/s)
    pub air_spin_step: f32,
    /// Pickup reach as a fraction of the sprite width
    pub pickup_reach_fraction: f32,
}

impl Default for VehicleTuning {
    fn default() -> Self {
        Self {
            start_x: 200.0,
            start_y: 150.0,
            body_height_ratio: 0.55,
            corner_radius: 14.0,
            friction: 0.15,
            restitution: 0.2,
            speed_limit: 2000.0,
            accel_force: 9500.0,
            boost_force: 14000.0,
            hill_assist_force: 1800.0,
            air_spin_step: 0.25,
            pickup_reach_fraction: 0.5,
        }
    }
}

/// Fuel consumption and refill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuelTuning {
    /// Passive drain per tick
    pub deplete_rate: f32,
    /// Extra drain per tick while the engine is pushing
    pub accel_drain: f32,
    /// Smart fuel cans only spawn below this level
    pub low_threshold: f32,
    pub refill_amount: f32,
    /// Seconds at zero fuel before the run ends
    pub grace_period: f32,
}

impl Default for FuelTuning {
    fn default() -> Self {
        Self {
            deplete_rate: 0.02,
            accel_drain: 0.03,
            low_threshold: 35.0,
            refill_amount: 40.0,
            grace_period: 5.0,
        }
    }
}

/// Coin cluster spawning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoinTuning {
    /// Clusters are spawned this far ahead of the vehicle
    pub lookahead_margin: f32,
    pub spacing_min: f32,
    pub spacing_max: f32,
    /// Horizontal gap between coins in one cluster
    pub gap: f32,
    pub cluster_min: u32,
    pub cluster_max: u32,
    /// Height above the ground
    pub vertical_offset: f32,
    pub item_radius: f32,
    /// Coins awarded per completed airborne flip
    pub flip_bonus: u32,
}

impl Default for CoinTuning {
    fn default() -> Self {
        Self {
            lookahead_margin: 4000.0,
            spacing_min: 600.0,
            spacing_max: 1400.0,
            gap: 45.0,
            cluster_min: 2,
            cluster_max: 6,
            vertical_offset: 60.0,
            item_radius: 20.0,
            flip_bonus: 25,
        }
    }
}

/// Smart fuel can spawning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuelCanTuning {
    /// A new can spawns only if no can lies within this distance ahead
    pub min_gas_distance: f32,
    /// Where, ahead of the vehicle, a new can appears
    pub smart_spawn_distance: f32,
    pub vertical_offset: f32,
    pub item_radius: f32,
}

impl Default for FuelCanTuning {
    fn default() -> Self {
        Self {
            min_gas_distance: 1500.0,
            smart_spawn_distance: 1200.0,
            vertical_offset: 60.0,
            item_radius: 24.0,
        }
    }
}

/// Flip failure detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FailureTuning {
    /// Seconds upside down and still before the run ends
    pub flip_grace_period: f32,
    /// Below this angular speed (rad/s) the body counts as still
    pub still_angular_speed: f32,
    /// Below this linear speed the body counts as still
    pub still_linear_speed: f32,
}

impl Default for FailureTuning {
    fn default() -> Self {
        Self {
            flip_grace_period: 5.0,
            still_angular_speed: 0.5,
            still_linear_speed: 25.0,
        }
    }
}

/// Complete balance sheet for one session
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub physics: PhysicsTuning,
    pub terrain: TerrainProfile,
    pub stream: StreamTuning,
    pub vehicle: VehicleTuning,
    pub fuel: FuelTuning,
    pub coins: CoinTuning,
    pub fuel_cans: FuelCanTuning,
    pub failure: FailureTuning,
}

impl Tuning {
    /// Parse and validate a JSON tuning document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load and validate a tuning file
    pub fn load(path: &Path) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path).map_err(|source| TuningError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        positive("stream.step", self.stream.step)?;
        positive("stream.buffer_ahead", self.stream.buffer_ahead)?;
        positive("stream.buffer_behind", self.stream.buffer_behind)?;
        positive("physics.pixels_per_meter", self.physics.pixels_per_meter)?;
        positive("fuel.grace_period", self.fuel.grace_period)?;
        positive("failure.flip_grace_period", self.failure.flip_grace_period)?;
        positive("coins.spacing_min", self.coins.spacing_min)?;

        if self.coins.spacing_min > self.coins.spacing_max {
            return Err(invalid(
                "coins.spacing_max",
                format!(
                    "{} is below spacing_min {}",
                    self.coins.spacing_max, self.coins.spacing_min
                ),
            ));
        }
        if self.coins.cluster_min == 0 || self.coins.cluster_min > self.coins.cluster_max {
            return Err(invalid(
                "coins.cluster_min",
                format!(
                    "cluster range {}..={} is empty",
                    self.coins.cluster_min, self.coins.cluster_max
                ),
            ));
        }
        if self.fuel_cans.smart_spawn_distance > self.fuel_cans.min_gas_distance {
            // New cans must land inside the distance the search checks
            return Err(invalid(
                "fuel_cans.smart_spawn_distance",
                format!(
                    "{} exceeds min_gas_distance {}",
                    self.fuel_cans.smart_spawn_distance, self.fuel_cans.min_gas_distance
                ),
            ));
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), TuningError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, format!("{value} must be positive")))
    }
}

fn invalid(field: &'static str, reason: String) -> TuningError {
    TuningError::Invalid { field, reason }
}
