//! Read-only view of a session for the presentation layer

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collectibles::Collectible;
use super::state::{GamePhase, SessionOutcome};
use super::vehicle::VehicleState;
use super::world::TerrainPoint;

/// Vehicle pose for drawing the sprite and driving the camera
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehicleView {
    pub pos: Vec2,
    pub velocity: Vec2,
    /// Radians
    pub angle: f32,
    pub angular_velocity: f32,
    pub sprite_size: Vec2,
    pub grounded: bool,
    pub state: VehicleState,
}

/// Numbers for the HUD
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HudStats {
    pub fuel: f32,
    pub coins: u32,
    pub flips: u32,
    pub distance_m: f32,
    pub best_distance_m: f32,
    pub elapsed: f32,
    pub engine_disabled: bool,
    /// Seconds left before an empty tank ends the run
    pub fuel_grace_left: Option<f32>,
    /// Seconds left before lying upside down ends the run
    pub flip_grace_left: Option<f32>,
}

/// Everything needed to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: u64,
    pub phase: GamePhase,
    pub vehicle: VehicleView,
    pub terrain: Vec<TerrainPoint>,
    pub coins: Vec<Collectible>,
    pub fuel_cans: Vec<Collectible>,
    pub stats: HudStats,
    pub outcome: Option<SessionOutcome>,
}
