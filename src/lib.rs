//! Hill Rider - an endless side-scrolling hill driving game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (terrain streaming, vehicle physics, pickups)
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences and vehicle presets
//! - `records`: Per-player best runs
//! - `persistence`: JSON load/save with backup rotation

pub mod persistence;
pub mod records;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use records::{PlayerRecords, PlayerStats};
pub use settings::{Settings, VehiclePreset};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one tick per rendered frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Fuel tank capacity
    pub const FUEL_MAX: f32 = 100.0;

    /// Air control never spins the body faster than this (rad/s)
    pub const MAX_AIR_ANGULAR_SPEED: f32 = 5.0;
    /// Upward speed cap (world is y-down, so this bounds negative y velocity)
    pub const MAX_UPWARD_SPEED: f32 = 900.0;

    /// Angle considered exactly upside down (degrees)
    pub const UPSIDE_DOWN_DEG: f32 = 180.0;
    /// Half-width of the upside-down band around 180 degrees
    pub const UPSIDE_DOWN_TOLERANCE_DEG: f32 = 10.0;

    /// One completed flip
    pub const FULL_ROTATION_DEG: f32 = 360.0;

    /// Slack for comparing tick-derived timestamps (seconds)
    pub const TIMER_EPSILON: f32 = 1.0e-3;

    /// Terrain edges shorter than this are treated as this long
    pub const MIN_SEGMENT_LENGTH: f32 = 1.0e-3;
}

/// Normalize an angle in degrees to [-180, 180)
#[inline]
pub fn normalize_degrees(angle: f32) -> f32 {
    let wrapped = wrap_degrees(angle);
    if wrapped >= 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Wrap an angle in degrees to [0, 360)
#[inline]
pub fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(0.0), 0.0);
        assert_eq!(normalize_degrees(190.0), -170.0);
        assert_eq!(normalize_degrees(-190.0), 170.0);
        assert_eq!(normalize_degrees(540.0), -180.0);
        assert_eq!(normalize_degrees(-10.0), -10.0);
    }

    #[test]
    fn test_wrap_degrees() {
        assert_eq!(wrap_degrees(-10.0), 350.0);
        assert_eq!(wrap_degrees(725.0), 5.0);
        assert!(wrap_degrees(-1.0e-9) < 360.0);
    }
}
