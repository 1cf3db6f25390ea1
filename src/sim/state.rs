//! Session state and outcomes
//!
//! Everything the presentation layer reads about a run, apart from geometry,
//! lives in `SessionState`. Terminal conditions are plain data.

use serde::{Deserialize, Serialize};

use crate::consts::FUEL_MAX;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Ticks advance the simulation
    Running,
    /// Ticks are ignored until resumed
    Paused,
    /// Run ended, see `SessionState::outcome`
    Over,
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeKind {
    /// Upside down and motionless past the grace period
    Flipped,
    /// Empty tank past the grace period
    FuelExhausted,
    /// External quit signal
    UserQuit,
}

impl OutcomeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeKind::Flipped => "Flipped over",
            OutcomeKind::FuelExhausted => "Out of fuel",
            OutcomeKind::UserQuit => "Quit",
        }
    }
}

/// Stats frozen at the tick a session ended
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinalStats {
    /// Furthest distance reached, in meters
    pub distance_m: f32,
    pub coins: u32,
    pub flips: u32,
    /// Seconds played
    pub elapsed: f32,
}

/// Terminal outcome with the stats to display or persist
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionOutcome {
    pub kind: OutcomeKind,
    pub stats: FinalStats,
}

/// Things that happened during a tick, for sound/HUD feedback
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    CoinCollected { id: u32 },
    FuelCollected { id: u32, fuel: f32 },
    FlipCompleted { total: u32 },
    /// Tank hit zero; the grace timer is running
    FuelEmpty,
    /// Upside down and still; the grace timer is running
    UpsideDown,
    /// Back on the wheels or moving again
    Recovered,
    Paused,
    Resumed,
    SessionEnded(SessionOutcome),
}

/// Mutable per-run aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Simulation tick counter
    pub ticks: u64,
    /// Seconds since start (`ticks * dt`)
    pub elapsed: f32,
    /// 0..=FUEL_MAX
    pub fuel: f32,
    /// Net horizontal travel in world units
    pub distance: f32,
    /// Furthest `distance` reached
    pub best_distance: f32,
    /// Coin score, including flip bonuses
    pub coins: u32,
    pub flips: u32,
    /// When the tank last hit zero
    pub out_of_fuel_since: Option<f32>,
    /// When the vehicle came to rest upside down
    pub upside_down_since: Option<f32>,
    /// No drive force while the tank is empty
    pub engine_disabled: bool,
    pub phase: GamePhase,
    pub outcome: Option<SessionOutcome>,
}

impl SessionState {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            ticks: 0,
            elapsed: 0.0,
            fuel: FUEL_MAX,
            distance: 0.0,
            best_distance: 0.0,
            coins: 0,
            flips: 0,
            out_of_fuel_since: None,
            upside_down_since: None,
            engine_disabled: false,
            phase: GamePhase::Running,
            outcome: None,
        }
    }

    /// Add fuel up to the tank capacity and clear the empty-tank timer
    pub fn refuel(&mut self, amount: f32) {
        self.fuel = (self.fuel + amount).min(FUEL_MAX);
        if self.fuel > 0.0 {
            self.out_of_fuel_since = None;
            self.engine_disabled = false;
        }
    }

    /// Record horizontal travel for this tick
    pub fn advance_distance(&mut self, dx: f32) {
        self.distance += dx;
        self.best_distance = self.best_distance.max(self.distance);
    }

    /// Snapshot of the stats as they stand now
    pub fn final_stats(&self, pixels_per_meter: f32) -> FinalStats {
        FinalStats {
            distance_m: self.best_distance / pixels_per_meter,
            coins: self.coins,
            flips: self.flips,
            elapsed: self.elapsed,
        }
    }

    /// End the session, freezing the stats
    pub fn finish(&mut self, kind: OutcomeKind, pixels_per_meter: f32) -> SessionOutcome {
        let outcome = SessionOutcome {
            kind,
            stats: self.final_stats(pixels_per_meter),
        };
        self.phase = GamePhase::Over;
        self.outcome = Some(outcome);
        log::info!(
            "Session over ({}): {:.0} m, {} coins, {} flips after {:.1}s",
            kind.as_str(),
            outcome.stats.distance_m,
            outcome.stats.coins,
            outcome.stats.flips,
            outcome.stats.elapsed
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_full_and_running() {
        let state = SessionState::new(12345);
        assert_eq!(state.fuel, FUEL_MAX);
        assert_eq!(state.phase, GamePhase::Running);
        assert!(state.outcome.is_none());
        assert!(state.out_of_fuel_since.is_none());
    }

    #[test]
    fn test_refuel_clamps_and_clears_timer() {
        let mut state = SessionState::new(1);
        state.fuel = 0.0;
        state.out_of_fuel_since = Some(3.0);
        state.engine_disabled = true;

        state.refuel(40.0);
        assert_eq!(state.fuel, 40.0);
        assert!(state.out_of_fuel_since.is_none());
        assert!(!state.engine_disabled);

        state.refuel(90.0);
        assert_eq!(state.fuel, FUEL_MAX);
    }

    #[test]
    fn test_best_distance_survives_reversing() {
        let mut state = SessionState::new(1);
        state.advance_distance(300.0);
        state.advance_distance(-120.0);
        assert_eq!(state.distance, 180.0);
        assert_eq!(state.best_distance, 300.0);
        assert_eq!(state.final_stats(30.0).distance_m, 10.0);
    }

    #[test]
    fn test_finish_freezes_outcome() {
        let mut state = SessionState::new(1);
        state.coins = 7;
        state.flips = 2;
        let outcome = state.finish(OutcomeKind::UserQuit, 30.0);
        assert_eq!(state.phase, GamePhase::Over);
        assert_eq!(state.outcome, Some(outcome));
        assert_eq!(outcome.stats.coins, 7);
        assert_eq!(outcome.stats.flips, 2);
    }
}
