//! One run of the game
//!
//! `GameSession` owns the physics world and every subsystem that reads or
//! writes it. It is advanced by [`super::tick`] and read through
//! [`GameSession::snapshot`].

use super::collectibles::CollectibleSpawner;
use super::physics::{BodyState, PhysicsWorld, SurfaceMaterial};
use super::snapshot::{HudStats, Snapshot, VehicleView};
use super::state::{OutcomeKind, SessionOutcome, SessionState};
use super::vehicle::VehicleController;
use super::world::WorldStreamer;
use crate::consts::SIM_DT;
use crate::settings::VehiclePreset;
use crate::tuning::{Tuning, TuningError};

pub struct GameSession {
    pub(super) tuning: Tuning,
    pub(super) physics: PhysicsWorld,
    pub(super) world: WorldStreamer,
    pub(super) spawner: CollectibleSpawner,
    pub(super) vehicle: VehicleController,
    pub(super) state: SessionState,
}

impl GameSession {
    /// Build the world around the start position with a full tank
    ///
    /// Tuning is validated first; the tick path assumes it is sane.
    pub fn new(seed: u64, tuning: Tuning, preset: VehiclePreset) -> Result<Self, TuningError> {
        tuning.validate()?;

        let mut physics = PhysicsWorld::new(
            tuning.physics.gravity,
            tuning.physics.pixels_per_meter,
            SIM_DT,
        );

        let start_x = tuning.vehicle.start_x;
        let mut world = WorldStreamer::new(
            &tuning.stream,
            tuning.terrain,
            SurfaceMaterial {
                friction: tuning.physics.ground_friction,
                restitution: tuning.physics.ground_restitution,
            },
            tuning.physics.ground_thickness,
            start_x,
        );
        world.extend(start_x, &mut physics);

        let vehicle = VehicleController::spawn(
            &mut physics,
            &tuning.vehicle,
            preset.sprite_size(),
            preset.mass(),
        );
        let spawner = CollectibleSpawner::new(seed, start_x);

        log::info!(
            "Session started: seed={} vehicle={} ground={} segments",
            seed,
            preset.as_str(),
            world.segment_count()
        );

        Ok(Self {
            tuning,
            physics,
            world,
            spawner,
            vehicle,
            state: SessionState::new(seed),
        })
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Direct access for scripted scenarios and debug tools
    pub fn state_mut(&mut self) -> &mut SessionState {
        &mut self.state
    }

    pub fn world(&self) -> &WorldStreamer {
        &self.world
    }

    pub fn spawner(&self) -> &CollectibleSpawner {
        &self.spawner
    }

    pub fn vehicle(&self) -> &VehicleController {
        &self.vehicle
    }

    /// Current pose of the car body
    pub fn vehicle_body(&self) -> BodyState {
        self.vehicle.body_state(&self.physics).unwrap_or_default()
    }

    pub fn is_over(&self) -> bool {
        self.state.outcome.is_some()
    }

    pub fn outcome(&self) -> Option<SessionOutcome> {
        self.state.outcome
    }

    /// End the run now, freezing the stats
    pub(super) fn finish(&mut self, kind: OutcomeKind) -> SessionOutcome {
        self.state.finish(kind, self.tuning.physics.pixels_per_meter)
    }

    /// Copy out everything the presentation layer draws
    pub fn snapshot(&self) -> Snapshot {
        let body = self.vehicle_body();
        let state = &self.state;
        let ppm = self.tuning.physics.pixels_per_meter;
        let grace_left = |since: Option<f32>, grace: f32| {
            since.map(|start| (grace - (state.elapsed - start)).max(0.0))
        };

        Snapshot {
            tick: state.ticks,
            phase: state.phase,
            vehicle: VehicleView {
                pos: body.position,
                velocity: body.velocity,
                angle: body.angle,
                angular_velocity: body.angular_velocity,
                sprite_size: self.vehicle.sprite_size(),
                grounded: self.vehicle.grounded(),
                state: self.vehicle.state(),
            },
            terrain: self.world.points().iter().copied().collect(),
            coins: self.spawner.coins().to_vec(),
            fuel_cans: self.spawner.fuel_cans().to_vec(),
            stats: HudStats {
                fuel: state.fuel,
                coins: state.coins,
                flips: state.flips,
                distance_m: state.distance / ppm,
                best_distance_m: state.best_distance / ppm,
                elapsed: state.elapsed,
                engine_disabled: state.engine_disabled,
                fuel_grace_left: grace_left(state.out_of_fuel_since, self.tuning.fuel.grace_period),
                flip_grace_left: grace_left(
                    state.upside_down_since,
                    self.tuning.failure.flip_grace_period,
                ),
            },
            outcome: state.outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn session() -> GameSession {
        GameSession::new(42, Tuning::default(), VehiclePreset::Jeep).expect("default tuning")
    }

    #[test]
    fn test_invalid_tuning_is_rejected() {
        let mut tuning = Tuning::default();
        tuning.coins.cluster_min = 6;
        tuning.coins.cluster_max = 2;
        assert!(matches!(
            GameSession::new(1, tuning, VehiclePreset::Jeep),
            Err(TuningError::Invalid { field: "coins.cluster_min", .. })
        ));

        let mut tuning = Tuning::default();
        tuning.stream.step = 0.0;
        assert!(GameSession::new(1, tuning, VehiclePreset::Jeep).is_err());
    }

    #[test]
    fn test_new_session_covers_window() {
        let s = session();
        let tuning = s.tuning();
        let start = tuning.vehicle.start_x;

        let first = s.world().first_x().expect("ground");
        let last = s.world().last_x().expect("ground");
        assert!(first <= start - tuning.stream.buffer_behind);
        assert!(last >= start + tuning.stream.buffer_ahead);
        assert_eq!(s.world().segment_count(), s.world().points().len() - 1);
    }

    #[test]
    fn test_vehicle_starts_at_spawn_point() {
        let s = session();
        let body = s.vehicle_body();
        assert_eq!(body.position, Vec2::new(200.0, 150.0));
        assert_eq!(body.velocity, Vec2::ZERO);
        assert!(!s.is_over());
    }

    #[test]
    fn test_snapshot_mirrors_state() {
        let s = session();
        let snap = s.snapshot();
        assert_eq!(snap.tick, 0);
        assert_eq!(snap.stats.fuel, s.state().fuel);
        assert_eq!(snap.terrain.len(), s.world().points().len());
        assert_eq!(snap.vehicle.sprite_size, VehiclePreset::Jeep.sprite_size());
        assert!(snap.stats.fuel_grace_left.is_none());
        assert!(snap.outcome.is_none());
    }

    #[test]
    fn test_grace_countdown_in_snapshot() {
        let mut s = session();
        s.state_mut().elapsed = 12.0;
        s.state_mut().out_of_fuel_since = Some(10.0);
        let left = s.snapshot().stats.fuel_grace_left.expect("countdown");
        assert!((left - 3.0).abs() < 1e-4);
    }
}
