//! Vehicle controller
//!
//! Owns the car's rigid body and turns per-tick input into forces. On the
//! ground the throttle pushes along the body's local x axis; in the air it
//! nudges angular velocity instead, clamped to `MAX_AIR_ANGULAR_SPEED`. The
//! controller also drains fuel, counts airborne flips and runs the two grace
//! timers that end a run.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::physics::{
    BodyState, BoxBodyDesc, ColliderHandle, PhysicsWorld, RigidBodyHandle, SurfaceMaterial,
    box_inertia,
};
use super::state::{GameEvent, OutcomeKind, SessionState};
use crate::consts::*;
use crate::tuning::{FuelTuning, Tuning, VehicleTuning};
use crate::{normalize_degrees, wrap_degrees};

/// Controller state, derived each tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleState {
    Grounded,
    Airborne,
    /// Upside down and still; ends the run once the grace period runs out
    FlippedStill,
    /// Empty tank; ends the run once the grace period runs out
    OutOfFuel,
}

/// Accumulates airborne rotation and reports completed flips
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FlipTracker {
    /// Signed degrees turned since takeoff or the last flip
    pub rotation_accumulator: f32,
    /// Body angle seen on the previous tick (degrees)
    pub last_angle: f32,
}

impl FlipTracker {
    pub fn new(angle_deg: f32) -> Self {
        Self {
            rotation_accumulator: 0.0,
            last_angle: angle_deg,
        }
    }

    /// Feed the current body angle; returns true when a full turn completes
    ///
    /// Per-tick deltas are wrapped into [-180, 180) so crossing the +-180
    /// seam counts as a small step. Touching ground discards partial turns.
    pub fn observe(&mut self, angle_deg: f32, airborne: bool) -> bool {
        let delta = normalize_degrees(angle_deg - self.last_angle);
        self.last_angle = angle_deg;

        if !airborne {
            self.rotation_accumulator = 0.0;
            return false;
        }

        self.rotation_accumulator += delta;
        if self.rotation_accumulator.abs() >= FULL_ROTATION_DEG {
            self.rotation_accumulator = 0.0;
            return true;
        }
        false
    }
}

/// Fuel left after one tick
pub fn drain_fuel(fuel: f32, accelerating: bool, tuning: &FuelTuning) -> f32 {
    let mut drain = tuning.deplete_rate;
    if accelerating {
        drain += tuning.accel_drain;
    }
    (fuel - drain).clamp(0.0, FUEL_MAX)
}

/// True if the body angle is within the upside-down band
pub fn is_upside_down(angle_deg: f32) -> bool {
    let angle = wrap_degrees(angle_deg);
    (UPSIDE_DOWN_DEG - UPSIDE_DOWN_TOLERANCE_DEG..=UPSIDE_DOWN_DEG + UPSIDE_DOWN_TOLERANCE_DEG)
        .contains(&angle)
}

/// Run a grace timer
///
/// While `active` holds, `since` keeps the time of the first tick that saw
/// the condition; returns true once it has held for `grace` seconds. Any
/// tick without the condition unsets it.
pub fn grace_expired(since: &mut Option<f32>, active: bool, now: f32, grace: f32) -> bool {
    if !active {
        *since = None;
        return false;
    }
    let start = *since.get_or_insert(now);
    now - start >= grace - TIMER_EPSILON
}

/// The player's car
pub struct VehicleController {
    body: RigidBodyHandle,
    collider: ColliderHandle,
    /// Sprite footprint; the collision box is derived from it
    sprite_size: Vec2,
    flips: FlipTracker,
    state: VehicleState,
    grounded: bool,
}

impl VehicleController {
    /// Create the car body at the start position
    pub fn spawn(
        physics: &mut PhysicsWorld,
        tuning: &VehicleTuning,
        sprite_size: Vec2,
        mass: f32,
    ) -> Self {
        let collision_size = Vec2::new(sprite_size.x, sprite_size.y * tuning.body_height_ratio);
        let (body, collider) = physics.add_box_body(&BoxBodyDesc {
            position: Vec2::new(tuning.start_x, tuning.start_y),
            half_extents: collision_size / 2.0,
            corner_radius: tuning.corner_radius,
            mass,
            inertia: box_inertia(mass, collision_size),
            material: SurfaceMaterial {
                friction: tuning.friction,
                restitution: tuning.restitution,
            },
        });

        Self {
            body,
            collider,
            sprite_size,
            flips: FlipTracker::new(0.0),
            state: VehicleState::Airborne,
            grounded: false,
        }
    }

    /// Apply one tick of control and update fuel, flips and failure timers
    ///
    /// `throttle` is -1 (left), 0 or +1 (right). Returns the terminal outcome
    /// if a grace period ran out this tick.
    pub fn update(
        &mut self,
        physics: &mut PhysicsWorld,
        throttle: f32,
        session: &mut SessionState,
        tuning: &Tuning,
        events: &mut Vec<GameEvent>,
    ) -> Option<OutcomeKind> {
        let dt = physics.dt();
        let now = session.elapsed;
        let drive = &tuning.vehicle;

        // Empty contact set means airborne
        self.grounded = physics.in_contact(self.collider);
        physics.reset_forces(self.body);
        let body = physics.body_state(self.body)?;

        let mut accelerating = false;
        if throttle != 0.0 {
            let direction = throttle.signum();
            if self.grounded {
                if !session.engine_disabled && body.velocity.x.abs() < drive.speed_limit {
                    let push =
                        drive.accel_force + drive.boost_force * dt * 60.0 + drive.hill_assist_force;
                    physics.apply_local_force(self.body, Vec2::new(direction * push, 0.0));
                    accelerating = true;
                }
            } else {
                let spin = (body.angular_velocity - direction * drive.air_spin_step)
                    .clamp(-MAX_AIR_ANGULAR_SPEED, MAX_AIR_ANGULAR_SPEED);
                physics.set_angular_velocity(self.body, spin);
            }
        }

        if body.velocity.y < -MAX_UPWARD_SPEED {
            physics.set_linear_velocity(self.body, Vec2::new(body.velocity.x, -MAX_UPWARD_SPEED));
        }

        session.fuel = drain_fuel(session.fuel, accelerating, &tuning.fuel);
        session.engine_disabled = session.fuel <= 0.0;

        let angle_deg = body.angle.to_degrees();
        if self.flips.observe(angle_deg, !self.grounded) {
            session.flips += 1;
            session.coins += tuning.coins.flip_bonus;
            events.push(GameEvent::FlipCompleted {
                total: session.flips,
            });
            log::debug!("Flip {} completed", session.flips);
        }

        let failure = &tuning.failure;
        let still = body.angular_velocity.abs() < failure.still_angular_speed
            && body.velocity.length() < failure.still_linear_speed;
        let was_upside_down = session.upside_down_since.is_some();
        let flip_expired = grace_expired(
            &mut session.upside_down_since,
            still && is_upside_down(angle_deg),
            now,
            failure.flip_grace_period,
        );
        match (was_upside_down, session.upside_down_since.is_some()) {
            (false, true) => events.push(GameEvent::UpsideDown),
            (true, false) => events.push(GameEvent::Recovered),
            _ => {}
        }

        let was_empty = session.out_of_fuel_since.is_some();
        let fuel_expired = grace_expired(
            &mut session.out_of_fuel_since,
            session.fuel <= 0.0,
            now,
            tuning.fuel.grace_period,
        );
        if !was_empty && session.out_of_fuel_since.is_some() {
            events.push(GameEvent::FuelEmpty);
        }

        self.state = if session.upside_down_since.is_some() {
            VehicleState::FlippedStill
        } else if session.out_of_fuel_since.is_some() {
            VehicleState::OutOfFuel
        } else if self.grounded {
            VehicleState::Grounded
        } else {
            VehicleState::Airborne
        };

        if flip_expired {
            Some(OutcomeKind::Flipped)
        } else if fuel_expired {
            Some(OutcomeKind::FuelExhausted)
        } else {
            None
        }
    }

    pub fn body_state(&self, physics: &PhysicsWorld) -> Option<BodyState> {
        physics.body_state(self.body)
    }

    pub fn body(&self) -> RigidBodyHandle {
        self.body
    }

    pub fn sprite_size(&self) -> Vec2 {
        self.sprite_size
    }

    pub fn grounded(&self) -> bool {
        self.grounded
    }

    pub fn state(&self) -> VehicleState {
        self.state
    }

    pub fn flips(&self) -> &FlipTracker {
        &self.flips
    }
}
