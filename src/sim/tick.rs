//! Fixed timestep simulation tick
//!
//! Core game loop that advances a session deterministically.

use super::session::GameSession;
use super::state::{GameEvent, GamePhase, OutcomeKind};
use crate::normalize_degrees;

/// Airborne tilt the autopilot tolerates before correcting
const AUTOPILOT_LEVEL_TOLERANCE_DEG: f32 = 8.0;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Reverse / spin clockwise in the air
    pub left: bool,
    /// Accelerate / spin counter-clockwise in the air
    pub right: bool,
    /// Pause toggle
    pub pause: bool,
    /// End the session now
    pub quit: bool,
    /// Demo mode - the autopilot drives
    pub autopilot: bool,
}

impl TickInput {
    /// -1, 0 or +1; opposite keys cancel
    pub fn throttle(&self) -> f32 {
        (self.right as i8 - self.left as i8) as f32
    }
}

/// Advance the session by one fixed timestep
///
/// Order within a tick: controller update, physics step, ground streaming,
/// collectible spawning, collection, then pruning behind the vehicle.
pub fn tick(session: &mut GameSession, input: &TickInput) -> Vec<GameEvent> {
    let mut events = Vec::new();

    if session.state.phase == GamePhase::Over {
        return events;
    }

    if input.quit {
        let outcome = session.finish(OutcomeKind::UserQuit);
        events.push(GameEvent::SessionEnded(outcome));
        return events;
    }

    // Handle pause toggle
    if input.pause {
        match session.state.phase {
            GamePhase::Running => {
                session.state.phase = GamePhase::Paused;
                events.push(GameEvent::Paused);
                return events;
            }
            GamePhase::Paused => {
                session.state.phase = GamePhase::Running;
                events.push(GameEvent::Resumed);
            }
            GamePhase::Over => {}
        }
    }

    if session.state.phase == GamePhase::Paused {
        return events;
    }

    let dt = session.physics.dt();
    session.state.ticks += 1;
    session.state.elapsed = session.state.ticks as f32 * dt;

    let input = if input.autopilot {
        autopilot_input(session)
    } else {
        input.clone()
    };

    if let Some(kind) = session.vehicle.update(
        &mut session.physics,
        input.throttle(),
        &mut session.state,
        &session.tuning,
        &mut events,
    ) {
        let outcome = session.finish(kind);
        events.push(GameEvent::SessionEnded(outcome));
        return events;
    }

    session.physics.step();

    let Some(body) = session.vehicle.body_state(&session.physics) else {
        log::warn!("Vehicle body missing after step");
        return events;
    };
    let vx = body.position.x;
    let tuning = &session.tuning;

    session.world.extend(vx, &mut session.physics);
    session.world.prune(vx, &mut session.physics);

    session.spawner.spawn_coins(vx, &tuning.terrain, &tuning.coins);
    session.spawner.spawn_fuel(
        vx,
        session.state.fuel,
        tuning.fuel.low_threshold,
        &tuning.terrain,
        &tuning.fuel_cans,
    );

    let pickups = session.spawner.collect(
        body.position,
        session.vehicle.sprite_size().x,
        tuning.vehicle.pickup_reach_fraction,
        &tuning.coins,
        &tuning.fuel_cans,
    );
    for id in pickups.coins {
        session.state.coins += 1;
        events.push(GameEvent::CoinCollected { id });
    }
    for id in pickups.fuel_cans {
        session.state.refuel(tuning.fuel.refill_amount);
        events.push(GameEvent::FuelCollected {
            id,
            fuel: session.state.fuel,
        });
        log::debug!("Fuel can {} collected, tank at {:.1}", id, session.state.fuel);
    }

    session.spawner.prune(vx, tuning.stream.buffer_behind);

    session.state.advance_distance(body.velocity.x * dt);

    events
}

/// Demo driver: full throttle on the ground, level with the slope in the air
fn autopilot_input(session: &GameSession) -> TickInput {
    let mut input = TickInput {
        autopilot: true,
        ..Default::default()
    };
    let Some(body) = session.vehicle.body_state(&session.physics) else {
        return input;
    };

    if session.vehicle.grounded() {
        input.right = true;
    } else {
        let target = session.world.slope_angle_at(body.position.x).to_degrees();
        let error = normalize_degrees(body.angle.to_degrees() - target);
        // Right spins the angle down, left spins it up
        if error > AUTOPILOT_LEVEL_TOLERANCE_DEG {
            input.right = true;
        } else if error < -AUTOPILOT_LEVEL_TOLERANCE_DEG {
            input.left = true;
        }
    }
    input
}
