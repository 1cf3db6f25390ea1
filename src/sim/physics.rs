//! Rigid-body physics world
//!
//! Thin owner of a rapier world. The rest of the simulation only sees glam
//! vectors and opaque handles: static ground edges, one dynamic rounded box,
//! forces applied along the body's local axes, a contact query, and a fixed
//! step.

use glam::Vec2;
use rapier2d::prelude::*;

pub use rapier2d::prelude::{ColliderHandle, RigidBodyHandle};

/// Contact response of a collision shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceMaterial {
    pub friction: f32,
    pub restitution: f32,
}

/// Description of a dynamic rounded box body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxBodyDesc {
    pub position: Vec2,
    pub half_extents: Vec2,
    pub corner_radius: f32,
    pub mass: f32,
    /// Moment of inertia about the center of mass
    pub inertia: f32,
    pub material: SurfaceMaterial,
}

/// Pose and velocity read back from a body after a step
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BodyState {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Radians, counter-clockwise in world axes (clockwise on a y-down screen)
    pub angle: f32,
    pub angular_velocity: f32,
}

/// Moment of inertia of a solid box about its center
#[inline]
pub fn box_inertia(mass: f32, size: Vec2) -> f32 {
    mass * (size.x * size.x + size.y * size.y) / 12.0
}

/// The physics capability used by the session
pub struct PhysicsWorld {
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
}

impl PhysicsWorld {
    /// Create an empty world stepping by `dt`
    ///
    /// `length_unit` is how many world units make one meter; rapier scales its
    /// contact tolerances by it.
    pub fn new(gravity: f32, length_unit: f32, dt: f32) -> Self {
        let integration_parameters = IntegrationParameters {
            dt,
            length_unit,
            ..IntegrationParameters::default()
        };

        Self {
            gravity: vector![0.0, gravity],
            integration_parameters,
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
        }
    }

    /// Fixed timestep this world advances by
    pub fn dt(&self) -> f32 {
        self.integration_parameters.dt
    }

    /// Add a static ground edge from `a` to `b`, rounded by `thickness`
    pub fn add_static_segment(
        &mut self,
        a: Vec2,
        b: Vec2,
        thickness: f32,
        material: SurfaceMaterial,
    ) -> ColliderHandle {
        let shape = SharedShape::capsule(point![a.x, a.y], point![b.x, b.y], thickness);
        let collider = ColliderBuilder::new(shape)
            .friction(material.friction)
            .restitution(material.restitution)
            .build();
        self.colliders.insert(collider)
    }

    /// Remove a collider; returns false if it was already gone
    pub fn remove_collider(&mut self, handle: ColliderHandle) -> bool {
        self.colliders
            .remove(handle, &mut self.islands, &mut self.bodies, false)
            .is_some()
    }

    /// Add a dynamic rounded box with explicit mass and inertia
    pub fn add_box_body(&mut self, desc: &BoxBodyDesc) -> (RigidBodyHandle, ColliderHandle) {
        let body = RigidBodyBuilder::dynamic()
            .translation(vector![desc.position.x, desc.position.y])
            .additional_mass_properties(MassProperties::new(
                point![0.0, 0.0],
                desc.mass,
                desc.inertia,
            ))
            .can_sleep(false)
            .ccd_enabled(true)
            .build();
        let body_handle = self.bodies.insert(body);

        // Mass comes from the body; the shape only contributes contacts
        let collider = ColliderBuilder::round_cuboid(
            desc.half_extents.x,
            desc.half_extents.y,
            desc.corner_radius,
        )
        .density(0.0)
        .friction(desc.material.friction)
        .friction_combine_rule(CoefficientCombineRule::Multiply)
        .restitution(desc.material.restitution)
        .build();
        let collider_handle =
            self.colliders
                .insert_with_parent(collider, body_handle, &mut self.bodies);

        (body_handle, collider_handle)
    }

    /// Read back a body's pose and velocity
    pub fn body_state(&self, handle: RigidBodyHandle) -> Option<BodyState> {
        let body = self.bodies.get(handle)?;
        let translation = body.translation();
        let linvel = body.linvel();
        Some(BodyState {
            position: Vec2::new(translation.x, translation.y),
            velocity: Vec2::new(linvel.x, linvel.y),
            angle: body.rotation().angle(),
            angular_velocity: body.angvel(),
        })
    }

    /// Clear forces and torques accumulated for the next step
    pub fn reset_forces(&mut self, handle: RigidBodyHandle) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.reset_forces(true);
            body.reset_torques(true);
        }
    }

    /// Apply a force expressed in the body's local frame, through its center
    pub fn apply_local_force(&mut self, handle: RigidBodyHandle, local: Vec2) {
        if let Some(body) = self.bodies.get_mut(handle) {
            let world = body.rotation().transform_vector(&vector![local.x, local.y]);
            body.add_force(world, true);
        }
    }

    pub fn set_linear_velocity(&mut self, handle: RigidBodyHandle, velocity: Vec2) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.set_linvel(vector![velocity.x, velocity.y], true);
        }
    }

    pub fn set_angular_velocity(&mut self, handle: RigidBodyHandle, angular_velocity: f32) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.set_angvel(angular_velocity, true);
        }
    }

    /// Teleport a body and stop it
    #[cfg(test)]
    pub(crate) fn set_pose(&mut self, handle: RigidBodyHandle, position: Vec2, angle: f32) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.set_position(Isometry::new(vector![position.x, position.y], angle), true);
            body.set_linvel(vector![0.0, 0.0], true);
            body.set_angvel(0.0, true);
        }
    }

    /// True if the collider touches anything, as of the last step
    pub fn in_contact(&self, collider: ColliderHandle) -> bool {
        self.narrow_phase
            .contact_pairs_with(collider)
            .any(|pair| pair.has_any_active_contact)
    }

    /// Number of live colliders (ground edges plus the vehicle)
    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    /// Advance the world by one fixed timestep
    pub fn step(&mut self) {
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;

    const GROUND: SurfaceMaterial = SurfaceMaterial {
        friction: 1.0,
        restitution: 0.0,
    };

    fn crate_desc(position: Vec2) -> BoxBodyDesc {
        let size = Vec2::new(80.0, 30.0);
        BoxBodyDesc {
            position,
            half_extents: size / 2.0,
            corner_radius: 5.0,
            mass: 8.0,
            inertia: box_inertia(8.0, size),
            material: SurfaceMaterial {
                friction: 0.5,
                restitution: 0.0,
            },
        }
    }

    #[test]
    fn test_box_inertia_matches_solid_box() {
        assert_eq!(box_inertia(12.0, Vec2::new(3.0, 4.0)), 25.0);
    }

    #[test]
    fn test_segments_add_and_remove() {
        let mut world = PhysicsWorld::new(900.0, 30.0, SIM_DT);
        let a = world.add_static_segment(Vec2::ZERO, Vec2::new(30.0, 0.0), 4.0, GROUND);
        let b = world.add_static_segment(Vec2::new(30.0, 0.0), Vec2::new(60.0, 5.0), 4.0, GROUND);
        assert_eq!(world.collider_count(), 2);

        assert!(world.remove_collider(a));
        assert!(!world.remove_collider(a));
        assert_eq!(world.collider_count(), 1);
        assert!(world.remove_collider(b));
        assert_eq!(world.collider_count(), 0);
    }

    #[test]
    fn test_free_fall_moves_down_the_screen() {
        let mut world = PhysicsWorld::new(900.0, 30.0, SIM_DT);
        let (body, collider) = world.add_box_body(&crate_desc(Vec2::new(0.0, 0.0)));

        for _ in 0..30 {
            world.step();
        }

        let state = world.body_state(body).expect("body exists");
        assert!(state.position.y > 50.0, "fell to {}", state.position.y);
        assert!(state.velocity.y > 0.0);
        assert!(!world.in_contact(collider));
    }

    #[test]
    fn test_body_comes_to_rest_on_ground() {
        let mut world = PhysicsWorld::new(900.0, 30.0, SIM_DT);
        world.add_static_segment(
            Vec2::new(-500.0, 500.0),
            Vec2::new(500.0, 500.0),
            4.0,
            GROUND,
        );
        let (body, collider) = world.add_box_body(&crate_desc(Vec2::new(0.0, 400.0)));

        for _ in 0..180 {
            world.step();
        }

        let state = world.body_state(body).expect("body exists");
        // Ground top is 496, box bottom sits half height plus corner radius below center
        let resting_y = 496.0 - 15.0 - 5.0;
        assert!(
            (state.position.y - resting_y).abs() < 5.0,
            "rested at {}",
            state.position.y
        );
        assert!(world.in_contact(collider));
    }

    #[test]
    fn test_local_force_follows_rotation() {
        let mut world = PhysicsWorld::new(0.0, 30.0, SIM_DT);
        let (body, _) = world.add_box_body(&crate_desc(Vec2::ZERO));
        world.set_angular_velocity(body, 0.0);

        world.apply_local_force(body, Vec2::new(800.0, 0.0));
        world.step();

        let state = world.body_state(body).expect("body exists");
        assert!(state.velocity.x > 0.0);
        assert!(state.velocity.y.abs() < 1e-3);
    }
}
