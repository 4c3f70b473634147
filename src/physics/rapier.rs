//! Rapier3D physics runtime adapter
//!
//! Owns the Rapier sets and pipelines, builds the course colliders from a
//! `CourseLayout` and exposes bodies through `PhysicsWorld`.

use glam::{Quat, Vec3};
use nalgebra::{Quaternion, UnitQuaternion};
use rapier3d::prelude::*;

use super::{CourseBuilder, PhysicsWorld, RayHit};
use crate::sim::PlayerTuning;
use crate::sim::level::{CourseLayout, StaticBox};

/// Standard gravity (m/s²)
pub const GRAVITY: f32 = 9.81;

/// Bounciness and friction of everything on the course
const COURSE_RESTITUTION: f32 = 0.2;
const COURSE_FRICTION: f32 = 0.0;

#[inline]
fn to_vector(v: Vec3) -> Vector<Real> {
    vector![v.x, v.y, v.z]
}

#[inline]
fn to_glam(v: &Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

#[inline]
fn to_rotation(q: Quat) -> UnitQuaternion<Real> {
    UnitQuaternion::new_normalize(Quaternion::new(q.w, q.x, q.y, q.z))
}

fn static_box(shape: &StaticBox) -> Collider {
    let h = shape.half_extents;
    ColliderBuilder::cuboid(h.x, h.y, h.z)
        .translation(to_vector(shape.center))
        .restitution(COURSE_RESTITUTION)
        .friction(COURSE_FRICTION)
        .build()
}

/// Rapier world holding the course and the player ball
pub struct RapierWorld {
    pub gravity: Vector<Real>,
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub integration_parameters: IntegrationParameters,
    pub physics_pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub impulse_joint_set: ImpulseJointSet,
    pub multibody_joint_set: MultibodyJointSet,
    pub ccd_solver: CCDSolver,
    pub query_pipeline: QueryPipeline,

    /// Fixed course body first, then one kinematic body per obstacle
    course_bodies: Vec<RigidBodyHandle>,
    player: Option<RigidBodyHandle>,
}

impl Default for RapierWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl RapierWorld {
    pub fn new() -> Self {
        Self {
            gravity: vector![0.0, -GRAVITY, 0.0],
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            course_bodies: Vec::new(),
            player: None,
        }
    }

    /// Steps the simulation forward by dt seconds
    pub fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    /// Create the player ball at its spawn point
    pub fn spawn_player(&mut self, tuning: &PlayerTuning) -> RigidBodyHandle {
        if let Some(old) = self.player.take() {
            self.remove_body(old);
        }

        let body = RigidBodyBuilder::dynamic()
            .translation(to_vector(tuning.spawn))
            .linear_damping(tuning.linear_damping)
            .angular_damping(tuning.angular_damping)
            .can_sleep(false)
            .build();
        let handle = self.rigid_body_set.insert(body);

        let collider = ColliderBuilder::ball(tuning.radius)
            .restitution(tuning.restitution)
            .friction(tuning.friction)
            .build();
        self.collider_set
            .insert_with_parent(collider, handle, &mut self.rigid_body_set);

        self.player = Some(handle);
        self.query_pipeline.update(&self.collider_set);
        log::debug!("Spawned player body {handle:?}");
        handle
    }

    pub fn player(&self) -> Option<RigidBodyHandle> {
        self.player
    }

    /// Number of bodies making up the current course
    pub fn course_body_count(&self) -> usize {
        self.course_bodies.len()
    }

    /// Current rotation of a body
    pub fn rotation(&self, body: RigidBodyHandle) -> Option<Quat> {
        self.rigid_body_set.get(body).map(|b| {
            let q = b.rotation();
            Quat::from_xyzw(q.i, q.j, q.k, q.w)
        })
    }

    fn remove_body(&mut self, handle: RigidBodyHandle) {
        self.rigid_body_set.remove(
            handle,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        );
    }
}

impl PhysicsWorld for RapierWorld {
    type Handle = RigidBodyHandle;

    fn translation(&self, body: RigidBodyHandle) -> Option<Vec3> {
        self.rigid_body_set.get(body).map(|b| to_glam(b.translation()))
    }

    fn set_translation(&mut self, body: RigidBodyHandle, position: Vec3) {
        if let Some(b) = self.rigid_body_set.get_mut(body) {
            b.set_translation(to_vector(position), true);
        }
    }

    fn linear_velocity(&self, body: RigidBodyHandle) -> Option<Vec3> {
        self.rigid_body_set.get(body).map(|b| to_glam(b.linvel()))
    }

    fn set_linear_velocity(&mut self, body: RigidBodyHandle, velocity: Vec3) {
        if let Some(b) = self.rigid_body_set.get_mut(body) {
            b.set_linvel(to_vector(velocity), true);
        }
    }

    fn set_angular_velocity(&mut self, body: RigidBodyHandle, velocity: Vec3) {
        if let Some(b) = self.rigid_body_set.get_mut(body) {
            b.set_angvel(to_vector(velocity), true);
        }
    }

    fn apply_impulse(&mut self, body: RigidBodyHandle, impulse: Vec3) {
        if let Some(b) = self.rigid_body_set.get_mut(body) {
            b.apply_impulse(to_vector(impulse), true);
        }
    }

    fn apply_torque_impulse(&mut self, body: RigidBodyHandle, torque: Vec3) {
        if let Some(b) = self.rigid_body_set.get_mut(body) {
            b.apply_torque_impulse(to_vector(torque), true);
        }
    }

    fn set_next_kinematic_pose(
        &mut self,
        body: RigidBodyHandle,
        translation: Option<Vec3>,
        rotation: Option<Quat>,
    ) {
        if let Some(b) = self.rigid_body_set.get_mut(body) {
            if !b.is_kinematic() {
                return;
            }
            if let Some(translation) = translation {
                b.set_next_kinematic_translation(to_vector(translation));
            }
            if let Some(rotation) = rotation {
                b.set_next_kinematic_rotation(to_rotation(rotation));
            }
        }
    }

    fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        let ray = Ray::new(point![origin.x, origin.y, origin.z], to_vector(direction));
        let filter = match self.player {
            Some(player) => QueryFilter::default().exclude_rigid_body(player),
            None => QueryFilter::default(),
        };

        self.query_pipeline
            .cast_ray(
                &self.rigid_body_set,
                &self.collider_set,
                &ray,
                max_distance,
                true, // solid
                filter,
            )
            .map(|(_, toi)| RayHit {
                time_of_impact: toi,
            })
    }
}

impl CourseBuilder for RapierWorld {
    fn build_course(&mut self, layout: &CourseLayout) -> Vec<RigidBodyHandle> {
        self.clear_course();

        let course = self.rigid_body_set.insert(RigidBodyBuilder::fixed().build());
        for shape in std::iter::once(&layout.floor).chain(&layout.walls) {
            self.collider_set
                .insert_with_parent(static_box(shape), course, &mut self.rigid_body_set);
        }
        self.course_bodies.push(course);

        let mut obstacle_bodies = Vec::with_capacity(layout.obstacles.len());
        for obstacle in &layout.obstacles {
            let body = RigidBodyBuilder::kinematic_position_based()
                .translation(to_vector(obstacle.rest_translation()))
                .build();
            let handle = self.rigid_body_set.insert(body);

            let h = obstacle.kind.bar_half_extents();
            let collider = ColliderBuilder::cuboid(h.x, h.y, h.z)
                .restitution(COURSE_RESTITUTION)
                .friction(COURSE_FRICTION)
                .build();
            self.collider_set
                .insert_with_parent(collider, handle, &mut self.rigid_body_set);

            self.course_bodies.push(handle);
            obstacle_bodies.push(handle);
        }

        self.query_pipeline.update(&self.collider_set);
        log::info!(
            "Built course: {} blocks, {} obstacle bodies",
            layout.length_in_blocks(),
            obstacle_bodies.len()
        );
        obstacle_bodies
    }

    fn clear_course(&mut self) {
        for handle in std::mem::take(&mut self.course_bodies) {
            self.remove_body(handle);
        }
        self.query_pipeline.update(&self.collider_set);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::{Level, LevelSpec};
    use crate::sim::ObstacleKind;

    fn course(count: u32) -> (RapierWorld, Vec<RigidBodyHandle>) {
        let mut world = RapierWorld::new();
        let level = Level::new(LevelSpec {
            count,
            types: ObstacleKind::ALL.to_vec(),
            seed: 5,
        });
        let bodies = world.build_course(&level.layout());
        (world, bodies)
    }

    #[test]
    fn test_build_course_creates_bodies() {
        let (world, bodies) = course(4);
        assert_eq!(bodies.len(), 4);
        assert_eq!(world.course_body_count(), 5);
        // floor + 3 walls + 4 bars
        assert_eq!(world.collider_set.len(), 8);
    }

    #[test]
    fn test_rebuild_replaces_course() {
        let (mut world, _) = course(4);
        let level = Level::new(LevelSpec {
            count: 2,
            types: ObstacleKind::ALL.to_vec(),
            seed: 9,
        });
        let bodies = world.build_course(&level.layout());
        assert_eq!(bodies.len(), 2);
        assert_eq!(world.rigid_body_set.len(), 3);
        assert_eq!(world.collider_set.len(), 6);
    }

    #[test]
    fn test_ray_hits_floor_below_spawn() {
        let (mut world, _) = course(2);
        let tuning = PlayerTuning::default();
        world.spawn_player(&tuning);

        let hit = world
            .cast_ray(Vec3::new(0.0, 0.69, 0.0), Vec3::NEG_Y, 10.0)
            .expect("floor below the start block");
        assert!((hit.time_of_impact - 0.69).abs() < 1e-3);

        // Off the side of the course there is nothing to hit
        assert!(world.cast_ray(Vec3::new(10.0, 0.5, 0.0), Vec3::NEG_Y, 10.0).is_none());
    }

    #[test]
    fn test_kinematic_pose_moves_bar() {
        let (mut world, bodies) = course(1);
        let target = Vec3::new(0.5, 1.5, -4.0);
        world.set_next_kinematic_pose(bodies[0], Some(target), Some(Quat::from_rotation_y(0.3)));
        world.step(1.0 / 60.0);

        let pos = world.translation(bodies[0]).unwrap();
        assert!((pos - target).length() < 1e-4);
        let rot = world.rotation(bodies[0]).unwrap();
        assert!(rot.angle_between(Quat::from_rotation_y(0.3)) < 1e-3);
    }

    #[test]
    fn test_stale_handle_is_ignored() {
        let (mut world, bodies) = course(1);
        world.clear_course();
        assert!(world.translation(bodies[0]).is_none());
        world.apply_impulse(bodies[0], Vec3::Y);
        world.set_next_kinematic_pose(bodies[0], Some(Vec3::ZERO), None);
    }
}
