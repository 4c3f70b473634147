//! Recording physics world for unit tests

use std::cell::RefCell;

use glam::{Quat, Vec3};

use super::{CameraHandle, CourseBuilder, PhysicsWorld, RayHit};
use crate::sim::level::CourseLayout;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockHandle(pub usize);

#[derive(Debug, Clone, Default)]
pub struct MockBody {
    pub translation: Vec3,
    pub linvel: Vec3,
    pub angvel: Vec3,
    pub impulses: Vec<Vec3>,
    pub torques: Vec<Vec3>,
    pub next_pose: Option<(Option<Vec3>, Option<Quat>)>,
}

#[derive(Debug, Default)]
pub struct MockWorld {
    pub bodies: Vec<MockBody>,
    /// What every ray cast returns
    pub ray_result: Option<RayHit>,
    pub rays: RefCell<Vec<(Vec3, Vec3, f32)>>,
    pub builds: usize,
}

impl MockWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, translation: Vec3) -> MockHandle {
        self.bodies.push(MockBody {
            translation,
            ..Default::default()
        });
        MockHandle(self.bodies.len() - 1)
    }

    pub fn body(&self, handle: MockHandle) -> &MockBody {
        &self.bodies[handle.0]
    }

    pub fn body_mut(&mut self, handle: MockHandle) -> &mut MockBody {
        &mut self.bodies[handle.0]
    }

    pub fn grounded(&mut self, toi: f32) {
        self.ray_result = Some(RayHit { time_of_impact: toi });
    }
}

impl PhysicsWorld for MockWorld {
    type Handle = MockHandle;

    fn translation(&self, body: MockHandle) -> Option<Vec3> {
        self.bodies.get(body.0).map(|b| b.translation)
    }

    fn set_translation(&mut self, body: MockHandle, position: Vec3) {
        if let Some(b) = self.bodies.get_mut(body.0) {
            b.translation = position;
        }
    }

    fn linear_velocity(&self, body: MockHandle) -> Option<Vec3> {
        self.bodies.get(body.0).map(|b| b.linvel)
    }

    fn set_linear_velocity(&mut self, body: MockHandle, velocity: Vec3) {
        if let Some(b) = self.bodies.get_mut(body.0) {
            b.linvel = velocity;
        }
    }

    fn set_angular_velocity(&mut self, body: MockHandle, velocity: Vec3) {
        if let Some(b) = self.bodies.get_mut(body.0) {
            b.angvel = velocity;
        }
    }

    fn apply_impulse(&mut self, body: MockHandle, impulse: Vec3) {
        if let Some(b) = self.bodies.get_mut(body.0) {
            b.impulses.push(impulse);
        }
    }

    fn apply_torque_impulse(&mut self, body: MockHandle, torque: Vec3) {
        if let Some(b) = self.bodies.get_mut(body.0) {
            b.torques.push(torque);
        }
    }

    fn set_next_kinematic_pose(
        &mut self,
        body: MockHandle,
        translation: Option<Vec3>,
        rotation: Option<Quat>,
    ) {
        if let Some(b) = self.bodies.get_mut(body.0) {
            b.next_pose = Some((translation, rotation));
        }
    }

    fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        self.rays.borrow_mut().push((origin, direction, max_distance));
        self.ray_result
    }
}

impl CourseBuilder for MockWorld {
    fn build_course(&mut self, layout: &CourseLayout) -> Vec<MockHandle> {
        self.builds += 1;
        layout
            .obstacles
            .iter()
            .map(|o| self.spawn(o.rest_translation()))
            .collect()
    }

    fn clear_course(&mut self) {}
}

#[derive(Debug, Default)]
pub struct MockCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub updates: usize,
}

impl CameraHandle for MockCamera {
    fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.updates += 1;
    }

    fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }
}
