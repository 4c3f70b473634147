//! Narrow interface to the physics runtime
//!
//! The simulation never owns bodies; it addresses them by handle through
//! `PhysicsWorld`. Stale or unknown handles degrade to no-ops and `None`.

pub mod rapier;

#[cfg(test)]
pub(crate) mod mock;

use glam::{Quat, Vec3};

use crate::sim::level::CourseLayout;

pub use rapier::RapierWorld;

/// Result of a ray cast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Distance along the (unit) ray direction to the first hit
    pub time_of_impact: f32,
}

/// Body and query access the simulation needs
pub trait PhysicsWorld {
    type Handle: Copy + PartialEq + std::fmt::Debug;

    /// Current translation, `None` if the handle is not (yet) valid
    fn translation(&self, body: Self::Handle) -> Option<Vec3>;
    fn set_translation(&mut self, body: Self::Handle, position: Vec3);
    fn linear_velocity(&self, body: Self::Handle) -> Option<Vec3>;
    fn set_linear_velocity(&mut self, body: Self::Handle, velocity: Vec3);
    fn set_angular_velocity(&mut self, body: Self::Handle, velocity: Vec3);
    fn apply_impulse(&mut self, body: Self::Handle, impulse: Vec3);
    fn apply_torque_impulse(&mut self, body: Self::Handle, torque: Vec3);
    /// Pose a kinematic body will reach at the next physics step
    fn set_next_kinematic_pose(
        &mut self,
        body: Self::Handle,
        translation: Option<Vec3>,
        rotation: Option<Quat>,
    );
    /// First hit along `direction` within `max_distance`
    fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit>;
}

/// Builds the static course and obstacle bodies from a layout
pub trait CourseBuilder: PhysicsWorld {
    /// Replace any existing course. Returns one kinematic handle per
    /// `layout.obstacles` entry, in order.
    fn build_course(&mut self, layout: &CourseLayout) -> Vec<Self::Handle>;
    fn clear_course(&mut self);
}

/// Render camera the rig drives
pub trait CameraHandle {
    fn set_position(&mut self, position: Vec3);
    fn look_at(&mut self, target: Vec3);
}
