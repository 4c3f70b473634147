//! Follow camera with frame-rate independent smoothing

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::physics::CameraHandle;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraTuning {
    /// Camera position relative to the player
    pub offset: Vec3,
    /// Look-at point relative to the player
    pub target_offset: Vec3,
    /// Convergence rate per second
    pub damping: f32,
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            offset: Vec3::new(0.0, 0.65, 2.25),
            target_offset: Vec3::new(0.0, 0.25, 0.0),
            damping: 5.0,
        }
    }
}

/// Resolved camera placement for a frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraPose {
    pub position: Vec3,
    pub target: Vec3,
}

impl CameraPose {
    pub fn apply(&self, camera: &mut dyn CameraHandle) {
        camera.set_position(self.position);
        camera.look_at(self.target);
    }
}

/// Smoothed position and look-at target, persistent across frames
#[derive(Debug, Clone)]
pub struct CameraRig {
    position: Vec3,
    target: Vec3,
    tuning: CameraTuning,
}

impl CameraRig {
    /// Rig resting at the origin; it converges from there
    pub fn new(tuning: CameraTuning) -> Self {
        Self {
            position: Vec3::ZERO,
            target: Vec3::ZERO,
            tuning,
        }
    }

    pub fn pose(&self) -> CameraPose {
        CameraPose {
            position: self.position,
            target: self.target,
        }
    }

    /// Ideal (unsmoothed) pose for a player position
    pub fn desired(&self, player: Vec3) -> CameraPose {
        CameraPose {
            position: player + self.tuning.offset,
            target: player + self.tuning.target_offset,
        }
    }

    /// Move toward the desired pose by `damping * delta` of the remaining gap
    pub fn update(&mut self, player: Vec3, delta: f32) -> CameraPose {
        let desired = self.desired(player);
        let alpha = (self.tuning.damping * delta).clamp(0.0, 1.0);
        self.position = self.position.lerp(desired.position, alpha);
        self.target = self.target.lerp(desired.target, alpha);
        self.pose()
    }
}
