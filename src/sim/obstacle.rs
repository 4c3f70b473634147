//! Obstacle instances and their kinematic motion rules
//!
//! Poses are pure functions of simulation time and the per-instance
//! constants drawn once in `Obstacle::new`.

use glam::{Quat, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Obstacle block types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObstacleKind {
    /// Horizontal bar rotating about the vertical axis
    Spinner,
    /// Bar sweeping up and down across the path
    Limbo,
    /// Wide blade swinging side to side
    Axe,
}

impl ObstacleKind {
    /// Every kind, in the default generator order
    pub const ALL: [ObstacleKind; 3] = [ObstacleKind::Spinner, ObstacleKind::Axe, ObstacleKind::Limbo];

    pub fn as_str(&self) -> &'static str {
        match self {
            ObstacleKind::Spinner => "spinner",
            ObstacleKind::Limbo => "limbo",
            ObstacleKind::Axe => "axe",
        }
    }

    /// Half extents of the moving collider
    pub fn bar_half_extents(&self) -> Vec3 {
        match self {
            ObstacleKind::Spinner | ObstacleKind::Limbo => Vec3::new(1.75, 0.15, 0.15),
            ObstacleKind::Axe => Vec3::new(0.75, 0.75, 0.1),
        }
    }
}

/// Target pose for a kinematic body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KinematicPose {
    pub translation: Vec3,
    pub rotation: Quat,
}

/// One obstacle on the course
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    /// Block origin (floor center)
    pub position: Vec3,
    /// Shift of the periodic motion, in [0, 2π)
    pub phase_offset: f32,
    /// Signed angular speed (spinners), magnitude in [0.2, 1.2)
    pub speed: f32,
}

impl Obstacle {
    /// Draw the per-instance constants. Both are drawn for every kind so the
    /// stream stays aligned regardless of which kinds were generated.
    pub fn new<R: Rng>(kind: ObstacleKind, position: Vec3, rng: &mut R) -> Self {
        let phase_offset = rng.random::<f32>() * std::f32::consts::TAU;
        let magnitude =
            SPINNER_MIN_SPEED + rng.random::<f32>() * (SPINNER_MAX_SPEED - SPINNER_MIN_SPEED);
        let direction = if rng.random_bool(0.5) { -1.0 } else { 1.0 };

        Self {
            kind,
            position,
            // random::<f32>() * TAU can round up to TAU itself
            phase_offset: if phase_offset >= std::f32::consts::TAU { 0.0 } else { phase_offset },
            speed: magnitude * direction,
        }
    }

    /// Where the moving part rests before any motion is applied
    pub fn rest_translation(&self) -> Vec3 {
        self.position + Vec3::new(0.0, BAR_HEIGHT, 0.0)
    }

    /// Kinematic target at simulation time `t` (seconds)
    pub fn pose(&self, t: f32) -> KinematicPose {
        match self.kind {
            ObstacleKind::Spinner => KinematicPose {
                translation: self.rest_translation(),
                rotation: Quat::from_rotation_y(t * self.speed),
            },
            ObstacleKind::Limbo => KinematicPose {
                translation: Vec3::new(
                    0.0,
                    (t + self.phase_offset).sin() + LIMBO_BASE_HEIGHT,
                    self.position.z,
                ),
                rotation: Quat::IDENTITY,
            },
            ObstacleKind::Axe => KinematicPose {
                translation: Vec3::new(
                    (t + self.phase_offset).cos(),
                    self.position.y + 1.0,
                    self.position.z,
                ),
                rotation: Quat::IDENTITY,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::f32::consts::{FRAC_PI_2, PI, TAU};

    fn fixed(kind: ObstacleKind, phase_offset: f32, speed: f32) -> Obstacle {
        Obstacle {
            kind,
            position: Vec3::new(0.0, 0.0, -8.0),
            phase_offset,
            speed,
        }
    }

    #[test]
    fn test_limbo_sweep() {
        let limbo = fixed(ObstacleKind::Limbo, 0.0, 1.0);
        let p0 = limbo.pose(0.0).translation;
        assert!((p0.y - LIMBO_BASE_HEIGHT).abs() < 1e-6);
        assert_eq!(p0.x, 0.0);
        assert_eq!(p0.z, -8.0);

        let p1 = limbo.pose(FRAC_PI_2).translation;
        assert!((p1.y - (1.0 + LIMBO_BASE_HEIGHT)).abs() < 1e-6);
    }

    #[test]
    fn test_axe_swing() {
        let axe = fixed(ObstacleKind::Axe, 0.0, 1.0);
        let p0 = axe.pose(0.0).translation;
        assert!((p0.x - 1.0).abs() < 1e-6);
        assert!((p0.y - 1.0).abs() < 1e-6);

        let p1 = axe.pose(PI).translation;
        assert!((p1.x + 1.0).abs() < 1e-6);
        assert_eq!(p1.z, -8.0);
    }

    #[test]
    fn test_phase_offset_shifts_motion() {
        let a = fixed(ObstacleKind::Limbo, 0.0, 1.0);
        let b = fixed(ObstacleKind::Limbo, FRAC_PI_2, 1.0);
        assert!((a.pose(FRAC_PI_2).translation.y - b.pose(0.0).translation.y).abs() < 1e-6);
    }

    #[test]
    fn test_spinner_rotates_in_place() {
        let spinner = fixed(ObstacleKind::Spinner, 0.0, -0.5);
        let pose = spinner.pose(2.0);
        assert_eq!(pose.translation, Vec3::new(0.0, BAR_HEIGHT, -8.0));

        let expected = Quat::from_rotation_y(-1.0);
        assert!(pose.rotation.abs_diff_eq(expected, 1e-6));
        assert_eq!(spinner.pose(0.0).rotation, Quat::IDENTITY);
    }

    #[test]
    fn test_instance_constants_in_range() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut saw_negative = false;
        let mut saw_positive = false;
        for _ in 0..500 {
            let o = Obstacle::new(ObstacleKind::Spinner, Vec3::ZERO, &mut rng);
            assert!((0.0..TAU).contains(&o.phase_offset));
            assert!(o.speed.abs() >= SPINNER_MIN_SPEED && o.speed.abs() <= SPINNER_MAX_SPEED);
            saw_negative |= o.speed < 0.0;
            saw_positive |= o.speed > 0.0;
        }
        assert!(saw_negative && saw_positive);
    }

    #[test]
    fn test_pose_does_not_redraw_constants() {
        let mut rng = Pcg32::seed_from_u64(11);
        let axe = Obstacle::new(ObstacleKind::Axe, Vec3::new(0.0, 0.0, -4.0), &mut rng);
        let before = axe.clone();
        let first = axe.pose(1.25);
        let _ = axe.pose(7.0);
        assert_eq!(axe, before);
        assert_eq!(axe.pose(1.25), first);
    }
}
