//! Space Marble - a procedurally generated marble obstacle course
//!
//! Core modules:
//! - `sim`: Gameplay simulation (phases, level generation, obstacles, player, camera)
//! - `physics`: Narrow interface to the physics runtime, plus a Rapier adapter
//! - `session`: Per-frame orchestration of all simulation parts
//! - `settings`: Data-driven tuning loaded from JSON

pub mod physics;
pub mod session;
pub mod settings;
pub mod sim;

pub use session::{FrameReport, Session};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    use glam::Vec3;

    /// Nominal frame timestep used by the headless runner (60 Hz)
    pub const FRAME_DT: f32 = 1.0 / 60.0;
    /// Largest frame delta the simulation accepts (frame hitch guard)
    pub const MAX_FRAME_DELTA: f32 = 0.1;

    /// Length of one course block along -Z
    pub const BLOCK_LENGTH: f32 = 4.0;
    /// Half width of the course floor
    pub const COURSE_HALF_WIDTH: f32 = 2.0;
    /// Floor slab half thickness (top face sits at y = 0)
    pub const FLOOR_HALF_HEIGHT: f32 = 0.1;
    /// Side/end wall thickness
    pub const WALL_THICKNESS: f32 = 0.3;
    /// Side/end wall height
    pub const WALL_HEIGHT: f32 = 1.5;
    /// Default number of obstacle blocks between start and end
    pub const DEFAULT_BLOCKS_COUNT: u32 = 10;

    /// Player ball radius
    pub const BALL_RADIUS: f32 = 0.3;
    /// Where the ball spawns and respawns
    pub const SPAWN_POSITION: Vec3 = Vec3::new(0.0, 1.0, 0.0);
    /// Leaving this band of heights restarts the run
    pub const FALL_LIMIT: f32 = -4.0;
    pub const CEILING_LIMIT: f32 = 6.0;

    /// Ground probe: ray starts this far below the ball center
    pub const GROUND_PROBE_OFFSET: f32 = 0.31;
    /// Ground probe ray length
    pub const GROUND_PROBE_DISTANCE: f32 = 10.0;
    /// Time of impact below which the ball counts as grounded
    pub const GROUND_THRESHOLD: f32 = 0.15;

    /// Kinematic bar height above its block
    pub const BAR_HEIGHT: f32 = 0.3;
    /// Vertical center of the limbo bar sweep
    pub const LIMBO_BASE_HEIGHT: f32 = 1.15;
    /// Spinner speed range (magnitude, radians/sec)
    pub const SPINNER_MIN_SPEED: f32 = 0.2;
    pub const SPINNER_MAX_SPEED: f32 = 1.2;
}

/// Distance along -Z past which the run counts as finished
#[inline]
pub fn goal_distance(blocks_count: u32) -> f32 {
    blocks_count as f32 * consts::BLOCK_LENGTH + 2.0
}

/// Render an elapsed time (seconds) the way the HUD shows it
pub fn format_elapsed(secs: f64) -> String {
    format!("{secs:.2}")
}
