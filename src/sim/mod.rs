//! Gameplay simulation module
//!
//! All gameplay logic lives here. It stays deterministic for a given seed:
//! - Seeded RNG only
//! - Time only through the frame delta and host timestamps passed in
//! - No rendering dependencies; physics only through `crate::physics`

pub mod camera;
pub mod input;
pub mod level;
pub mod obstacle;
pub mod observers;
pub mod player;
pub mod state;

pub use camera::{CameraPose, CameraRig, CameraTuning};
pub use input::{InputEdges, InputSignals, InputSource, InputTracker};
pub use level::{BlockPlacement, BlockRole, CourseLayout, Level, LevelSpec, StaticBox, generate};
pub use obstacle::{KinematicPose, Obstacle, ObstacleKind};
pub use observers::{Observers, Subscription};
pub use player::{PlayerController, PlayerTuning, RunCheck, check_run, locomotion};
pub use state::{GamePhase, GameSnapshot, GameState, Timestamp};
