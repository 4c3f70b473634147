//! Game settings and tuning
//!
//! Loaded from an optional JSON file; every section and field falls back to
//! its default, so a file only needs the values it changes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_BLOCKS_COUNT;
use crate::sim::{CameraTuning, ObstacleKind, PlayerTuning};

/// Course generation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourseSettings {
    /// Obstacle blocks between start and end
    pub blocks_count: u32,
    /// Seed of the first level (later restarts draw from it)
    pub initial_seed: u64,
    /// Kinds the generator picks from
    pub obstacle_kinds: Vec<ObstacleKind>,
}

impl Default for CourseSettings {
    fn default() -> Self {
        Self {
            blocks_count: DEFAULT_BLOCKS_COUNT,
            initial_seed: 0,
            obstacle_kinds: ObstacleKind::ALL.to_vec(),
        }
    }
}

/// All tunable settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub course: CourseSettings,
    pub player: PlayerTuning,
    pub camera: CameraTuning,
}

impl Settings {
    /// Parse settings from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load settings from `path`, or defaults if there is no path or the file
    /// can't be read or parsed
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            log::info!("Using default settings");
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Invalid settings in {}: {e}; using defaults", path.display());
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Can't read {}: {e}; using defaults", path.display());
                Self::default()
            }
        }
    }
}
