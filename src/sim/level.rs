//! Deterministic level generation
//!
//! `generate` picks the obstacle sequence; `Level` memoizes it per
//! `(count, types, seed)` and derives the course geometry and obstacle
//! instances from it.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::obstacle::{Obstacle, ObstacleKind};
use crate::consts::*;

/// Stream salt for per-instance constants (keeps them independent of the
/// kind sequence drawn from the same seed)
const INSTANCE_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// Pick `count` obstacle kinds uniformly from `types`, reproducibly for a
/// given seed. Returns an empty sequence when `types` is empty.
pub fn generate(count: usize, types: &[ObstacleKind], seed: u64) -> Vec<ObstacleKind> {
    if types.is_empty() {
        if count > 0 {
            log::warn!("No obstacle kinds to choose from, generating an empty level");
        }
        return Vec::new();
    }

    let mut rng = Pcg32::seed_from_u64(seed);
    (0..count)
        .map(|_| types[rng.random_range(0..types.len())])
        .collect()
}

/// Cache key for a generated level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelSpec {
    pub count: u32,
    pub types: Vec<ObstacleKind>,
    pub seed: u64,
}

/// Kind of block placed along the course
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockRole {
    Start,
    Obstacle(ObstacleKind),
    End,
}

/// A 4x4 course block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockPlacement {
    pub role: BlockRole,
    pub position: Vec3,
}

/// Axis-aligned fixed box collider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticBox {
    pub center: Vec3,
    pub half_extents: Vec3,
}

/// Everything the physics side needs to build the course
#[derive(Debug, Clone, PartialEq)]
pub struct CourseLayout {
    pub blocks: Vec<BlockPlacement>,
    pub floor: StaticBox,
    pub walls: Vec<StaticBox>,
    pub obstacles: Vec<Obstacle>,
}

impl CourseLayout {
    /// Course length in blocks (start + obstacles + end)
    pub fn length_in_blocks(&self) -> usize {
        self.blocks.len()
    }
}

/// Memoized level for the current `(count, types, seed)`
#[derive(Debug, Clone)]
pub struct Level {
    spec: LevelSpec,
    kinds: Vec<ObstacleKind>,
}

impl Level {
    pub fn new(spec: LevelSpec) -> Self {
        let kinds = generate(spec.count as usize, &spec.types, spec.seed);
        log::info!(
            "Generated level: {} obstacles, seed {} [{}]",
            kinds.len(),
            spec.seed,
            kinds.iter().map(|k| k.as_str()).collect::<Vec<_>>().join(", ")
        );
        Self { spec, kinds }
    }

    pub fn spec(&self) -> &LevelSpec {
        &self.spec
    }

    /// Ordered obstacle kinds
    pub fn kinds(&self) -> &[ObstacleKind] {
        &self.kinds
    }

    /// Regenerate only if the key changed. Returns true when it did.
    pub fn sync(&mut self, count: u32, types: &[ObstacleKind], seed: u64) -> bool {
        if self.spec.count == count && self.spec.seed == seed && self.spec.types == types {
            return false;
        }
        *self = Level::new(LevelSpec {
            count,
            types: types.to_vec(),
            seed,
        });
        true
    }

    /// Block origin of obstacle `index`
    pub fn obstacle_position(index: usize) -> Vec3 {
        Vec3::new(0.0, 0.0, -((index + 1) as f32) * BLOCK_LENGTH)
    }

    /// Fresh obstacle instances. The constants come from a stream seeded by
    /// the level seed, so the same seed always spawns the same motion.
    pub fn spawn_obstacles(&self) -> Vec<Obstacle> {
        let mut rng = Pcg32::seed_from_u64(self.spec.seed ^ INSTANCE_SALT);
        self.kinds
            .iter()
            .enumerate()
            .map(|(i, &kind)| Obstacle::new(kind, Self::obstacle_position(i), &mut rng))
            .collect()
    }

    /// Course geometry and obstacles for this level
    pub fn layout(&self) -> CourseLayout {
        let count = self.kinds.len();
        let length = (count + 2) as f32;
        let mid_z = -length * BLOCK_LENGTH / 2.0 + BLOCK_LENGTH / 2.0;

        let mut blocks = Vec::with_capacity(count + 2);
        blocks.push(BlockPlacement {
            role: BlockRole::Start,
            position: Vec3::ZERO,
        });
        blocks.extend(self.kinds.iter().enumerate().map(|(i, &kind)| BlockPlacement {
            role: BlockRole::Obstacle(kind),
            position: Self::obstacle_position(i),
        }));
        blocks.push(BlockPlacement {
            role: BlockRole::End,
            position: Vec3::new(0.0, 0.0, -((count + 1) as f32) * BLOCK_LENGTH),
        });

        let floor = StaticBox {
            center: Vec3::new(0.0, -FLOOR_HALF_HEIGHT, mid_z),
            half_extents: Vec3::new(
                COURSE_HALF_WIDTH,
                FLOOR_HALF_HEIGHT,
                length * BLOCK_LENGTH / 2.0,
            ),
        };

        let wall_x = COURSE_HALF_WIDTH + WALL_THICKNESS / 2.0;
        let side = Vec3::new(WALL_THICKNESS / 2.0, WALL_HEIGHT / 2.0, length * BLOCK_LENGTH / 2.0);
        let walls = vec![
            StaticBox {
                center: Vec3::new(wall_x, WALL_HEIGHT / 2.0, mid_z),
                half_extents: side,
            },
            StaticBox {
                center: Vec3::new(-wall_x, WALL_HEIGHT / 2.0, mid_z),
                half_extents: side,
            },
            StaticBox {
                center: Vec3::new(0.0, WALL_HEIGHT / 2.0, -length * BLOCK_LENGTH + BLOCK_LENGTH / 2.0),
                half_extents: Vec3::new(COURSE_HALF_WIDTH, WALL_HEIGHT / 2.0, WALL_THICKNESS / 2.0),
            },
        ];

        CourseLayout {
            blocks,
            floor,
            walls,
            obstacles: self.spawn_obstacles(),
        }
    }
}
