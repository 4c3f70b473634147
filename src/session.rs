//! Session: owns every simulation part and runs one frame at a time
//!
//! Frame order: input sampling, jump/first input/locomotion, goal and
//! boundary checks, obstacle targets, camera. The host steps physics after
//! `frame` returns.

use glam::Vec3;
use serde::Serialize;

use crate::consts::MAX_FRAME_DELTA;
use crate::physics::{CameraHandle, CourseBuilder};
use crate::settings::Settings;
use crate::sim::{
    CameraPose, CameraRig, GamePhase, GameState, InputSignals, Level, LevelSpec, Obstacle,
    PlayerController, Subscription, Timestamp,
};

/// What happened in one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameReport {
    pub phase: GamePhase,
    /// Player position read this frame (`None` when the body is missing)
    pub player_position: Option<Vec3>,
    pub camera: Option<CameraPose>,
    pub elapsed_ms: f64,
    /// The course was rebuilt for a new level this frame
    pub level_changed: bool,
}

/// Top-level game context
pub struct Session<H> {
    settings: Settings,
    state: GameState,
    level: Level,
    obstacles: Vec<Obstacle>,
    obstacle_bodies: Vec<H>,
    player: PlayerController<H>,
    camera: CameraRig,
    /// Simulation clock driving obstacle motion (seconds)
    sim_time: f64,
    course_built: bool,
}

impl<H: Copy + PartialEq + std::fmt::Debug> Session<H> {
    pub fn new(settings: Settings) -> Self {
        let state = GameState::new(settings.course.blocks_count, settings.course.initial_seed);
        let level = Level::new(LevelSpec {
            count: state.blocks_count(),
            types: settings.course.obstacle_kinds.clone(),
            seed: state.blocks_seed(),
        });
        let mut player = PlayerController::new(settings.player.clone());
        player.attach(&state);
        let camera = CameraRig::new(settings.camera.clone());

        Self {
            settings,
            state,
            obstacles: level.spawn_obstacles(),
            level,
            obstacle_bodies: Vec::new(),
            player,
            camera,
            sim_time: 0.0,
            course_built: false,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    pub fn player(&self) -> &PlayerController<H> {
        &self.player
    }

    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    /// Hand the session the player's body once the runtime has created it
    pub fn set_player_body(&mut self, body: H) {
        self.player.set_body(body);
    }

    /// Subscribe to state changes (HUD and other collaborators)
    pub fn subscribe<S, F, C>(&self, selector: F, callback: C) -> Subscription
    where
        S: PartialEq + 'static,
        F: Fn(&crate::sim::GameSnapshot) -> S + 'static,
        C: FnMut(&S) + 'static,
    {
        self.state.subscribe(selector, callback)
    }

    /// Run time shown on the HUD, in seconds
    pub fn elapsed_secs(&self, now: Timestamp) -> f64 {
        self.state.current().elapsed_secs(now)
    }

    /// External restart trigger (HUD button)
    pub fn restart<W: CourseBuilder<Handle = H>>(&mut self, world: &mut W) {
        self.state.restart();
        self.player.apply_pending_respawn(world);
        self.sync_level(world);
    }

    /// Rebuild obstacles and course if the level key changed. Returns true
    /// when it did.
    pub fn sync_level<W: CourseBuilder<Handle = H>>(&mut self, world: &mut W) -> bool {
        let changed = self.level.sync(
            self.state.blocks_count(),
            &self.settings.course.obstacle_kinds,
            self.state.blocks_seed(),
        );
        if changed || !self.course_built {
            let layout = self.level.layout();
            self.obstacle_bodies = world.build_course(&layout);
            self.obstacles = layout.obstacles;
            self.course_built = true;
            return true;
        }
        false
    }

    /// Advance one frame
    pub fn frame<W: CourseBuilder<Handle = H>>(
        &mut self,
        world: &mut W,
        signals: InputSignals,
        delta: f32,
        now: Timestamp,
        camera: Option<&mut dyn CameraHandle>,
    ) -> FrameReport {
        let delta = delta.clamp(0.0, MAX_FRAME_DELTA);
        self.sim_time += f64::from(delta);

        let mut level_changed = self.sync_level(world);

        let player_position = self
            .player
            .frame(world, &mut self.state, signals, delta, now);

        // A restart during the frame draws a new seed
        level_changed |= self.sync_level(world);

        let t = self.sim_time as f32;
        for (obstacle, &body) in self.obstacles.iter().zip(&self.obstacle_bodies) {
            let pose = obstacle.pose(t);
            world.set_next_kinematic_pose(body, Some(pose.translation), Some(pose.rotation));
        }

        let camera_pose = player_position.map(|position| {
            let pose = self.camera.update(position, delta);
            if let Some(camera) = camera {
                pose.apply(camera);
            }
            pose
        });

        FrameReport {
            phase: self.state.phase(),
            player_position,
            camera: camera_pose,
            elapsed_ms: self.state.elapsed_ms(now),
            level_changed,
        }
    }
}
