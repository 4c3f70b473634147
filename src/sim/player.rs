//! Player controller
//!
//! Drives the ball body from input signals and decides when a run starts,
//! ends or restarts. The body itself lives in the physics runtime; the
//! controller only holds its handle.

use std::cell::Cell;
use std::rc::Rc;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::input::{InputSignals, InputTracker};
use super::observers::Subscription;
use super::state::{GamePhase, GameState, Timestamp};
use crate::consts::*;
use crate::physics::PhysicsWorld;

/// Tunable controller coefficients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// Linear impulse per second of held direction
    pub impulse_strength: f32,
    /// Torque impulse per second of held direction
    pub torque_strength: f32,
    /// Upward impulse of a jump
    pub jump_impulse: f32,
    pub ground_probe_offset: f32,
    pub ground_probe_distance: f32,
    /// Time of impact below which a jump is allowed
    pub ground_threshold: f32,
    pub spawn: Vec3,
    pub fall_limit: f32,
    pub ceiling_limit: f32,
    // Body material, consumed by the physics adapter
    pub radius: f32,
    pub restitution: f32,
    pub friction: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            impulse_strength: 0.6,
            torque_strength: 0.2,
            jump_impulse: 0.5,
            ground_probe_offset: GROUND_PROBE_OFFSET,
            ground_probe_distance: GROUND_PROBE_DISTANCE,
            ground_threshold: GROUND_THRESHOLD,
            spawn: SPAWN_POSITION,
            fall_limit: FALL_LIMIT,
            ceiling_limit: CEILING_LIMIT,
            radius: BALL_RADIUS,
            restitution: 0.2,
            friction: 1.0,
            linear_damping: 0.5,
            angular_damping: 0.5,
        }
    }
}

/// Impulse and torque for the held directions. Opposing directions cancel,
/// perpendicular ones combine.
pub fn locomotion(signals: &InputSignals, delta: f32, tuning: &PlayerTuning) -> (Vec3, Vec3) {
    let mut impulse = Vec3::ZERO;
    let mut torque = Vec3::ZERO;
    let impulse_strength = delta * tuning.impulse_strength;
    let torque_strength = delta * tuning.torque_strength;

    if signals.forward {
        impulse.z -= impulse_strength;
        torque.x -= torque_strength;
    }
    if signals.rightward {
        impulse.x += impulse_strength;
        torque.z -= torque_strength;
    }
    if signals.backward {
        impulse.z += impulse_strength;
        torque.x += torque_strength;
    }
    if signals.leftward {
        impulse.x -= impulse_strength;
        torque.z += torque_strength;
    }

    (impulse, torque)
}

/// Why the run left `Playing` this frame, if it did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunCheck {
    Continue,
    ReachedGoal,
    OutOfBounds,
}

/// Goal and boundary test for a position while playing
pub fn check_run(position: Vec3, blocks_count: u32, tuning: &PlayerTuning) -> RunCheck {
    if position.z < -crate::goal_distance(blocks_count) {
        RunCheck::ReachedGoal
    } else if position.y < tuning.fall_limit || position.y > tuning.ceiling_limit {
        RunCheck::OutOfBounds
    } else {
        RunCheck::Continue
    }
}

/// Ball controller bound to one body handle
#[derive(Debug)]
pub struct PlayerController<H> {
    body: Option<H>,
    tuning: PlayerTuning,
    input: InputTracker,
    /// Set by the phase subscription when the state returns to `Ready`
    respawn_pending: Rc<Cell<bool>>,
    phase_subscription: Option<Subscription>,
}

impl<H: Copy + PartialEq + std::fmt::Debug> PlayerController<H> {
    pub fn new(tuning: PlayerTuning) -> Self {
        Self {
            body: None,
            tuning,
            input: InputTracker::new(),
            respawn_pending: Rc::new(Cell::new(false)),
            phase_subscription: None,
        }
    }

    pub fn tuning(&self) -> &PlayerTuning {
        &self.tuning
    }

    pub fn body(&self) -> Option<H> {
        self.body
    }

    pub fn set_body(&mut self, body: H) {
        self.body = Some(body);
    }

    /// Subscribe to phase changes. Calling it again replaces the old
    /// subscription.
    pub fn attach(&mut self, state: &GameState) {
        let pending = self.respawn_pending.clone();
        self.phase_subscription = Some(state.subscribe(
            |s| s.phase,
            move |phase| {
                if *phase == GamePhase::Ready {
                    pending.set(true);
                }
            },
        ));
    }

    /// Release the phase subscription
    pub fn detach(&mut self) {
        if let Some(sub) = self.phase_subscription.take() {
            sub.unsubscribe();
        }
    }

    pub fn is_attached(&self) -> bool {
        self.phase_subscription.is_some()
    }

    /// Move the body back to the spawn point if a return to `Ready` was
    /// observed. Rotation is left as is.
    pub fn apply_pending_respawn<W: PhysicsWorld<Handle = H>>(&mut self, world: &mut W) {
        let Some(body) = self.body else {
            return;
        };
        if self.respawn_pending.replace(false) {
            log::debug!("Respawning player at {:?}", self.tuning.spawn);
            world.set_translation(body, self.tuning.spawn);
            world.set_linear_velocity(body, Vec3::ZERO);
            world.set_angular_velocity(body, Vec3::ZERO);
        }
    }

    /// Probe below the ball and jump if it is close enough to the ground.
    /// Returns whether the impulse was applied.
    pub fn jump<W: PhysicsWorld<Handle = H>>(&self, world: &mut W) -> bool {
        let Some(body) = self.body else {
            return false;
        };
        let Some(position) = world.translation(body) else {
            return false;
        };

        let origin = position - Vec3::new(0.0, self.tuning.ground_probe_offset, 0.0);
        let hit = world.cast_ray(origin, Vec3::NEG_Y, self.tuning.ground_probe_distance);
        match hit {
            Some(hit) if hit.time_of_impact < self.tuning.ground_threshold => {
                world.apply_impulse(body, Vec3::new(0.0, self.tuning.jump_impulse, 0.0));
                log::debug!("Jump (toi {:.3})", hit.time_of_impact);
                true
            }
            _ => {
                log::debug!("Jump suppressed, not grounded ({hit:?})");
                false
            }
        }
    }

    /// Run one frame of control. Returns the body position read this frame
    /// (the previous physics step's result), or `None` when there is no
    /// body, in which case control and camera are skipped.
    pub fn frame<W: PhysicsWorld<Handle = H>>(
        &mut self,
        world: &mut W,
        state: &mut GameState,
        signals: InputSignals,
        delta: f32,
        now: Timestamp,
    ) -> Option<Vec3> {
        let edges = self.input.sample(signals);
        self.apply_pending_respawn(world);

        if edges.changed && state.phase() == GamePhase::Ready {
            state.start(now);
        }

        let body = self.body?;
        let position = world.translation(body)?;

        if edges.jump_pressed {
            self.jump(world);
        }

        let (impulse, torque) = locomotion(&signals, delta, &self.tuning);
        world.apply_impulse(body, impulse);
        world.apply_torque_impulse(body, torque);

        if state.phase() == GamePhase::Playing {
            match check_run(position, state.blocks_count(), &self.tuning) {
                RunCheck::ReachedGoal => {
                    state.end(now);
                }
                RunCheck::OutOfBounds => {
                    log::info!("Player out of bounds at {position:?}");
                    state.restart();
                    self.apply_pending_respawn(world);
                }
                RunCheck::Continue => {}
            }
        }

        Some(position)
    }
}
