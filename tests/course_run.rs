//! Runs sessions on the Rapier adapter end to end: the ball settles on the
//! floor, jumps only when grounded and rolls down the course.
//!
//! Run with: cargo test --test course_run -- --nocapture

use glam::Vec3;
use rapier3d::prelude::RigidBodyHandle;

use space_marble::consts::{BALL_RADIUS, FRAME_DT, SPAWN_POSITION};
use space_marble::physics::{PhysicsWorld, RapierWorld};
use space_marble::sim::{GamePhase, InputSignals};
use space_marble::{Session, Settings};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Run {
    session: Session<RigidBodyHandle>,
    world: RapierWorld,
    body: RigidBodyHandle,
    clock_ms: f64,
}

impl Run {
    fn new(blocks: u32) -> Self {
        let mut settings = Settings::default();
        settings.course.blocks_count = blocks;
        settings.course.initial_seed = 42;

        let mut world = RapierWorld::new();
        let mut session = Session::new(settings);
        let body = world.spawn_player(&session.settings().player);
        session.set_player_body(body);
        session.sync_level(&mut world);

        Self {
            session,
            world,
            body,
            clock_ms: 0.0,
        }
    }

    fn frames(&mut self, n: usize, signals: InputSignals) {
        for _ in 0..n {
            self.clock_ms += f64::from(FRAME_DT) * 1000.0;
            self.session
                .frame(&mut self.world, signals, FRAME_DT, self.clock_ms, None);
            self.world.step(FRAME_DT);
        }
    }

    fn position(&self) -> Vec3 {
        self.world.translation(self.body).unwrap()
    }

    fn velocity(&self) -> Vec3 {
        self.world.linear_velocity(self.body).unwrap()
    }
}

fn idle() -> InputSignals {
    InputSignals::default()
}

fn forward() -> InputSignals {
    InputSignals {
        forward: true,
        ..Default::default()
    }
}

fn jump() -> InputSignals {
    InputSignals {
        jump: true,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Settling
// ---------------------------------------------------------------------------

#[test]
fn ball_settles_on_start_block() {
    let mut run = Run::new(3);
    assert_eq!(run.position(), SPAWN_POSITION);

    run.frames(120, idle());

    let pos = run.position();
    println!("resting position: {pos:?}");
    assert!((pos.y - BALL_RADIUS).abs() < 0.05, "ball at y={}", pos.y);
    assert!(pos.x.abs() < 0.05 && pos.z.abs() < 0.05);
    assert_eq!(run.session.state().phase(), GamePhase::Ready);
}

// ---------------------------------------------------------------------------
// Jump
// ---------------------------------------------------------------------------

#[test]
fn jump_from_floor_lifts_ball() {
    let mut run = Run::new(3);
    run.frames(120, idle());
    assert!(run.velocity().y.abs() < 0.5);

    // The press is both the first input and the jump edge
    run.frames(1, jump());
    assert_eq!(run.session.state().phase(), GamePhase::Playing);
    let vy = run.velocity().y;
    println!("vertical speed after jump: {vy}");
    assert!(vy > 1.0, "jump produced vy={vy}");

    // Still airborne a few frames later
    run.frames(5, jump());
    assert!(run.position().y > BALL_RADIUS + 0.05);
}

#[test]
fn held_jump_in_the_air_does_nothing() {
    let mut run = Run::new(3);
    run.frames(20, jump());
    // Pressed while still dropping from the spawn point, then only held
    let vy = run.velocity().y;
    assert!(vy < 0.0, "ball rising at vy={vy}");
}

// ---------------------------------------------------------------------------
// Rolling
// ---------------------------------------------------------------------------

#[test]
fn holding_forward_rolls_toward_goal() {
    let mut run = Run::new(3);
    run.frames(60, idle());

    run.frames(45, forward());
    let pos = run.position();
    println!("after rolling: {pos:?}");
    assert!(pos.z < -0.1, "ball at z={}", pos.z);
    assert_eq!(run.session.state().phase(), GamePhase::Playing);
}

// ---------------------------------------------------------------------------
// Falling off
// ---------------------------------------------------------------------------

#[test]
fn falling_off_restarts_and_rebuilds() {
    let mut run = Run::new(3);
    run.frames(10, forward());
    let seed = run.session.state().blocks_seed();

    // Drop the ball outside the walls
    run.world.set_translation(run.body, Vec3::new(5.0, 0.5, -2.0));
    run.world.set_linear_velocity(run.body, Vec3::ZERO);
    run.frames(150, idle());

    assert_eq!(run.session.state().phase(), GamePhase::Ready);
    assert_ne!(run.session.state().blocks_seed(), seed);
    assert_eq!(run.world.course_body_count(), 4);
    // Respawned and dropped back onto the start block
    let pos = run.position();
    assert!(pos.x.abs() < 0.1 && pos.z.abs() < 0.1, "ball at {pos:?}");
}
