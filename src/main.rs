//! Space Marble headless runner
//!
//! Runs a session on the Rapier adapter with a scripted autopilot and prints
//! a JSON summary of the run. Usage: `space-marble [settings.json]`

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::cell::Cell;
    use std::path::PathBuf;
    use std::rc::Rc;

    use rapier3d::prelude::RigidBodyHandle;
    use serde::Serialize;

    use space_marble::consts::*;
    use space_marble::physics::{PhysicsWorld, RapierWorld};
    use space_marble::sim::{GamePhase, InputSignals, InputSource, ObstacleKind, Subscription};
    use space_marble::{FrameReport, Session, Settings, format_elapsed};

    /// Give up after this much simulated time
    const MAX_RUN_SECS: f64 = 180.0;
    /// Autopilot taps jump this often (frames)
    const JUMP_INTERVAL: u64 = 50;

    #[derive(Debug, Serialize)]
    struct RunSummary {
        initial_seed: u64,
        final_seed: u64,
        blocks_count: u32,
        level: Vec<ObstacleKind>,
        phase: GamePhase,
        attempts: u32,
        elapsed: String,
        frames: u64,
        sim_secs: f64,
    }

    /// Game instance holding all state
    struct Game {
        session: Session<RigidBodyHandle>,
        world: RapierWorld,
        input: InputSource,
        accumulator: f32,
        clock_ms: f64,
        frames: u64,
        restarts: Rc<Cell<u32>>,
        _subscriptions: Vec<Subscription>,
    }

    impl Game {
        fn new(settings: Settings) -> Self {
            let mut world = RapierWorld::new();
            let mut session = Session::new(settings);
            let body = world.spawn_player(&session.settings().player);
            session.set_player_body(body);
            session.sync_level(&mut world);

            let restarts = Rc::new(Cell::new(0));
            let counter = restarts.clone();
            let input = InputSource::new();
            let subscriptions = vec![
                session.subscribe(
                    |s| s.phase,
                    move |phase| {
                        log::info!("Phase -> {phase:?}");
                        if *phase == GamePhase::Ready {
                            counter.set(counter.get() + 1);
                        }
                    },
                ),
                input.on_change(
                    |s| s.jump,
                    |pressed| {
                        if *pressed {
                            log::debug!("Jump key down");
                        }
                    },
                ),
            ];

            Self {
                session,
                world,
                input,
                accumulator: 0.0,
                clock_ms: 0.0,
                frames: 0,
                restarts,
                _subscriptions: subscriptions,
            }
        }

        /// Forward with light steering back to the center line, plus a
        /// periodic jump tap
        fn autopilot(&self) -> InputSignals {
            let x = self
                .session
                .player()
                .body()
                .and_then(|b| self.world.translation(b))
                .map(|p| p.x)
                .unwrap_or(0.0);

            InputSignals {
                forward: true,
                backward: false,
                leftward: x > 0.4,
                rightward: x < -0.4,
                jump: self.frames % JUMP_INTERVAL == 0,
            }
        }

        /// Run fixed frames for `dt` of host time
        fn update(&mut self, dt: f32) -> Option<FrameReport> {
            let dt = dt.min(MAX_FRAME_DELTA);
            self.accumulator += dt;

            let mut last = None;
            while self.accumulator >= FRAME_DT {
                let signals = self.autopilot();
                self.input.set(signals);
                self.clock_ms += f64::from(FRAME_DT) * 1000.0;

                let report = self.session.frame(
                    &mut self.world,
                    self.input.snapshot(),
                    FRAME_DT,
                    self.clock_ms,
                    None,
                );
                self.world.step(FRAME_DT);

                self.accumulator -= FRAME_DT;
                self.frames += 1;
                last = Some(report);
            }
            last
        }

        fn summary(&self, initial_seed: u64) -> RunSummary {
            let state = self.session.state().current();
            RunSummary {
                initial_seed,
                final_seed: state.blocks_seed,
                blocks_count: state.blocks_count,
                level: self.session.level().kinds().to_vec(),
                phase: state.phase,
                attempts: self.restarts.get() + 1,
                elapsed: format_elapsed(self.session.elapsed_secs(self.clock_ms)),
                frames: self.frames,
                sim_secs: self.session.sim_time(),
            }
        }
    }

    pub fn run() -> Result<(), Box<dyn std::error::Error>> {
        env_logger::init();
        log::info!("Space Marble (headless) starting...");

        let path = std::env::args().nth(1).map(PathBuf::from);
        let settings = Settings::load(path.as_deref());
        let initial_seed = settings.course.initial_seed;
        let mut game = Game::new(settings);

        // Host frames at a slightly uneven rate to exercise the accumulator
        let host_frames = [1.0 / 60.0, 1.0 / 55.0, 1.0 / 65.0];
        let mut i = 0;
        while game.session.sim_time() < MAX_RUN_SECS {
            let report = game.update(host_frames[i % host_frames.len()]);
            i += 1;
            if report.is_some_and(|r| r.phase == GamePhase::Ended) {
                break;
            }
        }

        let summary = game.summary(initial_seed);
        log::info!(
            "Finished: {:?} after {} attempt(s), time {}s",
            summary.phase,
            summary.attempts,
            summary.elapsed
        );
        println!("{}", serde_json::to_string_pretty(&summary)?);
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Headless runner is native only
}
