//! Game phase state machine
//!
//! `GameState` is owned by the session and mutated only through `start`,
//! `end` and `restart`. Every transition that changes something notifies
//! observers with a fresh `GameSnapshot`.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::observers::{Observers, Subscription};

/// Host timestamp in milliseconds
pub type Timestamp = f64;

/// Top-level phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
    /// Waiting at the start block for the first input
    #[default]
    Ready,
    /// Timer running
    Playing,
    /// Goal reached, timer frozen
    Ended,
}

/// Immutable view of the state handed to observers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub phase: GamePhase,
    pub start_time: Option<Timestamp>,
    pub end_time: Option<Timestamp>,
    pub blocks_count: u32,
    pub blocks_seed: u64,
}

impl GameSnapshot {
    /// Elapsed run time in milliseconds as of `now`
    pub fn elapsed_ms(&self, now: Timestamp) -> f64 {
        match (self.phase, self.start_time, self.end_time) {
            (GamePhase::Playing, Some(start), _) => now - start,
            (GamePhase::Ended, Some(start), Some(end)) => end - start,
            _ => 0.0,
        }
    }

    /// Elapsed run time in seconds as of `now`
    pub fn elapsed_secs(&self, now: Timestamp) -> f64 {
        self.elapsed_ms(now) / 1000.0
    }
}

/// Phase state machine plus level parameters
pub struct GameState {
    phase: GamePhase,
    start_time: Option<Timestamp>,
    end_time: Option<Timestamp>,
    blocks_count: u32,
    blocks_seed: u64,
    /// Source of fresh level seeds on restart
    seed_rng: Pcg32,
    observers: Observers<GameSnapshot>,
}

impl GameState {
    /// New state in `Ready`. `seed` is the first level seed and also seeds
    /// the sequence of seeds drawn by later restarts.
    pub fn new(blocks_count: u32, seed: u64) -> Self {
        Self {
            phase: GamePhase::Ready,
            start_time: None,
            end_time: None,
            blocks_count,
            blocks_seed: seed,
            seed_rng: Pcg32::seed_from_u64(seed),
            observers: Observers::new(),
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn blocks_count(&self) -> u32 {
        self.blocks_count
    }

    pub fn blocks_seed(&self) -> u64 {
        self.blocks_seed
    }

    /// Current snapshot
    pub fn current(&self) -> GameSnapshot {
        GameSnapshot {
            phase: self.phase,
            start_time: self.start_time,
            end_time: self.end_time,
            blocks_count: self.blocks_count,
            blocks_seed: self.blocks_seed,
        }
    }

    pub fn elapsed_ms(&self, now: Timestamp) -> f64 {
        self.current().elapsed_ms(now)
    }

    /// `Ready -> Playing`. Returns false (and does nothing) from any other phase.
    pub fn start(&mut self, now: Timestamp) -> bool {
        if self.phase != GamePhase::Ready {
            return false;
        }
        self.phase = GamePhase::Playing;
        self.start_time = Some(now);
        log::info!("Run started at {now:.0}ms (seed {})", self.blocks_seed);
        self.notify();
        true
    }

    /// `Playing -> Ended`. Returns false (and does nothing) from any other phase.
    pub fn end(&mut self, now: Timestamp) -> bool {
        if self.phase != GamePhase::Playing {
            return false;
        }
        self.phase = GamePhase::Ended;
        self.end_time = Some(now);
        log::info!(
            "Run finished in {}s",
            crate::format_elapsed(self.current().elapsed_secs(now))
        );
        self.notify();
        true
    }

    /// Back to `Ready` from anywhere, with cleared timestamps and a new seed.
    /// Reseeds on every call, including repeated calls while already ready.
    pub fn restart(&mut self) {
        let from = self.phase;
        self.phase = GamePhase::Ready;
        self.start_time = None;
        self.end_time = None;
        self.blocks_seed = self.seed_rng.random();
        log::info!("Restart from {from:?}, new seed {}", self.blocks_seed);
        self.notify();
    }

    /// Call `callback` whenever the selected part of the state changes
    pub fn subscribe<S, F, C>(&self, selector: F, callback: C) -> Subscription
    where
        S: PartialEq + 'static,
        F: Fn(&GameSnapshot) -> S + 'static,
        C: FnMut(&S) + 'static,
    {
        self.observers.subscribe(&self.current(), selector, callback)
    }

    /// Call `callback` on every state change
    pub fn subscribe_all<C>(&self, callback: C) -> Subscription
    where
        C: FnMut(&GameSnapshot) + 'static,
    {
        self.observers.subscribe_all(callback)
    }

    fn notify(&self) {
        self.observers.notify(&self.current());
    }
}

impl std::fmt::Debug for GameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameState")
            .field("snapshot", &self.current())
            .field("observers", &self.observers.len())
            .finish()
    }
}
