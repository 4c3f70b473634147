//! Logical input signals
//!
//! The host binds devices; the simulation only sees these booleans.

use serde::{Deserialize, Serialize};

use super::observers::{Observers, Subscription};

/// Snapshot of the control signals for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InputSignals {
    pub forward: bool,
    pub backward: bool,
    pub leftward: bool,
    pub rightward: bool,
    pub jump: bool,
}

impl InputSignals {
    pub fn any(&self) -> bool {
        self.forward || self.backward || self.leftward || self.rightward || self.jump
    }
}

/// What changed since the previous sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputEdges {
    /// Jump went from released to pressed
    pub jump_pressed: bool,
    /// Any signal changed (press or release)
    pub changed: bool,
}

/// Per-tick edge detection over polled snapshots
#[derive(Debug, Clone, Default)]
pub struct InputTracker {
    previous: InputSignals,
}

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `signals` and report edges relative to the last sample
    pub fn sample(&mut self, signals: InputSignals) -> InputEdges {
        let edges = InputEdges {
            jump_pressed: signals.jump && !self.previous.jump,
            changed: signals != self.previous,
        };
        self.previous = signals;
        edges
    }
}

/// Observable input state for collaborators (HUD key display and the like)
#[derive(Default)]
pub struct InputSource {
    current: InputSignals,
    observers: Observers<InputSignals>,
}

impl InputSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> InputSignals {
        self.current
    }

    /// Replace the snapshot, notifying listeners if anything changed
    pub fn set(&mut self, signals: InputSignals) {
        if signals != self.current {
            self.current = signals;
            self.observers.notify(&signals);
        }
    }

    /// Fire when the selected signal changes
    pub fn on_change<S, F, C>(&self, selector: F, callback: C) -> Subscription
    where
        S: PartialEq + 'static,
        F: Fn(&InputSignals) -> S + 'static,
        C: FnMut(&S) + 'static,
    {
        self.observers.subscribe(&self.current, selector, callback)
    }

    /// Fire on any change at all
    pub fn on_any<C>(&self, callback: C) -> Subscription
    where
        C: FnMut(&InputSignals) + 'static,
    {
        self.observers.subscribe_all(callback)
    }
}
