use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Source of experiment time, in seconds. Event timestamps, countdown
/// deadlines and response latencies are all measured against one clock.
/// Session time 0 is the start key press; the sequencer subtracts its own
/// origin reading rather than mutating the clock.
pub trait Clock {
    fn now(&self) -> f64;
}

/// Wall-clock time since construction.
#[derive(Debug, Clone)]
pub struct ExperimentClock {
    origin: Instant,
}

impl ExperimentClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for ExperimentClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ExperimentClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Hand-driven clock for tests.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, t: f64) {
        self.now.set(t);
    }

    pub fn advance(&self, dt: f64) {
        self.now.set(self.now.get() + dt);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }
}

/// Countdown against a clock. `remaining` keeps counting below zero after
/// the deadline passes; the go/stop phase thresholds depend on that.
#[derive(Debug, Clone, Copy)]
pub struct Countdown {
    deadline: f64,
}

impl Countdown {
    pub fn new() -> Self {
        Self { deadline: 0.0 }
    }

    pub fn reset(&mut self, now: f64, duration: f64) {
        self.deadline = now + duration;
    }

    pub fn remaining(&self, now: f64) -> f64 {
        self.deadline - now
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new()
    }
}
