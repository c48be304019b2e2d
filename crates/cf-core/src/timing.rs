//! Wall-clock accounting for the step loop.
//!
//! Timing is an observability side effect only; nothing in the kernel reads it
//! back to make decisions.

use std::time::Instant;

/// A simple timer that measures elapsed wall-clock time.
pub struct Timer {
    label: &'static str,
    start: Instant,
}

impl Timer {
    /// Create and start a new timer with the given label.
    pub fn start(label: &'static str) -> Self {
        Self {
            label,
            start: Instant::now(),
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Stop the timer and return elapsed time in seconds.
    pub fn stop(self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

/// Accumulated performance statistics of an engine over its lifetime.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerfStats {
    /// Steps executed over all `advance` calls.
    pub total_steps: u64,
    /// Wall-clock seconds spent over all `advance` calls.
    pub total_wall_s: f64,
    /// Steps executed by the most recent `advance` call.
    pub last_steps: u64,
    /// Wall-clock seconds of the most recent `advance` call.
    pub last_wall_s: f64,
}

impl PerfStats {
    /// Record one completed run of `steps` steps.
    pub fn record(&mut self, steps: u64, wall_s: f64) {
        self.total_steps += steps;
        self.total_wall_s += wall_s;
        self.last_steps = steps;
        self.last_wall_s = wall_s;
    }

    /// Average wall-clock time per step of the most recent run, in ms.
    pub fn last_average_step_ms(&self) -> f64 {
        if self.last_steps > 0 {
            self.last_wall_s / self.last_steps as f64 * 1000.0
        } else {
            0.0
        }
    }

    /// Average wall-clock time per step over the lifetime, in ms.
    pub fn average_step_ms(&self) -> f64 {
        if self.total_steps > 0 {
            self.total_wall_s / self.total_steps as f64 * 1000.0
        } else {
            0.0
        }
    }
}
