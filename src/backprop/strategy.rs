//! Epoch-boundary hooks controlling the training loop.

use crate::net::Network;

/// Progress figures for one completed epoch.
#[derive(Debug, Clone, Copy)]
pub struct EpochProgress {
    /// Zero-based epoch number within the current (re)start.
    pub epoch: usize,
    /// RMS error over the epoch.
    pub rms: f64,
    /// Drop in RMS relative to the previous epoch; 0.0 on the first one.
    pub improvement: f64,
}

/// Hooks invoked by the backpropagation trainer at epoch boundaries.
///
/// All methods default to no-ops, so a strategy only implements what it
/// cares about. `reset` runs when training restarts; a strategy must
/// return its predicates to their initial answers there.
pub trait Strategy {
    /// Runs before each epoch.
    fn pre_epoch(&mut self, _net: &Network) {}

    /// Runs after each epoch, with that epoch's progress figures.
    fn post_epoch(&mut self, _net: &Network, _progress: &EpochProgress) {}

    /// Whether training should stop before the next epoch.
    fn should_stop(&self) -> bool {
        false
    }

    /// Whether training should discard its state and restart from weight
    /// initialization.
    fn should_restart(&self) -> bool {
        false
    }

    /// Clears per-run state after a restart.
    fn reset(&mut self) {}
}

/// Stops training after a fixed number of epochs.
#[derive(Debug)]
pub struct StopAfterEpochs {
    limit: usize,
    seen: usize,
}

impl StopAfterEpochs {
    /// Stops once `limit` epochs have completed.
    pub fn new(limit: usize) -> Self {
        Self { limit, seen: 0 }
    }
}

impl Strategy for StopAfterEpochs {
    fn post_epoch(&mut self, _net: &Network, _progress: &EpochProgress) {
        self.seen += 1;
    }

    fn should_stop(&self) -> bool {
        self.seen >= self.limit
    }

    fn reset(&mut self) {
        self.seen = 0;
    }
}

/// Stops training once the epoch RMS error falls below a threshold.
#[derive(Debug)]
pub struct StopBelowRms {
    threshold: f64,
    reached: bool,
}

impl StopBelowRms {
    /// Stops once RMS error drops under `threshold`.
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            reached: false,
        }
    }
}

impl Strategy for StopBelowRms {
    fn post_epoch(&mut self, _net: &Network, progress: &EpochProgress) {
        if progress.rms < self.threshold {
            self.reached = true;
        }
    }

    fn should_stop(&self) -> bool {
        self.reached
    }

    fn reset(&mut self) {
        self.reached = false;
    }
}

/// Restarts training when the error stops improving.
///
/// Counts consecutive epochs whose improvement stays below
/// `min_improvement`; once `patience` such epochs accumulate, a restart is
/// requested. The number of restarts is bounded so a hopeless run still
/// terminates through the trainer's epoch cap.
#[derive(Debug)]
pub struct RestartOnStagnation {
    min_improvement: f64,
    patience: usize,
    max_restarts: usize,
    stagnant: usize,
    restarts: usize,
}

impl RestartOnStagnation {
    /// Requests a restart after `patience` epochs of sub-`min_improvement`
    /// progress, at most `max_restarts` times.
    pub fn new(min_improvement: f64, patience: usize, max_restarts: usize) -> Self {
        Self {
            min_improvement,
            patience,
            max_restarts,
            stagnant: 0,
            restarts: 0,
        }
    }
}

impl Strategy for RestartOnStagnation {
    fn post_epoch(&mut self, _net: &Network, progress: &EpochProgress) {
        if progress.epoch > 0 && progress.improvement.abs() < self.min_improvement {
            self.stagnant += 1;
        } else {
            self.stagnant = 0;
        }
    }

    fn should_restart(&self) -> bool {
        self.stagnant >= self.patience && self.restarts < self.max_restarts
    }

    fn reset(&mut self) {
        self.stagnant = 0;
        self.restarts += 1;
    }
}
