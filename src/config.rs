//! Configuration for the annet trainers.

use serde::{Deserialize, Serialize};

/// Backpropagation trainer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackPropConfig {
    /// Learning rate applied to every weight update.
    /// Default: 0.35.
    pub learn_rate: f64,

    /// Fraction of the previous weight-delta carried into the new delta.
    /// Default: 0.8.
    pub momentum: f64,

    /// Accumulate weight deltas over the whole epoch and apply them once,
    /// instead of updating after every pair.
    /// Default: false (online updates).
    pub batch: bool,

    /// Hard upper bound on epochs, applied even when no strategy ever
    /// signals a stop.
    /// Default: 10,000.
    pub max_epochs: usize,

    /// Random seed for weight initialization.
    /// Default: None (entropy-seeded).
    pub seed: Option<u64>,
}

impl Default for BackPropConfig {
    fn default() -> Self {
        Self {
            learn_rate: 0.35,
            momentum: 0.8,
            batch: false,
            max_epochs: 10_000,
            seed: None,
        }
    }
}

/// Self-organizing-map trainer configuration.
///
/// The defaults reproduce the classical two-phase annealed schedule:
/// a long ordering phase with a wide, shrinking neighborhood followed by
/// a short convergence phase pinned at radius 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SomConfig {
    /// Epochs in the ordering phase.
    /// Default: 250.
    pub ordering_epochs: usize,

    /// Random samples drawn per ordering epoch.
    /// Default: 50.
    pub ordering_samples: usize,

    /// Learning factor at the start of the ordering phase.
    /// Default: 0.9.
    pub ordering_factor: f64,

    /// Amount subtracted from the learning factor after each ordering epoch.
    /// Default: 0.0032.
    pub ordering_factor_decrement: f64,

    /// Neighbor radius at the start of the ordering phase. Decreases by one
    /// per epoch and is clamped to a floor of 1.
    /// Default: 6.
    pub ordering_radius: usize,

    /// Epochs in the convergence phase.
    /// Default: 100.
    pub convergence_epochs: usize,

    /// Random samples drawn per convergence epoch.
    /// Default: 75.
    pub convergence_samples: usize,

    /// Learning factor at the start of the convergence phase.
    /// Default: 0.1.
    pub convergence_factor: f64,

    /// Amount subtracted from the learning factor after each convergence
    /// epoch.
    /// Default: 0.08.
    pub convergence_factor_decrement: f64,

    /// Lower bound of the uniform range sample vectors are drawn from.
    /// Default: -1.0.
    pub sample_min: f64,

    /// Upper bound of the uniform range sample vectors are drawn from.
    /// Default: 1.0.
    pub sample_max: f64,

    /// Random seed for sampling and weight initialization.
    /// Default: None (entropy-seeded).
    pub seed: Option<u64>,
}

impl Default for SomConfig {
    fn default() -> Self {
        Self {
            ordering_epochs: 250,
            ordering_samples: 50,
            ordering_factor: 0.9,
            ordering_factor_decrement: 0.0032,
            ordering_radius: 6,
            convergence_epochs: 100,
            convergence_samples: 75,
            convergence_factor: 0.1,
            convergence_factor_decrement: 0.08,
            sample_min: -1.0,
            sample_max: 1.0,
            seed: None,
        }
    }
}
