//! Per-epoch squared-error accumulator.

/// Accumulates squared differences between ideal and actual output values
/// over one epoch and reports their root mean square.
#[derive(Debug, Clone, Default)]
pub struct NetError {
    sum: f64,
    count: usize,
}

impl NetError {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one (ideal, actual) observation.
    #[inline]
    pub fn update(&mut self, ideal: f64, actual: f64) {
        let diff = ideal - actual;
        self.sum += diff * diff;
        self.count += 1;
    }

    /// Root-mean-square of all observations so far; 0.0 when empty.
    pub fn rms(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            (self.sum / self.count as f64).sqrt()
        }
    }

    /// Number of observations recorded.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Clears sum and count for the next epoch.
    pub fn reset(&mut self) {
        self.sum = 0.0;
        self.count = 0;
    }
}
