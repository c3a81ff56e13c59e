//! Training data: input/ideal vector pairs.

use crate::error::{AnnetError, Result};
use serde::{Deserialize, Serialize};

/// One training example: an input vector and the ideal output vector.
///
/// Vector positions correspond to neuron order within the input and output
/// layers of the network being trained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPair {
    input: Vec<f64>,
    ideal: Vec<f64>,
}

impl DataPair {
    /// Creates a new pair.
    pub fn new(input: Vec<f64>, ideal: Vec<f64>) -> Self {
        Self { input, ideal }
    }

    /// The input vector.
    #[inline]
    pub fn input(&self) -> &[f64] {
        &self.input
    }

    /// The ideal (target) vector.
    #[inline]
    pub fn ideal(&self) -> &[f64] {
        &self.ideal
    }
}

/// An ordered sequence of training pairs.
///
/// All pairs in a set share the same input length and the same ideal
/// length; `push` rejects a pair that disagrees with the first one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataPairSet {
    pairs: Vec<DataPair>,
}

impl DataPairSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a pair, checking its shape against the pairs already present.
    pub fn push(&mut self, pair: DataPair) -> Result<()> {
        if let Some(first) = self.pairs.first() {
            if pair.input.len() != first.input.len() {
                return Err(AnnetError::ShapeMismatch {
                    role: "input",
                    expected: first.input.len(),
                    got: pair.input.len(),
                });
            }
            if pair.ideal.len() != first.ideal.len() {
                return Err(AnnetError::ShapeMismatch {
                    role: "ideal",
                    expected: first.ideal.len(),
                    got: pair.ideal.len(),
                });
            }
        }
        self.pairs.push(pair);
        Ok(())
    }

    /// The pairs, in insertion order.
    #[inline]
    pub fn pairs(&self) -> &[DataPair] {
        &self.pairs
    }

    /// Number of pairs in the set.
    #[inline]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether the set holds no pairs.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// The four-row XOR truth table, the classic backpropagation benchmark.
    pub fn xor() -> Self {
        let rows = [
            ([0.0, 0.0], 0.0),
            ([0.0, 1.0], 1.0),
            ([1.0, 0.0], 1.0),
            ([1.0, 1.0], 0.0),
        ];
        let mut set = Self::new();
        for (input, out) in rows {
            set.push(DataPair::new(input.to_vec(), vec![out]))
                .expect("uniform shape");
        }
        set
    }
}
