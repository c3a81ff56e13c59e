//! Activation functions.

use crate::error::AnnetError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The closed set of activation functions a neuron can carry.
///
/// Each variant supplies the function itself and its derivative. The
/// derivative is evaluated at the *output* value of the neuron, not at the
/// raw weighted sum; for the logistic sigmoid this is the familiar
/// `o * (1 - o)` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activation {
    /// Logistic sigmoid, `1 / (1 + e^-x)`.
    Sigmoid,
    /// Hyperbolic tangent.
    Tanh,
    /// Identity, for linear output units.
    Linear,
}

impl Activation {
    /// Applies the function to a raw weighted sum.
    #[inline]
    pub fn activate(self, x: f64) -> f64 {
        match self {
            Activation::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Activation::Tanh => x.tanh(),
            Activation::Linear => x,
        }
    }

    /// Slope of the function, expressed in terms of its output value `o`.
    #[inline]
    pub fn derivate(self, o: f64) -> f64 {
        match self {
            Activation::Sigmoid => o * (1.0 - o),
            Activation::Tanh => 1.0 - o * o,
            Activation::Linear => 1.0,
        }
    }

    /// Canonical name, matching what [`FromStr`] accepts.
    pub fn name(self) -> &'static str {
        match self {
            Activation::Sigmoid => "sigmoid",
            Activation::Tanh => "tanh",
            Activation::Linear => "linear",
        }
    }
}

impl Default for Activation {
    fn default() -> Self {
        Activation::Sigmoid
    }
}

impl FromStr for Activation {
    type Err = AnnetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sigmoid" => Ok(Activation::Sigmoid),
            "tanh" => Ok(Activation::Tanh),
            "linear" => Ok(Activation::Linear),
            other => Err(AnnetError::Config(format!(
                "unknown activation function: {other}"
            ))),
        }
    }
}
