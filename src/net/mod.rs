//! The network graph model shared by both trainers.
//!
//! A [`Network`] is an arena: it owns flat collections of [`Layer`],
//! [`Neuron`] and [`Synapse`] records, and everything else refers to them
//! through integer handles. Topology is append-only; once built and
//! finalized, only the numeric fields (values, deltas, weights) change.

mod activation;
mod network;
mod neuron;
mod synapse;

pub use activation::Activation;
pub use network::{Layer, Network};
pub use neuron::Neuron;
pub use synapse::Synapse;

use serde::{Deserialize, Serialize};

/// Handle to a [`Layer`] inside its owning [`Network`].
///
/// The handle value equals the layer's feed-forward position: 0 is the
/// input layer, the highest value the output layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerId(pub usize);

/// Handle to a [`Neuron`] inside its owning [`Network`].
///
/// Assigned monotonically at creation; external data vectors are indexed
/// by this id where a trainer needs a stable per-neuron slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NeuronId(pub usize);

/// Handle to a [`Synapse`] inside its owning [`Network`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SynapseId(pub usize);
