//! Weighted directed edge between two neurons.

use crate::net::{NeuronId, SynapseId};
use serde::{Deserialize, Serialize};

/// A directed, weighted connection from one neuron to another.
///
/// Besides the weight itself, a synapse carries the last applied
/// weight-delta (for momentum) and an accumulator used by batch-mode
/// training.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Synapse {
    id: SynapseId,
    from: NeuronId,
    to: NeuronId,
    weight: f64,
    delta_weight: f64,
    batch_delta: f64,
}

impl Synapse {
    pub(crate) fn new(id: SynapseId, from: NeuronId, to: NeuronId) -> Self {
        Self {
            id,
            from,
            to,
            weight: 0.0,
            delta_weight: 0.0,
            batch_delta: 0.0,
        }
    }

    /// This synapse's handle.
    #[inline]
    pub fn id(&self) -> SynapseId {
        self.id
    }

    /// The source neuron.
    #[inline]
    pub fn from(&self) -> NeuronId {
        self.from
    }

    /// The target neuron.
    #[inline]
    pub fn to(&self) -> NeuronId {
        self.to
    }

    /// Current weight.
    #[inline]
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Overwrites the weight.
    #[inline]
    pub fn set_weight(&mut self, weight: f64) {
        self.weight = weight;
    }

    /// The weight-delta applied by the most recent update.
    #[inline]
    pub fn delta_weight(&self) -> f64 {
        self.delta_weight
    }

    #[inline]
    pub(crate) fn set_delta_weight(&mut self, delta: f64) {
        self.delta_weight = delta;
    }

    /// Weight-delta accumulated over the current batch epoch.
    #[inline]
    pub fn batch_delta(&self) -> f64 {
        self.batch_delta
    }

    #[inline]
    pub(crate) fn accumulate_batch_delta(&mut self, delta: f64) {
        self.batch_delta += delta;
    }

    #[inline]
    pub(crate) fn reset_batch_delta(&mut self) {
        self.batch_delta = 0.0;
    }

    /// Clears weight and training state. Used when (re)initializing.
    pub(crate) fn reset(&mut self, weight: f64) {
        self.weight = weight;
        self.delta_weight = 0.0;
        self.batch_delta = 0.0;
    }
}
