//! Neuron record: activation state plus synapse adjacency.

use crate::net::{Activation, LayerId, NeuronId, SynapseId};
use serde::{Deserialize, Serialize};

/// A neuron in the network graph.
///
/// Holds the current activation value, the backpropagated error term
/// ("delta"), and ordered lists of incoming and outgoing synapse handles.
/// A bias neuron has a constant value of 1.0 that no operation overwrites.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Neuron {
    id: NeuronId,
    layer: LayerId,
    local_index: usize,
    activation: Activation,
    bias: bool,
    value: f64,
    delta: f64,
    incoming: Vec<SynapseId>,
    outgoing: Vec<SynapseId>,
}

impl Neuron {
    pub(crate) fn new(
        id: NeuronId,
        layer: LayerId,
        local_index: usize,
        activation: Activation,
        bias: bool,
    ) -> Self {
        Self {
            id,
            layer,
            local_index,
            activation,
            bias,
            value: if bias { 1.0 } else { 0.0 },
            delta: 0.0,
            incoming: Vec::new(),
            outgoing: Vec::new(),
        }
    }

    /// This neuron's global handle.
    #[inline]
    pub fn id(&self) -> NeuronId {
        self.id
    }

    /// The owning layer.
    #[inline]
    pub fn layer(&self) -> LayerId {
        self.layer
    }

    /// Position within the owning layer.
    #[inline]
    pub fn local_index(&self) -> usize {
        self.local_index
    }

    /// Whether this is a constant-output bias unit.
    #[inline]
    pub fn is_bias(&self) -> bool {
        self.bias
    }

    /// The activation function this neuron applies.
    #[inline]
    pub fn activation(&self) -> Activation {
        self.activation
    }

    /// Current activation value.
    #[inline]
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Current backpropagated error term.
    #[inline]
    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// Incoming synapses, in registration order.
    #[inline]
    pub fn incoming(&self) -> &[SynapseId] {
        &self.incoming
    }

    /// Outgoing synapses, in registration order.
    #[inline]
    pub fn outgoing(&self) -> &[SynapseId] {
        &self.outgoing
    }

    /// Applies the activation function to a weighted sum and stores the
    /// result. A bias neuron stays pinned at 1.0.
    #[inline]
    pub(crate) fn activate(&mut self, sum: f64) {
        if self.bias {
            self.value = 1.0;
        } else {
            self.value = self.activation.activate(sum);
        }
    }

    /// Loads an externally supplied value. Callers skip bias neurons.
    #[inline]
    pub(crate) fn set_value(&mut self, value: f64) {
        debug_assert!(!self.bias, "bias neuron value is constant");
        self.value = value;
    }

    #[inline]
    pub(crate) fn set_delta(&mut self, delta: f64) {
        self.delta = delta;
    }

    pub(crate) fn register_incoming(&mut self, synapse: SynapseId) {
        self.incoming.push(synapse);
    }

    pub(crate) fn register_outgoing(&mut self, synapse: SynapseId) {
        self.outgoing.push(synapse);
    }

    /// Clears activation state. Bias value stays at 1.0.
    pub(crate) fn reset_state(&mut self) {
        self.value = if self.bias { 1.0 } else { 0.0 };
        self.delta = 0.0;
    }
}
