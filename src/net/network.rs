//! Arena-backed network graph: layers, neurons, synapses.

use crate::error::{AnnetError, Result};
use crate::net::{Activation, LayerId, Neuron, NeuronId, Synapse, SynapseId};
use rand::distributions::{Distribution, Uniform};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// An ordered container of neurons at one depth of the network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer {
    id: LayerId,
    neurons: Vec<NeuronId>,
    has_bias: bool,
}

impl Layer {
    fn new(id: LayerId) -> Self {
        Self {
            id,
            neurons: Vec::new(),
            has_bias: false,
        }
    }

    /// This layer's handle; equals its feed-forward position.
    #[inline]
    pub fn id(&self) -> LayerId {
        self.id
    }

    /// Neuron handles in local-index order.
    #[inline]
    pub fn neurons(&self) -> &[NeuronId] {
        &self.neurons
    }

    /// Number of neurons, bias included.
    #[inline]
    pub fn len(&self) -> usize {
        self.neurons.len()
    }

    /// Whether the layer holds no neurons yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.neurons.is_empty()
    }

    /// Whether this layer carries a bias unit.
    #[inline]
    pub fn has_bias(&self) -> bool {
        self.has_bias
    }
}

/// The network graph: an ordered sequence of layers plus flat arenas of
/// neurons and synapses referenced by handle.
///
/// Insertion order of layers is the feed-forward order: index 0 is the
/// input layer, the last index the output layer. Topology is append-only;
/// after [`finalize`](Network::finalize) only numeric state mutates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Network {
    layers: Vec<Layer>,
    neurons: Vec<Neuron>,
    synapses: Vec<Synapse>,
    finalized: bool,
}

impl Network {
    /// Creates an empty network.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a fully connected multilayer perceptron.
    ///
    /// `sizes` gives the non-bias neuron count per layer, input first.
    /// When `bias` is set, every layer except the output layer gets one
    /// bias unit wired to the next layer. The returned network is
    /// finalized; weights start at zero until
    /// [`init_weights`](Network::init_weights) runs.
    pub fn multilayer(sizes: &[usize], bias: bool, activation: Activation) -> Result<Self> {
        if sizes.len() < 2 {
            return Err(AnnetError::Structure(format!(
                "a network needs at least two layers, got {}",
                sizes.len()
            )));
        }
        let mut net = Network::new();
        let mut layer_ids = Vec::with_capacity(sizes.len());
        for (i, &size) in sizes.iter().enumerate() {
            let layer = net.push_layer();
            for _ in 0..size {
                net.push_neuron(layer, activation, false)?;
            }
            if bias && i + 1 < sizes.len() {
                net.push_neuron(layer, activation, true)?;
            }
            layer_ids.push(layer);
        }
        for window in layer_ids.windows(2) {
            let (from_layer, to_layer) = (window[0], window[1]);
            let sources = net.layer(from_layer).neurons().to_vec();
            let targets: Vec<NeuronId> = net
                .layer(to_layer)
                .neurons()
                .iter()
                .copied()
                .filter(|&n| !net.neuron(n).is_bias())
                .collect();
            for &from in &sources {
                for &to in &targets {
                    net.connect(from, to)?;
                }
            }
        }
        net.finalize()?;
        Ok(net)
    }

    /// Appends a new empty layer and returns its handle.
    pub fn push_layer(&mut self) -> LayerId {
        let id = LayerId(self.layers.len());
        self.layers.push(Layer::new(id));
        id
    }

    /// Appends a neuron to a layer, assigning the next local index and the
    /// next global id.
    pub fn push_neuron(
        &mut self,
        layer: LayerId,
        activation: Activation,
        bias: bool,
    ) -> Result<NeuronId> {
        let layer_rec = self
            .layers
            .get_mut(layer.0)
            .ok_or_else(|| AnnetError::Structure(format!("no such layer: {}", layer.0)))?;
        let id = NeuronId(self.neurons.len());
        let local_index = layer_rec.neurons.len();
        layer_rec.neurons.push(id);
        if bias {
            layer_rec.has_bias = true;
        }
        self.neurons
            .push(Neuron::new(id, layer, local_index, activation, bias));
        Ok(id)
    }

    /// Connects two neurons with a new synapse, registering it on both
    /// endpoints.
    pub fn connect(&mut self, from: NeuronId, to: NeuronId) -> Result<SynapseId> {
        if from.0 >= self.neurons.len() {
            return Err(AnnetError::Structure(format!(
                "no such source neuron: {}",
                from.0
            )));
        }
        if to.0 >= self.neurons.len() {
            return Err(AnnetError::Structure(format!(
                "no such target neuron: {}",
                to.0
            )));
        }
        let id = SynapseId(self.synapses.len());
        self.synapses.push(Synapse::new(id, from, to));
        self.neurons[from.0].register_outgoing(id);
        self.neurons[to.0].register_incoming(id);
        Ok(id)
    }

    /// Marks the topology complete. Forward and backward passes refuse to
    /// run before this.
    pub fn finalize(&mut self) -> Result<()> {
        if self.layers.len() < 2 {
            return Err(AnnetError::Structure(format!(
                "a network needs at least two layers, got {}",
                self.layers.len()
            )));
        }
        self.finalized = true;
        Ok(())
    }

    /// Whether [`finalize`](Network::finalize) has run.
    #[inline]
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Looks up a layer by handle.
    #[inline]
    pub fn layer(&self, id: LayerId) -> &Layer {
        &self.layers[id.0]
    }

    /// Looks up a neuron by handle.
    #[inline]
    pub fn neuron(&self, id: NeuronId) -> &Neuron {
        &self.neurons[id.0]
    }

    #[inline]
    pub(crate) fn neuron_mut(&mut self, id: NeuronId) -> &mut Neuron {
        &mut self.neurons[id.0]
    }

    /// Looks up a synapse by handle.
    #[inline]
    pub fn synapse(&self, id: SynapseId) -> &Synapse {
        &self.synapses[id.0]
    }

    #[inline]
    pub(crate) fn synapse_mut(&mut self, id: SynapseId) -> &mut Synapse {
        &mut self.synapses[id.0]
    }

    /// All synapses, in creation order.
    #[inline]
    pub fn synapses(&self) -> &[Synapse] {
        &self.synapses
    }

    /// Number of layers.
    #[inline]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Layer handles in feed-forward order. Reverse the iterator for the
    /// backward pass.
    #[inline]
    pub fn layer_ids(&self) -> impl DoubleEndedIterator<Item = LayerId> {
        (0..self.layers.len()).map(LayerId)
    }

    /// The layer feeding into `id`, if `id` is not the input layer.
    #[inline]
    pub fn prev_layer(&self, id: LayerId) -> Option<LayerId> {
        id.0.checked_sub(1).map(LayerId)
    }

    /// The layer fed by `id`, if `id` is not the output layer.
    #[inline]
    pub fn next_layer(&self, id: LayerId) -> Option<LayerId> {
        if id.0 + 1 < self.layers.len() {
            Some(LayerId(id.0 + 1))
        } else {
            None
        }
    }

    /// The input layer.
    #[inline]
    pub fn input_layer(&self) -> &Layer {
        &self.layers[0]
    }

    /// The output layer.
    #[inline]
    pub fn output_layer(&self) -> &Layer {
        &self.layers[self.layers.len() - 1]
    }

    /// Number of non-bias neurons in the input layer.
    pub fn input_size_ignoring_bias(&self) -> usize {
        self.input_layer()
            .neurons()
            .iter()
            .filter(|&&n| !self.neuron(n).is_bias())
            .count()
    }

    /// Number of neurons in the output layer.
    pub fn output_size(&self) -> usize {
        self.output_layer().len()
    }

    /// Loads an input vector into the input layer, by position, skipping
    /// bias units.
    pub fn set_input_values(&mut self, input: &[f64]) -> Result<()> {
        let expected = self.input_size_ignoring_bias();
        if input.len() != expected {
            return Err(AnnetError::ShapeMismatch {
                role: "input",
                expected,
                got: input.len(),
            });
        }
        let targets: Vec<NeuronId> = self
            .input_layer()
            .neurons()
            .iter()
            .copied()
            .filter(|&n| !self.neuron(n).is_bias())
            .collect();
        for (&id, &value) in targets.iter().zip(input) {
            self.neuron_mut(id).set_value(value);
        }
        Ok(())
    }

    /// Current activation values of the output layer, in neuron order.
    pub fn output_values(&self) -> Vec<f64> {
        self.output_layer()
            .neurons()
            .iter()
            .map(|&n| self.neuron(n).value())
            .collect()
    }

    /// Randomizes every weight uniformly in [-1, 1] and clears all
    /// training state (values, deltas, momentum, batch accumulators).
    pub fn init_weights<R: Rng>(&mut self, rng: &mut R) {
        let between = Uniform::from(-1.0..=1.0);
        for synapse in &mut self.synapses {
            synapse.reset(between.sample(rng));
        }
        for neuron in &mut self.neurons {
            neuron.reset_state();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_append_order_assigns_indices() {
        let net = Network::multilayer(&[2, 3, 1], true, Activation::Sigmoid).unwrap();
        assert_eq!(net.layer_count(), 3);
        // 2+bias, 3+bias, 1
        assert_eq!(net.layer(LayerId(0)).len(), 3);
        assert_eq!(net.layer(LayerId(1)).len(), 4);
        assert_eq!(net.layer(LayerId(2)).len(), 1);
        // Global ids are monotonic and match arena positions.
        for (i, layer) in net.layer_ids().enumerate() {
            for (j, &n) in net.layer(LayerId(i)).neurons().iter().enumerate() {
                assert_eq!(net.neuron(n).local_index(), j);
                assert_eq!(net.neuron(n).layer(), layer);
            }
        }
    }

    #[test]
    fn test_synapse_registered_on_both_endpoints_once() {
        let net = Network::multilayer(&[2, 2, 1], true, Activation::Sigmoid).unwrap();
        for synapse in net.synapses() {
            let from = net.neuron(synapse.from());
            let to = net.neuron(synapse.to());
            let out_count = from.outgoing().iter().filter(|&&s| s == synapse.id()).count();
            let in_count = to.incoming().iter().filter(|&&s| s == synapse.id()).count();
            assert_eq!(out_count, 1);
            assert_eq!(in_count, 1);
        }
    }

    #[test]
    fn test_bias_wiring() {
        let net = Network::multilayer(&[2, 2, 1], true, Activation::Sigmoid).unwrap();
        // Bias neurons feed the next layer but receive nothing.
        for layer in net.layer_ids() {
            for &n in net.layer(layer).neurons() {
                let neuron = net.neuron(n);
                if neuron.is_bias() {
                    assert!(neuron.incoming().is_empty());
                    assert!(!neuron.outgoing().is_empty());
                    assert_eq!(neuron.value(), 1.0);
                }
            }
        }
        // The output layer has no bias unit.
        assert!(!net.output_layer().has_bias());
    }

    #[test]
    fn test_shape_queries() {
        let net = Network::multilayer(&[2, 4, 3], true, Activation::Sigmoid).unwrap();
        assert_eq!(net.input_size_ignoring_bias(), 2);
        assert_eq!(net.output_size(), 3);
    }

    #[test]
    fn test_set_input_shape_mismatch() {
        let mut net = Network::multilayer(&[2, 2, 1], true, Activation::Sigmoid).unwrap();
        let err = net.set_input_values(&[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(
            err,
            AnnetError::ShapeMismatch {
                role: "input",
                expected: 2,
                got: 3
            }
        ));
    }

    #[test]
    fn test_prev_next_layer() {
        let net = Network::multilayer(&[1, 1, 1], false, Activation::Sigmoid).unwrap();
        assert_eq!(net.prev_layer(LayerId(0)), None);
        assert_eq!(net.prev_layer(LayerId(1)), Some(LayerId(0)));
        assert_eq!(net.next_layer(LayerId(2)), None);
        assert_eq!(net.next_layer(LayerId(1)), Some(LayerId(2)));
    }

    #[test]
    fn test_connect_rejects_unknown_neuron() {
        let mut net = Network::new();
        let layer = net.push_layer();
        let n = net.push_neuron(layer, Activation::Sigmoid, false).unwrap();
        let err = net.connect(n, NeuronId(42)).unwrap_err();
        assert!(matches!(err, AnnetError::Structure(_)));
    }

    #[test]
    fn test_finalize_requires_two_layers() {
        let mut net = Network::new();
        net.push_layer();
        assert!(matches!(net.finalize(), Err(AnnetError::Structure(_))));
    }

    #[test]
    fn test_init_weights_randomizes_and_clears() {
        let mut net = Network::multilayer(&[2, 2, 1], true, Activation::Sigmoid).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        net.init_weights(&mut rng);
        assert!(net.synapses().iter().any(|s| s.weight() != 0.0));
        assert!(net
            .synapses()
            .iter()
            .all(|s| (-1.0..=1.0).contains(&s.weight())));
        assert!(net
            .synapses()
            .iter()
            .all(|s| s.delta_weight() == 0.0 && s.batch_delta() == 0.0));
    }
}
