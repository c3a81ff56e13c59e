//! Supervised training by error backpropagation.

use crate::backprop::{EpochProgress, NetError, Strategy};
use crate::config::BackPropConfig;
use crate::data::DataPairSet;
use crate::error::{AnnetError, Result};
use crate::net::{LayerId, Network};
use log::{debug, info};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Lifecycle of a [`BackPropagation`] trainer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainerState {
    /// Created, never trained.
    Idle,
    /// A training call is in progress.
    Running,
    /// The last training call has returned.
    Stopped,
}

/// What a completed training call reports back.
#[derive(Debug, Clone, Copy)]
pub struct TrainOutcome {
    /// Epochs completed in the final (post-restart) run.
    pub epochs: usize,
    /// RMS error of the last epoch.
    pub final_rms: f64,
    /// True when a strategy signalled the stop; false when the epoch cap
    /// tripped instead.
    pub stopped_by_strategy: bool,
    /// How many times training restarted from weight initialization.
    pub restarts: usize,
}

type WeightInit<'a> = Box<dyn FnMut(&mut Network, &mut ChaCha8Rng) + 'a>;

/// The external collaborators of one training call: the active
/// strategies, an optional per-epoch error sink, and the weight
/// initializer with its seeded RNG.
///
/// The default initializer randomizes uniformly in [-1, 1]; tests and
/// callers with their own scheme replace it via
/// [`set_initializer`](TrainSession::set_initializer).
pub struct TrainSession<'a> {
    strategies: Vec<Box<dyn Strategy + 'a>>,
    error_sink: Option<Box<dyn FnMut(f64) + 'a>>,
    initializer: WeightInit<'a>,
    rng: ChaCha8Rng,
}

impl<'a> TrainSession<'a> {
    /// Creates a session; `seed` fixes the weight-initialization RNG.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            strategies: Vec::new(),
            error_sink: None,
            initializer: Box::new(|net, rng| net.init_weights(rng)),
            rng,
        }
    }

    /// Adds a strategy; hooks run in insertion order.
    pub fn add_strategy(&mut self, strategy: impl Strategy + 'a) {
        self.strategies.push(Box::new(strategy));
    }

    /// Installs a callback receiving each epoch's RMS error.
    pub fn on_error(&mut self, sink: impl FnMut(f64) + 'a) {
        self.error_sink = Some(Box::new(sink));
    }

    /// Replaces the weight initializer run at every (re)start.
    pub fn set_initializer(&mut self, init: impl FnMut(&mut Network, &mut ChaCha8Rng) + 'a) {
        self.initializer = Box::new(init);
    }

    fn init_weights(&mut self, net: &mut Network) {
        (self.initializer)(net, &mut self.rng);
    }

    fn pre_epoch(&mut self, net: &Network) {
        for s in &mut self.strategies {
            s.pre_epoch(net);
        }
    }

    fn post_epoch(&mut self, net: &Network, progress: &EpochProgress) {
        for s in &mut self.strategies {
            s.post_epoch(net, progress);
        }
    }

    fn notify_error(&mut self, rms: f64) {
        if let Some(sink) = &mut self.error_sink {
            sink(rms);
        }
    }

    fn should_stop(&self) -> bool {
        self.strategies.iter().any(|s| s.should_stop())
    }

    fn should_restart(&self) -> bool {
        self.strategies.iter().any(|s| s.should_restart())
    }

    fn reset_strategies(&mut self) {
        for s in &mut self.strategies {
            s.reset();
        }
    }
}

/// The backpropagation trainer: forward pass, error backpropagation, and
/// online or batch weight updates with momentum.
#[derive(Debug)]
pub struct BackPropagation {
    config: BackPropConfig,
    state: TrainerState,
    net_error: NetError,
}

impl BackPropagation {
    /// Creates a trainer with the given hyperparameters.
    pub fn new(config: BackPropConfig) -> Self {
        Self {
            config,
            state: TrainerState::Idle,
            net_error: NetError::new(),
        }
    }

    /// Current lifecycle state.
    #[inline]
    pub fn state(&self) -> TrainerState {
        self.state
    }

    /// The hyperparameters this trainer runs with.
    #[inline]
    pub fn config(&self) -> &BackPropConfig {
        &self.config
    }

    /// Checks every pair in the dataset against the network's shape.
    pub fn validate(&self, net: &Network, data: &DataPairSet) -> Result<()> {
        let input_size = net.input_size_ignoring_bias();
        let output_size = net.output_size();
        for pair in data.pairs() {
            if pair.input().len() != input_size {
                return Err(AnnetError::ShapeMismatch {
                    role: "input",
                    expected: input_size,
                    got: pair.input().len(),
                });
            }
            if pair.ideal().len() != output_size {
                return Err(AnnetError::ShapeMismatch {
                    role: "ideal",
                    expected: output_size,
                    got: pair.ideal().len(),
                });
            }
        }
        Ok(())
    }

    /// Runs the forward pass: loads `input` into the input layer, then
    /// activates every subsequent layer in feed-forward order.
    pub fn forward(&self, net: &mut Network, input: &[f64]) -> Result<()> {
        if !net.is_finalized() {
            return Err(AnnetError::NotFinalized);
        }
        net.set_input_values(input)?;
        for i in 1..net.layer_count() {
            let ids = net.layer(LayerId(i)).neurons().to_vec();
            for id in ids {
                if net.neuron(id).is_bias() {
                    continue;
                }
                let sum: f64 = net
                    .neuron(id)
                    .incoming()
                    .iter()
                    .map(|&s| {
                        let syn = net.synapse(s);
                        syn.weight() * net.neuron(syn.from()).value()
                    })
                    .sum();
                net.neuron_mut(id).activate(sum);
            }
        }
        Ok(())
    }

    /// Runs the forward pass and returns the output-layer values.
    pub fn predict(&self, net: &mut Network, input: &[f64]) -> Result<Vec<f64>> {
        self.forward(net, input)?;
        Ok(net.output_values())
    }

    /// Trains until a strategy signals a stop or the epoch cap trips.
    ///
    /// Weights are (re)initialized through the session at the start and at
    /// every restart; a restart is a plain state reset, never re-entry.
    pub fn train(
        &mut self,
        net: &mut Network,
        data: &DataPairSet,
        session: &mut TrainSession<'_>,
    ) -> Result<TrainOutcome> {
        if data.is_empty() {
            return Err(AnnetError::Training("empty training set".into()));
        }
        if !net.is_finalized() {
            return Err(AnnetError::NotFinalized);
        }
        self.validate(net, data)?;

        self.state = TrainerState::Running;
        session.init_weights(net);
        self.net_error.reset();

        info!(
            "training: {} pairs, learn_rate={}, momentum={}, {} mode, cap {} epochs",
            data.len(),
            self.config.learn_rate,
            self.config.momentum,
            if self.config.batch { "batch" } else { "online" },
            self.config.max_epochs,
        );

        let mut epoch = 0;
        let mut restarts = 0;
        let mut last_rms = f64::NAN;
        let mut rms = 0.0;
        let mut stopped_by_strategy = false;

        while epoch < self.config.max_epochs {
            session.pre_epoch(net);

            for pair in data.pairs() {
                self.forward(net, pair.input())?;
                self.backward(net, pair.ideal());
            }
            if self.config.batch {
                self.apply_batch(net);
            }

            rms = self.net_error.rms();
            let improvement = if last_rms.is_finite() { last_rms - rms } else { 0.0 };
            last_rms = rms;
            session.notify_error(rms);
            self.net_error.reset();

            let progress = EpochProgress {
                epoch,
                rms,
                improvement,
            };
            session.post_epoch(net, &progress);
            epoch += 1;

            if epoch % 1000 == 0 {
                debug!("epoch {epoch}: rms={rms:.6}");
            }

            if session.should_restart() {
                info!("restarting training after epoch {epoch} (rms={rms:.6})");
                session.reset_strategies();
                session.init_weights(net);
                self.net_error.reset();
                last_rms = f64::NAN;
                epoch = 0;
                restarts += 1;
                continue;
            }
            if session.should_stop() {
                stopped_by_strategy = true;
                break;
            }
        }

        self.state = TrainerState::Stopped;
        info!("training stopped after {epoch} epochs, rms={rms:.6}");
        Ok(TrainOutcome {
            epochs: epoch,
            final_rms: rms,
            stopped_by_strategy,
            restarts,
        })
    }

    /// Backward pass for one pair: deltas from the output layer down, with
    /// the weight update (online) or accumulation (batch) per layer.
    fn backward(&mut self, net: &mut Network, ideal: &[f64]) {
        let output_layer = LayerId(net.layer_count() - 1);
        for i in (1..net.layer_count()).rev() {
            let layer = LayerId(i);
            if layer == output_layer {
                self.output_deltas(net, layer, ideal);
            } else {
                self.hidden_deltas(net, layer);
            }
            if self.config.batch {
                self.accumulate_batch(net, layer);
            } else {
                self.update_layer_weights(net, layer);
            }
        }
    }

    /// `delta_i = f'(o_i) * (ideal_i - o_i)` at the output layer, feeding
    /// each observation into the epoch error.
    fn output_deltas(&mut self, net: &mut Network, layer: LayerId, ideal: &[f64]) {
        let ids = net.layer(layer).neurons().to_vec();
        for (i, id) in ids.into_iter().enumerate() {
            let o = net.neuron(id).value();
            let t = ideal[i];
            let delta = net.neuron(id).activation().derivate(o) * (t - o);
            net.neuron_mut(id).set_delta(delta);
            self.net_error.update(t, o);
        }
    }

    /// `delta = f'(o) * sum(w * downstream delta)` at a hidden layer.
    fn hidden_deltas(&self, net: &mut Network, layer: LayerId) {
        let ids = net.layer(layer).neurons().to_vec();
        for id in ids {
            let diff_sum: f64 = net
                .neuron(id)
                .outgoing()
                .iter()
                .map(|&s| {
                    let syn = net.synapse(s);
                    syn.weight() * net.neuron(syn.to()).delta()
                })
                .sum();
            let o = net.neuron(id).value();
            let delta = net.neuron(id).activation().derivate(o) * diff_sum;
            net.neuron_mut(id).set_delta(delta);
        }
    }

    /// Online update of every incoming synapse of `layer`:
    /// `dw = rate * delta_to * value_from + momentum * previous dw`.
    fn update_layer_weights(&self, net: &mut Network, layer: LayerId) {
        let ids = net.layer(layer).neurons().to_vec();
        for id in ids {
            let incoming = net.neuron(id).incoming().to_vec();
            for s in incoming {
                let (delta_to, value_from, old_dw) = {
                    let syn = net.synapse(s);
                    (
                        net.neuron(syn.to()).delta(),
                        net.neuron(syn.from()).value(),
                        syn.delta_weight(),
                    )
                };
                let dw = self.config.learn_rate * delta_to * value_from
                    + self.config.momentum * old_dw;
                let syn = net.synapse_mut(s);
                let w = syn.weight();
                syn.set_weight(w + dw);
                syn.set_delta_weight(dw);
            }
        }
    }

    /// Batch mode: per pair, only accumulate `delta_to * value_from`.
    fn accumulate_batch(&self, net: &mut Network, layer: LayerId) {
        let ids = net.layer(layer).neurons().to_vec();
        for id in ids {
            let incoming = net.neuron(id).incoming().to_vec();
            for s in incoming {
                let contribution = {
                    let syn = net.synapse(s);
                    net.neuron(syn.to()).delta() * net.neuron(syn.from()).value()
                };
                net.synapse_mut(s).accumulate_batch_delta(contribution);
            }
        }
    }

    /// Applies the accumulated batch deltas once per synapse, then clears
    /// the accumulators.
    fn apply_batch(&self, net: &mut Network) {
        for i in 0..net.synapses().len() {
            let s = net.synapses()[i].id();
            let syn = net.synapse_mut(s);
            let dw =
                self.config.learn_rate * syn.batch_delta() + self.config.momentum * syn.delta_weight();
            let w = syn.weight();
            syn.set_weight(w + dw);
            syn.set_delta_weight(dw);
            syn.reset_batch_delta();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataPair;
    use crate::net::{Activation, SynapseId};

    fn fixed_initializer(weights: Vec<f64>) -> impl FnMut(&mut Network, &mut ChaCha8Rng) {
        move |net, _rng| {
            for (i, &w) in weights.iter().enumerate() {
                net.synapse_mut(SynapseId(i)).reset(w);
            }
        }
    }

    #[test]
    fn test_forward_is_deterministic() {
        let mut net = Network::multilayer(&[2, 3, 1], true, Activation::Sigmoid).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        net.init_weights(&mut rng);
        let trainer = BackPropagation::new(BackPropConfig::default());

        let first = trainer.predict(&mut net, &[0.3, 0.7]).unwrap();
        let second = trainer.predict(&mut net, &[0.3, 0.7]).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_forward_requires_finalized_network() {
        let mut net = Network::new();
        let layer = net.push_layer();
        net.push_neuron(layer, Activation::Sigmoid, false).unwrap();
        let trainer = BackPropagation::new(BackPropConfig::default());
        let err = trainer.forward(&mut net, &[1.0]).unwrap_err();
        assert!(matches!(err, AnnetError::NotFinalized));
    }

    #[test]
    fn test_validate_rejects_bad_input_length() {
        let net = Network::multilayer(&[2, 2, 1], true, Activation::Sigmoid).unwrap();
        let trainer = BackPropagation::new(BackPropConfig::default());
        let mut data = DataPairSet::new();
        data.push(DataPair::new(vec![1.0], vec![1.0])).unwrap();
        let err = trainer.validate(&net, &data).unwrap_err();
        assert!(matches!(err, AnnetError::ShapeMismatch { role: "input", .. }));
    }

    #[test]
    fn test_validate_rejects_bad_ideal_length() {
        let net = Network::multilayer(&[2, 2, 1], true, Activation::Sigmoid).unwrap();
        let trainer = BackPropagation::new(BackPropConfig::default());
        let mut data = DataPairSet::new();
        data.push(DataPair::new(vec![1.0, 0.0], vec![1.0, 0.0]))
            .unwrap();
        let err = trainer.validate(&net, &data).unwrap_err();
        assert!(matches!(err, AnnetError::ShapeMismatch { role: "ideal", .. }));
    }

    #[test]
    fn test_online_update_hand_computed() {
        // 1 linear input -> 1 linear output, single weight 0.5, no bias.
        let mut net = Network::multilayer(&[1, 1], false, Activation::Linear).unwrap();
        let config = BackPropConfig {
            learn_rate: 0.35,
            momentum: 0.0,
            batch: false,
            max_epochs: 1,
            seed: Some(0),
        };
        let mut trainer = BackPropagation::new(config);
        let mut session = TrainSession::new(Some(0));
        session.set_initializer(fixed_initializer(vec![0.5]));

        let mut data = DataPairSet::new();
        data.push(DataPair::new(vec![1.0], vec![1.0])).unwrap();
        data.push(DataPair::new(vec![2.0], vec![0.0])).unwrap();

        trainer.train(&mut net, &data, &mut session).unwrap();
        // Pair 1: o = 0.5, delta = 0.5, dw = 0.175, w = 0.675.
        // Pair 2: o = 1.35, delta = -1.35, dw = -0.945, w = -0.27.
        let w = net.synapse(SynapseId(0)).weight();
        assert!((w - (-0.27)).abs() < 1e-12, "got {w}");
    }

    #[test]
    fn test_batch_update_hand_computed() {
        // Same setup in batch mode: deltas accumulate against fixed weights
        // and apply once after the epoch.
        let mut net = Network::multilayer(&[1, 1], false, Activation::Linear).unwrap();
        let config = BackPropConfig {
            learn_rate: 0.35,
            momentum: 0.0,
            batch: true,
            max_epochs: 1,
            seed: Some(0),
        };
        let mut trainer = BackPropagation::new(config);
        let mut session = TrainSession::new(Some(0));
        session.set_initializer(fixed_initializer(vec![0.5]));

        let mut data = DataPairSet::new();
        data.push(DataPair::new(vec![1.0], vec![1.0])).unwrap();
        data.push(DataPair::new(vec![2.0], vec![0.0])).unwrap();

        trainer.train(&mut net, &data, &mut session).unwrap();
        // Contributions: 0.5 * 1 = 0.5 and -1.0 * 2 = -2.0 (weights fixed at
        // 0.5 during the epoch). dw = 0.35 * -1.5 = -0.525, w = -0.025 — the
        // sum of the per-pair online deltas computed at the held weights.
        let syn = net.synapse(SynapseId(0));
        assert!((syn.weight() - (-0.025)).abs() < 1e-12);
        assert_eq!(syn.batch_delta(), 0.0);
    }

    #[test]
    fn test_batch_equals_online_for_single_pair() {
        // With one pair and momentum 0, batch accumulation sees the same
        // values online would, so one epoch must land on identical weights.
        let base = Network::multilayer(&[2, 2, 1], true, Activation::Sigmoid).unwrap();
        let init: Vec<f64> = (0..base.synapses().len())
            .map(|i| 0.1 * (i as f64 + 1.0) - 0.4)
            .collect();

        let mut data = DataPairSet::new();
        data.push(DataPair::new(vec![1.0, 0.0], vec![1.0])).unwrap();

        let mut results = Vec::new();
        for batch in [false, true] {
            let mut net = base.clone();
            let config = BackPropConfig {
                learn_rate: 0.35,
                momentum: 0.0,
                batch,
                max_epochs: 1,
                seed: Some(0),
            };
            let mut trainer = BackPropagation::new(config);
            let mut session = TrainSession::new(Some(0));
            session.set_initializer(fixed_initializer(init.clone()));
            trainer.train(&mut net, &data, &mut session).unwrap();
            results.push(
                net.synapses()
                    .iter()
                    .map(|s| s.weight())
                    .collect::<Vec<_>>(),
            );
        }
        for (online, batch) in results[0].iter().zip(&results[1]) {
            assert!((online - batch).abs() < 1e-12);
        }
    }

    #[test]
    fn test_epoch_cap_trips_without_strategies() {
        let mut net = Network::multilayer(&[2, 2, 1], true, Activation::Sigmoid).unwrap();
        let config = BackPropConfig {
            max_epochs: 17,
            seed: Some(3),
            ..Default::default()
        };
        let mut trainer = BackPropagation::new(config);
        let mut session = TrainSession::new(Some(3));
        let outcome = trainer
            .train(&mut net, &DataPairSet::xor(), &mut session)
            .unwrap();
        assert_eq!(outcome.epochs, 17);
        assert!(!outcome.stopped_by_strategy);
        assert_eq!(trainer.state(), TrainerState::Stopped);
    }

    #[test]
    fn test_stop_strategy_ends_training() {
        let mut net = Network::multilayer(&[2, 2, 1], true, Activation::Sigmoid).unwrap();
        let mut trainer = BackPropagation::new(BackPropConfig {
            seed: Some(5),
            ..Default::default()
        });
        let mut session = TrainSession::new(Some(5));
        session.add_strategy(crate::backprop::StopAfterEpochs::new(3));
        let outcome = trainer
            .train(&mut net, &DataPairSet::xor(), &mut session)
            .unwrap();
        assert_eq!(outcome.epochs, 3);
        assert!(outcome.stopped_by_strategy);
    }

    #[test]
    fn test_restart_resets_epoch_counter() {
        // Restart once after the first epoch, then stop after two more.
        struct RestartOnce {
            fired: bool,
            epochs_seen: usize,
        }
        impl Strategy for RestartOnce {
            fn post_epoch(&mut self, _net: &Network, _p: &EpochProgress) {
                self.epochs_seen += 1;
            }
            fn should_restart(&self) -> bool {
                !self.fired && self.epochs_seen >= 1
            }
            fn reset(&mut self) {
                self.fired = true;
            }
        }

        let mut net = Network::multilayer(&[2, 2, 1], true, Activation::Sigmoid).unwrap();
        let mut trainer = BackPropagation::new(BackPropConfig {
            seed: Some(11),
            ..Default::default()
        });
        let mut session = TrainSession::new(Some(11));
        session.add_strategy(RestartOnce {
            fired: false,
            epochs_seen: 0,
        });
        session.add_strategy(crate::backprop::StopAfterEpochs::new(2));
        let outcome = trainer
            .train(&mut net, &DataPairSet::xor(), &mut session)
            .unwrap();
        assert_eq!(outcome.restarts, 1);
        // StopAfterEpochs was reset by the restart, so two further epochs ran.
        assert_eq!(outcome.epochs, 2);
    }

    #[test]
    fn test_empty_dataset_is_rejected() {
        let mut net = Network::multilayer(&[2, 2, 1], true, Activation::Sigmoid).unwrap();
        let mut trainer = BackPropagation::new(BackPropConfig::default());
        let mut session = TrainSession::new(Some(0));
        let err = trainer
            .train(&mut net, &DataPairSet::new(), &mut session)
            .unwrap_err();
        assert!(matches!(err, AnnetError::Training(_)));
    }
}
