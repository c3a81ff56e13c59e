//! Competitive learning over a self-organizing lattice.

use crate::config::SomConfig;
use crate::error::{AnnetError, Result};
use crate::net::{Activation, Network, NeuronId};
use crate::som::Lattice;
use log::{debug, info};
use rand::distributions::{Distribution, Uniform};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::thread;
use std::time::Duration;

/// Read-only observer notified after each weight adjustment step.
///
/// Receives the full current lattice state; it must not mutate anything.
pub trait LatticeObserver {
    /// Called once per presented sample, after the neighborhood update.
    fn update(&mut self, net: &Network, lattice: &Lattice);
}

/// Pacing hook between samples, capping visualization refresh rate.
pub trait Pacer {
    /// Waits for whatever interval the pacer implements. Returning early
    /// is harmless; training continues either way.
    fn pause(&mut self);
}

/// A [`Pacer`] that naps for a fixed duration per step.
#[derive(Debug)]
pub struct SleepPacer {
    delay: Duration,
}

impl SleepPacer {
    /// Pauses `delay` between samples.
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Pacer for SleepPacer {
    fn pause(&mut self) {
        // park_timeout may wake early; a shortened pause is fine.
        thread::park_timeout(self.delay);
    }
}

/// Builds the SOM topology over the shared graph model: an input layer of
/// `input_size` neurons fully connected to one output unit per lattice
/// cell, creation order matching the lattice's linear order.
///
/// Input neurons take the first `input_size` global ids, so a sample
/// vector indexed by a synapse's source id lines up by construction.
pub fn som_network(
    input_size: usize,
    dims: &[usize],
    activation: Activation,
) -> Result<(Network, Lattice)> {
    if input_size == 0 {
        return Err(AnnetError::Config("input size must be positive".into()));
    }
    let lattice = Lattice::new(dims)?;
    let mut net = Network::new();
    let input_layer = net.push_layer();
    let mut inputs = Vec::with_capacity(input_size);
    for _ in 0..input_size {
        inputs.push(net.push_neuron(input_layer, activation, false)?);
    }
    let output_layer = net.push_layer();
    for _ in 0..lattice.len() {
        let unit = net.push_neuron(output_layer, activation, false)?;
        for &from in &inputs {
            net.connect(from, unit)?;
        }
    }
    net.finalize()?;
    Ok((net, lattice))
}

/// Finds the winner unit for an input vector: the output unit whose
/// incoming-weight vector has the smallest squared Euclidean distance to
/// the input. Ties resolve to the lower linear index.
pub fn find_winner(net: &Network, input: &[f64]) -> usize {
    let mut winner = 0;
    let mut best = f64::INFINITY;
    for (i, &id) in net.output_layer().neurons().iter().enumerate() {
        let mut dist = 0.0;
        for &s in net.neuron(id).incoming() {
            let syn = net.synapse(s);
            let diff = input[syn.from().0] - syn.weight();
            dist += diff * diff;
        }
        if dist < best {
            best = dist;
            winner = i;
        }
    }
    winner
}

/// The self-organizing-map trainer: a two-phase annealed schedule of
/// winner search and neighborhood weight updates.
pub struct SomTrainer<'a> {
    config: SomConfig,
    rng: ChaCha8Rng,
    observer: Option<Box<dyn LatticeObserver + 'a>>,
    pacer: Option<Box<dyn Pacer + 'a>>,
}

impl<'a> SomTrainer<'a> {
    /// Creates a trainer with the given schedule.
    pub fn new(config: SomConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            config,
            rng,
            observer: None,
            pacer: None,
        }
    }

    /// Installs an observer notified after every update step.
    pub fn set_observer(&mut self, observer: impl LatticeObserver + 'a) {
        self.observer = Some(Box::new(observer));
    }

    /// Installs a pacing hook run after each sample.
    pub fn set_pacer(&mut self, pacer: impl Pacer + 'a) {
        self.pacer = Some(Box::new(pacer));
    }

    /// Learning factor and radius for an ordering-phase epoch. The radius
    /// shrinks by one per epoch and never drops below 1.
    pub fn ordering_params(&self, epoch: usize) -> (f64, usize) {
        let factor =
            self.config.ordering_factor - self.config.ordering_factor_decrement * epoch as f64;
        let radius = self.config.ordering_radius.saturating_sub(epoch).max(1);
        (factor, radius)
    }

    /// Learning factor and radius for a convergence-phase epoch. The
    /// radius is pinned at 1.
    pub fn convergence_params(&self, epoch: usize) -> (f64, usize) {
        let factor = self.config.convergence_factor
            - self.config.convergence_factor_decrement * epoch as f64;
        (factor, 1)
    }

    /// Runs the full two-phase schedule over a network built by
    /// [`som_network`].
    pub fn train(&mut self, net: &mut Network, lattice: &Lattice) -> Result<()> {
        if !net.is_finalized() {
            return Err(AnnetError::NotFinalized);
        }
        if net.output_size() != lattice.len() {
            return Err(AnnetError::Structure(format!(
                "lattice has {} cells but the output layer has {} units",
                lattice.len(),
                net.output_size()
            )));
        }
        if self.config.sample_min >= self.config.sample_max {
            return Err(AnnetError::Config(format!(
                "empty sample range [{}, {})",
                self.config.sample_min, self.config.sample_max
            )));
        }

        net.init_weights(&mut self.rng);

        info!(
            "som training: {} inputs, lattice {:?}, phases {}x{} + {}x{}",
            net.input_size_ignoring_bias(),
            lattice.dims(),
            self.config.ordering_epochs,
            self.config.ordering_samples,
            self.config.convergence_epochs,
            self.config.convergence_samples,
        );

        // Phase 1: ordering. Wide, shrinking neighborhood.
        for epoch in 0..self.config.ordering_epochs {
            let (factor, radius) = self.ordering_params(epoch);
            for _ in 0..self.config.ordering_samples {
                let input = self.random_vector(net.input_size_ignoring_bias());
                self.present(net, lattice, &input, factor, radius);
            }
            if epoch % 50 == 0 {
                debug!("ordering epoch {epoch}: factor={factor:.4}, radius={radius}");
            }
        }

        // Phase 2: convergence. Radius pinned at 1.
        for epoch in 0..self.config.convergence_epochs {
            let (factor, radius) = self.convergence_params(epoch);
            for _ in 0..self.config.convergence_samples {
                let input = self.random_vector(net.input_size_ignoring_bias());
                self.present(net, lattice, &input, factor, radius);
            }
            if epoch % 25 == 0 {
                debug!("convergence epoch {epoch}: factor={factor:.4}");
            }
        }

        info!("som training finished");
        Ok(())
    }

    /// Presents one sample: winner search, neighborhood update, observer
    /// notification, pacing.
    pub(crate) fn present(
        &mut self,
        net: &mut Network,
        lattice: &Lattice,
        input: &[f64],
        factor: f64,
        radius: usize,
    ) {
        let winner = find_winner(net, input);
        let neighbors = lattice.neighbors_within(&lattice.coords_of(winner), radius);
        let units: Vec<NeuronId> = net.output_layer().neurons().to_vec();
        for cell in neighbors {
            let incoming = net.neuron(units[cell]).incoming().to_vec();
            for s in incoming {
                let (source, weight) = {
                    let syn = net.synapse(s);
                    (syn.from(), syn.weight())
                };
                // Replaces the weight outright rather than nudging it
                // toward the input.
                net.synapse_mut(s)
                    .set_weight(factor * (input[source.0] - weight));
            }
        }
        if let Some(observer) = &mut self.observer {
            observer.update(net, lattice);
        }
        if let Some(pacer) = &mut self.pacer {
            pacer.pause();
        }
    }

    fn random_vector(&mut self, len: usize) -> Vec<f64> {
        let between = Uniform::from(self.config.sample_min..self.config.sample_max);
        (0..len).map(|_| between.sample(&mut self.rng)).collect()
    }
}
