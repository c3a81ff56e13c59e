//! # annet - educational neural-network toolkit
//!
//! annet implements two learning paradigms over one shared graph-based
//! network model: supervised multilayer-perceptron training via
//! backpropagation, and unsupervised competitive learning on a
//! self-organizing (Kohonen-style) lattice.
//!
//! ## Overview
//!
//! A [`net::Network`] is an arena of layers, neurons and weighted directed
//! synapses, referenced by integer handles. Topology is append-only and
//! frozen by `finalize`; training only ever mutates numeric state.
//!
//! ## Quick Start
//!
//! ```rust
//! use annet::backprop::{BackPropagation, StopBelowRms, TrainSession};
//! use annet::net::{Activation, Network};
//! use annet::{BackPropConfig, DataPairSet};
//!
//! # fn main() -> annet::Result<()> {
//! let mut net = Network::multilayer(&[2, 2, 1], true, Activation::Sigmoid)?;
//! let mut trainer = BackPropagation::new(BackPropConfig::default());
//! let mut session = TrainSession::new(Some(42));
//! session.add_strategy(StopBelowRms::new(0.05));
//! trainer.train(&mut net, &DataPairSet::xor(), &mut session)?;
//! # Ok(())
//! # }
//! ```
//!
//! Training a map works the same way over the same graph:
//!
//! ```rust,no_run
//! use annet::net::Activation;
//! use annet::som::{som_network, SomTrainer};
//! use annet::SomConfig;
//!
//! # fn main() -> annet::Result<()> {
//! let (mut net, lattice) = som_network(3, &[8, 8], Activation::Sigmoid)?;
//! let mut trainer = SomTrainer::new(SomConfig::default());
//! trainer.train(&mut net, &lattice)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`net`] - the network graph model (layers, neurons, synapses)
//! - [`backprop`] - supervised training: forward pass, backpropagation,
//!   online/batch updates, strategies
//! - [`som`] - competitive learning: lattice math and the two-phase
//!   annealed trainer
//! - [`config`] - trainer hyperparameters
//! - [`data`] - input/ideal training pairs

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backprop;
pub mod config;
pub mod data;
pub mod error;
pub mod net;
pub mod som;

// Re-export commonly used types
pub use config::{BackPropConfig, SomConfig};
pub use data::{DataPair, DataPairSet};
pub use error::{AnnetError, Result};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
