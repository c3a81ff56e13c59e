//! Unsupervised competitive learning: the self-organizing map.
//!
//! [`SomTrainer`] runs a two-phase annealed schedule over a network whose
//! output layer forms an N-dimensional [`Lattice`]. [`som_network`] builds
//! that topology on the shared graph model.

mod lattice;
mod trainer;

pub use lattice::Lattice;
pub use trainer::{find_winner, som_network, LatticeObserver, Pacer, SleepPacer, SomTrainer};
