//! Supervised multilayer-perceptron training via backpropagation.
//!
//! [`BackPropagation`] drives forward passes, error backpropagation and
//! weight updates over a [`crate::net::Network`]. A [`TrainSession`]
//! supplies the external collaborators: [`Strategy`] hooks deciding when
//! to stop or restart, an error sink receiving each epoch's RMS, and the
//! weight initializer.

mod net_error;
mod strategy;
mod trainer;

pub use net_error::NetError;
pub use strategy::{
    EpochProgress, RestartOnStagnation, StopAfterEpochs, StopBelowRms, Strategy,
};
pub use trainer::{BackPropagation, TrainOutcome, TrainSession, TrainerState};
