//! annet CLI - train the demo networks from the command line.

use annet::backprop::{BackPropagation, StopBelowRms, TrainSession};
use annet::net::{Activation, Network};
use annet::som::{som_network, LatticeObserver, SomTrainer};
use annet::{BackPropConfig, DataPairSet, Result, SomConfig};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;

#[derive(Parser)]
#[command(name = "annet")]
#[command(version)]
#[command(about = "Educational neural-network toolkit", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a 2-2-1 perceptron on the XOR truth table
    Xor {
        /// Epoch cap
        #[arg(long, default_value = "5000")]
        epochs: usize,

        /// Learning rate
        #[arg(long, default_value = "0.35")]
        learn_rate: f64,

        /// Momentum
        #[arg(long, default_value = "0.8")]
        momentum: f64,

        /// Accumulate updates over each epoch instead of applying online
        #[arg(long)]
        batch: bool,

        /// Stop once RMS error drops below this value
        #[arg(long, default_value = "0.05")]
        target_rms: f64,

        /// Random seed for reproducibility
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Train a self-organizing map on random input vectors
    Som {
        /// Number of input neurons
        #[arg(long, default_value = "3")]
        inputs: usize,

        /// Lattice extent per dimension, comma-separated
        #[arg(long, value_delimiter = ',', default_value = "8,8")]
        dims: Vec<usize>,

        /// Random seed for reproducibility
        #[arg(short, long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    match cli.command {
        Commands::Xor {
            epochs,
            learn_rate,
            momentum,
            batch,
            target_rms,
            seed,
        } => train_xor(epochs, learn_rate, momentum, batch, target_rms, seed),
        Commands::Som { inputs, dims, seed } => train_som(inputs, &dims, seed),
    }
}

fn train_xor(
    epochs: usize,
    learn_rate: f64,
    momentum: f64,
    batch: bool,
    target_rms: f64,
    seed: Option<u64>,
) -> Result<()> {
    let mut net = Network::multilayer(&[2, 2, 1], true, Activation::Sigmoid)?;
    let config = BackPropConfig {
        learn_rate,
        momentum,
        batch,
        max_epochs: epochs,
        seed,
    };
    let mut trainer = BackPropagation::new(config);

    let bar = ProgressBar::new(epochs as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} epochs, rms {msg}")
            .expect("valid template"),
    );

    let mut session = TrainSession::new(seed);
    session.add_strategy(StopBelowRms::new(target_rms));
    {
        let bar = &bar;
        session.on_error(move |rms| {
            bar.inc(1);
            bar.set_message(format!("{rms:.5}"));
        });
    }

    let data = DataPairSet::xor();
    let outcome = trainer.train(&mut net, &data, &mut session)?;
    drop(session);
    bar.finish_and_clear();

    if outcome.stopped_by_strategy {
        info!(
            "reached rms {:.5} after {} epochs",
            outcome.final_rms, outcome.epochs
        );
    } else {
        info!(
            "epoch cap hit at rms {:.5}; try more epochs or another seed",
            outcome.final_rms
        );
    }

    println!("a b | out");
    for pair in data.pairs() {
        let out = trainer.predict(&mut net, pair.input())?;
        println!(
            "{} {} | {:.4}",
            pair.input()[0],
            pair.input()[1],
            out[0]
        );
    }
    Ok(())
}

fn train_som(inputs: usize, dims: &[usize], seed: Option<u64>) -> Result<()> {
    let (mut net, lattice) = som_network(inputs, dims, Activation::Sigmoid)?;
    let config = SomConfig {
        seed,
        ..Default::default()
    };

    let total_samples = config.ordering_epochs * config.ordering_samples
        + config.convergence_epochs * config.convergence_samples;
    let bar = ProgressBar::new(total_samples as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} samples").expect("valid template"),
    );

    struct Progress<'a>(&'a ProgressBar);
    impl LatticeObserver for Progress<'_> {
        fn update(&mut self, _net: &annet::net::Network, _lattice: &annet::som::Lattice) {
            self.0.inc(1);
        }
    }

    let mut trainer = SomTrainer::new(config);
    trainer.set_observer(Progress(&bar));
    trainer.train(&mut net, &lattice)?;
    drop(trainer);
    bar.finish_and_clear();

    println!("trained {:?} lattice, {} units:", dims, lattice.len());
    for (i, &unit) in net.output_layer().neurons().iter().enumerate() {
        let weights: Vec<String> = net
            .neuron(unit)
            .incoming()
            .iter()
            .map(|&s| format!("{:+.3}", net.synapse(s).weight()))
            .collect();
        println!("  {:?} [{}]", lattice.coords_of(i), weights.join(", "));
    }
    Ok(())
}
