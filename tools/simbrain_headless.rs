// Copyright 2025 The Simbrain Authors
// SPDX-License-Identifier: Apache-2.0

//! Headless demonstration run
//!
//! Builds a small workspace (stimulus table -> decay inputs -> integrate-and-fire
//! layer -> STDP-trained output neuron -> recorder), runs it through the
//! updater and prints a summary.
//!
//! ```text
//! simbrain-headless --iterations 500 --threads 4 --debug-simbrain-workspace
//! ```

use anyhow::{Context, Result};
use clap::{CommandFactory, FromArgMatches, Parser};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use simbrain::config::{load_config_or_default, SimbrainConfig};
use simbrain::observability::{debug_flags_help, init_logging, parse_debug_flags, ObservabilityConfig};
use simbrain::prelude::*;

/// Simbrain headless runner - steps a demonstration workspace without a GUI
#[derive(Parser, Debug)]
#[command(name = "simbrain-headless", version, author, long_about = None)]
struct Args {
    /// Path to simbrain.toml (searched for when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Cycles to run (overrides updater.iterations)
    #[arg(short = 'n', long)]
    iterations: Option<u64>,

    /// Worker threads (overrides updater.num_threads, 0 = one per core)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Network seed (overrides network.seed)
    #[arg(long)]
    seed: Option<u64>,

    /// Integrate-and-fire neurons in the hidden layer
    #[arg(long, default_value_t = 8)]
    layer_size: usize,

    /// Rows in the generated stimulus table
    #[arg(long, default_value_t = 50)]
    stimulus_rows: usize,

    /// Drive cycles from the background updater thread instead of iterate()
    #[arg(long, default_value_t = false)]
    background: bool,
}

impl Args {
    fn config_overrides(&self) -> HashMap<String, String> {
        let mut overrides = HashMap::new();
        if let Some(iterations) = self.iterations {
            overrides.insert("iterations".to_string(), iterations.to_string());
        }
        if let Some(threads) = self.threads {
            overrides.insert("num_threads".to_string(), threads.to_string());
        }
        if let Some(seed) = self.seed {
            overrides.insert("seed".to_string(), seed.to_string());
        }
        overrides
    }
}

/// Ids needed after the run
struct Demo {
    network: ComponentId,
    recorder: ComponentId,
    hidden: Vec<NeuronId>,
    output: NeuronId,
}

fn main() -> Result<()> {
    // --debug-<crate> flags are handled by the observability crate, not clap
    let clap_args: Vec<String> = std::env::args().filter(|a| !a.starts_with("--debug-")).collect();
    let matches = Args::command()
        .after_help(debug_flags_help())
        .get_matches_from(clap_args);
    let args = Args::from_arg_matches(&matches)?;

    let config = load_config_or_default(args.config.as_deref(), Some(&args.config_overrides()))
        .context("Failed to load configuration")?;

    let debug_flags = parse_debug_flags();
    let _logging = init_logging(&ObservabilityConfig::from(&config.logging), &debug_flags)?;

    info!("🧠 Simbrain headless v{}", simbrain::network::VERSION);
    info!(
        "  time_step={} seed={} threads={} iterations={}",
        config.network.time_step,
        config.network.seed,
        config.updater.resolved_num_threads(),
        config.updater.iterations
    );

    let workspace = Workspace::new(&config.updater)?;
    let (listener, events) = ChannelListener::new();
    workspace.add_listener(Arc::new(listener));

    let demo = build_demo(&workspace, &config, &args)?;
    info!(
        "✓ Workspace ready: {} components, {} couplings",
        workspace.component_count(),
        workspace.couplings().len()
    );

    let started = Instant::now();
    let cycles = if args.background {
        run_in_background(&workspace, config.updater.iterations)?
    } else {
        workspace.iterate(config.updater.iterations)?
    };
    let elapsed = started.elapsed();

    let mut failures = 0usize;
    let mut inert = 0usize;
    for event in events.try_iter() {
        match event {
            UpdaterEvent::ComponentFailed(_) => failures += 1,
            UpdaterEvent::CouplingInert(_) => inert += 1,
            _ => {}
        }
    }
    if failures > 0 {
        warn!("{} component updates failed during the run", failures);
    }

    print_summary(&workspace, &demo, cycles, elapsed, failures, inert)?;
    Ok(())
}

fn build_demo(workspace: &Workspace, config: &SimbrainConfig, args: &Args) -> Result<Demo> {
    let rows: Vec<Vec<f64>> = (0..args.stimulus_rows.max(1))
        .map(|i| {
            let phase = i as f64 * 0.3;
            vec![phase.sin().abs(), phase.cos().abs()]
        })
        .collect();
    let table = workspace.add_component(DataTableComponent::new("stimulus", rows));

    let mut network = Network::from_config(&config.network)?;

    let inputs = network.add_neurons(2, NeuronRule::Decay(DecayParams::default()))?;
    let iaf = NeuronRule::IntegrateAndFire(IntegrateAndFireParams::default());
    let hidden = network.add_neurons(args.layer_size, iaf.clone())?;
    let output = network.add_neuron(Neuron::new(iaf).with_label("output"))?;

    for &input in &inputs {
        for &h in &hidden {
            network.add_synapse(input, h, 0.5)?;
        }
    }
    network.randomize_strengths(&NoiseSource::Uniform { min: 0.2, max: 0.8 })?;

    for &h in &hidden {
        let synapse = Synapse::new(h, output, 0.3)
            .with_rule(SynapseRule::Stdp(StdpParams::default()))
            .with_responder(SpikeResponder::Step(Default::default()));
        network.add_synapse_with(synapse)?;
    }

    let net = workspace.add_component(NetworkComponent::new("network", network));

    let mut recorder = RecorderComponent::new("recorder")
        .with_series("activations", ValueType::Vector)
        .with_series("output", ValueType::Scalar);
    for &h in &hidden {
        recorder.add_series(format!("spike:{}", h.0), ValueType::Scalar);
    }
    let recorder = workspace.add_component(recorder);

    // Table rows drive the two input neurons (inputs come first in insertion order)
    workspace.couple(AttributeRef::new(table, "row"), AttributeRef::new(net, "network:inputs"))?;
    workspace.couple(
        AttributeRef::new(net, "network:activations"),
        AttributeRef::new(recorder, "series:activations"),
    )?;
    workspace.couple(
        AttributeRef::new(net, format!("neuron:{}:activation", output.0)),
        AttributeRef::new(recorder, "series:output"),
    )?;
    for &h in &hidden {
        workspace.couple(
            AttributeRef::new(net, format!("neuron:{}:spike", h.0)),
            AttributeRef::new(recorder, format!("series:spike:{}", h.0)),
        )?;
    }

    Ok(Demo {
        network: net,
        recorder,
        hidden,
        output,
    })
}

fn run_in_background(workspace: &Workspace, iterations: u64) -> Result<u64> {
    let start = workspace.cycle_count();
    workspace.run()?;
    while workspace.cycle_count() - start < iterations {
        std::thread::sleep(Duration::from_millis(1));
    }
    workspace.stop();
    Ok(workspace.cycle_count() - start)
}

fn print_summary(
    workspace: &Workspace,
    demo: &Demo,
    cycles: u64,
    elapsed: Duration,
    failures: usize,
    inert: usize,
) -> Result<()> {
    let (time, strengths) = workspace.with_component(demo.network, |c: &mut NetworkComponent| {
        let network = c.network();
        let strengths: Vec<f64> = network
            .fan_in(demo.output)
            .iter()
            .filter_map(|&id| network.synapse(id).ok())
            .map(|s| s.strength())
            .collect();
        (network.time(), strengths)
    })?;

    let spike_counts = workspace.with_component(demo.recorder, |r: &mut RecorderComponent| {
        demo.hidden
            .iter()
            .map(|h| {
                let spikes = r.scalars(&format!("spike:{}", h.0));
                spikes.iter().filter(|&&v| v > 0.0).count()
            })
            .collect::<Vec<_>>()
    })?;
    let output_mean = workspace.with_component(demo.recorder, |r: &mut RecorderComponent| {
        let values = r.scalars("output");
        if values.is_empty() {
            0.0
        } else {
            values.iter().sum::<f64>() / values.len() as f64
        }
    })?;

    let mean_strength = if strengths.is_empty() {
        0.0
    } else {
        strengths.iter().sum::<f64>() / strengths.len() as f64
    };
    let per_second = cycles as f64 / elapsed.as_secs_f64().max(f64::EPSILON);

    println!("Simbrain headless run");
    println!("  cycles:            {} ({:.1} cycles/s)", cycles, per_second);
    println!("  network time:      {:.3}", time);
    println!("  hidden spikes:     {:?}", spike_counts);
    println!("  output mean:       {:.4}", output_mean);
    println!("  STDP mean weight:  {:.4} over {} synapses", mean_strength, strengths.len());
    println!("  failed updates:    {}", failures);
    println!("  inert couplings:   {}", inert);
    Ok(())
}
