// Copyright 2025 The Simbrain Authors
// SPDX-License-Identifier: Apache-2.0

//! # Simbrain Network Engine
//!
//! Neuron and synapse dynamics in one place:
//! - **Rules**: neuron update rules (linear, decay, integrate-and-fire,
//!   spiking threshold)
//! - **Synapse rules**: learning rules (Hebbian, STDP) and spike responders
//! - **Network**: arena-owned graph with buffered two-phase stepping
//! - **Schema**: declarative parameter tables for external editors
//!
//! ## Example
//!
//! ```
//! use simbrain_network::{Network, Neuron, NeuronRule};
//!
//! let mut net = Network::with_seed(42);
//! let a = net.add_neuron(Neuron::default()).unwrap();
//! let b = net.add_neuron(Neuron::new(NeuronRule::default())).unwrap();
//! net.add_synapse(a, b, 0.5).unwrap();
//!
//! net.add_input(a, 1.0).unwrap();
//! net.step_n(2);
//! assert_eq!(net.neuron(b).unwrap().activation(), 0.5);
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod data;
pub mod network;
pub mod neuron;
pub mod noise;
pub mod rules;
pub mod schema;
pub mod synapse;
pub mod synapse_rules;
pub mod types;

pub use data::{ScalarData, SynapseData};
pub use network::{Network, RemovedNeuron};
pub use neuron::{Neuron, Polarity};
pub use noise::NoiseSource;
pub use rules::{
    DecayParams, DecayUpdateType, IntegrateAndFireParams, LinearParams, NeuronRule,
    NeuronRuleKind, SpikingThresholdParams, TimeType,
};
pub use schema::{schema_to_json, ParamSpec, ParamValue, RuleParameters};
pub use synapse::Synapse;
pub use synapse_rules::{
    ExponentialStdpParams, HebbianParams, JumpAndDecayParams, SpikeResponder,
    SpikeResponderKind, StdpParams, StepParams, SynapseRule, SynapseRuleKind,
};
pub use types::{NetworkError, NeuronId, Result, SynapseId};
