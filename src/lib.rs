// Copyright 2025 The Simbrain Authors
// SPDX-License-Identifier: Apache-2.0

//! # Simbrain
//!
//! Neuron/synapse update engine and concurrent workspace scheduler for
//! biologically inspired network simulations.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! simbrain = "0.4"
//! ```
//!
//! ```rust
//! use simbrain::prelude::*;
//!
//! let mut network = Network::with_seed(1);
//! let a = network.add_neuron(Neuron::default())?;
//! let b = network.add_neuron(Neuron::new(NeuronRule::Decay(DecayParams::default())))?;
//! network.add_synapse(a, b, 0.8)?;
//!
//! let ws = Workspace::with_threads(2)?;
//! let net = ws.add_component(NetworkComponent::new("net", network));
//! let plot = ws.add_component(RecorderComponent::new("plot").with_series("b", ValueType::Scalar));
//! ws.couple(
//!     AttributeRef::new(net, format!("neuron:{}:activation", b.0)),
//!     AttributeRef::new(plot, "series:b"),
//! )?;
//!
//! ws.iterate(10)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Foundation: simbrain-config, simbrain-observability    │
//! │  (TOML config, tracing setup)                           │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Algorithms: simbrain-network                           │
//! │  (Update rules, learning rules, two-phase stepping)     │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Scheduling: simbrain-workspace                         │
//! │  (Components, couplings, worker-pool updater)           │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## License
//!
//! Apache-2.0

pub use simbrain_config as config;
pub use simbrain_network as network;
pub use simbrain_observability as observability;
pub use simbrain_workspace as workspace;

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::network::{
        DecayParams, ExponentialStdpParams, HebbianParams, IntegrateAndFireParams, LinearParams,
        Network, NetworkError, Neuron, NeuronId, NeuronRule, NoiseSource, Polarity,
        SpikeResponder, SpikingThresholdParams, StdpParams, Synapse, SynapseId, SynapseRule,
    };
    pub use crate::workspace::{
        AttributeRef, ChannelListener, ComponentId, CouplingId, DataTableComponent,
        NetworkComponent, RecorderComponent, UpdaterEvent, UpdaterListener, UpdaterState, Value,
        ValueType, Workspace, WorkspaceComponent, WorkspaceError,
    };
}
