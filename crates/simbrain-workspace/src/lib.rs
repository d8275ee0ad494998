// Copyright 2025 The Simbrain Authors
// SPDX-License-Identifier: Apache-2.0

//! # Simbrain Workspace
//!
//! Runs many components (networks, data tables, recorders) side by side:
//! - **Components**: anything implementing [`WorkspaceComponent`]
//! - **Couplings**: typed producer -> consumer attribute links, flushed in
//!   registration order after every cycle
//! - **Updater**: fans component updates out to a `rayon` pool, waits at a
//!   barrier, flushes couplings, then notifies listeners
//!
//! ## Example
//!
//! ```
//! use simbrain_network::{Network, Neuron};
//! use simbrain_workspace::{AttributeRef, DataTableComponent, NetworkComponent, Workspace};
//!
//! let ws = Workspace::with_threads(2).unwrap();
//! let table = ws.add_component(DataTableComponent::new("stimulus", vec![vec![1.0]]));
//!
//! let mut network = Network::with_seed(7);
//! let n = network.add_neuron(Neuron::default()).unwrap();
//! let net = ws.add_component(NetworkComponent::new("net", network));
//!
//! ws.couple(
//!     AttributeRef::new(table, "column:0"),
//!     AttributeRef::new(net, format!("neuron:{}:input", n.0)),
//! )
//! .unwrap();
//!
//! ws.iterate(2).unwrap();
//! let activation = ws
//!     .with_component(net, |c: &mut NetworkComponent| c.network().neuron(n).unwrap().activation())
//!     .unwrap();
//! assert_eq!(activation, 1.0);
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod attribute;
pub mod component;
pub mod components;
pub mod coupling;
pub mod error;
pub mod listener;
pub mod state;
pub mod updater;
pub mod workspace;

pub use attribute::{AttributeRef, AttributeSpec, ComponentId, Value, ValueType};
pub use component::{AsAny, WorkspaceComponent};
pub use components::recorder::Sample;
pub use components::{DataTableComponent, NetworkComponent, RecorderComponent};
pub use coupling::{
    Coupling, CouplingId, CouplingManager, CouplingStatus, FlushReport, InertCoupling,
    InertReason,
};
pub use error::{ComponentError, Result, WorkspaceError};
pub use listener::{ChannelListener, UpdaterEvent, UpdaterListener};
pub use state::UpdaterState;
pub use updater::{ComponentFailure, CycleReport, FailureCause};
pub use workspace::Workspace;
