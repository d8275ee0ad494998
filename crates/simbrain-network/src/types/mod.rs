// Copyright 2025 The Simbrain Authors
// SPDX-License-Identifier: Apache-2.0

//! # Core Types
//!
//! Identity and error types shared by rules and the network graph.

pub mod error;
pub mod ids;

pub use error::{NetworkError, Result};
pub use ids::{NeuronId, SynapseId};
