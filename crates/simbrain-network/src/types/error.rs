// Copyright 2025 The Simbrain Authors
// SPDX-License-Identifier: Apache-2.0

//! Error types for network operations
//!
//! Only configuration and structural operations fail. Rule application never
//! returns an error: NaN and infinities propagate through the arithmetic.

use super::ids::{NeuronId, SynapseId};

/// Error types for network operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NetworkError {
    #[error("Neuron not found: {0}")]
    NeuronNotFound(NeuronId),

    #[error("Synapse not found: {0}")]
    SynapseNotFound(SynapseId),

    #[error("Invalid {rule} parameter: {reason}")]
    InvalidParameter {
        rule: &'static str,
        reason: &'static str,
    },

    #[error("Invalid bounds: lower bound {lower} exceeds upper bound {upper}")]
    InvalidBounds { lower: f64, upper: f64 },

    #[error("Invalid time step {0}: must be finite and > 0")]
    InvalidTimeStep(f64),

    #[error("{0} id space exhausted")]
    IdSpaceExhausted(&'static str),
}

pub type Result<T> = core::result::Result<T, NetworkError>;
