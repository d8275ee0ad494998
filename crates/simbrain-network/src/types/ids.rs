// Copyright 2025 The Simbrain Authors
// SPDX-License-Identifier: Apache-2.0

//! Identity types for neurons and synapses
//!
//! Ids are arena indices. A network never reuses an id after removal, so a
//! stale id held by a collaborator resolves to "not found" instead of to a
//! different entity.

use core::fmt;
use serde::{Deserialize, Serialize};

/// Neuron ID (unique within one network)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NeuronId(pub u32);

impl NeuronId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NeuronId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Neuron({})", self.0)
    }
}

/// Synapse ID (unique within one network)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SynapseId(pub u32);

impl SynapseId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SynapseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Synapse({})", self.0)
    }
}
