// Copyright 2025 The Simbrain Authors
// SPDX-License-Identifier: Apache-2.0

//! Per-entity scratch state
//!
//! Rules are shared parameter sets; anything a rule needs to remember between
//! steps for one particular neuron or synapse lives here.

use serde::{Deserialize, Serialize};

/// Scratch data owned by one neuron
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalarData {
    #[default]
    Empty,
    Biased {
        bias: f64,
    },
}

impl ScalarData {
    /// Bias term, zero when the rule keeps none
    #[inline]
    pub fn bias(&self) -> f64 {
        match self {
            ScalarData::Biased { bias } => *bias,
            ScalarData::Empty => 0.0,
        }
    }

    /// Set the bias; ignored for rules without one
    pub fn set_bias(&mut self, value: f64) {
        if let ScalarData::Biased { bias } = self {
            *bias = value;
        }
    }
}

/// Scratch data owned by one synapse
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SynapseData {
    /// Source spike flag seen by the previous step (one-step lag for STDP)
    pub source_spiked_last: bool,
    /// Target spike flag seen by the previous step
    pub target_spiked_last: bool,
    /// Remaining steps of a step-responder pulse
    pub response_countdown: u32,
}
