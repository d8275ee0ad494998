// Copyright 2025 The Simbrain Authors
// SPDX-License-Identifier: Apache-2.0

//! Spiking threshold rule: spike (activation 1) whenever `input >= threshold`.

use super::{NeuronSnapshot, NeuronUpdate};
use crate::schema::{ParamSpec, RuleParameters};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpikingThresholdParams {
    pub threshold: f64,
}

impl Default for SpikingThresholdParams {
    fn default() -> Self {
        Self { threshold: 0.5 }
    }
}

impl SpikingThresholdParams {
    #[inline]
    pub fn apply(&self, snapshot: &NeuronSnapshot) -> NeuronUpdate {
        let spiked = snapshot.input >= self.threshold;
        NeuronUpdate {
            activation: if spiked { 1.0 } else { 0.0 },
            spiked,
        }
    }
}

impl RuleParameters for SpikingThresholdParams {
    const RULE_NAME: &'static str = "Spiking threshold";

    fn validate(&self) -> Result<(), &'static str> {
        if !self.threshold.is_finite() {
            return Err("threshold must be finite");
        }
        Ok(())
    }

    fn schema() -> &'static [ParamSpec] {
        const SCHEMA: &[ParamSpec] = &[ParamSpec::float("threshold", "Threshold", 0.5)];
        SCHEMA
    }
}
