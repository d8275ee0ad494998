// Copyright 2025 The Simbrain Authors
// SPDX-License-Identifier: Apache-2.0

//! Linear rule: `a' = slope × (input + bias)`, the default neuron rule.

use super::{clip, NeuronSnapshot};
use crate::noise::NoiseSource;
use crate::schema::{ParamSpec, RuleParameters};
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinearParams {
    pub slope: f64,
    pub clipping: bool,
    pub add_noise: bool,
    pub noise: NoiseSource,
}

impl Default for LinearParams {
    fn default() -> Self {
        Self {
            slope: 1.0,
            clipping: true,
            add_noise: false,
            noise: NoiseSource::default(),
        }
    }
}

impl LinearParams {
    #[inline]
    pub fn apply<R: Rng + ?Sized>(&self, snapshot: &NeuronSnapshot, bias: f64, rng: &mut R) -> f64 {
        let mut val = self.slope * (snapshot.input + bias);
        if self.add_noise {
            val += self.noise.sample(rng);
        }
        if self.clipping {
            val = clip(val, snapshot.lower_bound, snapshot.upper_bound);
        }
        val
    }
}

impl RuleParameters for LinearParams {
    const RULE_NAME: &'static str = "Linear";

    fn validate(&self) -> Result<(), &'static str> {
        if !self.slope.is_finite() {
            return Err("slope must be finite");
        }
        self.noise.validate()
    }

    fn schema() -> &'static [ParamSpec] {
        const SCHEMA: &[ParamSpec] = &[
            ParamSpec::float("slope", "Slope", 1.0).describe("Slope of the linear rule"),
            ParamSpec::boolean("clipping", "Clipping", true),
            ParamSpec::boolean("add_noise", "Add noise", false),
        ];
        SCHEMA
    }
}
