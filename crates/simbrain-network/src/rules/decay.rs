// Copyright 2025 The Simbrain Authors
// SPDX-License-Identifier: Apache-2.0

//! # Decay Rule
//!
//! ```text
//! val      = input + activation + bias
//! decrement = decay_fraction × |val - base_line|   (relative)
//!           = decay_amount                          (absolute)
//!
//! val < base_line:  val = min(val + decrement, base_line)
//! val > base_line:  val = max(val - decrement, base_line)
//! ```
//!
//! The value never crosses the base line. Noise is added after the decay
//! step, clipping last.

use super::{clip, NeuronSnapshot};
use crate::noise::NoiseSource;
use crate::schema::{ParamSpec, RuleParameters};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Relative (percentage of distance to base line) vs. absolute (fixed amount)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecayUpdateType {
    #[default]
    Relative,
    Absolute,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecayParams {
    pub update_type: DecayUpdateType,
    /// Change per iteration for absolute decay
    pub decay_amount: f64,
    /// Proportion of the distance to the base line for relative decay
    pub decay_fraction: f64,
    pub base_line: f64,
    pub clipping: bool,
    pub add_noise: bool,
    pub noise: NoiseSource,
}

impl Default for DecayParams {
    fn default() -> Self {
        Self {
            update_type: DecayUpdateType::Relative,
            decay_amount: 0.1,
            decay_fraction: 0.1,
            base_line: 0.0,
            clipping: true,
            add_noise: false,
            noise: NoiseSource::default(),
        }
    }
}

impl DecayParams {
    /// Decay `input + activation + bias` toward the base line
    pub fn decay<R: Rng + ?Sized>(&self, input: f64, activation: f64, bias: f64, rng: &mut R) -> f64 {
        let mut val = input + activation + bias;
        let decrement = match self.update_type {
            DecayUpdateType::Relative => self.decay_fraction * (val - self.base_line).abs(),
            DecayUpdateType::Absolute => self.decay_amount,
        };
        if val < self.base_line {
            val += decrement;
            if val > self.base_line {
                val = self.base_line;
            }
        } else if val > self.base_line {
            val -= decrement;
            if val < self.base_line {
                val = self.base_line;
            }
        }
        if self.add_noise {
            val += self.noise.sample(rng);
        }
        val
    }

    #[inline]
    pub fn apply<R: Rng + ?Sized>(&self, snapshot: &NeuronSnapshot, bias: f64, rng: &mut R) -> f64 {
        let val = self.decay(snapshot.input, snapshot.activation, bias, rng);
        if self.clipping {
            clip(val, snapshot.lower_bound, snapshot.upper_bound)
        } else {
            val
        }
    }
}

impl RuleParameters for DecayParams {
    const RULE_NAME: &'static str = "Decay";

    fn validate(&self) -> Result<(), &'static str> {
        if !(self.decay_amount.is_finite() && self.decay_amount >= 0.0) {
            return Err("decay amount must be finite and >= 0");
        }
        if !(0.0..=1.0).contains(&self.decay_fraction) {
            return Err("decay fraction must be in [0, 1]");
        }
        if !self.base_line.is_finite() {
            return Err("base line must be finite");
        }
        self.noise.validate()
    }

    fn schema() -> &'static [ParamSpec] {
        const SCHEMA: &[ParamSpec] = &[
            ParamSpec::choice("update_type", "Update Type", "relative", &["relative", "absolute"])
                .describe("Relative (percentage decay of current activation) vs. absolute (fixed decay amount)"),
            ParamSpec::float("base_line", "Base Line", 0.0),
            ParamSpec::float("decay_amount", "Decay amount", 0.1)
                .describe("The amount by which the activation is changed each iteration if absolute decay is chosen")
                .range(Some(0.0), None),
            ParamSpec::float("decay_fraction", "Decay fraction", 0.1)
                .describe("The proportion of the distance between the current value and the base-line value, by which the activation is changed each iteration if relative decay is chosen")
                .range(Some(0.0), Some(1.0)),
            ParamSpec::boolean("clipping", "Clipping", true),
            ParamSpec::boolean("add_noise", "Add noise", false),
        ];
        SCHEMA
    }
}
