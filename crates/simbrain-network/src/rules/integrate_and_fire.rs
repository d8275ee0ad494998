// Copyright 2025 The Simbrain Authors
// SPDX-License-Identifier: Apache-2.0

//! # Integrate-and-Fire Rule
//!
//! ```text
//! I     = input (+ noise)
//! V'    = V + dt / τ × (V_rest - V + R × I)
//! V' > θ:  spike, V' = V_reset
//! ```
//!
//! `V` is the neuron's activation at the start of the step; the rule never
//! looks at any other neuron's post-update value.

use super::{clip, NeuronSnapshot, NeuronUpdate};
use crate::noise::NoiseSource;
use crate::schema::{ParamSpec, RuleParameters};
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrateAndFireParams {
    pub resistance: f64,
    pub time_constant: f64,
    pub threshold: f64,
    pub reset_potential: f64,
    pub resting_potential: f64,
    pub clipping: bool,
    pub add_noise: bool,
    pub noise: NoiseSource,
}

impl Default for IntegrateAndFireParams {
    fn default() -> Self {
        Self {
            resistance: 1.0,
            time_constant: 1.0,
            threshold: 0.8,
            reset_potential: 0.1,
            resting_potential: 0.5,
            clipping: false,
            add_noise: false,
            noise: NoiseSource::default(),
        }
    }
}

impl IntegrateAndFireParams {
    #[inline]
    pub fn apply<R: Rng + ?Sized>(&self, snapshot: &NeuronSnapshot, rng: &mut R) -> NeuronUpdate {
        let mut inputs = snapshot.input;
        if self.add_noise {
            inputs += self.noise.sample(rng);
        }

        let v = snapshot.activation;
        let mut val = v
            + snapshot.time_step / self.time_constant
                * (self.resting_potential - v + self.resistance * inputs);

        let spiked = val > self.threshold;
        if spiked {
            val = self.reset_potential;
        }
        if self.clipping {
            val = clip(val, snapshot.lower_bound, snapshot.upper_bound);
        }

        NeuronUpdate {
            activation: val,
            spiked,
        }
    }
}

impl RuleParameters for IntegrateAndFireParams {
    const RULE_NAME: &'static str = "Integrate and fire";

    fn validate(&self) -> Result<(), &'static str> {
        if !(self.time_constant.is_finite() && self.time_constant > 0.0) {
            return Err("time constant must be finite and > 0");
        }
        if !(self.resistance.is_finite() && self.resistance > 0.0) {
            return Err("resistance must be finite and > 0");
        }
        if !(self.threshold.is_finite()
            && self.reset_potential.is_finite()
            && self.resting_potential.is_finite())
        {
            return Err("threshold and potentials must be finite");
        }
        self.noise.validate()
    }

    fn schema() -> &'static [ParamSpec] {
        const SCHEMA: &[ParamSpec] = &[
            ParamSpec::float("resistance", "Resistance", 1.0).range(Some(0.0), None),
            ParamSpec::float("time_constant", "Time constant", 1.0).range(Some(0.0), None),
            ParamSpec::float("threshold", "Threshold", 0.8),
            ParamSpec::float("reset_potential", "Reset potential", 0.1),
            ParamSpec::float("resting_potential", "Resting potential", 0.5),
            ParamSpec::boolean("clipping", "Clipping", false),
            ParamSpec::boolean("add_noise", "Add noise", false),
        ];
        SCHEMA
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn snapshot(activation: f64, input: f64, time_step: f64) -> NeuronSnapshot {
        NeuronSnapshot {
            activation,
            input,
            upper_bound: 1.0,
            lower_bound: -1.0,
            time_step,
        }
    }

    #[test]
    fn test_relaxes_toward_resting_potential() {
        let mut rng = StdRng::seed_from_u64(0);
        let params = IntegrateAndFireParams::default();
        // 0 + 0.1 / 1 × (0.5 - 0 + 0) = 0.05
        let out = params.apply(&snapshot(0.0, 0.0, 0.1), &mut rng);
        assert!((out.activation - 0.05).abs() < 1e-12);
        assert!(!out.spiked);
    }

    #[test]
    fn test_fires_and_resets() {
        let mut rng = StdRng::seed_from_u64(0);
        let params = IntegrateAndFireParams::default();
        // 0.7 + 1.0 × (0.5 - 0.7 + 1.0) = 1.5 > 0.8
        let out = params.apply(&snapshot(0.7, 1.0, 1.0), &mut rng);
        assert!(out.spiked);
        assert_eq!(out.activation, params.reset_potential);
    }

    #[test]
    fn test_time_step_scales_update() {
        let mut rng = StdRng::seed_from_u64(0);
        let params = IntegrateAndFireParams::default();
        let small = params.apply(&snapshot(0.0, 0.0, 0.01), &mut rng).activation;
        let large = params.apply(&snapshot(0.0, 0.0, 0.1), &mut rng).activation;
        assert!((large - 10.0 * small).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_non_positive_time_constant() {
        let params = IntegrateAndFireParams {
            time_constant: 0.0,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }
}
