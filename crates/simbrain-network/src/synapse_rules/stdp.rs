// Copyright 2025 The Simbrain Authors
// SPDX-License-Identifier: Apache-2.0

//! # Spike-Timing Dependent Plasticity
//!
//! Two variants:
//!
//! - [`StdpParams`]: additive STDP on spike flags with a one-step lag.
//!   Potentiates when the source spiked on the previous step and the target
//!   spikes now; depresses for the reverse order.
//! - [`ExponentialStdpParams`]: classic exponential window over the last
//!   spike times of both endpoints.

use super::SynapseSnapshot;
use crate::data::SynapseData;
use crate::schema::{ParamSpec, RuleParameters};
use serde::{Deserialize, Serialize};

/// Lagged additive STDP
///
/// ```text
/// Δw = η × ([pre_last ∧ post_now] - [post_last ∧ pre_now])
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StdpParams {
    pub learning_rate: f64,
}

impl Default for StdpParams {
    fn default() -> Self {
        Self {
            learning_rate: 0.01,
        }
    }
}

impl StdpParams {
    /// Weight change for one step given the lagged and current spike flags
    #[inline]
    pub fn weight_change(
        &self,
        source_last: bool,
        target_last: bool,
        source_now: bool,
        target_now: bool,
    ) -> f64 {
        let ltp = (source_last && target_now) as u8 as f64;
        let ltd = (target_last && source_now) as u8 as f64;
        self.learning_rate * (ltp - ltd)
    }

    pub fn apply(&self, snapshot: &SynapseSnapshot, data: &mut SynapseData) -> f64 {
        let delta = self.weight_change(
            data.source_spiked_last,
            data.target_spiked_last,
            snapshot.source_spiked,
            snapshot.target_spiked,
        );
        data.source_spiked_last = snapshot.source_spiked;
        data.target_spiked_last = snapshot.target_spiked;
        snapshot.clip(snapshot.strength + delta)
    }
}

impl RuleParameters for StdpParams {
    const RULE_NAME: &'static str = "STDP";

    fn validate(&self) -> Result<(), &'static str> {
        if !self.learning_rate.is_finite() {
            return Err("learning rate must be finite");
        }
        Ok(())
    }

    fn schema() -> &'static [ParamSpec] {
        const SCHEMA: &[ParamSpec] = &[ParamSpec::float("learning_rate", "Learning rate", 0.01)];
        SCHEMA
    }
}

/// Exponential-window STDP
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExponentialStdpParams {
    /// Potentiation time constant (τ+)
    pub tau_plus: f64,
    /// Depression time constant (τ-)
    pub tau_minus: f64,
    /// Potentiation amplitude (W+)
    pub w_plus: f64,
    /// Depression amplitude (W-)
    pub w_minus: f64,
    pub learning_rate: f64,
}

impl Default for ExponentialStdpParams {
    fn default() -> Self {
        Self {
            tau_plus: 30.0,
            tau_minus: 60.0,
            w_plus: 10.0,
            w_minus: 5.0,
            learning_rate: 0.01,
        }
    }
}

impl ExponentialStdpParams {
    /// Weight change for `dt = t_post - t_pre`
    ///
    /// - `dt > 0`: pre before post, potentiation
    /// - `dt < 0`: post before pre, depression
    /// - `dt = 0`: potentiation at full amplitude
    #[inline]
    pub fn weight_change(&self, dt: f64) -> f64 {
        if dt > 0.0 {
            self.learning_rate * self.w_plus * (-dt / self.tau_plus).exp()
        } else if dt < 0.0 {
            -self.learning_rate * self.w_minus * (dt / self.tau_minus).exp()
        } else {
            self.learning_rate * self.w_plus
        }
    }

    pub fn apply(&self, snapshot: &SynapseSnapshot) -> f64 {
        if !(snapshot.source_spiked || snapshot.target_spiked) {
            return snapshot.strength;
        }
        match (snapshot.source_last_spike, snapshot.target_last_spike) {
            (Some(pre), Some(post)) => {
                snapshot.clip(snapshot.strength + self.weight_change(post - pre))
            }
            _ => snapshot.strength,
        }
    }
}

impl RuleParameters for ExponentialStdpParams {
    const RULE_NAME: &'static str = "Exponential STDP";

    fn validate(&self) -> Result<(), &'static str> {
        if !(self.tau_plus.is_finite() && self.tau_plus > 0.0) {
            return Err("tau plus must be finite and > 0");
        }
        if !(self.tau_minus.is_finite() && self.tau_minus > 0.0) {
            return Err("tau minus must be finite and > 0");
        }
        if !(self.w_plus.is_finite() && self.w_minus.is_finite() && self.learning_rate.is_finite()) {
            return Err("amplitudes and learning rate must be finite");
        }
        Ok(())
    }

    fn schema() -> &'static [ParamSpec] {
        const SCHEMA: &[ParamSpec] = &[
            ParamSpec::float("tau_plus", "Tau +", 30.0)
                .describe("Time constant of the potentiation window")
                .range(Some(0.0), None),
            ParamSpec::float("tau_minus", "Tau -", 60.0)
                .describe("Time constant of the depression window")
                .range(Some(0.0), None),
            ParamSpec::float("w_plus", "W +", 10.0),
            ParamSpec::float("w_minus", "W -", 5.0),
            ParamSpec::float("learning_rate", "Learning rate", 0.01),
        ];
        SCHEMA
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synapse_rules::tests::snapshot;

    #[test]
    fn test_lagged_stdp_spike_trains() {
        let params = StdpParams { learning_rate: 0.1 };
        let pre = [true, false, true];
        let post = [false, true, false];
        let expected = [0.0, 0.1, -0.1];

        let mut data = SynapseData::default();
        let mut strength = 0.0;
        for t in 0..3 {
            let mut snap = snapshot(strength);
            snap.source_spiked = pre[t];
            snap.target_spiked = post[t];
            let next = params.apply(&snap, &mut data);
            assert!(
                (next - strength - expected[t]).abs() < 1e-12,
                "step {}: expected delta {}, got {}",
                t,
                expected[t],
                next - strength
            );
            strength = next;
        }
        assert!(strength.abs() < 1e-12);
    }

    #[test]
    fn test_lagged_stdp_simultaneous_spikes_do_not_change_weight() {
        let params = StdpParams { learning_rate: 0.1 };
        let mut data = SynapseData::default();
        let mut snap = snapshot(1.0);
        snap.source_spiked = true;
        snap.target_spiked = true;
        assert_eq!(params.apply(&snap, &mut data), 1.0);
        // Both flags lagged and both spiking again: LTP and LTD cancel
        assert_eq!(params.apply(&snap, &mut data), 1.0);
    }

    #[test]
    fn test_exponential_window_sign() {
        let params = ExponentialStdpParams::default();
        assert!(params.weight_change(5.0) > 0.0);
        assert!(params.weight_change(-5.0) < 0.0);
        assert_eq!(params.weight_change(0.0), params.learning_rate * params.w_plus);
        assert!(params.weight_change(1.0) > params.weight_change(10.0));
    }

    #[test]
    fn test_exponential_requires_spike_history() {
        let params = ExponentialStdpParams::default();
        let mut snap = snapshot(1.0);
        snap.target_spiked = true;
        snap.target_last_spike = Some(4.0);
        assert_eq!(params.apply(&snap), 1.0);

        snap.source_last_spike = Some(2.0);
        let expected = 1.0 + params.weight_change(2.0);
        assert!((params.apply(&snap) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_exponential_idle_without_current_spike() {
        let params = ExponentialStdpParams::default();
        let mut snap = snapshot(1.0);
        snap.source_last_spike = Some(2.0);
        snap.target_last_spike = Some(4.0);
        assert_eq!(params.apply(&snap), 1.0);
    }
}
