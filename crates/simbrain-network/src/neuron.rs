// Copyright 2025 The Simbrain Authors
// SPDX-License-Identifier: Apache-2.0

//! Neuron entity

use crate::data::ScalarData;
use crate::rules::{NeuronRule, NeuronUpdate};
use crate::types::{NetworkError, NeuronId, Result};
use serde::{Deserialize, Serialize};

/// Sign constraint a neuron imposes on its outgoing synapses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    #[default]
    None,
    Excitatory,
    Inhibitory,
}

impl Polarity {
    /// Clip a synapse strength to this polarity
    #[inline]
    pub fn clip_strength(self, strength: f64) -> f64 {
        match self {
            Polarity::None => strength,
            Polarity::Excitatory => strength.max(0.0),
            Polarity::Inhibitory => strength.min(0.0),
        }
    }
}

/// A neuron and its per-step state
///
/// Built with the `with_*` methods and handed to
/// [`Network::add_neuron`](crate::Network::add_neuron), which assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct Neuron {
    pub(crate) id: NeuronId,
    label: Option<String>,
    pub(crate) activation: f64,
    /// External input, consumed and cleared by the next step
    pub(crate) input: f64,
    pub(crate) upper_bound: f64,
    pub(crate) lower_bound: f64,
    pub(crate) polarity: Polarity,
    pub(crate) rule: NeuronRule,
    pub(crate) data: ScalarData,
    pub(crate) clamped: bool,
    pub(crate) spike: bool,
    pub(crate) last_spike_time: Option<f64>,
    /// Result of the compute pass, committed in the second pass
    pub(crate) buffer: NeuronUpdate,
}

impl Default for Neuron {
    fn default() -> Self {
        Self::new(NeuronRule::default())
    }
}

impl Neuron {
    /// Neuron with the given rule, its default bounds and fresh scratch data
    pub fn new(rule: NeuronRule) -> Self {
        let (lower_bound, upper_bound) = rule.default_bounds();
        let data = rule.create_scalar_data();
        Self {
            id: NeuronId(u32::MAX),
            label: None,
            activation: 0.0,
            input: 0.0,
            upper_bound,
            lower_bound,
            polarity: Polarity::None,
            rule,
            data,
            clamped: false,
            spike: false,
            last_spike_time: None,
            buffer: NeuronUpdate {
                activation: 0.0,
                spiked: false,
            },
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_activation(mut self, activation: f64) -> Self {
        self.activation = activation;
        self
    }

    pub fn with_polarity(mut self, polarity: Polarity) -> Self {
        self.polarity = polarity;
        self
    }

    pub fn with_bounds(mut self, lower: f64, upper: f64) -> Self {
        self.lower_bound = lower;
        self.upper_bound = upper;
        self
    }

    pub fn with_bias(mut self, bias: f64) -> Self {
        self.data.set_bias(bias);
        self
    }

    pub fn clamped(mut self, clamped: bool) -> Self {
        self.clamped = clamped;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if !(self.lower_bound <= self.upper_bound) {
            return Err(NetworkError::InvalidBounds {
                lower: self.lower_bound,
                upper: self.upper_bound,
            });
        }
        self.rule.validate()
    }

    /// Replace the rule, resetting bounds and scratch data
    pub(crate) fn assign_rule(&mut self, rule: NeuronRule) {
        let (lower, upper) = rule.default_bounds();
        self.lower_bound = lower;
        self.upper_bound = upper;
        self.data = rule.create_scalar_data();
        self.rule = rule;
    }

    /// Zero the dynamic state, keeping rule, bounds and bias
    pub(crate) fn clear(&mut self) {
        self.activation = 0.0;
        self.input = 0.0;
        self.spike = false;
        self.last_spike_time = None;
        let bias = self.data.bias();
        self.data = self.rule.create_scalar_data();
        self.data.set_bias(bias);
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = Some(label.into());
    }

    /// Set the bias of rules that keep one
    pub fn set_bias(&mut self, bias: f64) {
        self.data.set_bias(bias);
    }

    pub fn set_bounds(&mut self, lower: f64, upper: f64) -> Result<()> {
        if !(lower <= upper) {
            return Err(NetworkError::InvalidBounds { lower, upper });
        }
        self.lower_bound = lower;
        self.upper_bound = upper;
        Ok(())
    }

    pub fn id(&self) -> NeuronId {
        self.id
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn activation(&self) -> f64 {
        self.activation
    }

    /// External input waiting for the next step
    pub fn input(&self) -> f64 {
        self.input
    }

    pub fn upper_bound(&self) -> f64 {
        self.upper_bound
    }

    pub fn lower_bound(&self) -> f64 {
        self.lower_bound
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    pub fn rule(&self) -> &NeuronRule {
        &self.rule
    }

    pub fn data(&self) -> &ScalarData {
        &self.data
    }

    pub fn is_clamped(&self) -> bool {
        self.clamped
    }

    /// Spike flag from the most recent step
    pub fn is_spike(&self) -> bool {
        self.spike
    }

    pub fn last_spike_time(&self) -> Option<f64> {
        self.last_spike_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{DecayParams, IntegrateAndFireParams};

    #[test]
    fn test_polarity_clip() {
        assert_eq!(Polarity::Excitatory.clip_strength(-0.5), 0.0);
        assert_eq!(Polarity::Excitatory.clip_strength(0.5), 0.5);
        assert_eq!(Polarity::Inhibitory.clip_strength(0.5), 0.0);
        assert_eq!(Polarity::Inhibitory.clip_strength(-0.5), -0.5);
        assert_eq!(Polarity::None.clip_strength(-0.5), -0.5);
    }

    #[test]
    fn test_assign_rule_resets_bounds_and_data() {
        let mut neuron = Neuron::new(NeuronRule::Decay(DecayParams::default()))
            .with_bounds(-5.0, 5.0)
            .with_bias(0.3);
        assert_eq!(neuron.data().bias(), 0.3);

        neuron.assign_rule(NeuronRule::IntegrateAndFire(IntegrateAndFireParams::default()));
        assert_eq!(neuron.lower_bound(), -1.0);
        assert_eq!(neuron.upper_bound(), 1.0);
        assert_eq!(*neuron.data(), ScalarData::Empty);
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let neuron = Neuron::default().with_bounds(1.0, -1.0);
        assert!(matches!(
            neuron.validate(),
            Err(NetworkError::InvalidBounds { .. })
        ));
    }
}
