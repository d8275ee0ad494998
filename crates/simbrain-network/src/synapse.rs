// Copyright 2025 The Simbrain Authors
// SPDX-License-Identifier: Apache-2.0

//! Synapse entity

use crate::data::SynapseData;
use crate::synapse_rules::{
    SpikeResponder, SynapseRule, DEFAULT_SYNAPSE_CEILING, DEFAULT_SYNAPSE_FLOOR,
};
use crate::types::{NetworkError, NeuronId, Result, SynapseId};

/// A directed, weighted connection between two neurons of one network
///
/// Endpoints are neuron ids, never references; the network keeps them valid
/// by deleting synapses together with their neurons.
#[derive(Debug, Clone, PartialEq)]
pub struct Synapse {
    pub(crate) id: SynapseId,
    pub(crate) source: NeuronId,
    pub(crate) target: NeuronId,
    pub(crate) strength: f64,
    pub(crate) upper_bound: f64,
    pub(crate) lower_bound: f64,
    /// Learning disabled
    pub(crate) frozen: bool,
    /// Disabled synapses carry no signal
    pub(crate) enabled: bool,
    pub(crate) rule: SynapseRule,
    pub(crate) responder: SpikeResponder,
    pub(crate) data: SynapseData,
    /// Post-synaptic response from the last step
    pub(crate) psr: f64,
}

impl Synapse {
    pub fn new(source: NeuronId, target: NeuronId, strength: f64) -> Self {
        Self {
            id: SynapseId(u32::MAX),
            source,
            target,
            strength,
            upper_bound: DEFAULT_SYNAPSE_CEILING,
            lower_bound: DEFAULT_SYNAPSE_FLOOR,
            frozen: false,
            enabled: true,
            rule: SynapseRule::Static,
            responder: SpikeResponder::None,
            data: SynapseData::default(),
            psr: 0.0,
        }
    }

    pub fn with_rule(mut self, rule: SynapseRule) -> Self {
        self.rule = rule;
        self
    }

    pub fn with_responder(mut self, responder: SpikeResponder) -> Self {
        self.responder = responder;
        self
    }

    pub fn with_bounds(mut self, lower: f64, upper: f64) -> Self {
        self.lower_bound = lower;
        self.upper_bound = upper;
        self
    }

    pub fn frozen(mut self, frozen: bool) -> Self {
        self.frozen = frozen;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if !(self.lower_bound <= self.upper_bound) {
            return Err(NetworkError::InvalidBounds {
                lower: self.lower_bound,
                upper: self.upper_bound,
            });
        }
        self.rule.validate()?;
        self.responder.validate()
    }

    pub(crate) fn clear(&mut self) {
        self.psr = 0.0;
        self.data = SynapseData::default();
    }

    pub fn id(&self) -> SynapseId {
        self.id
    }

    pub fn source(&self) -> NeuronId {
        self.source
    }

    pub fn target(&self) -> NeuronId {
        self.target
    }

    pub fn strength(&self) -> f64 {
        self.strength
    }

    pub fn upper_bound(&self) -> f64 {
        self.upper_bound
    }

    pub fn lower_bound(&self) -> f64 {
        self.lower_bound
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn rule(&self) -> &SynapseRule {
        &self.rule
    }

    pub fn responder(&self) -> &SpikeResponder {
        &self.responder
    }

    pub fn data(&self) -> &SynapseData {
        &self.data
    }

    /// Post-synaptic response produced by the last step
    pub fn psr(&self) -> f64 {
        self.psr
    }
}
