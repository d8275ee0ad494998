// Copyright 2025 The Simbrain Authors
// SPDX-License-Identifier: Apache-2.0

//! # Network Graph
//!
//! Owns every neuron and synapse in arenas of slots. Ids index the slots and
//! are never reused, so a stale id can only ever miss, never alias.
//!
//! ## Step
//!
//! ```text
//! PHASE 1  synapses   strength' = rule(start-of-step neurons)
//!                     psr'      = responder(strength', start-of-step neurons)
//! PHASE 2  neurons    input     = Σ psr' (enabled fan-in) + accumulator
//!                     buffer    = rule(input, own start-of-step state)
//!                     commit    activation, spike, last spike time
//! PHASE 3  time      += time_step, iteration += 1
//! ```
//!
//! Neuron state is read-only during phase 1 and every neuron rule reads only
//! its own slot during phase 2, so both compute passes can run data-parallel
//! without changing the result.

use crate::neuron::{Neuron, Polarity};
use crate::noise::{stream_seed, EntityRng, NoiseSource};
use crate::rules::{clip, NeuronRule, NeuronSnapshot, NeuronUpdate, TimeType};
use crate::synapse::Synapse;
use crate::synapse_rules::{SpikeResponder, SynapseRule, SynapseSnapshot};
use crate::types::{NetworkError, NeuronId, Result, SynapseId};
use ahash::AHashMap;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use simbrain_config::NetworkConfig;
use tracing::{debug, trace};

/// A neuron removed from the network together with its synapses
#[derive(Debug, Clone)]
pub struct RemovedNeuron {
    pub neuron: Neuron,
    pub synapses: Vec<Synapse>,
}

#[derive(Debug, Clone)]
pub struct Network {
    neurons: Vec<Option<Neuron>>,
    synapses: Vec<Option<Synapse>>,
    fan_in: AHashMap<NeuronId, Vec<SynapseId>>,
    fan_out: AHashMap<NeuronId, Vec<SynapseId>>,
    neuron_count: usize,
    synapse_count: usize,
    time: f64,
    time_step: f64,
    iteration: u64,
    seed: u64,
    /// Arena size from which compute passes go data-parallel
    parallel_threshold: usize,
    /// Randomization stream (step noise uses per-neuron streams)
    rng: StdRng,
}

impl Default for Network {
    fn default() -> Self {
        Self::new()
    }
}

impl Network {
    pub fn new() -> Self {
        let config = NetworkConfig::default();
        Self::build(config.time_step, config.seed, config.parallel_threshold)
    }

    pub fn with_seed(seed: u64) -> Self {
        let config = NetworkConfig::default();
        Self::build(config.time_step, seed, config.parallel_threshold)
    }

    pub fn from_config(config: &NetworkConfig) -> Result<Self> {
        check_time_step(config.time_step)?;
        Ok(Self::build(
            config.time_step,
            config.seed,
            config.parallel_threshold,
        ))
    }

    fn build(time_step: f64, seed: u64, parallel_threshold: usize) -> Self {
        Self {
            neurons: Vec::new(),
            synapses: Vec::new(),
            fan_in: AHashMap::new(),
            fan_out: AHashMap::new(),
            neuron_count: 0,
            synapse_count: 0,
            time: 0.0,
            time_step,
            iteration: 0,
            seed,
            parallel_threshold,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    // ========================================================================
    // Structure
    // ========================================================================

    pub fn add_neuron(&mut self, mut neuron: Neuron) -> Result<NeuronId> {
        neuron.validate()?;
        let id = NeuronId(next_index(self.neurons.len(), "Neuron")?);
        neuron.id = id;
        self.neurons.push(Some(neuron));
        self.neuron_count += 1;
        trace!("[NETWORK] Added {}", id);
        Ok(id)
    }

    /// Add `count` neurons sharing a rule
    pub fn add_neurons(&mut self, count: usize, rule: NeuronRule) -> Result<Vec<NeuronId>> {
        rule.validate()?;
        let ids = (0..count)
            .map(|_| self.add_neuron(Neuron::new(rule.clone())))
            .collect::<Result<Vec<_>>>()?;
        debug!("[NETWORK] Added {} {} neurons", count, rule.name());
        Ok(ids)
    }

    /// Connect two neurons with a static synapse
    pub fn add_synapse(
        &mut self,
        source: NeuronId,
        target: NeuronId,
        strength: f64,
    ) -> Result<SynapseId> {
        self.add_synapse_with(Synapse::new(source, target, strength))
    }

    pub fn add_synapse_with(&mut self, mut synapse: Synapse) -> Result<SynapseId> {
        synapse.validate()?;
        let polarity = self.neuron(synapse.source)?.polarity;
        self.neuron(synapse.target)?;

        let id = SynapseId(next_index(self.synapses.len(), "Synapse")?);
        synapse.id = id;
        synapse.strength = polarity.clip_strength(synapse.strength);
        self.fan_out.entry(synapse.source).or_default().push(id);
        self.fan_in.entry(synapse.target).or_default().push(id);
        trace!(
            "[NETWORK] Added {} ({} -> {})",
            id,
            synapse.source,
            synapse.target
        );
        self.synapses.push(Some(synapse));
        self.synapse_count += 1;
        Ok(id)
    }

    /// Remove a neuron and every synapse that starts or ends at it
    pub fn remove_neuron(&mut self, id: NeuronId) -> Result<RemovedNeuron> {
        self.neuron(id)?;

        let mut attached: Vec<SynapseId> = self
            .fan_in
            .remove(&id)
            .into_iter()
            .chain(self.fan_out.remove(&id))
            .flatten()
            .collect();
        attached.sort_unstable();
        attached.dedup();

        let mut synapses = Vec::with_capacity(attached.len());
        for synapse_id in attached {
            synapses.push(self.remove_synapse(synapse_id)?);
        }

        let neuron = self
            .neurons
            .get_mut(id.index())
            .and_then(Option::take)
            .ok_or(NetworkError::NeuronNotFound(id))?;
        self.neuron_count -= 1;
        debug!(
            "[NETWORK] Removed {} with {} attached synapses",
            id,
            synapses.len()
        );
        Ok(RemovedNeuron { neuron, synapses })
    }

    pub fn remove_synapse(&mut self, id: SynapseId) -> Result<Synapse> {
        let synapse = self
            .synapses
            .get_mut(id.index())
            .and_then(Option::take)
            .ok_or(NetworkError::SynapseNotFound(id))?;
        if let Some(out) = self.fan_out.get_mut(&synapse.source) {
            out.retain(|s| *s != id);
        }
        if let Some(inc) = self.fan_in.get_mut(&synapse.target) {
            inc.retain(|s| *s != id);
        }
        self.synapse_count -= 1;
        trace!("[NETWORK] Removed {}", id);
        Ok(synapse)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn neuron(&self, id: NeuronId) -> Result<&Neuron> {
        self.neurons
            .get(id.index())
            .and_then(Option::as_ref)
            .ok_or(NetworkError::NeuronNotFound(id))
    }

    pub fn neuron_mut(&mut self, id: NeuronId) -> Result<&mut Neuron> {
        self.neurons
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .ok_or(NetworkError::NeuronNotFound(id))
    }

    pub fn synapse(&self, id: SynapseId) -> Result<&Synapse> {
        self.synapses
            .get(id.index())
            .and_then(Option::as_ref)
            .ok_or(NetworkError::SynapseNotFound(id))
    }

    fn synapse_mut(&mut self, id: SynapseId) -> Result<&mut Synapse> {
        self.synapses
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .ok_or(NetworkError::SynapseNotFound(id))
    }

    /// Live neurons in insertion order
    pub fn neurons(&self) -> impl Iterator<Item = &Neuron> {
        self.neurons.iter().flatten()
    }

    /// Live synapses in insertion order
    pub fn synapses(&self) -> impl Iterator<Item = &Synapse> {
        self.synapses.iter().flatten()
    }

    pub fn neuron_ids(&self) -> Vec<NeuronId> {
        self.neurons().map(|n| n.id).collect()
    }

    /// Incoming synapses of a neuron
    pub fn fan_in(&self, id: NeuronId) -> &[SynapseId] {
        self.fan_in.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Outgoing synapses of a neuron
    pub fn fan_out(&self, id: NeuronId) -> &[SynapseId] {
        self.fan_out.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn neuron_count(&self) -> usize {
        self.neuron_count
    }

    pub fn synapse_count(&self) -> usize {
        self.synapse_count
    }

    pub fn is_empty(&self) -> bool {
        self.neuron_count == 0
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn time_step(&self) -> f64 {
        self.time_step
    }

    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Continuous as soon as one neuron runs a continuous rule
    pub fn time_type(&self) -> TimeType {
        if self
            .neurons()
            .any(|n| n.rule.time_type() == TimeType::Continuous)
        {
            TimeType::Continuous
        } else {
            TimeType::Discrete
        }
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Overwrite an activation, ignoring bounds
    pub fn set_activation(&mut self, id: NeuronId, value: f64) -> Result<()> {
        self.neuron_mut(id)?.activation = value;
        Ok(())
    }

    pub fn set_clamped(&mut self, id: NeuronId, clamped: bool) -> Result<()> {
        self.neuron_mut(id)?.clamped = clamped;
        Ok(())
    }

    /// Accumulate external input for the next step
    pub fn add_input(&mut self, id: NeuronId, value: f64) -> Result<()> {
        self.neuron_mut(id)?.input += value;
        Ok(())
    }

    pub fn set_neuron_rule(&mut self, id: NeuronId, rule: NeuronRule) -> Result<()> {
        rule.validate()?;
        self.neuron_mut(id)?.assign_rule(rule);
        Ok(())
    }

    /// Change a neuron's polarity and re-clip its outgoing strengths
    pub fn set_polarity(&mut self, id: NeuronId, polarity: Polarity) -> Result<()> {
        self.neuron_mut(id)?.polarity = polarity;
        let outgoing = self.fan_out(id).to_vec();
        for synapse_id in outgoing {
            let synapse = self.synapse_mut(synapse_id)?;
            synapse.strength = polarity.clip_strength(synapse.strength);
        }
        Ok(())
    }

    /// Set a strength, clipped to the synapse bounds and the source polarity
    pub fn set_strength(&mut self, id: SynapseId, value: f64) -> Result<()> {
        let source = self.synapse(id)?.source;
        let polarity = self.neuron(source)?.polarity;
        let synapse = self.synapse_mut(id)?;
        synapse.strength =
            polarity.clip_strength(clip(value, synapse.lower_bound, synapse.upper_bound));
        Ok(())
    }

    pub fn set_synapse_rule(&mut self, id: SynapseId, rule: SynapseRule) -> Result<()> {
        rule.validate()?;
        let synapse = self.synapse_mut(id)?;
        synapse.rule = rule;
        synapse.data = Default::default();
        Ok(())
    }

    pub fn set_spike_responder(&mut self, id: SynapseId, responder: SpikeResponder) -> Result<()> {
        responder.validate()?;
        let synapse = self.synapse_mut(id)?;
        synapse.responder = responder;
        synapse.data.response_countdown = 0;
        synapse.psr = 0.0;
        Ok(())
    }

    pub fn set_frozen(&mut self, id: SynapseId, frozen: bool) -> Result<()> {
        self.synapse_mut(id)?.frozen = frozen;
        Ok(())
    }

    pub fn set_enabled(&mut self, id: SynapseId, enabled: bool) -> Result<()> {
        self.synapse_mut(id)?.enabled = enabled;
        Ok(())
    }

    pub fn set_time_step(&mut self, time_step: f64) -> Result<()> {
        check_time_step(time_step)?;
        self.time_step = time_step;
        Ok(())
    }

    /// Zero activations, inputs, spikes, responses and scratch data
    pub fn clear(&mut self) {
        for neuron in self.neurons.iter_mut().flatten() {
            neuron.clear();
        }
        for synapse in self.synapses.iter_mut().flatten() {
            synapse.clear();
        }
        debug!("[NETWORK] Cleared {} neurons", self.neuron_count);
    }

    /// Draw every activation from `source`, clipped to the neuron's bounds
    pub fn randomize_activations(&mut self, source: &NoiseSource) -> Result<()> {
        source.validate().map_err(|reason| NetworkError::InvalidParameter {
            rule: "Randomizer",
            reason,
        })?;
        for neuron in self.neurons.iter_mut().flatten() {
            let value = source.sample(&mut self.rng);
            neuron.activation = clip(value, neuron.lower_bound, neuron.upper_bound);
        }
        Ok(())
    }

    /// Draw every strength from `source`, clipped to bounds and polarity
    pub fn randomize_strengths(&mut self, source: &NoiseSource) -> Result<()> {
        source.validate().map_err(|reason| NetworkError::InvalidParameter {
            rule: "Randomizer",
            reason,
        })?;
        let neurons = &self.neurons;
        for synapse in self.synapses.iter_mut().flatten() {
            let polarity = neurons
                .get(synapse.source.index())
                .and_then(Option::as_ref)
                .map_or(Polarity::None, |n| n.polarity);
            let value = clip(
                source.sample(&mut self.rng),
                synapse.lower_bound,
                synapse.upper_bound,
            );
            synapse.strength = polarity.clip_strength(value);
        }
        Ok(())
    }

    // ========================================================================
    // Time
    // ========================================================================

    /// Advance the network by one buffered time step
    pub fn step(&mut self) {
        let time = self.time;
        let time_step = self.time_step;
        let iteration = self.iteration;
        let seed = self.seed;
        let parallel = self.neurons.len().max(self.synapses.len()) >= self.parallel_threshold;

        // PHASE 1: SYNAPSES - learning and responses from start-of-step neurons
        {
            let neurons = &self.neurons;
            let update = |slot: &mut Option<Synapse>| {
                if let Some(synapse) = slot {
                    update_synapse(synapse, neurons, time_step);
                }
            };
            if parallel {
                self.synapses.par_iter_mut().for_each(update);
            } else {
                self.synapses.iter_mut().for_each(update);
            }
        }

        // PHASE 2a: GATHER - sum responses in synapse order for a reproducible sum
        let mut inputs = vec![0.0; self.neurons.len()];
        for synapse in self.synapses.iter().flatten() {
            if synapse.enabled {
                inputs[synapse.target.index()] += synapse.psr;
            }
        }

        // PHASE 2b: COMPUTE - each neuron reads only its own slot
        {
            let inputs = &inputs;
            let compute = |(index, slot): (usize, &mut Option<Neuron>)| {
                if let Some(neuron) = slot {
                    neuron.buffer = compute_neuron(neuron, inputs[index], time_step, || {
                        EntityRng::new(stream_seed(seed, iteration, index as u32))
                    });
                }
            };
            if parallel {
                self.neurons.par_iter_mut().enumerate().for_each(compute);
            } else {
                self.neurons.iter_mut().enumerate().for_each(compute);
            }
        }

        // PHASE 2c: COMMIT
        let mut spikes = 0usize;
        for neuron in self.neurons.iter_mut().flatten() {
            neuron.activation = neuron.buffer.activation;
            neuron.spike = neuron.buffer.spiked;
            if neuron.spike {
                neuron.last_spike_time = Some(time);
                spikes += 1;
            }
            neuron.input = 0.0;
        }

        // PHASE 3: TIME
        self.time += time_step;
        self.iteration += 1;

        trace!(
            "[NETWORK] Step {} done: t={:.4}, {} spikes",
            self.iteration,
            self.time,
            spikes
        );
    }

    pub fn step_n(&mut self, n: usize) {
        for _ in 0..n {
            self.step();
        }
    }
}

/// Arena slots are never reused, so the next id is the arena length
fn next_index(len: usize, kind: &'static str) -> Result<u32> {
    u32::try_from(len).map_err(|_| NetworkError::IdSpaceExhausted(kind))
}

fn check_time_step(time_step: f64) -> Result<()> {
    if time_step.is_finite() && time_step > 0.0 {
        Ok(())
    } else {
        Err(NetworkError::InvalidTimeStep(time_step))
    }
}

#[inline]
fn update_synapse(synapse: &mut Synapse, neurons: &[Option<Neuron>], time_step: f64) {
    let endpoint = |id: NeuronId| neurons.get(id.index()).and_then(Option::as_ref);
    let (Some(source), Some(target)) = (endpoint(synapse.source), endpoint(synapse.target)) else {
        return;
    };

    let mut snapshot = SynapseSnapshot {
        strength: synapse.strength,
        upper_bound: synapse.upper_bound,
        lower_bound: synapse.lower_bound,
        source_activation: source.activation,
        target_activation: target.activation,
        source_spiked: source.spike,
        target_spiked: target.spike,
        source_last_spike: source.last_spike_time,
        target_last_spike: target.last_spike_time,
        source_is_spiking: source.rule.is_spiking(),
        previous_psr: synapse.psr,
        time_step,
    };

    if !synapse.frozen {
        let strength = synapse.rule.apply(&snapshot, &mut synapse.data);
        synapse.strength = source.polarity.clip_strength(strength);
    }

    // Responses see this step's strength
    snapshot.strength = synapse.strength;
    synapse.psr = if synapse.enabled {
        synapse.responder.respond(&snapshot, &mut synapse.data)
    } else {
        0.0
    };
}

#[inline]
fn compute_neuron(
    neuron: &Neuron,
    synaptic_input: f64,
    time_step: f64,
    rng: impl FnOnce() -> EntityRng,
) -> NeuronUpdate {
    if neuron.clamped {
        return NeuronUpdate {
            activation: neuron.activation,
            spiked: false,
        };
    }
    let snapshot = NeuronSnapshot {
        activation: neuron.activation,
        input: synaptic_input + neuron.input,
        upper_bound: neuron.upper_bound,
        lower_bound: neuron.lower_bound,
        time_step,
    };
    neuron.rule.apply(&snapshot, &neuron.data, &mut rng())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{LinearParams, SpikingThresholdParams};

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_next_index_refuses_to_wrap() {
        assert_eq!(next_index(0, "Neuron"), Ok(0));
        assert_eq!(next_index(u32::MAX as usize, "Neuron"), Ok(u32::MAX));
        assert_eq!(
            next_index(u32::MAX as usize + 1, "Synapse"),
            Err(NetworkError::IdSpaceExhausted("Synapse"))
        );
    }

    #[test]
    fn test_add_synapse_rejects_unknown_endpoints() {
        let mut net = Network::new();
        let a = net.add_neuron(Neuron::default()).unwrap();
        let err = net.add_synapse(a, NeuronId(7), 1.0).unwrap_err();
        assert_eq!(err, NetworkError::NeuronNotFound(NeuronId(7)));
        assert_eq!(net.synapse_count(), 0);
    }

    #[test]
    fn test_ids_are_not_reused() {
        let mut net = Network::new();
        let a = net.add_neuron(Neuron::default()).unwrap();
        net.remove_neuron(a).unwrap();
        let b = net.add_neuron(Neuron::default()).unwrap();
        assert_ne!(a, b);
        assert!(net.neuron(a).is_err());
        assert_eq!(net.neuron_count(), 1);
    }

    #[test]
    fn test_linear_chain_propagates_one_hop_per_step() {
        let mut net = Network::new();
        let ids = net.add_neurons(3, NeuronRule::default()).unwrap();
        net.add_synapse(ids[0], ids[1], 1.0).unwrap();
        net.add_synapse(ids[1], ids[2], 1.0).unwrap();
        net.set_activation(ids[0], 0.5).unwrap();
        net.set_clamped(ids[0], true).unwrap();

        net.step();
        assert_eq!(net.neuron(ids[1]).unwrap().activation(), 0.5);
        assert_eq!(net.neuron(ids[2]).unwrap().activation(), 0.0);

        net.step();
        assert_eq!(net.neuron(ids[2]).unwrap().activation(), 0.5);
        assert_eq!(net.neuron(ids[0]).unwrap().activation(), 0.5);
    }

    #[test]
    fn test_external_input_is_consumed() {
        let mut net = Network::new();
        let id = net.add_neuron(Neuron::default()).unwrap();
        net.add_input(id, 0.25).unwrap();
        net.add_input(id, 0.25).unwrap();
        net.step();
        assert_eq!(net.neuron(id).unwrap().activation(), 0.5);
        assert_eq!(net.neuron(id).unwrap().input(), 0.0);
        net.step();
        assert_eq!(net.neuron(id).unwrap().activation(), 0.0);
    }

    #[test]
    fn test_polarity_clips_strength() {
        let mut net = Network::new();
        let exc = net
            .add_neuron(Neuron::default().with_polarity(Polarity::Excitatory))
            .unwrap();
        let inh = net
            .add_neuron(Neuron::default().with_polarity(Polarity::Inhibitory))
            .unwrap();
        let s1 = net.add_synapse(exc, inh, -2.0).unwrap();
        let s2 = net.add_synapse(inh, exc, 2.0).unwrap();
        assert_eq!(net.synapse(s1).unwrap().strength(), 0.0);
        assert_eq!(net.synapse(s2).unwrap().strength(), 0.0);

        net.set_strength(s2, -20.0).unwrap();
        assert_eq!(net.synapse(s2).unwrap().strength(), -10.0);
    }

    #[test]
    fn test_time_advances_by_time_step() {
        let mut net = Network::new();
        net.set_time_step(0.5).unwrap();
        net.step_n(4);
        assert_eq!(net.iteration(), 4);
        assert!((net.time() - 2.0).abs() < 1e-12);
        assert_eq!(
            net.set_time_step(0.0),
            Err(NetworkError::InvalidTimeStep(0.0))
        );
    }

    #[test]
    fn test_time_type_follows_rules() {
        let mut net = Network::new();
        let id = net.add_neuron(Neuron::default()).unwrap();
        assert_eq!(net.time_type(), TimeType::Discrete);
        net.set_neuron_rule(
            id,
            crate::rules::NeuronRuleKind::IntegrateAndFire.default_rule(),
        )
        .unwrap();
        assert_eq!(net.time_type(), TimeType::Continuous);
    }

    #[test]
    fn test_disabled_synapse_carries_no_signal() {
        let mut net = Network::new();
        let ids = net.add_neurons(2, NeuronRule::default()).unwrap();
        let s = net.add_synapse(ids[0], ids[1], 1.0).unwrap();
        net.set_activation(ids[0], 1.0).unwrap();
        net.set_clamped(ids[0], true).unwrap();
        net.set_enabled(s, false).unwrap();
        net.step();
        assert_eq!(net.neuron(ids[1]).unwrap().activation(), 0.0);
    }

    #[test]
    fn test_clear_keeps_structure() {
        let mut net = Network::new();
        let ids = net
            .add_neurons(
                2,
                NeuronRule::SpikingThreshold(SpikingThresholdParams::default()),
            )
            .unwrap();
        net.add_synapse(ids[0], ids[1], 1.0).unwrap();
        net.add_input(ids[0], 1.0).unwrap();
        net.step();
        assert!(net.neuron(ids[0]).unwrap().is_spike());

        net.clear();
        let n = net.neuron(ids[0]).unwrap();
        assert!(!n.is_spike());
        assert_eq!(n.activation(), 0.0);
        assert_eq!(n.last_spike_time(), None);
        assert_eq!(net.synapse_count(), 1);
    }

    #[test]
    fn test_randomize_respects_bounds() {
        let mut net = Network::with_seed(3);
        net.add_neurons(50, NeuronRule::Linear(LinearParams::default()))
            .unwrap();
        net.randomize_activations(&NoiseSource::Uniform {
            min: -5.0,
            max: 5.0,
        })
        .unwrap();
        assert!(net.neurons().all(|n| (-1.0..=1.0).contains(&n.activation())));
        assert!(net
            .randomize_activations(&NoiseSource::Uniform { min: 1.0, max: 0.0 })
            .is_err());
    }
}
