// Copyright 2025 The Simbrain Authors
// SPDX-License-Identifier: Apache-2.0

//! A network as a workspace component
//!
//! Attribute names:
//!
//! | attribute                | role     | type   |
//! |--------------------------|----------|--------|
//! | `neuron:<id>:activation` | both     | scalar |
//! | `neuron:<id>:spike`      | producer | scalar (0 or 1) |
//! | `neuron:<id>:input`      | consumer | scalar (added to the input accumulator) |
//! | `synapse:<id>:strength`  | producer | scalar |
//! | `network:activations`    | producer | vector, neuron insertion order |
//! | `network:inputs`         | consumer | vector, neuron insertion order |

use crate::attribute::{AttributeSpec, Value, ValueType};
use crate::component::{expect_type, WorkspaceComponent};
use crate::error::ComponentError;
use simbrain_network::{Network, NeuronId, SynapseId};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NetworkAttribute {
    Activation(NeuronId),
    Spike(NeuronId),
    Input(NeuronId),
    Strength(SynapseId),
    Activations,
    Inputs,
}

impl NetworkAttribute {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "network:activations" => return Some(Self::Activations),
            "network:inputs" => return Some(Self::Inputs),
            _ => {}
        }

        let mut parts = name.split(':');
        let (kind, id, field) = (parts.next()?, parts.next()?, parts.next()?);
        if parts.next().is_some() {
            return None;
        }
        let id: u32 = id.parse().ok()?;
        match (kind, field) {
            ("neuron", "activation") => Some(Self::Activation(NeuronId(id))),
            ("neuron", "spike") => Some(Self::Spike(NeuronId(id))),
            ("neuron", "input") => Some(Self::Input(NeuronId(id))),
            ("synapse", "strength") => Some(Self::Strength(SynapseId(id))),
            _ => None,
        }
    }

    fn value_type(self) -> ValueType {
        match self {
            Self::Activations | Self::Inputs => ValueType::Vector,
            _ => ValueType::Scalar,
        }
    }

    fn is_producer(self) -> bool {
        !matches!(self, Self::Input(_) | Self::Inputs)
    }

    fn is_consumer(self) -> bool {
        matches!(self, Self::Activation(_) | Self::Input(_) | Self::Inputs)
    }
}

pub struct NetworkComponent {
    name: String,
    network: Network,
}

impl NetworkComponent {
    pub fn new(name: impl Into<String>, network: Network) -> Self {
        Self {
            name: name.into(),
            network,
        }
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn network_mut(&mut self) -> &mut Network {
        &mut self.network
    }

    pub fn into_network(self) -> Network {
        self.network
    }

    /// Resolve `name` against the live network (stale ids resolve to `None`)
    fn lookup(&self, name: &str) -> Option<NetworkAttribute> {
        let attribute = NetworkAttribute::parse(name)?;
        let exists = match attribute {
            NetworkAttribute::Activation(id)
            | NetworkAttribute::Spike(id)
            | NetworkAttribute::Input(id) => self.network.neuron(id).is_ok(),
            NetworkAttribute::Strength(id) => self.network.synapse(id).is_ok(),
            NetworkAttribute::Activations | NetworkAttribute::Inputs => true,
        };
        exists.then_some(attribute)
    }
}

impl WorkspaceComponent for NetworkComponent {
    fn name(&self) -> &str {
        &self.name
    }

    fn update(&mut self) -> Result<(), ComponentError> {
        self.network.step();
        Ok(())
    }

    fn producers(&self) -> Vec<AttributeSpec> {
        let mut specs = Vec::with_capacity(self.network.neuron_count() * 2 + self.network.synapse_count() + 1);
        for neuron in self.network.neurons() {
            specs.push(AttributeSpec::scalar(format!("neuron:{}:activation", neuron.id().0)));
            specs.push(AttributeSpec::scalar(format!("neuron:{}:spike", neuron.id().0)));
        }
        for synapse in self.network.synapses() {
            specs.push(AttributeSpec::scalar(format!("synapse:{}:strength", synapse.id().0)));
        }
        specs.push(AttributeSpec::vector("network:activations"));
        specs
    }

    fn consumers(&self) -> Vec<AttributeSpec> {
        let mut specs = Vec::with_capacity(self.network.neuron_count() * 2 + 1);
        for neuron in self.network.neurons() {
            specs.push(AttributeSpec::scalar(format!("neuron:{}:input", neuron.id().0)));
            specs.push(AttributeSpec::scalar(format!("neuron:{}:activation", neuron.id().0)));
        }
        specs.push(AttributeSpec::vector("network:inputs"));
        specs
    }

    fn producer_type(&self, attribute: &str) -> Option<ValueType> {
        self.lookup(attribute)
            .filter(|a| a.is_producer())
            .map(NetworkAttribute::value_type)
    }

    fn consumer_type(&self, attribute: &str) -> Option<ValueType> {
        self.lookup(attribute)
            .filter(|a| a.is_consumer())
            .map(NetworkAttribute::value_type)
    }

    fn read(&self, attribute: &str) -> Option<Value> {
        let value = match self.lookup(attribute).filter(|a| a.is_producer())? {
            NetworkAttribute::Activation(id) => Value::Scalar(self.network.neuron(id).ok()?.activation()),
            NetworkAttribute::Spike(id) => {
                let spiked = self.network.neuron(id).ok()?.is_spike();
                Value::Scalar(if spiked { 1.0 } else { 0.0 })
            }
            NetworkAttribute::Strength(id) => Value::Scalar(self.network.synapse(id).ok()?.strength()),
            NetworkAttribute::Activations => {
                Value::Vector(self.network.neurons().map(|n| n.activation()).collect())
            }
            NetworkAttribute::Input(_) | NetworkAttribute::Inputs => return None,
        };
        Some(value)
    }

    fn write(&mut self, attribute: &str, value: Value) -> Result<(), ComponentError> {
        let target = self
            .lookup(attribute)
            .filter(|a| a.is_consumer())
            .ok_or_else(|| ComponentError::UnknownAttribute(attribute.to_string()))?;
        expect_type(attribute, target.value_type(), &value)?;

        match (target, value) {
            (NetworkAttribute::Input(id), Value::Scalar(v)) => self.network.add_input(id, v)?,
            (NetworkAttribute::Activation(id), Value::Scalar(v)) => self.network.set_activation(id, v)?,
            (NetworkAttribute::Inputs, Value::Vector(values)) => {
                let ids = self.network.neuron_ids();
                if ids.len() != values.len() {
                    trace!(
                        "[COUPLING] '{}' got {} inputs for {} neurons",
                        self.name,
                        values.len(),
                        ids.len()
                    );
                }
                for (id, v) in ids.into_iter().zip(values) {
                    self.network.add_input(id, v)?;
                }
            }
            _ => return Err(ComponentError::UnknownAttribute(attribute.to_string())),
        }
        Ok(())
    }
}
