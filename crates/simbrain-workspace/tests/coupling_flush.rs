// Copyright 2025 The Simbrain Authors
// SPDX-License-Identifier: Apache-2.0

//! Couplings between the built-in components

use simbrain_network::{DecayParams, Network, Neuron, NeuronRule};
use simbrain_workspace::{
    AttributeRef, ChannelListener, CouplingStatus, DataTableComponent, InertReason,
    NetworkComponent, RecorderComponent, UpdaterEvent, ValueType, Workspace, WorkspaceError,
};
use std::sync::Arc;

fn single_neuron_network(rule: NeuronRule) -> (Network, String) {
    let mut network = Network::with_seed(3);
    let id = network.add_neuron(Neuron::new(rule)).unwrap();
    (network, format!("neuron:{}", id.0))
}

#[test]
fn test_table_to_network_to_recorder() {
    let ws = Workspace::with_threads(2).unwrap();
    let table = ws.add_component(DataTableComponent::new(
        "stimulus",
        vec![vec![0.1], vec![0.2], vec![0.3]],
    ));
    let (network, neuron) = single_neuron_network(NeuronRule::default());
    let net = ws.add_component(NetworkComponent::new("net", network));
    let recorder = ws.add_component(RecorderComponent::new("plot").with_series("out", ValueType::Scalar));

    ws.couple(
        AttributeRef::new(table, "column:0"),
        AttributeRef::new(net, format!("{}:input", neuron)),
    )
    .unwrap();
    ws.couple(
        AttributeRef::new(net, format!("{}:activation", neuron)),
        AttributeRef::new(recorder, "series:out"),
    )
    .unwrap();

    ws.iterate(4).unwrap();

    // Each table row reaches the network one cycle after it is produced
    let recorded = ws
        .with_component(recorder, |r: &mut RecorderComponent| r.scalars("out"))
        .unwrap();
    assert_eq!(recorded, vec![0.0, 0.1, 0.2, 0.3]);
}

#[test]
fn test_couple_rejects_type_mismatch() {
    let ws = Workspace::with_threads(1).unwrap();
    let table = ws.add_component(DataTableComponent::new("t", vec![vec![1.0, 2.0]]));
    let (network, neuron) = single_neuron_network(NeuronRule::default());
    let net = ws.add_component(NetworkComponent::new("net", network));

    let result = ws.couple(
        AttributeRef::new(table, "row"),
        AttributeRef::new(net, format!("{}:input", neuron)),
    );
    assert_eq!(
        result,
        Err(WorkspaceError::TypeMismatch {
            producer: ValueType::Vector,
            consumer: ValueType::Scalar,
        })
    );

    // Vector to vector is fine
    assert!(ws
        .couple(AttributeRef::new(table, "row"), AttributeRef::new(net, "network:inputs"))
        .is_ok());
}

#[test]
fn test_removed_component_makes_coupling_inert() {
    let ws = Workspace::with_threads(2).unwrap();
    let table = ws.add_component(DataTableComponent::new("t", vec![vec![1.0]]));
    let (network, neuron) = single_neuron_network(NeuronRule::Decay(DecayParams::default()));
    let net = ws.add_component(NetworkComponent::new("net", network));
    let coupling = ws
        .couple(
            AttributeRef::new(table, "column:0"),
            AttributeRef::new(net, format!("{}:input", neuron)),
        )
        .unwrap();
    let (listener, events) = ChannelListener::new();
    ws.add_listener(Arc::new(listener));

    ws.step().unwrap();
    assert_eq!(ws.couplings()[0].status, CouplingStatus::Active);

    ws.remove_component(net).unwrap();
    let report = ws.step().unwrap();
    assert_eq!(report.flush.transferred, 0);
    assert_eq!(report.flush.inert.len(), 1);
    assert_eq!(report.flush.inert[0].id, coupling);
    assert_eq!(report.flush.inert[0].reason, InertReason::ConsumerRemoved);
    assert!(ws.couplings().is_empty());

    let inert_events = events
        .try_iter()
        .filter(|e| matches!(e, UpdaterEvent::CouplingInert(_)))
        .count();
    assert_eq!(inert_events, 1);

    // Reported once, then gone
    assert!(ws.step().unwrap().flush.inert.is_empty());
    assert_eq!(ws.decouple(coupling), Err(WorkspaceError::CouplingNotFound(coupling)));
}

#[test]
fn test_removed_neuron_makes_coupling_inert() {
    let ws = Workspace::with_threads(1).unwrap();
    let mut network = Network::with_seed(1);
    let a = network.add_neuron(Neuron::default()).unwrap();
    let b = network.add_neuron(Neuron::default()).unwrap();
    let net = ws.add_component(NetworkComponent::new("net", network));
    let recorder = ws.add_component(RecorderComponent::new("plot").with_series("a", ValueType::Scalar));

    ws.couple(
        AttributeRef::new(net, format!("neuron:{}:activation", a.0)),
        AttributeRef::new(recorder, "series:a"),
    )
    .unwrap();
    ws.couple(
        AttributeRef::new(net, format!("neuron:{}:activation", b.0)),
        AttributeRef::new(net, format!("neuron:{}:input", a.0)),
    )
    .unwrap();

    ws.with_component(net, |c: &mut NetworkComponent| c.network_mut().remove_neuron(a).map(|_| ()))
        .unwrap()
        .unwrap();

    let report = ws.step().unwrap();
    let reasons: Vec<_> = report.flush.inert.iter().map(|i| i.reason.clone()).collect();
    assert_eq!(
        reasons,
        vec![InertReason::ProducerAttributeMissing, InertReason::ConsumerAttributeMissing]
    );
}
