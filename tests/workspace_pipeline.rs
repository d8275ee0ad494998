// Copyright 2025 The Simbrain Authors
// SPDX-License-Identifier: Apache-2.0

//! End-to-end: config -> network -> workspace -> couplings -> listeners

use crossbeam::channel::Receiver;
use parking_lot::Mutex;
use simbrain::config::SimbrainConfig;
use simbrain::prelude::*;
use std::sync::Arc;

fn drain(events: &Receiver<UpdaterEvent>) -> Vec<UpdaterEvent> {
    events.try_iter().collect()
}

/// Records the cycle number of every `workspace_updated`
#[derive(Default)]
struct CycleLog {
    cycles: Mutex<Vec<u64>>,
}

impl UpdaterListener for CycleLog {
    fn workspace_updated(&self, cycle: u64) {
        self.cycles.lock().push(cycle);
    }
}

fn build(config: &SimbrainConfig) -> (Workspace, ComponentId, NeuronId) {
    let ws = Workspace::new(&config.updater).unwrap();

    let table = ws.add_component(DataTableComponent::new(
        "stimulus",
        vec![vec![1.0], vec![0.0], vec![0.0], vec![1.0]],
    ));

    let mut network = Network::from_config(&config.network).unwrap();
    let input = network.add_neuron(Neuron::default()).unwrap();
    let spiking = network
        .add_neuron(Neuron::new(NeuronRule::SpikingThreshold(SpikingThresholdParams::default())))
        .unwrap();
    network.add_synapse(input, spiking, 1.0).unwrap();
    let net = ws.add_component(NetworkComponent::new("net", network));

    ws.couple(
        AttributeRef::new(table, "column:0"),
        AttributeRef::new(net, format!("neuron:{}:input", input.0)),
    )
    .unwrap();

    (ws, net, spiking)
}

#[test]
fn test_pipeline_is_deterministic_across_thread_counts() {
    let mut config = SimbrainConfig::default();
    config.network.seed = 11;

    let mut traces = Vec::new();
    for threads in [1, 4] {
        config.updater.num_threads = threads;
        let (ws, net, spiking) = build(&config);
        let recorder = ws.add_component(
            RecorderComponent::new("plot").with_series("spike", ValueType::Scalar),
        );
        ws.couple(
            AttributeRef::new(net, format!("neuron:{}:spike", spiking.0)),
            AttributeRef::new(recorder, "series:spike"),
        )
        .unwrap();

        ws.iterate(8).unwrap();
        traces.push(
            ws.with_component(recorder, |r: &mut RecorderComponent| r.scalars("spike"))
                .unwrap(),
        );
    }

    assert_eq!(traces[0], traces[1]);
    // Row 0 reaches the input neuron in cycle 2 and the spiking neuron in cycle 3
    assert_eq!(traces[0][..4], [0.0, 0.0, 1.0, 0.0]);
}

#[test]
fn test_listeners_see_every_cycle() {
    let config = SimbrainConfig::default();
    let (ws, _, _) = build(&config);
    let log = Arc::new(CycleLog::default());
    let (listener, events) = ChannelListener::new();
    ws.add_listener(log.clone());
    ws.add_listener(Arc::new(listener));

    ws.iterate(3).unwrap();

    assert_eq!(*log.cycles.lock(), vec![1, 2, 3]);
    let events = drain(&events);
    assert_eq!(events.first(), Some(&UpdaterEvent::UpdatingStarted));
    assert_eq!(events.last(), Some(&UpdaterEvent::UpdatingFinished { cycles: 3 }));
    let flushes = events
        .iter()
        .filter(|e| matches!(e, UpdaterEvent::CouplingsUpdated(_)))
        .count();
    assert_eq!(flushes, 3);
}

#[test]
fn test_network_edits_between_cycles() {
    let config = SimbrainConfig::default();
    let (ws, net, spiking) = build(&config);
    ws.iterate(2).unwrap();

    ws.with_component(net, |c: &mut NetworkComponent| {
        c.network_mut().set_clamped(spiking, true).unwrap();
        c.network_mut().set_activation(spiking, 0.25).unwrap();
    })
    .unwrap();
    ws.iterate(3).unwrap();

    let activation = ws
        .read(&AttributeRef::new(net, format!("neuron:{}:activation", spiking.0)))
        .unwrap();
    assert_eq!(activation, Value::Scalar(0.25));
}
