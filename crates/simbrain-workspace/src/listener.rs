// Copyright 2025 The Simbrain Authors
// SPDX-License-Identifier: Apache-2.0

//! Updater event hooks
//!
//! Listeners run on whichever thread raised the event (a pool worker for the
//! per-component events, the cycle thread for everything else), so they must
//! be cheap and must not call back into the updater.

use crate::attribute::ComponentId;
use crate::coupling::{FlushReport, InertCoupling};
use crate::updater::ComponentFailure;
use crossbeam::channel::{unbounded, Receiver, Sender};

#[allow(unused_variables)]
pub trait UpdaterListener: Send + Sync {
    /// `run()` or `iterate()` began
    fn updating_started(&self) {}

    /// `run()` or `iterate()` returned to idle after `cycles` cycles
    fn updating_finished(&self, cycles: u64) {}

    fn component_update_started(&self, component: ComponentId, thread: usize) {}

    fn component_update_finished(&self, component: ComponentId, thread: usize) {}

    fn component_failed(&self, failure: &ComponentFailure) {}

    fn couplings_updated(&self, report: &FlushReport) {}

    fn coupling_inert(&self, coupling: &InertCoupling) {}

    /// A full cycle (updates and flush) completed
    fn workspace_updated(&self, cycle: u64) {}

    fn num_threads_changed(&self, num_threads: usize) {}
}

/// Owned form of the listener callbacks
#[derive(Debug, Clone, PartialEq)]
pub enum UpdaterEvent {
    UpdatingStarted,
    UpdatingFinished { cycles: u64 },
    ComponentUpdateStarted { component: ComponentId, thread: usize },
    ComponentUpdateFinished { component: ComponentId, thread: usize },
    ComponentFailed(ComponentFailure),
    CouplingsUpdated(FlushReport),
    CouplingInert(InertCoupling),
    WorkspaceUpdated { cycle: u64 },
    NumThreadsChanged { num_threads: usize },
}

/// Forwards every callback as an [`UpdaterEvent`] on a crossbeam channel
pub struct ChannelListener {
    sender: Sender<UpdaterEvent>,
}

impl ChannelListener {
    pub fn new() -> (Self, Receiver<UpdaterEvent>) {
        let (sender, receiver) = unbounded();
        (Self { sender }, receiver)
    }

    fn send(&self, event: UpdaterEvent) {
        // Receiver dropped: nobody is listening anymore
        let _ = self.sender.send(event);
    }
}

impl UpdaterListener for ChannelListener {
    fn updating_started(&self) {
        self.send(UpdaterEvent::UpdatingStarted);
    }

    fn updating_finished(&self, cycles: u64) {
        self.send(UpdaterEvent::UpdatingFinished { cycles });
    }

    fn component_update_started(&self, component: ComponentId, thread: usize) {
        self.send(UpdaterEvent::ComponentUpdateStarted { component, thread });
    }

    fn component_update_finished(&self, component: ComponentId, thread: usize) {
        self.send(UpdaterEvent::ComponentUpdateFinished { component, thread });
    }

    fn component_failed(&self, failure: &ComponentFailure) {
        self.send(UpdaterEvent::ComponentFailed(failure.clone()));
    }

    fn couplings_updated(&self, report: &FlushReport) {
        self.send(UpdaterEvent::CouplingsUpdated(report.clone()));
    }

    fn coupling_inert(&self, coupling: &InertCoupling) {
        self.send(UpdaterEvent::CouplingInert(coupling.clone()));
    }

    fn workspace_updated(&self, cycle: u64) {
        self.send(UpdaterEvent::WorkspaceUpdated { cycle });
    }

    fn num_threads_changed(&self, num_threads: usize) {
        self.send(UpdaterEvent::NumThreadsChanged { num_threads });
    }
}
