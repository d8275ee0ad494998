// Copyright 2025 The Simbrain Authors
// SPDX-License-Identifier: Apache-2.0

//! The workspace: component registry, couplings and the updater lifecycle

use crate::attribute::{AttributeRef, ComponentId, Value};
use crate::component::WorkspaceComponent;
use crate::coupling::{Coupling, CouplingId};
use crate::error::{Result, WorkspaceError};
use crate::listener::UpdaterListener;
use crate::state::UpdaterState;
use crate::updater::{ComponentEntry, CycleReport, IdleGuard, UpdaterShared};
use parking_lot::{Mutex, MutexGuard};
use simbrain_config::UpdaterConfig;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

/// Components, the couplings between them and the updater that drives them
///
/// Every method takes `&self`; share a workspace across threads with `Arc`.
pub struct Workspace {
    shared: Arc<UpdaterShared>,
    driver: Mutex<Option<JoinHandle<()>>>,
}

impl Workspace {
    /// Workspace with a pool sized from `config` (0 threads = one per core)
    pub fn new(config: &UpdaterConfig) -> Result<Self> {
        let num_threads = config.resolved_num_threads();
        let shared = UpdaterShared::new(num_threads, config.cycle_delay_ms)?;
        info!("[WORKSPACE] Created with {} worker threads", num_threads);
        Ok(Self {
            shared: Arc::new(shared),
            driver: Mutex::new(None),
        })
    }

    pub fn with_threads(num_threads: usize) -> Result<Self> {
        if num_threads == 0 {
            return Err(WorkspaceError::InvalidThreadCount(0));
        }
        Self::new(&UpdaterConfig {
            num_threads,
            ..UpdaterConfig::default()
        })
    }

    // ===== Components =====

    pub fn add_component<C: WorkspaceComponent>(&self, component: C) -> ComponentId {
        self.add_boxed_component(Box::new(component))
    }

    pub fn add_boxed_component(&self, component: Box<dyn WorkspaceComponent>) -> ComponentId {
        let id = ComponentId(self.shared.next_component_id.fetch_add(1, Ordering::AcqRel));
        let name = component.name().to_string();
        debug!("[WORKSPACE] Added {} '{}'", id, name);
        self.shared.components.write().push(ComponentEntry {
            id,
            name,
            handle: Arc::new(Mutex::new(component)),
        });
        id
    }

    /// Unregister a component
    ///
    /// An update already in flight finishes; couplings that reference the
    /// component are left alone and go inert at the next flush.
    pub fn remove_component(&self, id: ComponentId) -> Result<()> {
        let mut components = self.shared.components.write();
        let index = components
            .iter()
            .position(|entry| entry.id == id)
            .ok_or(WorkspaceError::ComponentNotFound(id))?;
        let entry = components.remove(index);
        debug!("[WORKSPACE] Removed {} '{}'", id, entry.name);
        Ok(())
    }

    /// Ids in registration order
    pub fn component_ids(&self) -> Vec<ComponentId> {
        self.shared.components.read().iter().map(|entry| entry.id).collect()
    }

    pub fn component_name(&self, id: ComponentId) -> Result<String> {
        self.shared
            .components
            .read()
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.name.clone())
            .ok_or(WorkspaceError::ComponentNotFound(id))
    }

    pub fn component_count(&self) -> usize {
        self.shared.components.read().len()
    }

    /// Run `f` against a component downcast to its concrete type
    ///
    /// Blocks while the component is being updated.
    pub fn with_component<T, R, F>(&self, id: ComponentId, f: F) -> Result<R>
    where
        T: WorkspaceComponent,
        F: FnOnce(&mut T) -> R,
    {
        let handle = self
            .shared
            .resolve(id)
            .ok_or(WorkspaceError::ComponentNotFound(id))?;
        let mut guard = handle.lock();
        let component: &mut dyn WorkspaceComponent = &mut **guard;
        let concrete = component
            .as_any_mut()
            .downcast_mut::<T>()
            .ok_or(WorkspaceError::ComponentTypeMismatch(id))?;
        Ok(f(concrete))
    }

    pub fn read(&self, attribute: &AttributeRef) -> Result<Value> {
        let handle = self
            .shared
            .resolve(attribute.component)
            .ok_or(WorkspaceError::ComponentNotFound(attribute.component))?;
        let value = handle.lock().read(&attribute.attribute);
        value.ok_or_else(|| WorkspaceError::UnknownAttribute {
            component: attribute.component,
            attribute: attribute.attribute.clone(),
            role: "producer",
        })
    }

    pub fn write(&self, attribute: &AttributeRef, value: Value) -> Result<()> {
        let handle = self
            .shared
            .resolve(attribute.component)
            .ok_or(WorkspaceError::ComponentNotFound(attribute.component))?;
        let result = handle.lock().write(&attribute.attribute, value);
        result.map_err(|source| WorkspaceError::Component {
            id: attribute.component,
            source,
        })
    }

    // ===== Couplings =====

    /// Link a producer attribute to a consumer attribute
    ///
    /// Both endpoints must exist and carry the same value type.
    pub fn couple(&self, producer: AttributeRef, consumer: AttributeRef) -> Result<CouplingId> {
        let producer_type = {
            let handle = self
                .shared
                .resolve(producer.component)
                .ok_or(WorkspaceError::ComponentNotFound(producer.component))?;
            let found = handle.lock().producer_type(&producer.attribute);
            found.ok_or_else(|| WorkspaceError::UnknownAttribute {
                component: producer.component,
                attribute: producer.attribute.clone(),
                role: "producer",
            })?
        };
        let consumer_type = {
            let handle = self
                .shared
                .resolve(consumer.component)
                .ok_or(WorkspaceError::ComponentNotFound(consumer.component))?;
            let found = handle.lock().consumer_type(&consumer.attribute);
            found.ok_or_else(|| WorkspaceError::UnknownAttribute {
                component: consumer.component,
                attribute: consumer.attribute.clone(),
                role: "consumer",
            })?
        };
        if producer_type != consumer_type {
            return Err(WorkspaceError::TypeMismatch {
                producer: producer_type,
                consumer: consumer_type,
            });
        }

        let label = format!("{} -> {}", producer, consumer);
        let id = self.shared.couplings.lock().add(producer, consumer);
        debug!("[COUPLING] Added {}: {}", id, label);
        Ok(id)
    }

    pub fn decouple(&self, id: CouplingId) -> Result<Coupling> {
        self.shared
            .couplings
            .lock()
            .remove(id)
            .ok_or(WorkspaceError::CouplingNotFound(id))
    }

    /// Couplings in flush order
    pub fn couplings(&self) -> Vec<Coupling> {
        self.shared.couplings.lock().couplings().to_vec()
    }

    // ===== Listeners / threads =====

    pub fn add_listener(&self, listener: Arc<dyn UpdaterListener>) {
        self.shared.listeners.write().push(listener);
    }

    /// Resize the worker pool; takes effect from the next cycle
    pub fn set_num_threads(&self, num_threads: usize) -> Result<()> {
        self.shared.set_num_threads(num_threads)
    }

    pub fn num_threads(&self) -> usize {
        self.shared.num_threads.load(Ordering::Acquire)
    }

    pub fn set_cycle_delay_ms(&self, delay_ms: u64) {
        self.shared.cycle_delay_ms.store(delay_ms, Ordering::Relaxed);
    }

    // ===== Lifecycle =====

    pub fn state(&self) -> UpdaterState {
        self.shared.state.load()
    }

    pub fn is_running(&self) -> bool {
        self.state() != UpdaterState::Idle
    }

    /// Cycles completed since creation
    pub fn cycle_count(&self) -> u64 {
        self.shared.cycles.load(Ordering::Acquire)
    }

    /// Run exactly one cycle on the caller's thread
    pub fn step(&self) -> Result<CycleReport> {
        let _run = self.begin()?;
        let _idle = IdleGuard::new(&self.shared.state);
        Ok(self.shared.run_cycle())
    }

    /// Run `n` cycles on the caller's thread
    ///
    /// Returns the number of cycles completed, which is less than `n` only if
    /// `stop()` was called from another thread.
    pub fn iterate(&self, n: u64) -> Result<u64> {
        let _run = self.begin()?;
        debug!("[UPDATER] Iterating {} cycles", n);
        Ok(self.shared.drive(Some(n)))
    }

    /// Start cycling on a background thread until `stop()`
    pub fn run(&self) -> Result<()> {
        // stop() must find the handle once it sees Running
        let mut driver = self.driver.lock();
        self.shared
            .state
            .transition(UpdaterState::Idle, UpdaterState::Running)
            .map_err(WorkspaceError::Busy)?;

        let shared = self.shared.clone();
        let spawned = thread::Builder::new()
            .name("simbrain-updater".to_string())
            .spawn(move || {
                let _run = shared.run_lock.lock();
                shared.drive(None);
            });

        match spawned {
            Ok(handle) => {
                *driver = Some(handle);
                info!("[UPDATER] Started");
                Ok(())
            }
            Err(e) => {
                self.shared.state.store(UpdaterState::Idle);
                Err(WorkspaceError::Spawn(e.to_string()))
            }
        }
    }

    /// Request a stop and wait for the in-flight cycle to finish
    ///
    /// Cooperative: a component stuck in `update()` blocks this call.
    pub fn stop(&self) {
        if self
            .shared
            .state
            .transition(UpdaterState::Running, UpdaterState::Stopping)
            .is_err()
        {
            return;
        }
        info!("[UPDATER] Stopping...");

        let handle = self.driver.lock().take();
        match handle {
            Some(handle) => {
                if handle.join().is_err() {
                    warn!("[UPDATER] Driver thread panicked during shutdown");
                    self.shared.state.store(UpdaterState::Idle);
                }
            }
            None => {
                // iterate() on another thread: wait for it to release the run lock
                drop(self.shared.run_lock.lock());
            }
        }
        info!("[UPDATER] Stopped after {} cycles", self.cycle_count());
    }
}

impl Workspace {
    /// Claim the run lock and move `Idle -> Running` for a caller-thread run
    ///
    /// The lock is held until the state is back to `Idle`, so `stop()` waiting
    /// on it never returns early.
    fn begin(&self) -> Result<MutexGuard<'_, ()>> {
        let run = self
            .shared
            .run_lock
            .try_lock()
            .ok_or_else(|| WorkspaceError::Busy(self.state()))?;
        self.shared
            .state
            .transition(UpdaterState::Idle, UpdaterState::Running)
            .map_err(WorkspaceError::Busy)?;
        Ok(run)
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        self.stop();
    }
}
