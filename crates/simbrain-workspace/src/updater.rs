// Copyright 2025 The Simbrain Authors
// SPDX-License-Identifier: Apache-2.0

//! Cycle execution
//!
//! One cycle:
//! 1. fan out every component's `update()` into the worker pool
//! 2. barrier: the pool scope returns only after every update returned
//! 3. flush couplings in registration order
//! 4. notify listeners
//!
//! The stop flag is checked by the caller between cycles, never inside one.

use crate::attribute::ComponentId;
use crate::coupling::{ComponentHandle, CouplingManager, FlushReport};
use crate::error::{ComponentError, Result, WorkspaceError};
use crate::listener::UpdaterListener;
use crate::state::{AtomicState, UpdaterState};
use parking_lot::{Mutex, RwLock};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, trace, warn};

/// A component whose update failed or panicked during a cycle
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentFailure {
    pub component: ComponentId,
    pub name: String,
    pub cause: FailureCause,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FailureCause {
    Error(ComponentError),
    Panic(String),
}

/// Outcome of one cycle
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// 1-based cycle number
    pub cycle: u64,
    /// Components dispatched this cycle
    pub updated: usize,
    pub failures: Vec<ComponentFailure>,
    pub flush: FlushReport,
}

#[derive(Clone)]
pub(crate) struct ComponentEntry {
    pub(crate) id: ComponentId,
    pub(crate) name: String,
    pub(crate) handle: ComponentHandle,
}

/// State shared between the workspace handle and the driver thread
pub(crate) struct UpdaterShared {
    pub(crate) components: RwLock<Vec<ComponentEntry>>,
    pub(crate) couplings: Mutex<CouplingManager>,
    pub(crate) listeners: RwLock<Vec<Arc<dyn UpdaterListener>>>,
    pub(crate) state: AtomicState,
    pub(crate) pool: RwLock<Arc<rayon::ThreadPool>>,
    pub(crate) num_threads: AtomicUsize,
    pub(crate) cycles: AtomicU64,
    pub(crate) cycle_delay_ms: AtomicU64,
    /// Held for the whole of one `iterate()` call or driver-thread lifetime
    pub(crate) run_lock: Mutex<()>,
    pub(crate) next_component_id: AtomicU64,
}

impl UpdaterShared {
    pub(crate) fn new(num_threads: usize, cycle_delay_ms: u64) -> Result<Self> {
        Ok(Self {
            components: RwLock::new(Vec::new()),
            couplings: Mutex::new(CouplingManager::new()),
            listeners: RwLock::new(Vec::new()),
            state: AtomicState::new(),
            pool: RwLock::new(Arc::new(build_pool(num_threads)?)),
            num_threads: AtomicUsize::new(num_threads),
            cycles: AtomicU64::new(0),
            cycle_delay_ms: AtomicU64::new(cycle_delay_ms),
            run_lock: Mutex::new(()),
            next_component_id: AtomicU64::new(0),
        })
    }

    pub(crate) fn resolve(&self, id: ComponentId) -> Option<ComponentHandle> {
        self.components
            .read()
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.handle.clone())
    }

    pub(crate) fn listeners(&self) -> Vec<Arc<dyn UpdaterListener>> {
        self.listeners.read().clone()
    }

    pub(crate) fn set_num_threads(&self, num_threads: usize) -> Result<()> {
        let pool = build_pool(num_threads)?;
        // In-flight cycles keep the pool they started with
        *self.pool.write() = Arc::new(pool);
        self.num_threads.store(num_threads, Ordering::Release);
        info!("[UPDATER] Worker pool resized to {} threads", num_threads);

        notify(&self.listeners(), "num_threads_changed", |l| {
            l.num_threads_changed(num_threads)
        });
        Ok(())
    }

    /// Run one full cycle
    pub(crate) fn run_cycle(&self) -> CycleReport {
        let entries: Vec<ComponentEntry> = self.components.read().clone();
        let listeners = self.listeners();
        let failures = Mutex::new(Vec::new());

        if self.num_threads.load(Ordering::Acquire) <= 1 {
            for entry in &entries {
                update_component(entry, 0, &listeners, &failures);
            }
        } else {
            let pool = self.pool.read().clone();
            pool.scope(|scope| {
                for entry in &entries {
                    let listeners = &listeners;
                    let failures = &failures;
                    scope.spawn(move |_| {
                        let thread = rayon::current_thread_index().unwrap_or(0);
                        update_component(entry, thread, listeners, failures);
                    });
                }
            });
        }

        // Every update has returned
        let flush = self.couplings.lock().flush(|id| self.resolve(id));
        notify(&listeners, "couplings_updated", |l| l.couplings_updated(&flush));
        for inert in &flush.inert {
            notify(&listeners, "coupling_inert", |l| l.coupling_inert(inert));
        }

        let cycle = self.cycles.fetch_add(1, Ordering::AcqRel) + 1;
        notify(&listeners, "workspace_updated", |l| l.workspace_updated(cycle));

        let failures = failures.into_inner();
        trace!(
            "[UPDATER] Cycle {} complete: {} components, {} failures, {} values transferred",
            cycle,
            entries.len(),
            failures.len(),
            flush.transferred
        );

        CycleReport {
            cycle,
            updated: entries.len(),
            failures,
            flush,
        }
    }

    /// Loop cycles until the state leaves `Running`
    ///
    /// Caller must have moved the state to `Running` and hold `run_lock`.
    pub(crate) fn drive(&self, limit: Option<u64>) -> u64 {
        let idle = IdleGuard::new(&self.state);
        notify(&self.listeners(), "updating_started", |l| l.updating_started());

        let mut completed = 0u64;
        while self.state.load() == UpdaterState::Running && limit.map_or(true, |n| completed < n) {
            self.run_cycle();
            completed += 1;

            let delay = self.cycle_delay_ms.load(Ordering::Relaxed);
            if delay > 0 && self.state.load() == UpdaterState::Running {
                std::thread::sleep(Duration::from_millis(delay));
            }
        }

        drop(idle);
        notify(&self.listeners(), "updating_finished", |l| {
            l.updating_finished(completed)
        });
        debug!("[UPDATER] Idle after {} cycles", completed);
        completed
    }
}

fn update_component(
    entry: &ComponentEntry,
    thread: usize,
    listeners: &[Arc<dyn UpdaterListener>],
    failures: &Mutex<Vec<ComponentFailure>>,
) {
    notify(listeners, "component_update_started", |l| {
        l.component_update_started(entry.id, thread)
    });

    let outcome = {
        let mut component = entry.handle.lock();
        catch_unwind(AssertUnwindSafe(|| component.update()))
    };

    let cause = match outcome {
        Ok(Ok(())) => None,
        Ok(Err(error)) => {
            warn!("[UPDATER] {} ('{}') update failed: {}", entry.id, entry.name, error);
            Some(FailureCause::Error(error))
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!("[UPDATER] {} ('{}') panicked: {}", entry.id, entry.name, message);
            Some(FailureCause::Panic(message))
        }
    };

    if let Some(cause) = cause {
        let failure = ComponentFailure {
            component: entry.id,
            name: entry.name.clone(),
            cause,
        };
        notify(listeners, "component_failed", |l| l.component_failed(&failure));
        failures.lock().push(failure);
    }

    notify(listeners, "component_update_finished", |l| {
        l.component_update_finished(entry.id, thread)
    });
}

/// Deliver one callback to every listener; a panicking listener is logged and skipped
fn notify<F>(listeners: &[Arc<dyn UpdaterListener>], callback: &str, f: F)
where
    F: Fn(&dyn UpdaterListener),
{
    for listener in listeners {
        if let Err(payload) = catch_unwind(AssertUnwindSafe(|| f(listener.as_ref()))) {
            warn!(
                "[UPDATER] Listener panicked in {}: {}",
                callback,
                panic_message(payload.as_ref())
            );
        }
    }
}

/// Returns the updater to `Idle` when dropped, unwinding included
pub(crate) struct IdleGuard<'a> {
    state: &'a AtomicState,
}

impl<'a> IdleGuard<'a> {
    pub(crate) fn new(state: &'a AtomicState) -> Self {
        Self { state }
    }
}

impl Drop for IdleGuard<'_> {
    fn drop(&mut self) {
        self.state.store(UpdaterState::Idle);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

pub(crate) fn build_pool(num_threads: usize) -> Result<rayon::ThreadPool> {
    if num_threads == 0 {
        return Err(WorkspaceError::InvalidThreadCount(num_threads));
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .thread_name(|index| format!("simbrain-worker-{}", index))
        .build()
        .map_err(|e| WorkspaceError::ThreadPool(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
        let payload: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(payload.as_ref()), "non-string panic payload");
    }

    #[test]
    fn test_zero_threads_rejected() {
        assert!(matches!(build_pool(0), Err(WorkspaceError::InvalidThreadCount(0))));
        assert!(build_pool(2).is_ok());
    }
}
