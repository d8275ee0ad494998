// Copyright 2025 The Simbrain Authors
// SPDX-License-Identifier: Apache-2.0

//! Couplings: producer attribute -> consumer attribute links
//!
//! Couplings hold component ids, not component handles. Removing a component
//! never touches the coupling table; the next flush finds the endpoint gone,
//! marks the coupling inert and drops it.

use crate::attribute::{AttributeRef, ComponentId};
use crate::component::WorkspaceComponent;
use crate::error::ComponentError;
use core::fmt;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{trace, warn};

pub(crate) type ComponentHandle = Arc<Mutex<Box<dyn WorkspaceComponent>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CouplingId(pub u64);

impl fmt::Display for CouplingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Coupling({})", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CouplingStatus {
    Active,
    /// An endpoint disappeared; dropped after the flush that found it
    Inert,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Coupling {
    pub id: CouplingId,
    pub producer: AttributeRef,
    pub consumer: AttributeRef,
    pub status: CouplingStatus,
}

/// Why a coupling went inert
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InertReason {
    ProducerRemoved,
    ProducerAttributeMissing,
    ConsumerRemoved,
    ConsumerAttributeMissing,
}

impl fmt::Display for InertReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            InertReason::ProducerRemoved => "producer component removed",
            InertReason::ProducerAttributeMissing => "producer attribute missing",
            InertReason::ConsumerRemoved => "consumer component removed",
            InertReason::ConsumerAttributeMissing => "consumer attribute missing",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InertCoupling {
    pub id: CouplingId,
    pub producer: AttributeRef,
    pub consumer: AttributeRef,
    pub reason: InertReason,
}

/// Outcome of one flush
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlushReport {
    /// Values delivered
    pub transferred: usize,
    pub inert: Vec<InertCoupling>,
    /// Couplings whose consumer rejected the value (kept active)
    pub rejected: Vec<(CouplingId, ComponentError)>,
}

#[derive(Debug, Default)]
pub struct CouplingManager {
    couplings: Vec<Coupling>,
    next_id: u64,
}

impl CouplingManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, producer: AttributeRef, consumer: AttributeRef) -> CouplingId {
        let id = CouplingId(self.next_id);
        self.next_id += 1;
        self.couplings.push(Coupling {
            id,
            producer,
            consumer,
            status: CouplingStatus::Active,
        });
        id
    }

    pub fn remove(&mut self, id: CouplingId) -> Option<Coupling> {
        let index = self.couplings.iter().position(|c| c.id == id)?;
        Some(self.couplings.remove(index))
    }

    pub fn get(&self, id: CouplingId) -> Option<&Coupling> {
        self.couplings.iter().find(|c| c.id == id)
    }

    /// Couplings in registration order
    pub fn couplings(&self) -> &[Coupling] {
        &self.couplings
    }

    pub fn len(&self) -> usize {
        self.couplings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.couplings.is_empty()
    }

    /// Deliver every producer value to its consumer, in registration order
    ///
    /// The producer lock is released before the consumer lock is taken, so a
    /// component coupled to itself does not deadlock.
    pub(crate) fn flush<F>(&mut self, resolve: F) -> FlushReport
    where
        F: Fn(ComponentId) -> Option<ComponentHandle>,
    {
        let mut report = FlushReport::default();

        for coupling in self.couplings.iter_mut() {
            match transfer(coupling, &resolve) {
                Ok(()) => report.transferred += 1,
                Err(Transfer::Inert(reason)) => {
                    warn!(
                        "[COUPLING] {} ({} -> {}) is inert: {}",
                        coupling.id, coupling.producer, coupling.consumer, reason
                    );
                    coupling.status = CouplingStatus::Inert;
                    report.inert.push(InertCoupling {
                        id: coupling.id,
                        producer: coupling.producer.clone(),
                        consumer: coupling.consumer.clone(),
                        reason,
                    });
                }
                Err(Transfer::Rejected(error)) => {
                    warn!("[COUPLING] {} rejected by consumer: {}", coupling.id, error);
                    report.rejected.push((coupling.id, error));
                }
            }
        }

        if !report.inert.is_empty() {
            self.couplings.retain(|c| c.status == CouplingStatus::Active);
        }

        trace!(
            "[COUPLING] Flushed {} values ({} inert, {} rejected)",
            report.transferred,
            report.inert.len(),
            report.rejected.len()
        );
        report
    }
}

enum Transfer {
    Inert(InertReason),
    Rejected(ComponentError),
}

fn transfer<F>(coupling: &Coupling, resolve: &F) -> Result<(), Transfer>
where
    F: Fn(ComponentId) -> Option<ComponentHandle>,
{
    let producer = resolve(coupling.producer.component)
        .ok_or(Transfer::Inert(InertReason::ProducerRemoved))?;
    let value = producer
        .lock()
        .read(&coupling.producer.attribute)
        .ok_or(Transfer::Inert(InertReason::ProducerAttributeMissing))?;

    let consumer = resolve(coupling.consumer.component)
        .ok_or(Transfer::Inert(InertReason::ConsumerRemoved))?;
    let result = consumer.lock().write(&coupling.consumer.attribute, value);
    match result {
        Ok(()) => Ok(()),
        Err(ComponentError::UnknownAttribute(_)) => {
            Err(Transfer::Inert(InertReason::ConsumerAttributeMissing))
        }
        Err(other) => Err(Transfer::Rejected(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::{AttributeSpec, Value};
    use std::collections::HashMap;

    struct Cell {
        value: f64,
    }

    impl WorkspaceComponent for Cell {
        fn name(&self) -> &str {
            "cell"
        }

        fn update(&mut self) -> Result<(), ComponentError> {
            Ok(())
        }

        fn producers(&self) -> Vec<AttributeSpec> {
            vec![AttributeSpec::scalar("out")]
        }

        fn consumers(&self) -> Vec<AttributeSpec> {
            vec![AttributeSpec::scalar("in")]
        }

        fn read(&self, attribute: &str) -> Option<Value> {
            (attribute == "out").then_some(Value::Scalar(self.value))
        }

        fn write(&mut self, attribute: &str, value: Value) -> Result<(), ComponentError> {
            if attribute != "in" {
                return Err(ComponentError::UnknownAttribute(attribute.to_string()));
            }
            self.value = value.as_scalar().unwrap_or_default();
            Ok(())
        }
    }

    fn handle(value: f64) -> ComponentHandle {
        Arc::new(Mutex::new(Box::new(Cell { value })))
    }

    fn value_of(handle: &ComponentHandle) -> f64 {
        handle.lock().read("out").and_then(|v| v.as_scalar()).unwrap()
    }

    #[test]
    fn test_flush_in_registration_order() {
        let mut registry = HashMap::new();
        registry.insert(ComponentId(0), handle(1.0));
        registry.insert(ComponentId(1), handle(0.0));
        registry.insert(ComponentId(2), handle(0.0));

        let mut manager = CouplingManager::new();
        manager.add(AttributeRef::new(ComponentId(0), "out"), AttributeRef::new(ComponentId(1), "in"));
        manager.add(AttributeRef::new(ComponentId(1), "out"), AttributeRef::new(ComponentId(2), "in"));

        let report = manager.flush(|id| registry.get(&id).cloned());
        assert_eq!(report.transferred, 2);
        // Second coupling sees the value delivered by the first
        assert_eq!(value_of(&registry[&ComponentId(2)]), 1.0);
    }

    #[test]
    fn test_self_coupling() {
        let cell = handle(3.0);
        let mut manager = CouplingManager::new();
        manager.add(AttributeRef::new(ComponentId(0), "out"), AttributeRef::new(ComponentId(0), "in"));

        let report = manager.flush(|_| Some(cell.clone()));
        assert_eq!(report.transferred, 1);
        assert_eq!(value_of(&cell), 3.0);
    }

    #[test]
    fn test_missing_endpoints_go_inert_and_are_dropped() {
        let mut registry = HashMap::new();
        registry.insert(ComponentId(0), handle(1.0));

        let mut manager = CouplingManager::new();
        let gone = manager.add(
            AttributeRef::new(ComponentId(0), "out"),
            AttributeRef::new(ComponentId(9), "in"),
        );
        let bad_attr = manager.add(
            AttributeRef::new(ComponentId(0), "missing"),
            AttributeRef::new(ComponentId(0), "in"),
        );
        let live = manager.add(
            AttributeRef::new(ComponentId(0), "out"),
            AttributeRef::new(ComponentId(0), "in"),
        );

        let report = manager.flush(|id| registry.get(&id).cloned());
        assert_eq!(report.transferred, 1);
        assert_eq!(report.inert.len(), 2);
        assert_eq!(report.inert[0].id, gone);
        assert_eq!(report.inert[0].reason, InertReason::ConsumerRemoved);
        assert_eq!(report.inert[1].id, bad_attr);
        assert_eq!(report.inert[1].reason, InertReason::ProducerAttributeMissing);

        assert_eq!(manager.len(), 1);
        assert!(manager.get(live).is_some());

        // Nothing left to report on the next flush
        let report = manager.flush(|id| registry.get(&id).cloned());
        assert!(report.inert.is_empty());
    }
}
