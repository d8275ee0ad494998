// Copyright 2025 The Simbrain Authors
// SPDX-License-Identifier: Apache-2.0

//! Error types for the workspace and its components

use crate::attribute::{ComponentId, ValueType};
use crate::coupling::CouplingId;
use crate::state::UpdaterState;
use simbrain_network::NetworkError;

/// Errors raised by a single component
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ComponentError {
    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),

    #[error("Attribute {attribute} expects {expected:?}, got {found:?}")]
    TypeMismatch {
        attribute: String,
        expected: ValueType,
        found: ValueType,
    },

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Component update failed: {0}")]
    Failed(String),
}

/// Errors raised by workspace operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WorkspaceError {
    #[error("Component not found: {0}")]
    ComponentNotFound(ComponentId),

    #[error("{component} has no {role} attribute '{attribute}'")]
    UnknownAttribute {
        component: ComponentId,
        attribute: String,
        role: &'static str,
    },

    #[error("Cannot couple {producer:?} producer to {consumer:?} consumer")]
    TypeMismatch {
        producer: ValueType,
        consumer: ValueType,
    },

    #[error("Coupling not found: {0}")]
    CouplingNotFound(CouplingId),

    #[error("Updater is {0:?}")]
    Busy(UpdaterState),

    #[error("Invalid thread count {0}: must be at least 1")]
    InvalidThreadCount(usize),

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(String),

    #[error("Failed to spawn updater thread: {0}")]
    Spawn(String),

    #[error("{0} is not of the requested type")]
    ComponentTypeMismatch(ComponentId),

    #[error("{id}: {source}")]
    Component {
        id: ComponentId,
        #[source]
        source: ComponentError,
    },
}

pub type Result<T> = std::result::Result<T, WorkspaceError>;
