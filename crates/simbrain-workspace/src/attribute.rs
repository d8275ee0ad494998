// Copyright 2025 The Simbrain Authors
// SPDX-License-Identifier: Apache-2.0

//! Typed values exchanged between components
//!
//! Components expose named attributes. Producer attributes are read after
//! every cycle; consumer attributes are written by couplings.

use core::fmt;
use serde::{Deserialize, Serialize};

/// Workspace-unique component id (never reused)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId(pub u64);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Component({})", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    Scalar,
    Vector,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Scalar(f64),
    Vector(Vec<f64>),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Scalar(_) => ValueType::Scalar,
            Value::Vector(_) => ValueType::Vector,
        }
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Value::Scalar(v) => Some(*v),
            Value::Vector(_) => None,
        }
    }

    pub fn as_vector(&self) -> Option<&[f64]> {
        match self {
            Value::Vector(v) => Some(v),
            Value::Scalar(_) => None,
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Scalar(value)
    }
}

impl From<Vec<f64>> for Value {
    fn from(value: Vec<f64>) -> Self {
        Value::Vector(value)
    }
}

/// Name and type of one attribute
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributeSpec {
    pub name: String,
    pub value_type: ValueType,
}

impl AttributeSpec {
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
        }
    }

    pub fn scalar(name: impl Into<String>) -> Self {
        Self::new(name, ValueType::Scalar)
    }

    pub fn vector(name: impl Into<String>) -> Self {
        Self::new(name, ValueType::Vector)
    }
}

/// An attribute of a specific component
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributeRef {
    pub component: ComponentId,
    pub attribute: String,
}

impl AttributeRef {
    pub fn new(component: ComponentId, attribute: impl Into<String>) -> Self {
        Self {
            component,
            attribute: attribute.into(),
        }
    }
}

impl fmt::Display for AttributeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.component, self.attribute)
    }
}
