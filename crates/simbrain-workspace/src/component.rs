// Copyright 2025 The Simbrain Authors
// SPDX-License-Identifier: Apache-2.0

//! The component trait
//!
//! A component is anything the workspace updater steps once per cycle. It is
//! updated by exactly one worker at a time (each component sits behind its
//! own lock) and talks to other components only through couplings.

use crate::attribute::{AttributeSpec, Value, ValueType};
use crate::error::ComponentError;
use std::any::Any;

/// Downcasting support for component trait objects
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

pub trait WorkspaceComponent: AsAny + Send {
    fn name(&self) -> &str;

    /// Advance one cycle
    fn update(&mut self) -> Result<(), ComponentError>;

    /// Attributes that can feed couplings
    fn producers(&self) -> Vec<AttributeSpec>;

    /// Attributes that couplings can write
    fn consumers(&self) -> Vec<AttributeSpec>;

    /// Current value of a producer attribute, `None` if it does not exist
    fn read(&self, attribute: &str) -> Option<Value>;

    /// Deliver a value to a consumer attribute
    fn write(&mut self, attribute: &str, value: Value) -> Result<(), ComponentError>;

    fn producer_type(&self, attribute: &str) -> Option<ValueType> {
        self.producers()
            .into_iter()
            .find(|spec| spec.name == attribute)
            .map(|spec| spec.value_type)
    }

    fn consumer_type(&self, attribute: &str) -> Option<ValueType> {
        self.consumers()
            .into_iter()
            .find(|spec| spec.name == attribute)
            .map(|spec| spec.value_type)
    }
}

/// Reject a value whose type differs from the attribute's
pub(crate) fn expect_type(
    attribute: &str,
    expected: ValueType,
    value: &Value,
) -> Result<(), ComponentError> {
    let found = value.value_type();
    if found == expected {
        Ok(())
    } else {
        Err(ComponentError::TypeMismatch {
            attribute: attribute.to_string(),
            expected,
            found,
        })
    }
}
