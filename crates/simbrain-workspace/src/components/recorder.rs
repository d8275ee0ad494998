// Copyright 2025 The Simbrain Authors
// SPDX-License-Identifier: Apache-2.0

//! Time-series sink
//!
//! Each declared series is a consumer attribute `series:<name>`. Every value
//! written is stored with the recorder's cycle count at the time of the write.

use crate::attribute::{AttributeSpec, Value, ValueType};
use crate::component::{expect_type, WorkspaceComponent};
use crate::error::ComponentError;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub cycle: u64,
    pub value: Value,
}

#[derive(Debug, Clone)]
struct Series {
    value_type: ValueType,
    samples: Vec<Sample>,
}

pub struct RecorderComponent {
    name: String,
    series: BTreeMap<String, Series>,
    cycles: u64,
    capacity: Option<usize>,
}

impl RecorderComponent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            series: BTreeMap::new(),
            cycles: 0,
            capacity: None,
        }
    }

    pub fn with_series(mut self, name: impl Into<String>, value_type: ValueType) -> Self {
        self.add_series(name, value_type);
        self
    }

    /// Keep only the most recent `capacity` samples per series
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn add_series(&mut self, name: impl Into<String>, value_type: ValueType) {
        self.series.insert(
            name.into(),
            Series {
                value_type,
                samples: Vec::new(),
            },
        );
    }

    pub fn series(&self, name: &str) -> Option<&[Sample]> {
        self.series.get(name).map(|s| s.samples.as_slice())
    }

    /// Scalar samples of a series, skipping vectors
    pub fn scalars(&self, name: &str) -> Vec<f64> {
        self.series(name)
            .map(|samples| samples.iter().filter_map(|s| s.value.as_scalar()).collect())
            .unwrap_or_default()
    }

    pub fn series_names(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn clear(&mut self) {
        for series in self.series.values_mut() {
            series.samples.clear();
        }
    }
}

impl WorkspaceComponent for RecorderComponent {
    fn name(&self) -> &str {
        &self.name
    }

    fn update(&mut self) -> Result<(), ComponentError> {
        self.cycles += 1;
        Ok(())
    }

    fn producers(&self) -> Vec<AttributeSpec> {
        Vec::new()
    }

    fn consumers(&self) -> Vec<AttributeSpec> {
        self.series
            .iter()
            .map(|(name, series)| AttributeSpec::new(format!("series:{}", name), series.value_type))
            .collect()
    }

    fn read(&self, _attribute: &str) -> Option<Value> {
        None
    }

    fn write(&mut self, attribute: &str, value: Value) -> Result<(), ComponentError> {
        let series = attribute
            .strip_prefix("series:")
            .and_then(|name| self.series.get_mut(name))
            .ok_or_else(|| ComponentError::UnknownAttribute(attribute.to_string()))?;
        expect_type(attribute, series.value_type, &value)?;

        series.samples.push(Sample {
            cycle: self.cycles,
            value,
        });
        if let Some(capacity) = self.capacity {
            let excess = series.samples.len().saturating_sub(capacity);
            series.samples.drain(..excess);
        }
        Ok(())
    }
}
