// Copyright 2025 The Simbrain Authors
// SPDX-License-Identifier: Apache-2.0

//! Table of numbers played back one row per cycle
//!
//! Producers: `column:<i>` (scalar) and `row` (vector). Before the first
//! update the current row is row 0. An empty table produces zeros.

use crate::attribute::{AttributeSpec, Value};
use crate::component::WorkspaceComponent;
use crate::error::ComponentError;

pub struct DataTableComponent {
    name: String,
    columns: usize,
    rows: Vec<Vec<f64>>,
    cursor: Option<usize>,
    looping: bool,
}

impl DataTableComponent {
    /// Rows shorter than the widest row are padded with zeros
    pub fn new(name: impl Into<String>, mut rows: Vec<Vec<f64>>) -> Self {
        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in rows.iter_mut() {
            row.resize(columns, 0.0);
        }
        Self {
            name: name.into(),
            columns,
            rows,
            cursor: None,
            looping: true,
        }
    }

    /// Stay on the last row instead of wrapping to the first
    pub fn without_looping(mut self) -> Self {
        self.looping = false;
        self
    }

    pub fn column_count(&self) -> usize {
        self.columns
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn current_index(&self) -> usize {
        self.cursor.unwrap_or(0)
    }

    pub fn current_row(&self) -> Vec<f64> {
        self.rows
            .get(self.current_index())
            .cloned()
            .unwrap_or_else(|| vec![0.0; self.columns])
    }

    pub fn reset(&mut self) {
        self.cursor = None;
    }
}

impl WorkspaceComponent for DataTableComponent {
    fn name(&self) -> &str {
        &self.name
    }

    fn update(&mut self) -> Result<(), ComponentError> {
        if self.rows.is_empty() {
            return Ok(());
        }
        let last = self.rows.len() - 1;
        self.cursor = Some(match self.cursor {
            None => 0,
            Some(i) if i < last => i + 1,
            Some(_) if self.looping => 0,
            Some(_) => last,
        });
        Ok(())
    }

    fn producers(&self) -> Vec<AttributeSpec> {
        let mut specs: Vec<AttributeSpec> = (0..self.columns)
            .map(|i| AttributeSpec::scalar(format!("column:{}", i)))
            .collect();
        specs.push(AttributeSpec::vector("row"));
        specs
    }

    fn consumers(&self) -> Vec<AttributeSpec> {
        Vec::new()
    }

    fn read(&self, attribute: &str) -> Option<Value> {
        if attribute == "row" {
            return Some(Value::Vector(self.current_row()));
        }
        let column: usize = attribute.strip_prefix("column:")?.parse().ok()?;
        if column >= self.columns {
            return None;
        }
        let value = self
            .rows
            .get(self.current_index())
            .map_or(0.0, |row| row[column]);
        Some(Value::Scalar(value))
    }

    fn write(&mut self, attribute: &str, _value: Value) -> Result<(), ComponentError> {
        Err(ComponentError::UnknownAttribute(attribute.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advances_one_row_per_update() {
        let mut table = DataTableComponent::new("table", vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        assert_eq!(table.read("column:1"), Some(Value::Scalar(2.0)));

        table.update().unwrap();
        assert_eq!(table.read("row"), Some(Value::Vector(vec![1.0, 2.0])));
        table.update().unwrap();
        assert_eq!(table.read("column:0"), Some(Value::Scalar(3.0)));
        // Wraps
        table.update().unwrap();
        assert_eq!(table.current_index(), 0);
    }

    #[test]
    fn test_without_looping_holds_last_row() {
        let mut table = DataTableComponent::new("table", vec![vec![1.0], vec![2.0]]).without_looping();
        for _ in 0..5 {
            table.update().unwrap();
        }
        assert_eq!(table.read("column:0"), Some(Value::Scalar(2.0)));
    }

    #[test]
    fn test_ragged_and_empty_tables() {
        let table = DataTableComponent::new("ragged", vec![vec![1.0], vec![2.0, 3.0]]);
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.read("column:1"), Some(Value::Scalar(0.0)));
        assert_eq!(table.read("column:2"), None);
        assert_eq!(table.read("columns:0"), None);

        let mut empty = DataTableComponent::new("empty", Vec::new());
        empty.update().unwrap();
        assert_eq!(empty.read("row"), Some(Value::Vector(Vec::new())));
        assert_eq!(empty.producers().len(), 1);
    }
}
