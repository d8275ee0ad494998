// Copyright 2025 The Simbrain Authors
// SPDX-License-Identifier: Apache-2.0

//! # Parameter Schemas
//!
//! Every rule's parameter struct describes its own user-editable fields with a
//! static table of [`ParamSpec`]s. Property editors and persistence layers
//! consume the table; the engine itself only calls [`RuleParameters::validate`].

use serde::Serialize;

/// Default value of a parameter, which also fixes its type
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", content = "default", rename_all = "snake_case")]
pub enum ParamValue {
    Float(f64),
    Integer(i64),
    Bool(bool),
    Choice(&'static str),
}

/// Declarative description of one parameter
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParamSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    #[serde(flatten)]
    pub value: ParamValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "no_choices")]
    pub choices: &'static [&'static str],
}

impl ParamSpec {
    pub const fn float(name: &'static str, label: &'static str, default: f64) -> Self {
        Self {
            name,
            label,
            description: "",
            value: ParamValue::Float(default),
            min: None,
            max: None,
            choices: &[],
        }
    }

    pub const fn integer(name: &'static str, label: &'static str, default: i64) -> Self {
        Self {
            name,
            label,
            description: "",
            value: ParamValue::Integer(default),
            min: None,
            max: None,
            choices: &[],
        }
    }

    pub const fn boolean(name: &'static str, label: &'static str, default: bool) -> Self {
        Self {
            name,
            label,
            description: "",
            value: ParamValue::Bool(default),
            min: None,
            max: None,
            choices: &[],
        }
    }

    pub const fn choice(
        name: &'static str,
        label: &'static str,
        default: &'static str,
        choices: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            label,
            description: "",
            value: ParamValue::Choice(default),
            min: None,
            max: None,
            choices,
        }
    }

    pub const fn describe(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    pub const fn range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }
}

fn no_choices(choices: &&'static [&'static str]) -> bool {
    choices.is_empty()
}

/// Behaviour shared by every rule parameter struct
pub trait RuleParameters {
    /// Human-readable rule name, used in error messages and editors
    const RULE_NAME: &'static str;

    /// Reject parameter combinations the rule cannot run with
    fn validate(&self) -> Result<(), &'static str>;

    /// Editable fields of this rule
    fn schema() -> &'static [ParamSpec];
}

/// Render a schema as JSON for an external editor
pub fn schema_to_json(specs: &[ParamSpec]) -> serde_json::Value {
    serde_json::to_value(specs).unwrap_or(serde_json::Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPECS: &[ParamSpec] = &[
        ParamSpec::float("slope", "Slope", 1.0).range(Some(0.0), None),
        ParamSpec::choice("update_type", "Update Type", "relative", &["relative", "absolute"]),
    ];

    #[test]
    fn test_schema_json_shape() {
        let json = schema_to_json(SPECS);
        let entries = json.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["name"], "slope");
        assert_eq!(entries[0]["type"], "float");
        assert_eq!(entries[0]["default"], 1.0);
        assert_eq!(entries[0]["min"], 0.0);
        assert!(entries[0].get("max").is_none());
        assert_eq!(entries[1]["choices"][1], "absolute");
    }
}
