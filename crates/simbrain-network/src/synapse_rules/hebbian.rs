// Copyright 2025 The Simbrain Authors
// SPDX-License-Identifier: Apache-2.0

//! Hebbian rule: `w += learning_rate × a_src × a_tgt`, then clipped.

use super::SynapseSnapshot;
use crate::schema::{ParamSpec, RuleParameters};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HebbianParams {
    pub learning_rate: f64,
}

impl Default for HebbianParams {
    fn default() -> Self {
        Self { learning_rate: 0.1 }
    }
}

impl HebbianParams {
    #[inline]
    pub fn apply(&self, snapshot: &SynapseSnapshot) -> f64 {
        let delta = self.learning_rate * snapshot.source_activation * snapshot.target_activation;
        snapshot.clip(snapshot.strength + delta)
    }
}

impl RuleParameters for HebbianParams {
    const RULE_NAME: &'static str = "Hebbian";

    fn validate(&self) -> Result<(), &'static str> {
        if !self.learning_rate.is_finite() {
            return Err("learning rate must be finite");
        }
        Ok(())
    }

    fn schema() -> &'static [ParamSpec] {
        const SCHEMA: &[ParamSpec] = &[ParamSpec::float("learning_rate", "Learning rate", 0.1)];
        SCHEMA
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synapse_rules::tests::snapshot;

    #[test]
    fn test_hebbian_correlation() {
        let params = HebbianParams { learning_rate: 0.5 };
        let mut snap = snapshot(1.0);
        snap.source_activation = 0.8;
        snap.target_activation = 0.5;
        // 1 + 0.5 × 0.8 × 0.5 = 1.2
        assert!((params.apply(&snap) - 1.2).abs() < 1e-12);

        snap.target_activation = -0.5;
        assert!((params.apply(&snap) - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_hebbian_clips_to_bounds() {
        let params = HebbianParams { learning_rate: 100.0 };
        let mut snap = snapshot(9.0);
        snap.source_activation = 1.0;
        snap.target_activation = 1.0;
        assert_eq!(params.apply(&snap), snap.upper_bound);
    }
}
