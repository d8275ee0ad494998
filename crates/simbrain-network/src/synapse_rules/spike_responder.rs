// Copyright 2025 The Simbrain Authors
// SPDX-License-Identifier: Apache-2.0

//! # Spike Responders
//!
//! Turn a source spike into a post-synaptic response (PSR). Responders only
//! matter when the source neuron runs a spiking rule; otherwise the response
//! is always `strength × a_src`.

use super::SynapseSnapshot;
use crate::data::SynapseData;
use crate::rules::check;
use crate::schema::{ParamSpec, RuleParameters};
use crate::types;
use serde::{Deserialize, Serialize};

/// Square pulse of fixed height and duration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepParams {
    pub response_height: f64,
    /// Number of steps the pulse lasts
    pub response_duration: u32,
}

impl Default for StepParams {
    fn default() -> Self {
        Self {
            response_height: 0.5,
            response_duration: 1,
        }
    }
}

impl RuleParameters for StepParams {
    const RULE_NAME: &'static str = "Step";

    fn validate(&self) -> Result<(), &'static str> {
        if !self.response_height.is_finite() {
            return Err("response height must be finite");
        }
        Ok(())
    }

    fn schema() -> &'static [ParamSpec] {
        const SCHEMA: &[ParamSpec] = &[
            ParamSpec::float("response_height", "Response height", 0.5),
            ParamSpec::integer("response_duration", "Response duration", 1)
                .describe("Number of steps the response is held after a spike")
                .range(Some(0.0), None),
        ];
        SCHEMA
    }
}

/// Instant jump followed by exponential relaxation toward a base line
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JumpAndDecayParams {
    pub jump_height: f64,
    pub base_line: f64,
    pub time_constant: f64,
}

impl Default for JumpAndDecayParams {
    fn default() -> Self {
        Self {
            jump_height: 2.0,
            base_line: 0.0,
            time_constant: 3.0,
        }
    }
}

impl RuleParameters for JumpAndDecayParams {
    const RULE_NAME: &'static str = "Jump and decay";

    fn validate(&self) -> Result<(), &'static str> {
        if !(self.time_constant.is_finite() && self.time_constant > 0.0) {
            return Err("time constant must be finite and > 0");
        }
        if !(self.jump_height.is_finite() && self.base_line.is_finite()) {
            return Err("jump height and base line must be finite");
        }
        Ok(())
    }

    fn schema() -> &'static [ParamSpec] {
        const SCHEMA: &[ParamSpec] = &[
            ParamSpec::float("jump_height", "Jump height", 2.0),
            ParamSpec::float("base_line", "Base-line", 0.0),
            ParamSpec::float("time_constant", "Decay time constant", 3.0).range(Some(0.0), None),
        ];
        SCHEMA
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpikeResponderKind {
    None,
    Step,
    JumpAndDecay,
}

impl SpikeResponderKind {
    pub const ALL: [SpikeResponderKind; 3] = [
        SpikeResponderKind::None,
        SpikeResponderKind::Step,
        SpikeResponderKind::JumpAndDecay,
    ];

    pub fn default_responder(self) -> SpikeResponder {
        match self {
            SpikeResponderKind::None => SpikeResponder::None,
            SpikeResponderKind::Step => SpikeResponder::Step(StepParams::default()),
            SpikeResponderKind::JumpAndDecay => {
                SpikeResponder::JumpAndDecay(JumpAndDecayParams::default())
            }
        }
    }

    pub fn schema(self) -> &'static [ParamSpec] {
        match self {
            SpikeResponderKind::None => &[],
            SpikeResponderKind::Step => StepParams::schema(),
            SpikeResponderKind::JumpAndDecay => JumpAndDecayParams::schema(),
        }
    }
}

/// Spike responder with its parameters
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "responder", rename_all = "snake_case")]
pub enum SpikeResponder {
    #[default]
    None,
    Step(StepParams),
    JumpAndDecay(JumpAndDecayParams),
}

impl SpikeResponder {
    pub fn try_new(responder: SpikeResponder) -> types::Result<Self> {
        responder.validate()?;
        Ok(responder)
    }

    pub fn validate(&self) -> types::Result<()> {
        match self {
            SpikeResponder::None => Ok(()),
            SpikeResponder::Step(p) => check(p),
            SpikeResponder::JumpAndDecay(p) => check(p),
        }
    }

    pub fn kind(&self) -> SpikeResponderKind {
        match self {
            SpikeResponder::None => SpikeResponderKind::None,
            SpikeResponder::Step(_) => SpikeResponderKind::Step,
            SpikeResponder::JumpAndDecay(_) => SpikeResponderKind::JumpAndDecay,
        }
    }

    /// Compute this step's post-synaptic response
    pub fn respond(&self, snapshot: &SynapseSnapshot, data: &mut SynapseData) -> f64 {
        if !snapshot.source_is_spiking {
            return snapshot.strength * snapshot.source_activation;
        }
        match self {
            SpikeResponder::None => snapshot.strength * snapshot.source_activation,
            SpikeResponder::Step(p) => {
                if snapshot.source_spiked {
                    data.response_countdown = p.response_duration;
                }
                if data.response_countdown > 0 {
                    data.response_countdown -= 1;
                    snapshot.strength * p.response_height
                } else {
                    0.0
                }
            }
            SpikeResponder::JumpAndDecay(p) => {
                let psr = snapshot.previous_psr;
                if snapshot.source_spiked {
                    psr + snapshot.strength * p.jump_height
                } else {
                    psr + snapshot.time_step * (p.base_line - psr) / p.time_constant
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synapse_rules::tests::snapshot;

    fn spiking(strength: f64) -> SynapseSnapshot {
        let mut snap = snapshot(strength);
        snap.source_is_spiking = true;
        snap
    }

    #[test]
    fn test_non_spiking_source_is_weighted_activation() {
        let mut data = SynapseData::default();
        let mut snap = snapshot(2.0);
        snap.source_activation = 0.25;
        let responder = SpikeResponder::Step(StepParams::default());
        assert_eq!(responder.respond(&snap, &mut data), 0.5);
    }

    #[test]
    fn test_step_pulse_duration() {
        let responder = SpikeResponder::Step(StepParams {
            response_height: 1.0,
            response_duration: 2,
        });
        let mut data = SynapseData::default();
        let mut snap = spiking(0.5);

        snap.source_spiked = true;
        assert_eq!(responder.respond(&snap, &mut data), 0.5);
        snap.source_spiked = false;
        assert_eq!(responder.respond(&snap, &mut data), 0.5);
        assert_eq!(responder.respond(&snap, &mut data), 0.0);
    }

    #[test]
    fn test_jump_and_decay() {
        let responder = SpikeResponder::JumpAndDecay(JumpAndDecayParams {
            jump_height: 1.0,
            base_line: 0.0,
            time_constant: 2.0,
        });
        let mut data = SynapseData::default();
        let mut snap = spiking(2.0);

        snap.source_spiked = true;
        let jumped = responder.respond(&snap, &mut data);
        assert_eq!(jumped, 2.0);

        snap.source_spiked = false;
        snap.previous_psr = jumped;
        // 2 + 1 × (0 - 2) / 2 = 1
        assert_eq!(responder.respond(&snap, &mut data), 1.0);
    }

    #[test]
    fn test_rejects_zero_time_constant() {
        let bad = SpikeResponder::JumpAndDecay(JumpAndDecayParams {
            time_constant: 0.0,
            ..Default::default()
        });
        assert!(SpikeResponder::try_new(bad).is_err());
    }

    #[test]
    fn test_step_validation_reports_rule_name() {
        let bad = SpikeResponder::Step(StepParams {
            response_height: f64::NAN,
            response_duration: 1,
        });
        match bad.validate() {
            Err(crate::types::NetworkError::InvalidParameter { rule, reason }) => {
                assert_eq!(rule, "Step");
                assert_eq!(reason, "response height must be finite");
            }
            other => panic!("expected InvalidParameter, got {:?}", other),
        }
        assert_eq!(StepParams::default().validate(), Ok(()));
        assert!(SpikeResponder::None.validate().is_ok());
    }
}
