// Copyright 2025 The Simbrain Authors
// SPDX-License-Identifier: Apache-2.0

//! # Synapse Update Rules and Spike Responders
//!
//! A synapse step has two independent outputs, both computed from the
//! start-of-step snapshot:
//!
//! ```text
//! strength' = SynapseRule::apply(snapshot, scratch)      (skipped when frozen)
//! psr'      = SpikeResponder::respond(snapshot, scratch)
//! ```
//!
//! Strength bounds are applied by the rule; polarity is applied by the
//! network when the result is committed.

pub mod hebbian;
pub mod spike_responder;
pub mod stdp;

pub use hebbian::HebbianParams;
pub use spike_responder::{JumpAndDecayParams, SpikeResponder, SpikeResponderKind, StepParams};
pub use stdp::{ExponentialStdpParams, StdpParams};

use crate::data::SynapseData;
use crate::rules::{check, clip};
use crate::schema::{ParamSpec, RuleParameters};
use crate::types::Result;
use serde::{Deserialize, Serialize};

/// Default upper strength bound
pub const DEFAULT_SYNAPSE_CEILING: f64 = 10.0;

/// Default lower strength bound
pub const DEFAULT_SYNAPSE_FLOOR: f64 = -10.0;

/// Start-of-step view of a synapse and its two endpoints
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynapseSnapshot {
    pub strength: f64,
    pub upper_bound: f64,
    pub lower_bound: f64,
    pub source_activation: f64,
    pub target_activation: f64,
    pub source_spiked: bool,
    pub target_spiked: bool,
    pub source_last_spike: Option<f64>,
    pub target_last_spike: Option<f64>,
    /// Whether the source neuron runs a spiking rule
    pub source_is_spiking: bool,
    /// Response produced by the previous step
    pub previous_psr: f64,
    pub time_step: f64,
}

impl SynapseSnapshot {
    #[inline]
    pub(crate) fn clip(&self, value: f64) -> f64 {
        clip(value, self.lower_bound, self.upper_bound)
    }
}

/// Rule kind without parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynapseRuleKind {
    Static,
    Hebbian,
    Stdp,
    ExponentialStdp,
}

impl SynapseRuleKind {
    pub const ALL: [SynapseRuleKind; 4] = [
        SynapseRuleKind::Static,
        SynapseRuleKind::Hebbian,
        SynapseRuleKind::Stdp,
        SynapseRuleKind::ExponentialStdp,
    ];

    pub fn default_rule(self) -> SynapseRule {
        match self {
            SynapseRuleKind::Static => SynapseRule::Static,
            SynapseRuleKind::Hebbian => SynapseRule::Hebbian(HebbianParams::default()),
            SynapseRuleKind::Stdp => SynapseRule::Stdp(StdpParams::default()),
            SynapseRuleKind::ExponentialStdp => {
                SynapseRule::ExponentialStdp(ExponentialStdpParams::default())
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SynapseRuleKind::Static => "Static",
            SynapseRuleKind::Hebbian => HebbianParams::RULE_NAME,
            SynapseRuleKind::Stdp => StdpParams::RULE_NAME,
            SynapseRuleKind::ExponentialStdp => ExponentialStdpParams::RULE_NAME,
        }
    }

    pub fn schema(self) -> &'static [ParamSpec] {
        match self {
            SynapseRuleKind::Static => &[],
            SynapseRuleKind::Hebbian => HebbianParams::schema(),
            SynapseRuleKind::Stdp => StdpParams::schema(),
            SynapseRuleKind::ExponentialStdp => ExponentialStdpParams::schema(),
        }
    }
}

/// A synapse learning rule with its parameters
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum SynapseRule {
    #[default]
    Static,
    Hebbian(HebbianParams),
    Stdp(StdpParams),
    ExponentialStdp(ExponentialStdpParams),
}

impl SynapseRule {
    pub fn try_new(rule: SynapseRule) -> Result<Self> {
        rule.validate()?;
        Ok(rule)
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            SynapseRule::Static => Ok(()),
            SynapseRule::Hebbian(p) => check(p),
            SynapseRule::Stdp(p) => check(p),
            SynapseRule::ExponentialStdp(p) => check(p),
        }
    }

    pub fn kind(&self) -> SynapseRuleKind {
        match self {
            SynapseRule::Static => SynapseRuleKind::Static,
            SynapseRule::Hebbian(_) => SynapseRuleKind::Hebbian,
            SynapseRule::Stdp(_) => SynapseRuleKind::Stdp,
            SynapseRule::ExponentialStdp(_) => SynapseRuleKind::ExponentialStdp,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Compute the next strength, updating the synapse's scratch data
    #[inline]
    pub fn apply(&self, snapshot: &SynapseSnapshot, data: &mut SynapseData) -> f64 {
        match self {
            SynapseRule::Static => snapshot.strength,
            SynapseRule::Hebbian(p) => p.apply(snapshot),
            SynapseRule::Stdp(p) => p.apply(snapshot, data),
            SynapseRule::ExponentialStdp(p) => p.apply(snapshot),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NetworkError;

    pub(crate) fn snapshot(strength: f64) -> SynapseSnapshot {
        SynapseSnapshot {
            strength,
            upper_bound: DEFAULT_SYNAPSE_CEILING,
            lower_bound: DEFAULT_SYNAPSE_FLOOR,
            source_activation: 0.0,
            target_activation: 0.0,
            source_spiked: false,
            target_spiked: false,
            source_last_spike: None,
            target_last_spike: None,
            source_is_spiking: false,
            previous_psr: 0.0,
            time_step: 1.0,
        }
    }

    #[test]
    fn test_static_rule_keeps_strength() {
        let mut data = SynapseData::default();
        let mut snap = snapshot(0.3);
        snap.source_activation = 1.0;
        snap.target_activation = 1.0;
        snap.source_spiked = true;
        assert_eq!(SynapseRule::Static.apply(&snap, &mut data), 0.3);
    }

    #[test]
    fn test_try_new_rejects_invalid_parameters() {
        let bad = SynapseRule::ExponentialStdp(ExponentialStdpParams {
            tau_plus: 0.0,
            ..Default::default()
        });
        assert!(matches!(
            SynapseRule::try_new(bad),
            Err(NetworkError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_kinds_round_trip() {
        for kind in SynapseRuleKind::ALL {
            assert_eq!(kind.default_rule().kind(), kind);
            assert!(kind.default_rule().validate().is_ok());
        }
        assert!(SynapseRuleKind::Static.schema().is_empty());
        assert!(!SynapseRuleKind::Hebbian.schema().is_empty());
    }
}
