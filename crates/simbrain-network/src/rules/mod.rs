// Copyright 2025 The Simbrain Authors
// SPDX-License-Identifier: Apache-2.0

//! # Neuron Update Rules
//!
//! A neuron rule is a tagged variant: the [`NeuronRule`] enum names the kind and
//! carries that kind's parameter struct. Dispatch is a single `match`.
//!
//! ## Contract
//!
//! ```text
//! apply(snapshot, scratch, rng) -> NeuronUpdate
//!
//!     snapshot = the neuron's own state at the start of the step, plus the
//!                input gathered from the same start-of-step snapshot
//!     result   = next activation + spike flag, committed by the network
//!                only after every neuron has been computed
//! ```
//!
//! Rules never fail. Parameter problems are caught by [`NeuronRule::try_new`];
//! NaN inputs come out as NaN.
//!
//! ## Adding a New Rule
//!
//! 1. Create `src/rules/your_rule.rs` with a parameter struct
//! 2. Implement [`RuleParameters`] for it
//! 3. Add a variant to [`NeuronRule`] and [`NeuronRuleKind`]
//! 4. Add tests

pub mod decay;
pub mod integrate_and_fire;
pub mod linear;
pub mod spiking_threshold;

pub use decay::{DecayParams, DecayUpdateType};
pub use integrate_and_fire::IntegrateAndFireParams;
pub use linear::LinearParams;
pub use spiking_threshold::SpikingThresholdParams;

use crate::data::ScalarData;
use crate::schema::{ParamSpec, RuleParameters};
use crate::types::{NetworkError, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// The default upper bound of a neuron using a rule
pub const DEFAULT_CEILING: f64 = 1.0;

/// The default lower bound of a neuron using a rule
pub const DEFAULT_FLOOR: f64 = -1.0;

/// Whether a rule's dynamics are scaled by the network time step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeType {
    Discrete,
    Continuous,
}

/// Start-of-step view of a neuron handed to its rule
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeuronSnapshot {
    pub activation: f64,
    /// Weighted synaptic input plus externally accumulated input
    pub input: f64,
    pub upper_bound: f64,
    pub lower_bound: f64,
    pub time_step: f64,
}

/// Buffered result of one rule application
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeuronUpdate {
    pub activation: f64,
    pub spiked: bool,
}

impl NeuronUpdate {
    #[inline]
    fn value(activation: f64) -> Self {
        Self {
            activation,
            spiked: false,
        }
    }
}

/// Clamp to `[lower, upper]`, letting NaN through untouched
#[inline]
pub fn clip(value: f64, lower: f64, upper: f64) -> f64 {
    if value > upper {
        upper
    } else if value < lower {
        lower
    } else {
        value
    }
}

/// Rule kind without parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeuronRuleKind {
    Linear,
    Decay,
    IntegrateAndFire,
    SpikingThreshold,
}

impl NeuronRuleKind {
    pub const ALL: [NeuronRuleKind; 4] = [
        NeuronRuleKind::Linear,
        NeuronRuleKind::Decay,
        NeuronRuleKind::IntegrateAndFire,
        NeuronRuleKind::SpikingThreshold,
    ];

    /// Rule of this kind with default parameters
    pub fn default_rule(self) -> NeuronRule {
        match self {
            NeuronRuleKind::Linear => NeuronRule::Linear(LinearParams::default()),
            NeuronRuleKind::Decay => NeuronRule::Decay(DecayParams::default()),
            NeuronRuleKind::IntegrateAndFire => {
                NeuronRule::IntegrateAndFire(IntegrateAndFireParams::default())
            }
            NeuronRuleKind::SpikingThreshold => {
                NeuronRule::SpikingThreshold(SpikingThresholdParams::default())
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            NeuronRuleKind::Linear => LinearParams::RULE_NAME,
            NeuronRuleKind::Decay => DecayParams::RULE_NAME,
            NeuronRuleKind::IntegrateAndFire => IntegrateAndFireParams::RULE_NAME,
            NeuronRuleKind::SpikingThreshold => SpikingThresholdParams::RULE_NAME,
        }
    }

    pub fn schema(self) -> &'static [ParamSpec] {
        match self {
            NeuronRuleKind::Linear => LinearParams::schema(),
            NeuronRuleKind::Decay => DecayParams::schema(),
            NeuronRuleKind::IntegrateAndFire => IntegrateAndFireParams::schema(),
            NeuronRuleKind::SpikingThreshold => SpikingThresholdParams::schema(),
        }
    }
}

/// A neuron update rule with its parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum NeuronRule {
    Linear(LinearParams),
    Decay(DecayParams),
    IntegrateAndFire(IntegrateAndFireParams),
    SpikingThreshold(SpikingThresholdParams),
}

impl Default for NeuronRule {
    fn default() -> Self {
        NeuronRule::Linear(LinearParams::default())
    }
}

pub(crate) fn check<P: RuleParameters>(params: &P) -> Result<()> {
    params
        .validate()
        .map_err(|reason| NetworkError::InvalidParameter {
            rule: P::RULE_NAME,
            reason,
        })
}

impl NeuronRule {
    /// Validate and return the rule
    pub fn try_new(rule: NeuronRule) -> Result<Self> {
        rule.validate()?;
        Ok(rule)
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            NeuronRule::Linear(p) => check(p),
            NeuronRule::Decay(p) => check(p),
            NeuronRule::IntegrateAndFire(p) => check(p),
            NeuronRule::SpikingThreshold(p) => check(p),
        }
    }

    pub fn kind(&self) -> NeuronRuleKind {
        match self {
            NeuronRule::Linear(_) => NeuronRuleKind::Linear,
            NeuronRule::Decay(_) => NeuronRuleKind::Decay,
            NeuronRule::IntegrateAndFire(_) => NeuronRuleKind::IntegrateAndFire,
            NeuronRule::SpikingThreshold(_) => NeuronRuleKind::SpikingThreshold,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    pub fn time_type(&self) -> TimeType {
        match self {
            NeuronRule::IntegrateAndFire(_) => TimeType::Continuous,
            _ => TimeType::Discrete,
        }
    }

    /// Spiking rules emit spike flags that spike responders react to
    pub fn is_spiking(&self) -> bool {
        matches!(
            self,
            NeuronRule::IntegrateAndFire(_) | NeuronRule::SpikingThreshold(_)
        )
    }

    pub fn is_clipped(&self) -> bool {
        match self {
            NeuronRule::Linear(p) => p.clipping,
            NeuronRule::Decay(p) => p.clipping,
            NeuronRule::IntegrateAndFire(p) => p.clipping,
            NeuronRule::SpikingThreshold(_) => false,
        }
    }

    /// `(lower, upper)` bounds a neuron gets when this rule is assigned
    pub fn default_bounds(&self) -> (f64, f64) {
        (DEFAULT_FLOOR, DEFAULT_CEILING)
    }

    /// Fresh scratch data for a neuron using this rule
    pub fn create_scalar_data(&self) -> ScalarData {
        match self {
            NeuronRule::Linear(_) | NeuronRule::Decay(_) => ScalarData::Biased { bias: 0.0 },
            NeuronRule::IntegrateAndFire(_) | NeuronRule::SpikingThreshold(_) => {
                ScalarData::Empty
            }
        }
    }

    /// Compute the next state of one neuron
    #[inline]
    pub fn apply<R: Rng + ?Sized>(
        &self,
        snapshot: &NeuronSnapshot,
        data: &ScalarData,
        rng: &mut R,
    ) -> NeuronUpdate {
        match self {
            NeuronRule::Linear(p) => NeuronUpdate::value(p.apply(snapshot, data.bias(), rng)),
            NeuronRule::Decay(p) => NeuronUpdate::value(p.apply(snapshot, data.bias(), rng)),
            NeuronRule::IntegrateAndFire(p) => p.apply(snapshot, rng),
            NeuronRule::SpikingThreshold(p) => p.apply(snapshot),
        }
    }
}
