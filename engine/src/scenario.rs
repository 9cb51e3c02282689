//! Scenario / profile config binding (C10)
//!
//! Injects limits, the risk multiplier, gate definitions, and the
//! short-circuit/multi-reason choice into a `Scenario` at build time. All
//! configuration is validated eagerly: an invalid scenario fails to build
//! and no input is ever consumed, matching this codebase's convention of
//! a validating builder rather than a runtime-checked bag of fields.

use crate::features::{identity_multiplier, MultiplierFn};
use crate::money::Money;
use crate::policy::{GateRule, PolicyLimits};
use thiserror::Error;

/// Errors that fail scenario construction (`CONFIG_ERROR`).
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("daily_attempt_limit must be at least 1, got {0}")]
    ZeroAttemptLimit(u64),

    #[error("gate {0:?} has neither an amount cap nor a daily global cap")]
    GateHasNoEffect(String),

    #[error("duplicate gate name {0:?}")]
    DuplicateGateName(String),
}

/// A fully validated, immutable scenario configuration.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub limits: PolicyLimits,
    pub multiplier: MultiplierFn,
}

/// Builder for `Scenario`, mirroring this codebase's per-module
/// configuration builders (e.g. orchestrator/scenario config).
pub struct ScenarioBuilder {
    daily_attempt_limit: u64,
    daily_amount_limit: Money,
    weekly_amount_limit: Money,
    gates: Vec<GateRule>,
    multi_reason: bool,
    multiplier: MultiplierFn,
}

impl ScenarioBuilder {
    /// Start a builder with baseline limits matching the worked examples
    /// in the specification (daily_attempt_limit=3, daily_amount_limit
    /// =$5000.00, weekly_amount_limit=$20000.00, no gates, no multiplier).
    pub fn baseline() -> Self {
        Self {
            daily_attempt_limit: 3,
            daily_amount_limit: Money::from_minor_units(500_000),
            weekly_amount_limit: Money::from_minor_units(2_000_000),
            gates: Vec::new(),
            multi_reason: false,
            multiplier: identity_multiplier,
        }
    }

    pub fn daily_attempt_limit(mut self, limit: u64) -> Self {
        self.daily_attempt_limit = limit;
        self
    }

    pub fn daily_amount_limit(mut self, limit: Money) -> Self {
        self.daily_amount_limit = limit;
        self
    }

    pub fn weekly_amount_limit(mut self, limit: Money) -> Self {
        self.weekly_amount_limit = limit;
        self
    }

    pub fn multi_reason(mut self, enabled: bool) -> Self {
        self.multi_reason = enabled;
        self
    }

    pub fn multiplier(mut self, multiplier: MultiplierFn) -> Self {
        self.multiplier = multiplier;
        self
    }

    pub fn add_gate(mut self, gate: GateRule) -> Self {
        self.gates.push(gate);
        self
    }

    /// Validate and freeze the scenario. Fails fast before any input is
    /// consumed, per `CONFIG_ERROR` semantics (§7).
    pub fn build(self) -> Result<Scenario, ConfigError> {
        if self.daily_attempt_limit == 0 {
            return Err(ConfigError::ZeroAttemptLimit(0));
        }

        let mut seen_names = std::collections::HashSet::new();
        for gate in &self.gates {
            if !seen_names.insert(gate.name.clone()) {
                return Err(ConfigError::DuplicateGateName(gate.name.clone()));
            }
            if gate.amount_cap.is_none() && gate.daily_global_cap.is_none() {
                return Err(ConfigError::GateHasNoEffect(gate.name.clone()));
            }
        }

        tracing::info!(
            daily_attempt_limit = self.daily_attempt_limit,
            daily_amount_limit = %self.daily_amount_limit,
            weekly_amount_limit = %self.weekly_amount_limit,
            gate_count = self.gates.len(),
            multi_reason = self.multi_reason,
            "scenario built"
        );

        Ok(Scenario {
            limits: PolicyLimits {
                daily_attempt_limit: self.daily_attempt_limit,
                daily_amount_limit: self.daily_amount_limit,
                weekly_amount_limit: self.weekly_amount_limit,
                gates: self.gates,
                multi_reason: self.multi_reason,
            },
            multiplier: self.multiplier,
        })
    }
}

impl Default for ScenarioBuilder {
    fn default() -> Self {
        Self::baseline()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_scenario_builds() {
        let scenario = ScenarioBuilder::baseline().build().unwrap();
        assert_eq!(scenario.limits.daily_attempt_limit, 3);
    }

    #[test]
    fn zero_attempt_limit_fails_build() {
        let err = ScenarioBuilder::baseline()
            .daily_attempt_limit(0)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::ZeroAttemptLimit(0));
    }

    #[test]
    fn gate_with_no_caps_fails_build() {
        let gate = GateRule {
            name: "USELESS".to_string(),
            predicate: |_| true,
            amount_cap: None,
            daily_global_cap: None,
        };
        let err = ScenarioBuilder::baseline().add_gate(gate).build().unwrap_err();
        assert_eq!(err, ConfigError::GateHasNoEffect("USELESS".to_string()));
    }

    #[test]
    fn duplicate_gate_names_fail_build() {
        let gate = |name: &str| GateRule {
            name: name.to_string(),
            predicate: |_| true,
            amount_cap: Some(Money::ZERO),
            daily_global_cap: None,
        };
        let err = ScenarioBuilder::baseline()
            .add_gate(gate("DUP"))
            .add_gate(gate("DUP"))
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::DuplicateGateName("DUP".to_string()));
    }
}
