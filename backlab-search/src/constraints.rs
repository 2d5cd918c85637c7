//! Cross-parameter ordering constraints, declared as data.
//!
//! Independent per-parameter ranges cannot express relations like "fast
//! window below slow window", so the orchestrator filters combinations
//! against this table before running them. Combinations that violate a
//! constraint are counted as skipped, never executed.

use std::collections::BTreeMap;

/// A directional relation between two named parameters: when both are
/// present, `lesser` must be strictly below `greater`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderingConstraint {
    pub lesser: &'static str,
    pub greater: &'static str,
}

/// Well-known parameter pairs across the built-in strategy library.
pub const DEFAULT_CONSTRAINTS: &[OrderingConstraint] = &[
    OrderingConstraint {
        lesser: "fast_period",
        greater: "slow_period",
    },
    OrderingConstraint {
        lesser: "fast",
        greater: "slow",
    },
    OrderingConstraint {
        lesser: "macd_fast",
        greater: "macd_slow",
    },
    OrderingConstraint {
        lesser: "oversold",
        greater: "overbought",
    },
    OrderingConstraint {
        lesser: "rsi_oversold",
        greater: "rsi_overbought",
    },
    OrderingConstraint {
        lesser: "z_buy",
        greater: "z_sell",
    },
];

/// Whether `params` satisfies every applicable constraint. Constraints
/// whose parameters are absent do not apply.
pub fn is_valid(
    params: &BTreeMap<String, f64>,
    constraints: &[OrderingConstraint],
) -> bool {
    constraints.iter().all(|c| {
        match (params.get(c.lesser), params.get(c.greater)) {
            (Some(lesser), Some(greater)) => lesser < greater,
            _ => true,
        }
    })
}
