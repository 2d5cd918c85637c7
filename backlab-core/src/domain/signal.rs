//! Per-bar trading signal.

use serde::{Deserialize, Serialize};

/// Directive emitted by a strategy for one bar.
///
/// `Buy` is meaningful only when the engine is flat and `Sell` only while a
/// position is held; the engine enforces this, the strategy is not trusted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl Signal {
    pub fn is_hold(&self) -> bool {
        matches!(self, Signal::Hold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hold_predicate() {
        assert!(Signal::Hold.is_hold());
        assert!(!Signal::Buy.is_hold());
        assert!(!Signal::Sell.is_hold());
    }

    #[test]
    fn signal_serialization_roundtrip() {
        let json = serde_json::to_string(&Signal::Buy).unwrap();
        let deser: Signal = serde_json::from_str(&json).unwrap();
        assert_eq!(deser, Signal::Buy);
    }
}
