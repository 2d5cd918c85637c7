//! Equity curve point.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Portfolio value observed at one bar.
///
/// The engine emits one point per candle for both the strategy run and the
/// passive buy-and-hold baseline, at full precision.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EquityPoint {
    pub time: DateTime<Utc>,
    pub value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn equity_point_serialization_roundtrip() {
        let point = EquityPoint {
            time: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
            value: 10_500.25,
        };
        let json = serde_json::to_string(&point).unwrap();
        let deser: EquityPoint = serde_json::from_str(&json).unwrap();
        assert_eq!(point, deser);
    }
}
