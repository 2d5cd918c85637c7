//! Trade — one long round trip from entry to exit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single long position opened and (eventually) closed by the engine.
///
/// Created on entry with a strictly positive, fixed `size` in position
/// units. `close()` fills the exit fields and derives P&L exactly once; a
/// closed trade is never mutated again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub entry_time: DateTime<Utc>,
    pub entry_price: f64,
    /// Position units bought at entry (net of commission).
    pub size: f64,
    pub exit_time: Option<DateTime<Utc>>,
    pub exit_price: Option<f64>,
    pub pnl: Option<f64>,
    pub pnl_pct: Option<f64>,
}

impl Trade {
    pub fn open(entry_time: DateTime<Utc>, entry_price: f64, size: f64) -> Self {
        debug_assert!(size > 0.0, "trade size must be strictly positive");
        Self {
            entry_time,
            entry_price,
            size,
            exit_time: None,
            exit_price: None,
            pnl: None,
            pnl_pct: None,
        }
    }

    /// Close the trade at `exit_price`, deriving gross P&L from the price
    /// move alone (commissions are accounted in engine cash, not here).
    pub fn close(&mut self, exit_time: DateTime<Utc>, exit_price: f64) {
        self.exit_time = Some(exit_time);
        self.exit_price = Some(exit_price);
        self.pnl = Some((exit_price - self.entry_price) * self.size);
        self.pnl_pct = Some((exit_price - self.entry_price) / self.entry_price);
    }

    pub fn is_closed(&self) -> bool {
        self.exit_time.is_some()
    }

    pub fn is_win(&self) -> bool {
        self.pnl.map(|pnl| pnl > 0.0).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()
    }

    #[test]
    fn open_trade_has_no_exit() {
        let trade = Trade::open(t(1), 100.0, 2.0);
        assert!(!trade.is_closed());
        assert!(trade.pnl.is_none());
        assert!(!trade.is_win());
    }

    #[test]
    fn close_derives_pnl_exactly() {
        let mut trade = Trade::open(t(1), 100.0, 2.5);
        trade.close(t(3), 120.0);

        assert!(trade.is_closed());
        assert_eq!(trade.pnl, Some((120.0 - 100.0) * 2.5));
        assert_eq!(trade.pnl_pct, Some((120.0 - 100.0) / 100.0));
        assert!(trade.is_win());
    }

    #[test]
    fn losing_trade_is_not_a_win() {
        let mut trade = Trade::open(t(1), 100.0, 1.0);
        trade.close(t(2), 90.0);
        assert!(!trade.is_win());
        assert_eq!(trade.pnl, Some(-10.0));
    }

    #[test]
    fn zero_pnl_trade_is_not_a_win() {
        let mut trade = Trade::open(t(1), 100.0, 1.0);
        trade.close(t(2), 100.0);
        assert!(!trade.is_win());
    }
}
