//! Built-in strategy library.
//!
//! Each strategy implements the `Strategy` trait over close (or high/low)
//! series and declares its tunable parameter ranges. The registry maps
//! stable string ids to constructors for the search layer and the CLI.

pub mod bollinger_bands;
pub mod combined_rsi_macd;
pub mod donchian_breakout;
pub mod ema_crossover;
pub mod macd;
pub mod mean_reversion;
pub mod registry;
pub mod rsi;
pub mod sma_crossover;
pub mod supertrend;

pub use bollinger_bands::BollingerBands;
pub use combined_rsi_macd::CombinedRsiMacd;
pub use donchian_breakout::DonchianBreakout;
pub use ema_crossover::EmaCrossover;
pub use macd::Macd;
pub use mean_reversion::MeanReversion;
pub use registry::{all_ids, create, declared_parameters, default_parameters, StrategyError};
pub use rsi::RsiStrategy;
pub use sma_crossover::SmaCrossover;
pub use supertrend::Supertrend;
