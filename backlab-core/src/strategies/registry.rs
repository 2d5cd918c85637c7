//! Strategy registry — id-keyed construction and parameter introspection.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::strategy::{ParamSpec, Strategy};

use super::{
    BollingerBands, CombinedRsiMacd, DonchianBreakout, EmaCrossover, Macd,
    MeanReversion, RsiStrategy, SmaCrossover, Supertrend,
};

/// Registry lookup failure.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StrategyError {
    #[error("unknown strategy '{id}' (known: {known})")]
    Unknown { id: String, known: String },
}

/// Every registered strategy id, in listing order.
pub fn all_ids() -> &'static [&'static str] {
    &[
        SmaCrossover::ID,
        EmaCrossover::ID,
        RsiStrategy::ID,
        Macd::ID,
        BollingerBands::ID,
        Supertrend::ID,
        CombinedRsiMacd::ID,
        MeanReversion::ID,
        DonchianBreakout::ID,
    ]
}

/// Build a strategy instance with `params` merged over its declared
/// defaults. Unrecognized parameter names are ignored, matching the
/// merge-over-defaults contract.
pub fn create(
    id: &str,
    params: &BTreeMap<String, f64>,
) -> Result<Box<dyn Strategy>, StrategyError> {
    match id {
        SmaCrossover::ID => Ok(Box::new(SmaCrossover::new(params))),
        EmaCrossover::ID => Ok(Box::new(EmaCrossover::new(params))),
        RsiStrategy::ID => Ok(Box::new(RsiStrategy::new(params))),
        Macd::ID => Ok(Box::new(Macd::new(params))),
        BollingerBands::ID => Ok(Box::new(BollingerBands::new(params))),
        Supertrend::ID => Ok(Box::new(Supertrend::new(params))),
        CombinedRsiMacd::ID => Ok(Box::new(CombinedRsiMacd::new(params))),
        MeanReversion::ID => Ok(Box::new(MeanReversion::new(params))),
        DonchianBreakout::ID => Ok(Box::new(DonchianBreakout::new(params))),
        _ => Err(StrategyError::Unknown {
            id: id.to_string(),
            known: all_ids().join(", "),
        }),
    }
}

/// Declared parameter ranges for `id`.
pub fn declared_parameters(
    id: &str,
) -> Result<BTreeMap<String, ParamSpec>, StrategyError> {
    create(id, &BTreeMap::new()).map(|s| s.param_specs())
}

/// Default parameter values for `id`.
pub fn default_parameters(
    id: &str,
) -> Result<BTreeMap<String, f64>, StrategyError> {
    create(id, &BTreeMap::new()).map(|s| s.params())
}
