//! Search orchestrator — multi-strategy sweep with deterministic ranking.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::time::Instant;

use backlab_core::strategies::{self, StrategyError};
use backlab_core::{Candle, EngineError, Metrics, Simulator};
use log::{info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constraints::{self, OrderingConstraint, DEFAULT_CONSTRAINTS};
use crate::grid::{build_grid, GridError, RangeOverride};

/// Search failure taxonomy. `is_client_error` separates caller mistakes
/// (bad inputs, blown budget, everything filtered out) from upstream data
/// failures.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Strategy(#[from] StrategyError),
    #[error("{field} must be positive, got {value}")]
    NonPositiveField { field: &'static str, value: f64 },
    #[error("commission rate must be non-negative, got {rate}")]
    NegativeCommission { rate: f64 },
    #[error("strategy '{strategy_id}': {source}")]
    Grid {
        strategy_id: String,
        source: GridError,
    },
    #[error("no valid parameter combinations were executed")]
    NoValidRuns,
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl SearchError {
    pub fn is_client_error(&self) -> bool {
        !matches!(self, SearchError::Engine(_))
    }
}

/// Caller-facing sweep configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Strategies to sweep; empty means every registered strategy.
    pub strategy_ids: Vec<String>,
    pub initial_capital: f64,
    pub commission_rate: f64,
    /// Multiplier applied to every declared step before enumeration.
    pub step_scale: f64,
    pub auto_scale_steps: bool,
    /// Per-strategy combination budget.
    pub max_combinations: u64,
    /// Result cap; zero or negative history means return everything.
    pub top_n: usize,
    /// strategy id → parameter name → range override.
    pub overrides: BTreeMap<String, BTreeMap<String, RangeOverride>>,
    /// Run combinations on the rayon pool instead of sequentially.
    pub parallel: bool,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            strategy_ids: Vec::new(),
            initial_capital: 10_000.0,
            commission_rate: 0.001,
            step_scale: 1.0,
            auto_scale_steps: true,
            max_combinations: 1_000,
            top_n: 20,
            overrides: BTreeMap::new(),
            parallel: true,
        }
    }
}

/// One ranked run in the combined leaderboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub strategy_id: String,
    pub params: BTreeMap<String, f64>,
    pub metrics: Metrics,
    pub rank: usize,
}

/// Per-strategy sweep accounting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategySummary {
    pub strategy_id: String,
    pub estimated_combinations: u64,
    pub executed: usize,
    pub skipped_invalid: usize,
    pub step_multiplier: u32,
}

/// Combined outcome of one sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchReport {
    pub results: Vec<SearchResult>,
    pub summaries: Vec<StrategySummary>,
    pub total_executed: usize,
    pub total_skipped: usize,
    pub duration_ms: u64,
}

/// Sweep every requested strategy's parameter grid over `candles` and rank
/// all executed runs in one combined table.
///
/// Request fields are validated before any simulation runs. Combinations
/// violating a declared ordering constraint are skipped; everything else
/// runs through the engine in summary mode. Ranking is a stable descending
/// sort on `(total_return, final_capital, sharpe_ratio)` with ties kept in
/// enumeration order, truncated to `top_n`, then densely ranked from 1.
pub fn smart_search(
    request: &SearchRequest,
    candles: &[Candle],
) -> Result<SearchReport, SearchError> {
    smart_search_with_constraints(request, candles, DEFAULT_CONSTRAINTS)
}

/// `smart_search` with a caller-supplied constraint table.
pub fn smart_search_with_constraints(
    request: &SearchRequest,
    candles: &[Candle],
    constraints: &[OrderingConstraint],
) -> Result<SearchReport, SearchError> {
    let started = Instant::now();
    validate_request(request)?;

    let ids: Vec<String> = if request.strategy_ids.is_empty() {
        strategies::all_ids().iter().map(|s| s.to_string()).collect()
    } else {
        request.strategy_ids.clone()
    };
    // Resolve every id up front so an unknown strategy fails before any run.
    for id in &ids {
        strategies::declared_parameters(id)?;
    }

    let simulator = Simulator::new(request.initial_capital, request.commission_rate);
    let empty_overrides = BTreeMap::new();

    let mut runs: Vec<(String, BTreeMap<String, f64>, Metrics)> = Vec::new();
    let mut summaries = Vec::with_capacity(ids.len());
    let mut total_skipped = 0usize;

    for id in &ids {
        let specs = strategies::declared_parameters(id)?;
        let overrides = request.overrides.get(id).unwrap_or(&empty_overrides);
        let grid = build_grid(
            &specs,
            overrides,
            request.step_scale,
            request.max_combinations,
            request.auto_scale_steps,
        )
        .map_err(|source| SearchError::Grid {
            strategy_id: id.clone(),
            source,
        })?;

        if grid.step_multiplier > 1 {
            info!(
                "strategy {id}: step multiplier {} applied, {} combinations",
                grid.step_multiplier, grid.estimated_combinations
            );
        }

        let mut skipped = 0usize;
        let valid: Vec<BTreeMap<String, f64>> = grid
            .combinations()
            .filter(|combo| {
                let keep = constraints::is_valid(combo, constraints);
                if !keep {
                    skipped += 1;
                }
                keep
            })
            .collect();

        info!(
            "strategy {id}: {} valid combinations ({skipped} skipped)",
            valid.len()
        );

        // Ordered collect keeps enumeration order regardless of which
        // worker finishes first, so parallelism never leaks into ranking.
        let metrics: Vec<Metrics> = if request.parallel {
            valid
                .par_iter()
                .map(|combo| {
                    let strat = strategies::create(id, combo)?;
                    simulator
                        .run_summary(candles, strat.as_ref())
                        .map_err(SearchError::from)
                })
                .collect::<Result<_, _>>()?
        } else {
            valid
                .iter()
                .map(|combo| {
                    let strat = strategies::create(id, combo)?;
                    simulator
                        .run_summary(candles, strat.as_ref())
                        .map_err(SearchError::from)
                })
                .collect::<Result<_, _>>()?
        };

        summaries.push(StrategySummary {
            strategy_id: id.clone(),
            estimated_combinations: grid.estimated_combinations,
            executed: metrics.len(),
            skipped_invalid: skipped,
            step_multiplier: grid.step_multiplier,
        });
        total_skipped += skipped;

        for (combo, m) in valid.into_iter().zip(metrics) {
            // Grid values override the declared defaults they vary.
            let mut resolved = grid.default_params.clone();
            resolved.extend(combo);
            runs.push((id.clone(), resolved, m));
        }
    }

    let total_executed = runs.len();
    if total_executed == 0 {
        warn!("sweep executed zero valid runs across {} strategies", ids.len());
        return Err(SearchError::NoValidRuns);
    }

    let results = rank(runs, request.top_n);
    let duration_ms = started.elapsed().as_millis() as u64;
    info!(
        "sweep done: {total_executed} runs, {} returned, {duration_ms} ms",
        results.len()
    );

    Ok(SearchReport {
        results,
        summaries,
        total_executed,
        total_skipped,
        duration_ms,
    })
}

fn validate_request(request: &SearchRequest) -> Result<(), SearchError> {
    if request.initial_capital <= 0.0 {
        return Err(SearchError::NonPositiveField {
            field: "initial_capital",
            value: request.initial_capital,
        });
    }
    if request.commission_rate < 0.0 {
        return Err(SearchError::NegativeCommission {
            rate: request.commission_rate,
        });
    }
    if request.step_scale <= 0.0 {
        return Err(SearchError::NonPositiveField {
            field: "step_scale",
            value: request.step_scale,
        });
    }
    if request.max_combinations == 0 {
        return Err(SearchError::NonPositiveField {
            field: "max_combinations",
            value: 0.0,
        });
    }
    Ok(())
}

fn sort_key(m: &Metrics) -> (f64, f64, f64) {
    (m.total_return, m.final_capital, m.sharpe_ratio)
}

fn descending(a: &Metrics, b: &Metrics) -> Ordering {
    let (ar, ac, asr) = sort_key(a);
    let (br, bc, bsr) = sort_key(b);
    br.partial_cmp(&ar)
        .unwrap_or(Ordering::Equal)
        .then_with(|| bc.partial_cmp(&ac).unwrap_or(Ordering::Equal))
        .then_with(|| bsr.partial_cmp(&asr).unwrap_or(Ordering::Equal))
}

fn rank(
    runs: Vec<(String, BTreeMap<String, f64>, Metrics)>,
    top_n: usize,
) -> Vec<SearchResult> {
    let mut runs = runs;
    // Stable: equal keys keep enumeration order.
    runs.sort_by(|a, b| descending(&a.2, &b.2));
    if top_n > 0 {
        runs.truncate(top_n);
    }

    let mut results: Vec<SearchResult> = Vec::with_capacity(runs.len());
    let mut rank = 0usize;
    let mut prev_key: Option<(f64, f64, f64)> = None;
    for (strategy_id, params, metrics) in runs {
        let key = sort_key(&metrics);
        if prev_key != Some(key) {
            rank += 1;
            prev_key = Some(key);
        }
        results.push(SearchResult {
            strategy_id,
            params,
            metrics,
            rank,
        });
    }
    results
}
