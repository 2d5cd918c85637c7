//! BackLab CLI — strategy listing, single backtests, smart search.
//!
//! Commands:
//! - `strategies` — list registered strategies and their parameters
//! - `run` — one backtest over a CSV price file, metrics and trades printed
//! - `search` — sweep parameter grids across strategies and rank the runs

mod data;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use backlab_core::{strategies, Simulator};
use backlab_search::{smart_search, RangeOverride, SearchError, SearchRequest};
use clap::{Parser, Subcommand};
use log::error;
use serde::Deserialize;

#[derive(Parser)]
#[command(name = "backlab", about = "BackLab — strategy backtesting lab")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered strategies and their declared parameters.
    Strategies,
    /// Run a single backtest over a CSV price file.
    Run {
        /// CSV price file (time,open,high,low,close,volume).
        #[arg(long)]
        data: PathBuf,

        /// Strategy id (see `backlab strategies`).
        #[arg(long)]
        strategy: String,

        /// Parameter override, repeatable (e.g. --set fast_period=10).
        #[arg(long = "set", value_name = "NAME=VALUE")]
        sets: Vec<String>,

        /// Starting cash.
        #[arg(long, default_value_t = 10_000.0)]
        capital: f64,

        /// Commission as a fraction of notional per side.
        #[arg(long, default_value_t = 0.001)]
        commission: f64,

        /// Write the full run report as JSON to this path.
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Sweep parameter grids across strategies and rank all runs.
    Search {
        /// CSV price file (time,open,high,low,close,volume).
        #[arg(long)]
        data: PathBuf,

        /// Comma-separated strategy ids. Defaults to all.
        #[arg(long, value_delimiter = ',')]
        strategies: Vec<String>,

        /// Starting cash.
        #[arg(long, default_value_t = 10_000.0)]
        capital: f64,

        /// Commission as a fraction of notional per side.
        #[arg(long, default_value_t = 0.001)]
        commission: f64,

        /// Keep only the best N runs (0 = all).
        #[arg(long, default_value_t = 20)]
        top: usize,

        /// Per-strategy combination budget.
        #[arg(long, default_value_t = 1_000)]
        max_combinations: u64,

        /// Multiplier applied to every declared step.
        #[arg(long, default_value_t = 1.0)]
        step_scale: f64,

        /// Fail instead of coarsening steps when a grid is over budget.
        #[arg(long, default_value_t = false)]
        no_auto_scale: bool,

        /// Run combinations sequentially instead of on the rayon pool.
        #[arg(long, default_value_t = false)]
        sequential: bool,

        /// TOML file with per-strategy parameter range overrides.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

/// Search config file: `[overrides.<strategy>.<param>]` tables with
/// optional `min`/`max`/`step` keys.
#[derive(Debug, Default, Deserialize)]
struct SearchConfigFile {
    #[serde(default)]
    overrides: BTreeMap<String, BTreeMap<String, RangeOverride>>,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Strategies => run_strategies(),
        Commands::Run {
            data,
            strategy,
            sets,
            capital,
            commission,
            json,
        } => run_single(data, strategy, sets, capital, commission, json),
        Commands::Search {
            data,
            strategies,
            capital,
            commission,
            top,
            max_combinations,
            step_scale,
            no_auto_scale,
            sequential,
            config,
        } => run_search(
            data,
            strategies,
            capital,
            commission,
            top,
            max_combinations,
            step_scale,
            no_auto_scale,
            sequential,
            config,
        ),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            eprintln!("error: {err:#}");
            // Caller mistakes exit distinctly from internal failures.
            let client = err
                .downcast_ref::<SearchError>()
                .map(SearchError::is_client_error)
                .unwrap_or_else(|| {
                    err.downcast_ref::<strategies::StrategyError>().is_some()
                });
            if client {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn run_strategies() -> Result<()> {
    for id in strategies::all_ids() {
        let strat = strategies::create(id, &BTreeMap::new())?;
        println!("{id} — {}", strat.name());
        for (name, spec) in strat.param_specs() {
            println!(
                "    {name}: default {}, range {}..={} step {}",
                spec.default, spec.min, spec.max, spec.step
            );
        }
    }
    Ok(())
}

fn run_single(
    data: PathBuf,
    strategy: String,
    sets: Vec<String>,
    capital: f64,
    commission: f64,
    json: Option<PathBuf>,
) -> Result<()> {
    let candles = data::load_candles(&data)?;
    let params = parse_sets(&sets)?;
    let strat = strategies::create(&strategy, &params)?;
    let simulator = Simulator::new(capital, commission);
    let report = simulator.run(&candles, strat.as_ref())?;

    let m = &report.metrics;
    println!("{} on {} bars", strat.name(), candles.len());
    println!("  total return:    {:>10.2}%", m.total_return);
    println!("  buy & hold:      {:>10.2}%", m.buy_hold_return);
    println!("  final capital:   {:>10.2}", m.final_capital);
    println!("  trades:          {:>10}", m.num_trades);
    println!("  win rate:        {:>10.2}%", m.win_rate);
    println!("  avg win / loss:  {:>6.2}% / {:.2}%", m.avg_win_pct, m.avg_loss_pct);
    println!("  max drawdown:    {:>10.2}%", m.max_drawdown);
    println!("  sharpe ratio:    {:>10.2}", m.sharpe_ratio);
    println!("  profit factor:   {:>10.2}", m.profit_factor);

    if !report.trades.is_empty() {
        println!("trades:");
        for trade in &report.trades {
            println!(
                "  {}  {:>10.4} @ {:<10.2} -> {:<10.2} pnl {:>10.2} ({:>6.2}%)",
                trade.entry_time.format("%Y-%m-%d %H:%M"),
                trade.size,
                trade.entry_price,
                trade.exit_price.unwrap_or(f64::NAN),
                trade.pnl.unwrap_or(0.0),
                trade.pnl_pct.unwrap_or(0.0) * 100.0,
            );
        }
    }

    if let Some(path) = json {
        let file = std::fs::File::create(&path)
            .with_context(|| format!("cannot create {}", path.display()))?;
        serde_json::to_writer_pretty(file, &report)?;
        println!("report written to {}", path.display());
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_search(
    data: PathBuf,
    strategy_ids: Vec<String>,
    capital: f64,
    commission: f64,
    top: usize,
    max_combinations: u64,
    step_scale: f64,
    no_auto_scale: bool,
    sequential: bool,
    config: Option<PathBuf>,
) -> Result<()> {
    let candles = data::load_candles(&data)?;

    let overrides = match config {
        Some(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("cannot read {}", path.display()))?;
            let parsed: SearchConfigFile = toml::from_str(&raw)
                .with_context(|| format!("invalid config {}", path.display()))?;
            parsed.overrides
        }
        None => BTreeMap::new(),
    };

    let request = SearchRequest {
        strategy_ids,
        initial_capital: capital,
        commission_rate: commission,
        step_scale,
        auto_scale_steps: !no_auto_scale,
        max_combinations,
        top_n: top,
        overrides,
        parallel: !sequential,
    };

    let report = smart_search(&request, &candles)?;

    println!(
        "{} runs executed, {} skipped, {} ms",
        report.total_executed, report.total_skipped, report.duration_ms
    );
    for summary in &report.summaries {
        println!(
            "  {}: {} combinations ({} run, {} skipped, step x{})",
            summary.strategy_id,
            summary.estimated_combinations,
            summary.executed,
            summary.skipped_invalid,
            summary.step_multiplier,
        );
    }

    println!(
        "{:>4}  {:<18} {:>9} {:>12} {:>7}  params",
        "rank", "strategy", "return%", "capital", "sharpe"
    );
    for result in &report.results {
        let params: Vec<String> = result
            .params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        println!(
            "{:>4}  {:<18} {:>9.2} {:>12.2} {:>7.2}  {}",
            result.rank,
            result.strategy_id,
            result.metrics.total_return,
            result.metrics.final_capital,
            result.metrics.sharpe_ratio,
            params.join(", "),
        );
    }
    Ok(())
}

fn parse_sets(sets: &[String]) -> Result<BTreeMap<String, f64>> {
    let mut params = BTreeMap::new();
    for set in sets {
        let Some((name, value)) = set.split_once('=') else {
            bail!("--set expects NAME=VALUE, got '{set}'");
        };
        let value: f64 = value
            .trim()
            .parse()
            .with_context(|| format!("--set {name}: '{value}' is not a number"))?;
        params.insert(name.trim().to_string(), value);
    }
    Ok(params)
}
