//! matchcore - Binary Entry Point
//!
//! Runs the reference market maker against seeded random order flow and
//! reports its P&L.
//!
//! ```text
//! matchcore --config sim.toml --rounds 5000 --seed 7
//! RUST_LOG=matchcore=debug matchcore
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use matchcore::config::SimConfig;
use matchcore::sim::Simulation;
use matchcore::types::price::fixed_to_decimal;

#[derive(Debug, Parser)]
#[command(name = "matchcore", version, about = "Order book market-making simulation")]
struct Args {
    /// TOML config file; defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the number of rounds
    #[arg(short, long)]
    rounds: Option<u64>,

    /// Override the flow seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Log a round summary every N rounds
    #[arg(long, default_value_t = 100)]
    report_every: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SimConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => SimConfig::default(),
    };
    if let Some(rounds) = args.rounds {
        config.rounds = rounds;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let mut sim = Simulation::new(config.clone()).context("invalid configuration")?;

    info!(
        rounds = config.rounds,
        seed = config.seed,
        spread = %config.market_maker.spread,
        max_inventory = %config.market_maker.max_inventory,
        "starting simulation"
    );

    let report_every = args.report_every.max(1);
    for _ in 0..config.rounds {
        let round = sim.run_round();
        if round.round % report_every == 0 {
            info!(
                round = round.round,
                trades = round.trades,
                bid = %round.best_bid.map(fixed_to_decimal).unwrap_or_default(),
                ask = %round.best_ask.map(fixed_to_decimal).unwrap_or_default(),
                inventory = %round.maker_inventory,
                pnl = %round.maker_pnl,
                "round"
            );
        }
    }

    let summary = sim.finish();
    info!(
        rounds = summary.rounds,
        trades = summary.trades,
        mark = %summary.mark_price,
        cash = %summary.maker.cash,
        inventory = %summary.maker.inventory,
        realized = %summary.maker.realized_pnl,
        fees = %summary.maker_fees,
        pnl = %summary.maker_pnl,
        state_root = %summary.state_root,
        "simulation complete"
    );
    let metrics = &summary.metrics;
    info!(
        max_drawdown = %metrics.max_drawdown,
        max_drawdown_rate = %metrics.max_drawdown_rate,
        max_drawdown_rounds = metrics.max_drawdown_rounds,
        win_rate = ?metrics.win_rate,
        profit_factor = ?metrics.profit_factor,
        sharpe = ?metrics.sharpe_ratio,
        "performance"
    );
    info!(
        entries = sim.exchange().audit_log().len(),
        "audit journal"
    );

    Ok(())
}
