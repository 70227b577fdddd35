//! Equity curve of the market maker and the performance figures derived
//! from it.
//!
//! Every figure is computed from the per-round curve alone, so two runs
//! with the same curve report the same metrics.

use rust_decimal::{Decimal, MathematicalOps};
use serde::Serialize;

/// Market maker state at the end of one round
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquityPoint {
    pub round: u64,
    pub mark_price: Decimal,
    pub cash: Decimal,
    pub inventory: Decimal,
    /// Fees paid up to and including this round
    pub fees: Decimal,
    /// Realized plus unrealized P&L, net of fees
    pub pnl: Decimal,
    /// Starting cash plus `pnl`
    pub equity: Decimal,
}

/// Drawdown, win rate and risk-adjusted return of one run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PerformanceMetrics {
    pub start_equity: Decimal,
    pub end_equity: Decimal,
    pub total_pnl: Decimal,
    /// Largest fall from a running peak, in cash
    pub max_drawdown: Decimal,
    /// Largest fall from a running peak, as a fraction of that peak
    pub max_drawdown_rate: Decimal,
    /// Longest run of rounds spent below a previous peak
    pub max_drawdown_rounds: u64,
    pub winning_rounds: u64,
    pub losing_rounds: u64,
    /// Winning rounds over rounds where equity moved; None if it never did
    pub win_rate: Option<Decimal>,
    /// Gross gains over gross losses; None without a losing round
    pub profit_factor: Option<Decimal>,
    /// `mean / stddev × √n` of per-round returns; None below two returns
    /// or with zero spread
    pub sharpe_ratio: Option<Decimal>,
}

impl PerformanceMetrics {
    /// Compute from an equity curve that started at `start_equity`
    pub fn from_curve(start_equity: Decimal, curve: &[EquityPoint]) -> Self {
        let mut metrics = Self {
            start_equity,
            end_equity: start_equity,
            ..Self::default()
        };

        let mut peak = start_equity;
        let mut prev = start_equity;
        let mut below_peak = 0u64;
        let mut gross_gain = Decimal::ZERO;
        let mut gross_loss = Decimal::ZERO;
        let mut returns = Vec::with_capacity(curve.len());

        for point in curve {
            let equity = point.equity;
            let change = equity - prev;
            if change > Decimal::ZERO {
                metrics.winning_rounds += 1;
                gross_gain += change;
            } else if change < Decimal::ZERO {
                metrics.losing_rounds += 1;
                gross_loss -= change;
            }
            if let Some(ret) = change.checked_div(prev) {
                returns.push(ret);
            }

            if equity >= peak {
                peak = equity;
                below_peak = 0;
            } else {
                below_peak += 1;
                let drawdown = peak - equity;
                metrics.max_drawdown = metrics.max_drawdown.max(drawdown);
                if peak > Decimal::ZERO {
                    metrics.max_drawdown_rate =
                        metrics.max_drawdown_rate.max((drawdown / peak).round_dp(6));
                }
                metrics.max_drawdown_rounds = metrics.max_drawdown_rounds.max(below_peak);
            }
            prev = equity;
        }

        metrics.end_equity = prev;
        metrics.total_pnl = prev - start_equity;

        let moved = metrics.winning_rounds + metrics.losing_rounds;
        if moved > 0 {
            metrics.win_rate =
                Some((Decimal::from(metrics.winning_rounds) / Decimal::from(moved)).round_dp(6));
        }
        if gross_loss > Decimal::ZERO {
            metrics.profit_factor = Some((gross_gain / gross_loss).round_dp(6));
        }
        metrics.sharpe_ratio = sharpe(&returns);
        metrics
    }
}

fn sharpe(returns: &[Decimal]) -> Option<Decimal> {
    if returns.len() < 2 {
        return None;
    }
    let n = Decimal::from(returns.len() as u64);
    let mean = returns.iter().sum::<Decimal>() / n;
    let variance = returns
        .iter()
        .map(|r| (*r - mean) * (*r - mean))
        .sum::<Decimal>()
        / n;
    let std_dev = variance.sqrt()?;
    if std_dev.is_zero() {
        return None;
    }
    let ratio = mean.checked_div(std_dev)?.checked_mul(n.sqrt()?)?;
    Some(ratio.round_dp(6))
}
