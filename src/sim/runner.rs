//! Market maker versus random flow, round by round.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{ConfigError, SimConfig};
use crate::exchange::Exchange;
use crate::ledger::Position;
use crate::sim::{EquityPoint, PerformanceMetrics, RandomFlow};
use crate::strategy::{MarketMaker, Strategy};
use crate::types::price::fixed_to_decimal;

/// Owner id of the market maker
pub const MAKER_OWNER: u64 = 1;

/// Owner id of the random flow
pub const FLOW_OWNER: u64 = 2;

/// What happened in one round
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundSummary {
    pub round: u64,
    pub trades: usize,
    pub best_bid: Option<u64>,
    pub best_ask: Option<u64>,
    pub maker_inventory: Decimal,
    /// Fees paid by the maker so far
    pub maker_fees: Decimal,
    /// Maker P&L net of fees
    pub maker_pnl: Decimal,
}

/// End-of-run totals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimSummary {
    pub rounds: u64,
    pub trades: usize,
    pub mark_price: Decimal,
    pub maker: Position,
    pub flow: Position,
    pub maker_fees: Decimal,
    /// Maker P&L net of fees
    pub maker_pnl: Decimal,
    pub metrics: PerformanceMetrics,
    pub state_root: String,
}

/// Drives one [`Exchange`] with a [`MarketMaker`] and a [`RandomFlow`].
///
/// Each round the maker pulls its old quotes and re-quotes from a fresh
/// snapshot, then the flow sends its orders. Flow limit orders that did not
/// trade are cancelled at the end of the round. The maker's marked equity,
/// net of `transaction_cost` per unit traded, is recorded after every round.
pub struct Simulation {
    config: SimConfig,
    exchange: Exchange,
    maker: MarketMaker,
    flow: RandomFlow,
    rounds_run: u64,
    curve: Vec<EquityPoint>,
}

impl Simulation {
    /// Validates `config` before building anything
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let exchange = Exchange::new(config.starting_cash);
        let maker = MarketMaker::new(config.market_maker.clone(), config.reference_price);
        let flow = RandomFlow::new(config.flow.clone(), config.seed)?;
        Ok(Self {
            config,
            exchange,
            maker,
            flow,
            rounds_run: 0,
            curve: Vec::new(),
        })
    }

    pub fn exchange(&self) -> &Exchange {
        &self.exchange
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Last trade price, else the configured reference
    pub fn mark_price(&self) -> Decimal {
        self.exchange
            .last_trade_price()
            .map(fixed_to_decimal)
            .unwrap_or(self.config.reference_price)
    }

    /// Maker equity after each round so far
    pub fn equity_curve(&self) -> &[EquityPoint] {
        &self.curve
    }

    /// Fees owed on everything `position` has traded
    fn fees(&self, position: &Position) -> Decimal {
        position.volume * self.config.transaction_cost
    }

    fn position_or_new(&self, owner_id: u64) -> Position {
        self.exchange
            .position(owner_id)
            .cloned()
            .unwrap_or_else(|| Position::new(owner_id, self.config.starting_cash))
    }

    /// Run one round
    pub fn run_round(&mut self) -> RoundSummary {
        self.rounds_run += 1;
        let round = self.rounds_run;
        let trades_before = self.exchange.trades().len();

        self.exchange.cancel_all(MAKER_OWNER);
        let snapshot = self.exchange.snapshot(self.config.depth_levels);
        let position = self.position_or_new(MAKER_OWNER);
        for intent in self.maker.decide(&snapshot, &position) {
            if let Err(err) = self.exchange.submit_order(intent.into_request(MAKER_OWNER)) {
                warn!(%err, round, "maker quote rejected");
            }
        }

        for _ in 0..self.config.flow.orders_per_round {
            let reference = self
                .exchange
                .snapshot(1)
                .reference_price()
                .map(fixed_to_decimal)
                .unwrap_or(self.config.reference_price);
            let Some(intent) = self.flow.next_intent(reference) else {
                continue;
            };
            if let Err(err) = self.exchange.submit_order(intent.into_request(FLOW_OWNER)) {
                warn!(%err, round, "flow order rejected");
            }
        }
        self.exchange.cancel_all(FLOW_OWNER);

        let mark = self.mark_price();
        let maker = self.position_or_new(MAKER_OWNER);
        let fees = self.fees(&maker);
        let pnl = maker.total_pnl(mark) - fees;
        self.curve.push(EquityPoint {
            round,
            mark_price: mark,
            cash: maker.cash,
            inventory: maker.inventory,
            fees,
            pnl,
            equity: self.config.starting_cash + pnl,
        });

        let summary = RoundSummary {
            round,
            trades: self.exchange.trades().len() - trades_before,
            best_bid: self.exchange.book().best_bid(),
            best_ask: self.exchange.book().best_ask(),
            maker_inventory: maker.inventory,
            maker_fees: fees,
            maker_pnl: pnl,
        };
        debug!(
            round,
            trades = summary.trades,
            inventory = %summary.maker_inventory,
            pnl = %summary.maker_pnl,
            "round complete"
        );
        summary
    }

    /// Run every configured round that has not run yet
    pub fn run(&mut self) -> SimSummary {
        while self.rounds_run < self.config.rounds {
            self.run_round();
        }
        self.finish()
    }

    /// Totals so far
    pub fn summary(&self) -> SimSummary {
        let mark = self.mark_price();
        let maker = self.position_or_new(MAKER_OWNER);
        let flow = self.position_or_new(FLOW_OWNER);
        let maker_fees = self.fees(&maker);
        SimSummary {
            rounds: self.rounds_run,
            trades: self.exchange.trades().len(),
            mark_price: mark,
            maker_pnl: maker.total_pnl(mark) - maker_fees,
            maker_fees,
            maker,
            flow,
            metrics: PerformanceMetrics::from_curve(self.config.starting_cash, &self.curve),
            state_root: self.exchange.state_root_hex(),
        }
    }

    /// Write a checkpoint to the journal and return the totals
    pub fn finish(&mut self) -> SimSummary {
        self.exchange.checkpoint();
        self.summary()
    }
}
