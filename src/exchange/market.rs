//! Single-book exchange: book, engine, ledger and journal behind one API.

use rust_decimal::Decimal;
use tracing::{debug, error, info};

use crate::engine::{MatchResult, MatchingEngine};
use crate::error::BookError;
use crate::exchange::audit::{AuditLog, AuditRecord, Checkpoint};
use crate::ledger::{Position, PositionLedger};
use crate::orderbook::{BookSnapshot, OrderBook};
use crate::types::price::fixed_to_decimal;
use crate::types::{Order, OrderStatus, OrderType, Side, Trade};

/// What a participant asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderRequest {
    pub owner_id: u64,
    pub side: Side,
    pub kind: OrderType,
    /// Fixed-point limit price, required for limit orders
    pub price: Option<u64>,
    /// Fixed-point quantity
    pub quantity: u64,
}

impl OrderRequest {
    pub fn limit(owner_id: u64, side: Side, price: u64, quantity: u64) -> Self {
        Self {
            owner_id,
            side,
            kind: OrderType::Limit,
            price: Some(price),
            quantity,
        }
    }

    pub fn market(owner_id: u64, side: Side, quantity: u64) -> Self {
        Self {
            owner_id,
            side,
            kind: OrderType::Market,
            price: None,
            quantity,
        }
    }

    /// Build the order the engine will see; the engine assigns id and sequence
    pub fn into_order(self, timestamp: u64) -> Order {
        Order::new(
            0,
            self.owner_id,
            self.side,
            self.kind,
            self.price.unwrap_or(0),
            self.quantity,
            timestamp,
        )
    }
}

/// Result of a submit or amend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReport {
    /// Final state of the order
    pub order: Order,
    /// Trades it took part in as taker, in execution order
    pub trades: Vec<Trade>,
}

impl SubmitReport {
    pub fn status(&self) -> OrderStatus {
        self.order.status()
    }

    pub fn filled_quantity(&self) -> u64 {
        self.trades.iter().map(|t| t.quantity).sum()
    }

    /// Market quantity dropped because the book ran dry
    pub fn discarded_quantity(&self) -> u64 {
        match self.order.status() {
            OrderStatus::Discarded => self.order.remaining,
            _ => 0,
        }
    }

    /// Volume-weighted fill price, None without trades
    pub fn average_price(&self) -> Option<Decimal> {
        let filled = self.filled_quantity();
        if filled == 0 {
            return None;
        }
        let notional: Decimal = self.trades.iter().map(Trade::notional).sum();
        Some(notional / fixed_to_decimal(filled))
    }
}

impl From<MatchResult> for SubmitReport {
    fn from(result: MatchResult) -> Self {
        Self {
            order: result.order,
            trades: result.trades,
        }
    }
}

/// Driver-facing trading surface.
///
/// Implemented by [`Exchange`] and [`SharedExchange`](crate::exchange::SharedExchange);
/// a live broker adapter would implement it too.
pub trait Venue {
    fn submit_order(&mut self, request: OrderRequest) -> Result<SubmitReport, BookError>;

    fn cancel_order(&mut self, order_id: u64) -> Result<Order, BookError>;

    fn snapshot(&self, levels: usize) -> BookSnapshot;
}

/// Owns one order book and everything that reacts to it.
///
/// Every mutation takes `&mut self`: one submit runs matching, ledger
/// updates and journaling to completion before the next starts. Time is a
/// logical clock advanced once per accepted request, so identical request
/// streams give identical trades, timestamps and state roots.
#[derive(Debug)]
pub struct Exchange {
    book: OrderBook,
    engine: MatchingEngine,
    ledger: PositionLedger,
    trades: Vec<Trade>,
    audit: AuditLog,
    last_trade_price: Option<u64>,
    clock: u64,
    checkpoints: u64,
}

impl Default for Exchange {
    fn default() -> Self {
        Self::new(Decimal::ZERO)
    }
}

impl Exchange {
    /// New exchange where every participant starts with `starting_cash`
    pub fn new(starting_cash: Decimal) -> Self {
        Self::with_capacity(starting_cash, 1024)
    }

    /// Pre-allocate room for `order_capacity` resting orders
    pub fn with_capacity(starting_cash: Decimal, order_capacity: usize) -> Self {
        Self {
            book: OrderBook::with_capacity(order_capacity),
            engine: MatchingEngine::new(),
            ledger: PositionLedger::new(starting_cash),
            trades: Vec::new(),
            audit: AuditLog::new(),
            last_trade_price: None,
            clock: 0,
            checkpoints: 0,
        }
    }

    // ========================================================================
    // Order Entry
    // ========================================================================

    /// Validate, match and settle one request
    pub fn submit_order(&mut self, request: OrderRequest) -> Result<SubmitReport, BookError> {
        let timestamp = self.clock + 1;
        let result = self
            .engine
            .submit(&mut self.book, request.into_order(timestamp), timestamp)
            .map_err(|err| self.settle_stranded(err, timestamp))?;
        self.clock = timestamp;

        self.ledger.register(request.owner_id);
        self.settle(&result.trades);
        self.audit.append(AuditRecord::Accepted(result.order.clone()));
        Ok(result.into())
    }

    /// Cancel a resting order
    pub fn cancel_order(&mut self, order_id: u64) -> Result<Order, BookError> {
        let order = self.engine.cancel(&mut self.book, order_id)?;
        self.clock += 1;
        self.audit.append(AuditRecord::Cancelled(order.clone()));
        Ok(order)
    }

    /// Cancel every resting order of `owner_id`, returning them
    pub fn cancel_all(&mut self, owner_id: u64) -> Vec<Order> {
        let ids: Vec<u64> = [Side::Buy, Side::Sell]
            .into_iter()
            .flat_map(|side| self.book.orders_by_priority(side))
            .filter(|order| order.owner_id == owner_id)
            .map(|order| order.id)
            .collect();

        ids.into_iter()
            .filter_map(|id| self.cancel_order(id).ok())
            .collect()
    }

    /// Change price and/or total quantity of a resting order
    ///
    /// See [`MatchingEngine::amend`] for when priority is kept.
    pub fn amend_order(
        &mut self,
        order_id: u64,
        new_price: Option<u64>,
        new_quantity: Option<u64>,
    ) -> Result<SubmitReport, BookError> {
        let timestamp = self.clock + 1;
        let result = self
            .engine
            .amend(&mut self.book, order_id, new_price, new_quantity, timestamp)
            .map_err(|err| self.settle_stranded(err, timestamp))?;
        self.clock = timestamp;

        self.settle(&result.trades);
        self.audit.append(AuditRecord::Accepted(result.order.clone()));
        Ok(result.into())
    }

    /// Apply trades to the ledger and journal them
    fn settle(&mut self, trades: &[Trade]) {
        for trade in trades {
            if let Err(err) = self.ledger.apply(trade) {
                error!(%err, trade_seq = trade.sequence, "ledger rejected trade");
            }
            self.audit.append(AuditRecord::Trade(trade.clone()));
        }
        if let Some(last) = trades.last() {
            self.last_trade_price = Some(last.price);
            debug!(
                order_id = last.taker_order_id,
                trades = trades.len(),
                last_price = last.price,
                "trades settled"
            );
        }
        self.trades.extend(trades.iter().cloned());
    }

    /// Settle fills the engine made before failing, then hand the error back
    ///
    /// The book already reflects those fills, so the ledger and journal
    /// must too.
    fn settle_stranded(&mut self, err: BookError, timestamp: u64) -> BookError {
        let stranded = self.engine.take_stranded_trades();
        if !stranded.is_empty() {
            error!(%err, fills = stranded.len(), "settling fills from a failed match");
            self.clock = timestamp;
            self.settle(&stranded);
        }
        err
    }

    /// Record the current state root in the journal
    pub fn checkpoint(&mut self) -> Checkpoint {
        self.checkpoints += 1;
        let cp = Checkpoint {
            checkpoint_id: self.checkpoints,
            orders_processed: self.engine.orders_processed(),
            trades_executed: self.engine.trades_executed(),
            state_root: self.book.state_root(),
            timestamp: self.clock,
        };
        info!(
            checkpoint = cp.checkpoint_id,
            orders = cp.orders_processed,
            trades = cp.trades_executed,
            state_root = %cp.state_root_hex(),
            "checkpoint"
        );
        self.audit.append(AuditRecord::Checkpoint(cp.clone()));
        cp
    }

    // ========================================================================
    // Views
    // ========================================================================

    /// Top of book, `levels` of depth and the last trade price
    pub fn snapshot(&self, levels: usize) -> BookSnapshot {
        let mut snapshot = self.book.snapshot(levels);
        snapshot.last_trade_price = self.last_trade_price;
        snapshot
    }

    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    pub fn ledger(&self) -> &PositionLedger {
        &self.ledger
    }

    pub fn position(&self, owner_id: u64) -> Option<&Position> {
        self.ledger.position(owner_id)
    }

    /// Every trade so far, in sequence order
    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn audit_log(&self) -> &AuditLog {
        &self.audit
    }

    pub fn order(&self, order_id: u64) -> Option<&Order> {
        self.book.get(order_id)
    }

    pub fn last_trade_price(&self) -> Option<u64> {
        self.last_trade_price
    }

    pub fn state_root_hex(&self) -> String {
        self.book.state_root_hex()
    }

    pub fn clock(&self) -> u64 {
        self.clock
    }
}

impl Venue for Exchange {
    fn submit_order(&mut self, request: OrderRequest) -> Result<SubmitReport, BookError> {
        Exchange::submit_order(self, request)
    }

    fn cancel_order(&mut self, order_id: u64) -> Result<Order, BookError> {
        Exchange::cancel_order(self, order_id)
    }

    fn snapshot(&self, levels: usize) -> BookSnapshot {
        Exchange::snapshot(self, levels)
    }
}
