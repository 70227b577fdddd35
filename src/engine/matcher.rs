//! Price-time priority matching.
//!
//! ## Algorithm
//!
//! For an incoming (taker) order:
//!
//! 1. Validate it. Nothing is mutated if validation fails.
//! 2. Stamp an id (when 0) and a fresh sequence number.
//! 3. While it has quantity left and the opposite best price crosses, fill
//!    against the head of that price level at the maker's price.
//! 4. Rest a limit remainder; discard a market remainder.
//! 5. Verify the book is not crossed.
//!
//! Makers are only ever filled in place or removed, never re-queued, so a
//! partially filled maker keeps its sequence and its place at the head.

use tracing::{debug, error, trace, warn};

use crate::error::BookError;
use crate::orderbook::OrderBook;
use crate::types::{Order, OrderStatus, OrderType, Trade};

/// Outcome of submitting (or amending) one order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    /// Final state of the incoming order
    pub order: Order,

    /// Trades in execution order
    pub trades: Vec<Trade>,

    /// Maker orders after each fill, parallel to `trades`
    pub makers: Vec<Order>,

    /// Market-order quantity dropped for lack of liquidity
    pub discarded: u64,
}

impl MatchResult {
    fn new(order: Order) -> Self {
        Self {
            order,
            trades: Vec::new(),
            makers: Vec::new(),
            discarded: 0,
        }
    }

    /// Final status of the incoming order
    pub fn status(&self) -> OrderStatus {
        self.order.status()
    }

    /// True if the incoming order has nothing left
    pub fn fully_filled(&self) -> bool {
        self.order.is_filled()
    }

    /// Quantity the incoming order traded in this call
    pub fn filled_quantity(&self) -> u64 {
        self.trades.iter().map(|t| t.quantity).sum()
    }

    /// True if a limit remainder was left resting in the book
    pub fn rested(&self) -> bool {
        self.order.kind() == OrderType::Limit && self.order.is_active()
    }
}

/// Deterministic matching engine.
///
/// Holds the id and sequence counters; the book it matches against is
/// passed in, so one engine drives exactly one book.
#[derive(Debug)]
pub struct MatchingEngine {
    next_order_id: u64,
    next_order_sequence: u64,
    next_trade_sequence: u64,
    orders_processed: u64,
    trades_executed: u64,
    /// Fills from a match that then failed, awaiting settlement
    stranded: Vec<Trade>,
}

impl Default for MatchingEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchingEngine {
    pub fn new() -> Self {
        Self {
            next_order_id: 1,
            next_order_sequence: 1,
            next_trade_sequence: 1,
            orders_processed: 0,
            trades_executed: 0,
            stranded: Vec::new(),
        }
    }

    /// Number of orders accepted so far
    pub fn orders_processed(&self) -> u64 {
        self.orders_processed
    }

    /// Number of trades produced so far
    pub fn trades_executed(&self) -> u64 {
        self.trades_executed
    }

    /// Id the next auto-assigned order will get
    pub fn peek_next_order_id(&self) -> u64 {
        self.next_order_id
    }

    /// Drain fills made by a match that returned an error
    ///
    /// Those fills already changed the book, so whoever settles trades must
    /// still apply them.
    pub fn take_stranded_trades(&mut self) -> Vec<Trade> {
        std::mem::take(&mut self.stranded)
    }

    fn take_order_sequence(&mut self) -> u64 {
        let seq = self.next_order_sequence;
        self.next_order_sequence += 1;
        seq
    }

    fn take_trade_sequence(&mut self) -> u64 {
        let seq = self.next_trade_sequence;
        self.next_trade_sequence += 1;
        seq
    }

    // ========================================================================
    // Submit
    // ========================================================================

    /// Submit a new order
    ///
    /// # Arguments
    ///
    /// * `book` - The book to match against
    /// * `order` - The incoming order; `id == 0` requests an engine-assigned id
    /// * `timestamp` - Execution time stamped on trades (ms)
    ///
    /// # Errors
    ///
    /// * [`BookError::InvalidOrder`] before any mutation
    /// * [`BookError::CrossedBook`] if matching left the book crossed; fills
    ///   made before the check are kept for [`Self::take_stranded_trades`]
    ///
    /// # Example
    ///
    /// ```
    /// use matchcore::engine::MatchingEngine;
    /// use matchcore::orderbook::OrderBook;
    /// use matchcore::types::{Order, OrderStatus, Side};
    ///
    /// let mut book = OrderBook::new();
    /// let mut engine = MatchingEngine::new();
    ///
    /// engine.submit(&mut book, Order::limit(1, Side::Buy, 100, 5), 0).unwrap();
    /// let result = engine.submit(&mut book, Order::limit(2, Side::Sell, 99, 3), 0).unwrap();
    ///
    /// assert_eq!(result.trades.len(), 1);
    /// assert_eq!(result.trades[0].price, 100);
    /// assert_eq!(result.status(), OrderStatus::Filled);
    /// ```
    pub fn submit(
        &mut self,
        book: &mut OrderBook,
        mut order: Order,
        timestamp: u64,
    ) -> Result<MatchResult, BookError> {
        order.validate()?;
        if order.id != 0 {
            if book.contains(order.id) {
                return Err(BookError::invalid("duplicate order id"));
            }
            // Ids only move forward, including those of terminal orders
            if order.id < self.next_order_id {
                return Err(BookError::invalid("order id already used"));
            }
        }

        if order.id == 0 {
            order.id = self.next_order_id;
        }
        self.next_order_id = self.next_order_id.max(order.id.saturating_add(1));
        if order.timestamp == 0 {
            order.timestamp = timestamp;
        }
        order.sequence = self.take_order_sequence();
        self.orders_processed += 1;

        debug!(
            order_id = order.id,
            owner = order.owner_id,
            side = ?order.side(),
            kind = ?order.kind(),
            price = order.price,
            quantity = order.quantity,
            sequence = order.sequence,
            "order accepted"
        );

        self.execute(book, order, timestamp)
    }

    /// Match an already-stamped order and settle its remainder
    fn execute(
        &mut self,
        book: &mut OrderBook,
        order: Order,
        timestamp: u64,
    ) -> Result<MatchResult, BookError> {
        let mut result = MatchResult::new(order);
        match self.match_and_settle(book, &mut result, timestamp) {
            Ok(()) => Ok(result),
            Err(err) => {
                if !result.trades.is_empty() {
                    error!(
                        %err,
                        order_id = result.order.id,
                        fills = result.trades.len(),
                        "match failed after fills"
                    );
                    self.stranded.append(&mut result.trades);
                }
                Err(err)
            }
        }
    }

    fn match_and_settle(
        &mut self,
        book: &mut OrderBook,
        result: &mut MatchResult,
        timestamp: u64,
    ) -> Result<(), BookError> {
        let contra = result.order.side().opposite();

        while result.order.remaining > 0 {
            let Some(best) = book.best_price(contra) else {
                break;
            };
            if !result.order.crosses(best) {
                break;
            }
            let Some(key) = book.front_key(contra, best) else {
                break;
            };
            let Some(maker_remaining) = book.order_at(key).map(|maker| maker.remaining) else {
                break;
            };

            let quantity = result.order.remaining.min(maker_remaining);
            let Some(maker) = book.fill_resting(key, quantity) else {
                break;
            };
            result.order.fill(quantity);

            let trade = Trade::new(
                self.take_trade_sequence(),
                maker.id,
                result.order.id,
                maker.owner_id,
                result.order.owner_id,
                result.order.side(),
                maker.price,
                quantity,
                timestamp,
            );
            self.trades_executed += 1;
            trace!(
                trade_seq = trade.sequence,
                maker = maker.id,
                taker = result.order.id,
                price = trade.price,
                quantity,
                "fill"
            );

            result.trades.push(trade);
            result.makers.push(maker);
        }

        if result.order.remaining > 0 {
            match result.order.kind() {
                OrderType::Market => {
                    result.discarded = result.order.discard();
                    warn!(
                        order_id = result.order.id,
                        filled = result.order.filled_quantity(),
                        discarded = result.discarded,
                        "market order ran out of liquidity"
                    );
                }
                OrderType::Limit => {
                    book.insert_resting(result.order.clone())?;
                    debug!(
                        order_id = result.order.id,
                        price = result.order.price,
                        remaining = result.order.remaining,
                        "order resting"
                    );
                }
            }
        }

        if let Err(err) = book.check_uncrossed() {
            error!(%err, order_id = result.order.id, "matching left the book crossed");
            return Err(err);
        }

        Ok(())
    }

    // ========================================================================
    // Cancel / Amend
    // ========================================================================

    /// Cancel a resting order
    ///
    /// Filled, cancelled and unknown orders are not in the book, so all of
    /// them fail with [`BookError::OrderNotFound`]; a second cancel of the
    /// same order is an error, not a no-op.
    pub fn cancel(&mut self, book: &mut OrderBook, order_id: u64) -> Result<Order, BookError> {
        let mut order = book.remove(order_id)?;
        order.cancel();
        debug!(order_id, remaining = order.remaining, "order cancelled");
        Ok(order)
    }

    /// Change the price and/or total quantity of a resting order
    ///
    /// A quantity reduction at an unchanged price keeps time priority. Any
    /// other change re-queues the order under the same id with a new
    /// sequence, and it may trade immediately.
    ///
    /// `new_quantity` is the new original quantity and must exceed what has
    /// already been filled.
    pub fn amend(
        &mut self,
        book: &mut OrderBook,
        order_id: u64,
        new_price: Option<u64>,
        new_quantity: Option<u64>,
        timestamp: u64,
    ) -> Result<MatchResult, BookError> {
        let current = book
            .get(order_id)
            .cloned()
            .ok_or(BookError::OrderNotFound { order_id })?;

        let price = new_price.unwrap_or(current.price);
        let quantity = new_quantity.unwrap_or(current.quantity);
        let filled = current.filled_quantity();
        if price == 0 {
            return Err(BookError::invalid("limit order requires a price"));
        }
        if quantity <= filled {
            return Err(BookError::invalid("amended quantity must exceed the filled amount"));
        }

        if price == current.price && quantity <= current.quantity {
            if quantity == current.quantity {
                return Ok(MatchResult::new(current));
            }
            let order = book.reduce_resting(order_id, quantity - filled)?;
            debug!(order_id, quantity, "order reduced in place");
            return Ok(MatchResult::new(order));
        }

        let mut replacement = book.remove(order_id)?;
        replacement.price = price;
        replacement.quantity = quantity;
        replacement.remaining = quantity - filled;
        replacement.sequence = self.take_order_sequence();
        debug!(
            order_id,
            price,
            quantity,
            sequence = replacement.sequence,
            "order re-queued by amend"
        );

        self.execute(book, replacement, timestamp)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
