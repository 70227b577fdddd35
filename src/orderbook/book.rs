//! Limit order book: resting liquidity on both sides.
//!
//! ## Architecture
//!
//! - **Slab**: pre-allocated storage for resting orders
//! - **BTreeMap**: sorted price levels for O(log n) best bid/ask
//! - **HashMap**: order ID to slab key mapping for O(1) cancel
//!
//! ## Price Ordering
//!
//! - **Bids**: keyed by `Reverse(price)`, so the first key is the highest bid
//! - **Asks**: keyed by `price`, so the first key is the lowest ask
//!
//! A level is dropped from its map as soon as its last order leaves, so the
//! first key of each map is always a real, non-empty best price.
//!
//! ## Example
//!
//! ```
//! use matchcore::orderbook::OrderBook;
//! use matchcore::types::{Order, Side};
//!
//! let mut book = OrderBook::with_capacity(1_000);
//!
//! let mut bid = Order::limit(1, Side::Buy, 9_900, 10);
//! bid.id = 1;
//! bid.sequence = 1;
//! let mut ask = Order::limit(2, Side::Sell, 10_100, 10);
//! ask.id = 2;
//! ask.sequence = 2;
//!
//! book.insert_resting(bid).unwrap();
//! book.insert_resting(ask).unwrap();
//!
//! assert_eq!(book.best_bid(), Some(9_900));
//! assert_eq!(book.best_ask(), Some(10_100));
//! assert!(!book.is_crossed());
//! ```

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

use sha2::{Digest, Sha256};
use slab::Slab;

use crate::error::BookError;
use crate::orderbook::{BookSnapshot, LevelDepth, OrderNode, PriceLevel};
use crate::types::{Order, OrderType, Side};

/// Price-time priority order book
#[derive(Debug, Default)]
pub struct OrderBook {
    /// Resting order storage, keyed by slab index
    orders: Slab<OrderNode>,

    /// Bid price levels (sorted high to low)
    bids: BTreeMap<Reverse<u64>, PriceLevel>,

    /// Ask price levels (sorted low to high)
    asks: BTreeMap<u64, PriceLevel>,

    /// Order ID to slab key mapping
    order_index: HashMap<u64, usize>,

    bid_count: usize,
    ask_count: usize,
}

impl OrderBook {
    /// Create a new empty book
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a book with room for `order_capacity` resting orders
    pub fn with_capacity(order_capacity: usize) -> Self {
        Self {
            orders: Slab::with_capacity(order_capacity),
            order_index: HashMap::with_capacity(order_capacity),
            ..Self::default()
        }
    }

    // ========================================================================
    // Capacity and Size
    // ========================================================================

    #[inline]
    pub fn capacity(&self) -> usize {
        self.orders.capacity()
    }

    /// Total number of resting orders
    #[inline]
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    #[inline]
    pub fn bid_count(&self) -> usize {
        self.bid_count
    }

    #[inline]
    pub fn ask_count(&self) -> usize {
        self.ask_count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Number of distinct bid prices
    #[inline]
    pub fn bid_levels(&self) -> usize {
        self.bids.len()
    }

    /// Number of distinct ask prices
    #[inline]
    pub fn ask_levels(&self) -> usize {
        self.asks.len()
    }

    // ========================================================================
    // Order Management
    // ========================================================================

    /// Add a resting order behind every order already at its price
    ///
    /// The order must be an active limit order with a price, a positive
    /// remaining quantity and an id that is not already resting.
    ///
    /// # Returns
    ///
    /// The slab key for the added order
    pub fn insert_resting(&mut self, order: Order) -> Result<usize, BookError> {
        if order.kind() != OrderType::Limit {
            return Err(BookError::invalid("market orders never rest"));
        }
        let price = order
            .limit_price()
            .ok_or(BookError::invalid("limit order requires a price"))?;
        if order.remaining == 0 {
            return Err(BookError::invalid("quantity must be positive"));
        }
        if !order.is_active() {
            return Err(BookError::invalid("order is already terminal"));
        }
        if self.order_index.contains_key(&order.id) {
            return Err(BookError::invalid("duplicate order id"));
        }

        let order_id = order.id;
        let side = order.side();
        let key = self.orders.insert(OrderNode::new(order));
        self.order_index.insert(order_id, key);

        match side {
            Side::Buy => {
                let level = self
                    .bids
                    .entry(Reverse(price))
                    .or_insert_with(|| PriceLevel::new(price));
                level.push_back(key, &mut self.orders);
                self.bid_count += 1;
            }
            Side::Sell => {
                let level = self
                    .asks
                    .entry(price)
                    .or_insert_with(|| PriceLevel::new(price));
                level.push_back(key, &mut self.orders);
                self.ask_count += 1;
            }
        }

        Ok(key)
    }

    /// Remove a resting order by ID
    ///
    /// The returned order keeps its current status; callers decide whether
    /// the removal is a cancel or an amend.
    pub fn remove(&mut self, order_id: u64) -> Result<Order, BookError> {
        let key = self
            .order_index
            .get(&order_id)
            .copied()
            .ok_or(BookError::OrderNotFound { order_id })?;
        self.remove_key(key)
            .ok_or(BookError::OrderNotFound { order_id })
    }

    /// Unlink and free the order at `key`, pruning its level if it empties
    fn remove_key(&mut self, key: usize) -> Option<Order> {
        let node = self.orders.get(key)?;
        let order_id = node.order_id();
        let price = node.price();
        let side = node.order.side();

        match side {
            Side::Buy => {
                if let Some(level) = self.bids.get_mut(&Reverse(price)) {
                    level.remove(key, &mut self.orders);
                    self.bid_count = self.bid_count.saturating_sub(1);
                    if level.is_empty() {
                        self.bids.remove(&Reverse(price));
                    }
                }
            }
            Side::Sell => {
                if let Some(level) = self.asks.get_mut(&price) {
                    level.remove(key, &mut self.orders);
                    self.ask_count = self.ask_count.saturating_sub(1);
                    if level.is_empty() {
                        self.asks.remove(&price);
                    }
                }
            }
        }

        self.order_index.remove(&order_id);
        Some(self.orders.remove(key).order)
    }

    /// Get a resting order by ID
    #[inline]
    pub fn get(&self, order_id: u64) -> Option<&Order> {
        let key = self.order_index.get(&order_id)?;
        self.orders.get(*key).map(|node| &node.order)
    }

    /// Check if an order is resting
    #[inline]
    pub fn contains(&self, order_id: u64) -> bool {
        self.order_index.contains_key(&order_id)
    }

    // ========================================================================
    // Best Bid/Ask
    // ========================================================================

    /// Highest resting buy price
    #[inline]
    pub fn best_bid(&self) -> Option<u64> {
        self.bids.keys().next().map(|r| r.0)
    }

    /// Lowest resting sell price
    #[inline]
    pub fn best_ask(&self) -> Option<u64> {
        self.asks.keys().next().copied()
    }

    /// Best price on `side`
    #[inline]
    pub fn best_price(&self, side: Side) -> Option<u64> {
        match side {
            Side::Buy => self.best_bid(),
            Side::Sell => self.best_ask(),
        }
    }

    /// `best_ask - best_bid`, None if either side is empty or the book is crossed
    pub fn spread(&self) -> Option<u64> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) if ask >= bid => Some(ask - bid),
            _ => None,
        }
    }

    /// True if the best bid meets or exceeds the best ask
    pub fn is_crossed(&self) -> bool {
        matches!(
            (self.best_bid(), self.best_ask()),
            (Some(bid), Some(ask)) if bid >= ask
        )
    }

    /// Fail with [`BookError::CrossedBook`] if the book is crossed
    pub fn check_uncrossed(&self) -> Result<(), BookError> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) if bid >= ask => Err(BookError::CrossedBook { bid, ask }),
            _ => Ok(()),
        }
    }

    fn level(&self, side: Side, price: u64) -> Option<&PriceLevel> {
        match side {
            Side::Buy => self.bids.get(&Reverse(price)),
            Side::Sell => self.asks.get(&price),
        }
    }

    fn level_mut(&mut self, side: Side, price: u64) -> Option<&mut PriceLevel> {
        match side {
            Side::Buy => self.bids.get_mut(&Reverse(price)),
            Side::Sell => self.asks.get_mut(&price),
        }
    }

    /// Earliest-sequence order resting at `price` on `side`
    pub fn peek_front(&self, side: Side, price: u64) -> Option<&Order> {
        let key = self.front_key(side, price)?;
        self.orders.get(key).map(|node| &node.order)
    }

    /// Slab key of the earliest-sequence order at `price` on `side`
    #[inline]
    pub(crate) fn front_key(&self, side: Side, price: u64) -> Option<usize> {
        self.level(side, price)?.peek_head()
    }

    /// Get a resting order by slab key
    #[inline]
    pub(crate) fn order_at(&self, key: usize) -> Option<&Order> {
        self.orders.get(key).map(|node| &node.order)
    }

    // ========================================================================
    // Matching Support
    // ========================================================================

    /// Fill the resting order at `key` in place
    ///
    /// The order keeps its queue position. If the fill exhausts it, it is
    /// removed from the book (and its level pruned if now empty).
    ///
    /// # Returns
    ///
    /// A copy of the maker order after the fill, or None if `key` is unknown
    pub(crate) fn fill_resting(&mut self, key: usize, quantity: u64) -> Option<Order> {
        let node = self.orders.get_mut(key)?;
        let filled = node.order.fill(quantity);
        let side = node.order.side();
        let price = node.price();
        let maker = node.order.clone();

        if let Some(level) = self.level_mut(side, price) {
            level.reduce_quantity(filled);
        }
        if maker.is_filled() {
            self.remove_key(key);
        }
        Some(maker)
    }

    /// Shrink a resting order's remaining quantity without touching its priority
    pub(crate) fn reduce_resting(&mut self, order_id: u64, new_remaining: u64) -> Result<Order, BookError> {
        let key = self
            .order_index
            .get(&order_id)
            .copied()
            .ok_or(BookError::OrderNotFound { order_id })?;
        let node = self
            .orders
            .get_mut(key)
            .ok_or(BookError::OrderNotFound { order_id })?;
        if new_remaining == 0 || new_remaining > node.remaining() {
            return Err(BookError::invalid("reduction must leave a smaller positive quantity"));
        }

        let reduction = node.remaining() - new_remaining;
        node.order.remaining = new_remaining;
        node.order.quantity -= reduction;
        let side = node.order.side();
        let price = node.price();
        let order = node.order.clone();

        if let Some(level) = self.level_mut(side, price) {
            level.reduce_quantity(reduction);
        }
        Ok(order)
    }

    // ========================================================================
    // Views
    // ========================================================================

    /// Aggregated depth for up to `levels` prices on `side`, best first
    pub fn depth(&self, side: Side, levels: usize) -> Vec<LevelDepth> {
        let to_depth = |level: &PriceLevel| LevelDepth {
            price: level.price,
            quantity: level.total_quantity,
            order_count: level.order_count,
        };
        match side {
            Side::Buy => self.bids.values().take(levels).map(to_depth).collect(),
            Side::Sell => self.asks.values().take(levels).map(to_depth).collect(),
        }
    }

    /// Top of book plus `levels` of depth per side
    pub fn snapshot(&self, levels: usize) -> BookSnapshot {
        BookSnapshot {
            best_bid: self.best_bid(),
            best_ask: self.best_ask(),
            bids: self.depth(Side::Buy, levels),
            asks: self.depth(Side::Sell, levels),
            last_trade_price: None,
        }
    }

    /// Resting orders on `side` in matching priority (price, then sequence)
    pub fn orders_by_priority(&self, side: Side) -> Vec<&Order> {
        let levels: Box<dyn Iterator<Item = &PriceLevel>> = match side {
            Side::Buy => Box::new(self.bids.values()),
            Side::Sell => Box::new(self.asks.values()),
        };
        levels
            .flat_map(|level| level.keys(&self.orders))
            .filter_map(|key| self.order_at(key))
            .collect()
    }

    /// SHA-256 over every resting order in priority order, bids then asks
    ///
    /// Two books with the same resting orders in the same queue positions
    /// produce the same root.
    pub fn state_root(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        for side in [Side::Buy, Side::Sell] {
            hasher.update([side.to_u8()]);
            for order in self.orders_by_priority(side) {
                hasher.update(order.id.to_le_bytes());
                hasher.update(order.owner_id.to_le_bytes());
                hasher.update(order.price.to_le_bytes());
                hasher.update(order.quantity.to_le_bytes());
                hasher.update(order.remaining.to_le_bytes());
                hasher.update(order.sequence.to_le_bytes());
            }
        }
        let mut root = [0u8; 32];
        root.copy_from_slice(&hasher.finalize());
        root
    }

    /// [`OrderBook::state_root`] as a hex string
    pub fn state_root_hex(&self) -> String {
        hex::encode(self.state_root())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OrderStatus;

    fn resting(id: u64, side: Side, price: u64, quantity: u64) -> Order {
        let mut order = Order::limit(100, side, price, quantity);
        order.id = id;
        order.sequence = id;
        order
    }

    #[test]
    fn test_book_new() {
        let book = OrderBook::new();

        assert!(book.is_empty());
        assert!(book.best_bid().is_none());
        assert!(book.best_ask().is_none());
        assert!(!book.is_crossed());
    }

    #[test]
    fn test_with_capacity() {
        let book = OrderBook::with_capacity(10_000);
        assert!(book.capacity() >= 10_000);
    }

    #[test]
    fn test_insert_both_sides() {
        let mut book = OrderBook::with_capacity(16);

        book.insert_resting(resting(1, Side::Buy, 100, 5)).unwrap();
        book.insert_resting(resting(2, Side::Sell, 105, 7)).unwrap();

        assert_eq!(book.order_count(), 2);
        assert_eq!(book.bid_count(), 1);
        assert_eq!(book.ask_count(), 1);
        assert_eq!(book.spread(), Some(5));
    }

    #[test]
    fn test_insert_rejects_invalid() {
        let mut book = OrderBook::new();

        let zero = resting(1, Side::Buy, 100, 0);
        assert!(matches!(book.insert_resting(zero), Err(BookError::InvalidOrder { .. })));

        let no_price = resting(2, Side::Buy, 0, 5);
        assert!(matches!(book.insert_resting(no_price), Err(BookError::InvalidOrder { .. })));

        let mut market = Order::market(1, Side::Buy, 5);
        market.id = 3;
        assert!(matches!(book.insert_resting(market), Err(BookError::InvalidOrder { .. })));

        book.insert_resting(resting(4, Side::Buy, 100, 5)).unwrap();
        assert_eq!(
            book.insert_resting(resting(4, Side::Buy, 100, 5)),
            Err(BookError::invalid("duplicate order id"))
        );
        assert_eq!(book.order_count(), 1);
    }

    #[test]
    fn test_price_priority() {
        let mut book = OrderBook::new();

        book.insert_resting(resting(1, Side::Buy, 49, 1)).unwrap();
        book.insert_resting(resting(2, Side::Buy, 51, 1)).unwrap();
        book.insert_resting(resting(3, Side::Buy, 50, 1)).unwrap();
        book.insert_resting(resting(4, Side::Sell, 60, 1)).unwrap();
        book.insert_resting(resting(5, Side::Sell, 55, 1)).unwrap();

        assert_eq!(book.best_bid(), Some(51));
        assert_eq!(book.best_ask(), Some(55));
        assert_eq!(book.bid_levels(), 3);

        let bid_ids: Vec<u64> = book.orders_by_priority(Side::Buy).iter().map(|o| o.id).collect();
        assert_eq!(bid_ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_peek_front_is_fifo() {
        let mut book = OrderBook::new();

        book.insert_resting(resting(1, Side::Sell, 100, 2)).unwrap();
        book.insert_resting(resting(2, Side::Sell, 100, 2)).unwrap();

        assert_eq!(book.peek_front(Side::Sell, 100).map(|o| o.id), Some(1));
        assert!(book.peek_front(Side::Sell, 101).is_none());
        assert!(book.peek_front(Side::Buy, 100).is_none());

        book.remove(1).unwrap();
        assert_eq!(book.peek_front(Side::Sell, 100).map(|o| o.id), Some(2));
    }

    #[test]
    fn test_remove_prunes_empty_level() {
        let mut book = OrderBook::new();

        book.insert_resting(resting(1, Side::Buy, 100, 1)).unwrap();
        book.insert_resting(resting(2, Side::Buy, 99, 1)).unwrap();

        let removed = book.remove(1).unwrap();
        assert_eq!(removed.id, 1);
        assert_eq!(book.bid_levels(), 1);
        assert_eq!(book.best_bid(), Some(99));
        assert!(!book.contains(1));
    }

    #[test]
    fn test_remove_missing() {
        let mut book = OrderBook::new();
        assert_eq!(book.remove(999), Err(BookError::OrderNotFound { order_id: 999 }));
    }

    #[test]
    fn test_fill_resting_keeps_position_until_filled() {
        let mut book = OrderBook::new();

        let key = book.insert_resting(resting(1, Side::Sell, 100, 5)).unwrap();
        book.insert_resting(resting(2, Side::Sell, 100, 5)).unwrap();

        let maker = book.fill_resting(key, 3).unwrap();
        assert_eq!(maker.remaining, 2);
        assert_eq!(maker.status(), OrderStatus::PartiallyFilled);
        assert_eq!(book.peek_front(Side::Sell, 100).map(|o| o.id), Some(1));
        assert_eq!(book.depth(Side::Sell, 1)[0].quantity, 7);

        let maker = book.fill_resting(key, 2).unwrap();
        assert_eq!(maker.status(), OrderStatus::Filled);
        assert!(!book.contains(1));
        assert_eq!(book.peek_front(Side::Sell, 100).map(|o| o.id), Some(2));
    }

    #[test]
    fn test_reduce_resting() {
        let mut book = OrderBook::new();
        book.insert_resting(resting(1, Side::Buy, 100, 10)).unwrap();
        book.insert_resting(resting(2, Side::Buy, 100, 10)).unwrap();

        let order = book.reduce_resting(1, 4).unwrap();
        assert_eq!(order.remaining, 4);
        assert_eq!(order.quantity, 4);
        assert_eq!(book.peek_front(Side::Buy, 100).map(|o| o.id), Some(1));
        assert_eq!(book.depth(Side::Buy, 1)[0].quantity, 14);

        assert!(book.reduce_resting(1, 5).is_err());
        assert!(book.reduce_resting(1, 0).is_err());
    }

    #[test]
    fn test_crossed_detection() {
        let mut book = OrderBook::new();
        book.insert_resting(resting(1, Side::Buy, 100, 1)).unwrap();
        book.insert_resting(resting(2, Side::Sell, 100, 1)).unwrap();

        assert!(book.is_crossed());
        assert_eq!(
            book.check_uncrossed(),
            Err(BookError::CrossedBook { bid: 100, ask: 100 })
        );
    }

    #[test]
    fn test_snapshot_depth() {
        let mut book = OrderBook::new();
        book.insert_resting(resting(1, Side::Buy, 100, 3)).unwrap();
        book.insert_resting(resting(2, Side::Buy, 100, 4)).unwrap();
        book.insert_resting(resting(3, Side::Buy, 98, 1)).unwrap();
        book.insert_resting(resting(4, Side::Sell, 103, 2)).unwrap();

        let snap = book.snapshot(1);
        assert_eq!(snap.best_bid, Some(100));
        assert_eq!(snap.best_ask, Some(103));
        assert_eq!(
            snap.bids,
            vec![LevelDepth { price: 100, quantity: 7, order_count: 2 }]
        );
        assert_eq!(snap.asks.len(), 1);
    }

    #[test]
    fn test_state_root_tracks_queue_order() {
        let mut a = OrderBook::new();
        a.insert_resting(resting(1, Side::Buy, 100, 1)).unwrap();
        a.insert_resting(resting(2, Side::Buy, 100, 1)).unwrap();

        let mut b = OrderBook::new();
        b.insert_resting(resting(1, Side::Buy, 100, 1)).unwrap();
        b.insert_resting(resting(2, Side::Buy, 100, 1)).unwrap();
        assert_eq!(a.state_root(), b.state_root());

        let mut c = OrderBook::new();
        c.insert_resting(resting(2, Side::Buy, 100, 1)).unwrap();
        c.insert_resting(resting(1, Side::Buy, 100, 1)).unwrap();
        assert_ne!(a.state_root(), c.state_root());
        assert_eq!(a.state_root_hex().len(), 64);
    }
}
