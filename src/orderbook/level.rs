//! Price level queue for orders resting at the same price.
//!
//! ## Design
//!
//! A `PriceLevel` is the FIFO queue of one price point. Orders live in the
//! book's slab; the level threads them into a doubly-linked list:
//!
//! ```text
//! head (lowest sequence) <-> order2 <-> order3 <-> tail (highest sequence)
//! ```
//!
//! - New orders are appended at the tail
//! - Matching consumes orders from the head
//! - Any order can be unlinked in O(1) using its slab key
//!
//! Partial fills update quantities in place and never move an order, so a
//! partially filled maker keeps its place in the queue.

use slab::Slab;

use crate::orderbook::OrderNode;

/// A price level containing orders at a single price.
#[derive(Debug, Clone)]
pub struct PriceLevel {
    /// Price for this level (fixed-point)
    pub price: u64,

    /// Total remaining quantity at this level
    pub total_quantity: u64,

    /// Head of the queue (oldest order, slab key)
    pub head: Option<usize>,

    /// Tail of the queue (newest order, slab key)
    pub tail: Option<usize>,

    /// Number of orders at this price level
    pub order_count: usize,
}

impl PriceLevel {
    /// Create a new empty price level
    pub fn new(price: u64) -> Self {
        Self {
            price,
            total_quantity: 0,
            head: None,
            tail: None,
            order_count: 0,
        }
    }

    /// Check if the price level is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order_count == 0
    }

    /// Append an order at the tail of the queue
    ///
    /// Keys that are not in the slab are ignored.
    pub fn push_back(&mut self, key: usize, slab: &mut Slab<OrderNode>) {
        let Some(node) = slab.get_mut(key) else {
            return;
        };
        let quantity = node.remaining();
        node.prev = self.tail;
        node.next = None;

        match self.tail.and_then(|tail| slab.get_mut(tail)) {
            Some(tail_node) => tail_node.next = Some(key),
            None => self.head = Some(key),
        }

        self.tail = Some(key);
        self.order_count += 1;
        self.total_quantity = self.total_quantity.saturating_add(quantity);
    }

    /// Unlink an order from the queue by slab key
    ///
    /// # Returns
    ///
    /// The remaining quantity of the unlinked order, 0 if the key is unknown
    pub fn remove(&mut self, key: usize, slab: &mut Slab<OrderNode>) -> u64 {
        let Some(node) = slab.get_mut(key) else {
            return 0;
        };
        let quantity = node.remaining();
        let prev_key = node.prev.take();
        let next_key = node.next.take();

        match prev_key.and_then(|prev| slab.get_mut(prev)) {
            Some(prev_node) => prev_node.next = next_key,
            None => self.head = next_key,
        }
        match next_key.and_then(|next| slab.get_mut(next)) {
            Some(next_node) => next_node.prev = prev_key,
            None => self.tail = prev_key,
        }

        self.order_count = self.order_count.saturating_sub(1);
        self.total_quantity = self.total_quantity.saturating_sub(quantity);
        quantity
    }

    /// Slab key of the oldest order, the next one to match
    #[inline]
    pub fn peek_head(&self) -> Option<usize> {
        self.head
    }

    /// Account for a fill against one of this level's orders
    pub fn reduce_quantity(&mut self, filled_quantity: u64) {
        self.total_quantity = self.total_quantity.saturating_sub(filled_quantity);
    }

    /// Slab keys from head to tail
    pub fn keys<'a>(&self, slab: &'a Slab<OrderNode>) -> LevelIter<'a> {
        LevelIter {
            slab,
            cursor: self.head,
        }
    }
}

/// Iterator over a level's slab keys in time priority
pub struct LevelIter<'a> {
    slab: &'a Slab<OrderNode>,
    cursor: Option<usize>,
}

impl Iterator for LevelIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let key = self.cursor?;
        self.cursor = self.slab.get(key).and_then(|node| node.next);
        Some(key)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
