//! Order node for slab-based storage.
//!
//! `OrderNode` wraps a resting `Order` with doubly-linked list pointers so a
//! price level can keep its FIFO queue without owning the orders. Pointers
//! are slab keys (`usize`), not references; keys may be reused after removal.

use crate::types::Order;

/// Resting order stored in the book's slab.
///
/// - `next`: the next (newer) order at the same price
/// - `prev`: the previous (older) order at the same price
#[derive(Debug, Clone)]
pub struct OrderNode {
    /// The resting order
    pub order: Order,

    /// Next order in the price level queue (slab key), None at the tail
    pub next: Option<usize>,

    /// Previous order in the price level queue (slab key), None at the head
    pub prev: Option<usize>,
}

impl OrderNode {
    /// Create a new, unlinked order node
    #[inline]
    pub fn new(order: Order) -> Self {
        Self {
            order,
            next: None,
            prev: None,
        }
    }

    /// Get the order ID
    #[inline]
    pub fn order_id(&self) -> u64 {
        self.order.id
    }

    /// Get the resting price
    #[inline]
    pub fn price(&self) -> u64 {
        self.order.price
    }

    /// Get the remaining quantity
    #[inline]
    pub fn remaining(&self) -> u64 {
        self.order.remaining
    }

    /// Get the time-priority sequence number
    #[inline]
    pub fn sequence(&self) -> u64 {
        self.order.sequence
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Side;

    #[test]
    fn test_order_node_new() {
        let mut order = Order::limit(100, Side::Buy, 5_000, 10);
        order.id = 42;
        order.sequence = 3;
        let node = OrderNode::new(order.clone());

        assert_eq!(node.order, order);
        assert!(node.next.is_none());
        assert!(node.prev.is_none());
        assert_eq!(node.order_id(), 42);
        assert_eq!(node.price(), 5_000);
        assert_eq!(node.remaining(), 10);
        assert_eq!(node.sequence(), 3);
    }
}
