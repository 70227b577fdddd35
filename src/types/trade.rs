//! Trade type representing an executed match between two orders.
//!
//! ## SSZ Serialization
//!
//! Trades are serialized using SSZ so the audit log can be persisted and
//! replayed byte-for-byte by external collaborators.

use rust_decimal::Decimal;
use ssz_rs::prelude::*;

use crate::types::price;
use crate::types::Side;

/// A trade represents a single match between a maker and taker order.
///
/// ## Terminology
///
/// - **Maker**: The resting order that was already in the book
/// - **Taker**: The incoming order that triggered the match
///
/// ## Price Discovery
///
/// The trade always executes at the maker's price (the resting order's price).
///
/// ## Example
///
/// ```
/// use matchcore::types::{Side, Trade};
///
/// let trade = Trade::new(
///     1,                      // sequence
///     100,                    // maker_order_id
///     200,                    // taker_order_id
///     10,                     // maker_owner_id
///     20,                     // taker_owner_id
///     Side::Buy,              // taker side
///     10_000_000_000,         // price: 100.00000000
///     300_000_000,            // quantity: 3.00000000
///     1703577600000,          // timestamp
/// );
/// assert_eq!(trade.buyer_owner_id(), 20);
/// assert_eq!(trade.seller_owner_id(), 10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct Trade {
    /// Strictly increasing trade sequence number (assigned by the engine)
    pub sequence: u64,

    /// Maker order ID (the resting order)
    pub maker_order_id: u64,

    /// Taker order ID (the incoming order)
    pub taker_order_id: u64,

    /// Maker participant
    pub maker_owner_id: u64,

    /// Taker participant
    pub taker_owner_id: u64,

    /// Side of the taker as u8 (0=Buy, 1=Sell); the maker is on the other side
    pub taker_side_raw: u8,

    /// Execution price in fixed-point (always the maker's price)
    pub price: u64,

    /// Executed quantity in fixed-point
    pub quantity: u64,

    /// Execution timestamp in milliseconds
    pub timestamp: u64,
}

impl Trade {
    /// Create a new trade
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sequence: u64,
        maker_order_id: u64,
        taker_order_id: u64,
        maker_owner_id: u64,
        taker_owner_id: u64,
        taker_side: Side,
        price: u64,
        quantity: u64,
        timestamp: u64,
    ) -> Self {
        Self {
            sequence,
            maker_order_id,
            taker_order_id,
            maker_owner_id,
            taker_owner_id,
            taker_side_raw: taker_side.to_u8(),
            price,
            quantity,
            timestamp,
        }
    }

    /// Side of the incoming order
    pub fn taker_side(&self) -> Side {
        Side::from_u8(self.taker_side_raw).unwrap_or(Side::Buy)
    }

    /// Participant on the buying side of the trade
    pub fn buyer_owner_id(&self) -> u64 {
        match self.taker_side() {
            Side::Buy => self.taker_owner_id,
            Side::Sell => self.maker_owner_id,
        }
    }

    /// Participant on the selling side of the trade
    pub fn seller_owner_id(&self) -> u64 {
        match self.taker_side() {
            Side::Buy => self.maker_owner_id,
            Side::Sell => self.taker_owner_id,
        }
    }

    /// Whether `order_id` took part in this trade
    pub fn involves(&self, order_id: u64) -> bool {
        self.maker_order_id == order_id || self.taker_order_id == order_id
    }

    /// Notional value (`price × quantity`) in real units
    pub fn notional(&self) -> Decimal {
        price::notional(self.price, self.quantity)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
