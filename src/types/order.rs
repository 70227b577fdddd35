//! Order types for the matching engine.
//!
//! ## SSZ Serialization
//!
//! `Order` derives `SimpleSerialize` from ssz_rs so that audit records have a
//! deterministic, fixed-size encoding. Enum fields are stored as `u8` and
//! exposed through typed accessors.
//!
//! ## Lifecycle
//!
//! ```text
//! New --(partial fill)--> PartiallyFilled --(fill exhausts)--> Filled
//! New | PartiallyFilled --(cancel)--> Cancelled
//! New | PartiallyFilled --(market order out of liquidity)--> Discarded
//! ```
//!
//! `Filled`, `Cancelled` and `Discarded` are terminal.

use ssz_rs::prelude::*;

use crate::error::BookError;

// ============================================================================
// Side enum
// ============================================================================

/// Order side: Buy or Sell
///
/// Represented as u8 for SSZ compatibility:
/// - Buy = 0
/// - Sell = 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub enum Side {
    /// Buy order (bid)
    #[default]
    Buy,
    /// Sell order (ask)
    Sell,
}

impl Side {
    /// Convert to u8 for serialization
    pub fn to_u8(self) -> u8 {
        match self {
            Side::Buy => 0,
            Side::Sell => 1,
        }
    }

    /// Convert from u8 for deserialization
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Side::Buy),
            1 => Some(Side::Sell),
            _ => None,
        }
    }

    /// Returns the opposite side
    pub fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

// ============================================================================
// OrderType enum
// ============================================================================

/// Order type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub enum OrderType {
    /// Executes at the limit price or better; the remainder rests
    #[default]
    Limit,
    /// Executes against whatever liquidity exists; the remainder is discarded
    Market,
}

impl OrderType {
    /// Convert to u8 for serialization
    pub fn to_u8(self) -> u8 {
        match self {
            OrderType::Limit => 0,
            OrderType::Market => 1,
        }
    }

    /// Convert from u8 for deserialization
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(OrderType::Limit),
            1 => Some(OrderType::Market),
            _ => None,
        }
    }
}

// ============================================================================
// OrderStatus enum
// ============================================================================

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub enum OrderStatus {
    #[default]
    New,
    PartiallyFilled,
    Filled,
    Cancelled,
    /// Market order whose unfilled remainder was dropped for lack of liquidity
    Discarded,
}

impl OrderStatus {
    /// Convert to u8 for serialization
    pub fn to_u8(self) -> u8 {
        match self {
            OrderStatus::New => 0,
            OrderStatus::PartiallyFilled => 1,
            OrderStatus::Filled => 2,
            OrderStatus::Cancelled => 3,
            OrderStatus::Discarded => 4,
        }
    }

    /// Convert from u8 for deserialization
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(OrderStatus::New),
            1 => Some(OrderStatus::PartiallyFilled),
            2 => Some(OrderStatus::Filled),
            3 => Some(OrderStatus::Cancelled),
            4 => Some(OrderStatus::Discarded),
            _ => None,
        }
    }

    /// True for states no transition leaves
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OrderStatus::Filled | OrderStatus::Cancelled | OrderStatus::Discarded
        )
    }
}

// ============================================================================
// Order struct
// ============================================================================

/// An order submitted to the book.
///
/// ## Fields
///
/// Price and quantity fields use fixed-point representation (scaled by 10^8).
/// `price` is 0 for market orders; use [`Order::limit_price`] to read it.
///
/// ## SSZ Layout
///
/// Fixed-size container: 7 × u64 + 3 × u8 = 59 bytes.
///
/// ## Example
///
/// ```
/// use matchcore::types::{Order, OrderStatus, Side};
///
/// // Limit buy for 1.0 at 100.0, owner 7
/// let order = Order::limit(7, Side::Buy, 10_000_000_000, 100_000_000);
/// assert_eq!(order.limit_price(), Some(10_000_000_000));
/// assert_eq!(order.status(), OrderStatus::New);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct Order {
    /// Unique order identifier (assigned by the engine when 0)
    pub id: u64,

    /// Submitting participant
    pub owner_id: u64,

    /// Order side as u8 (0=Buy, 1=Sell)
    pub side_raw: u8,

    /// Order type as u8 (0=Limit, 1=Market)
    pub kind_raw: u8,

    /// Status as u8, see [`OrderStatus::to_u8`]
    pub status_raw: u8,

    /// Limit price in fixed-point, 0 for market orders
    pub price: u64,

    /// Original quantity in fixed-point
    pub quantity: u64,

    /// Remaining quantity, decremented as the order is matched
    pub remaining: u64,

    /// Time-priority tie-break, assigned by the engine on submission
    pub sequence: u64,

    /// Caller-supplied submission timestamp in milliseconds
    pub timestamp: u64,
}

impl Order {
    /// Create a new order
    ///
    /// # Arguments
    ///
    /// * `id` - Order identifier, 0 to let the engine assign one
    /// * `owner_id` - Submitting participant
    /// * `side` - Buy or Sell
    /// * `kind` - Limit or Market
    /// * `price` - Limit price in fixed-point (ignored for market orders)
    /// * `quantity` - Quantity in fixed-point
    /// * `timestamp` - Unix timestamp in milliseconds
    pub fn new(
        id: u64,
        owner_id: u64,
        side: Side,
        kind: OrderType,
        price: u64,
        quantity: u64,
        timestamp: u64,
    ) -> Self {
        let price = match kind {
            OrderType::Limit => price,
            OrderType::Market => 0,
        };
        Self {
            id,
            owner_id,
            side_raw: side.to_u8(),
            kind_raw: kind.to_u8(),
            status_raw: OrderStatus::New.to_u8(),
            price,
            quantity,
            remaining: quantity,
            sequence: 0,
            timestamp,
        }
    }

    /// Limit order with an engine-assigned id
    pub fn limit(owner_id: u64, side: Side, price: u64, quantity: u64) -> Self {
        Self::new(0, owner_id, side, OrderType::Limit, price, quantity, 0)
    }

    /// Market order with an engine-assigned id
    pub fn market(owner_id: u64, side: Side, quantity: u64) -> Self {
        Self::new(0, owner_id, side, OrderType::Market, 0, quantity, 0)
    }

    /// Get the order side
    pub fn side(&self) -> Side {
        Side::from_u8(self.side_raw).unwrap_or(Side::Buy)
    }

    /// Get the order type
    pub fn kind(&self) -> OrderType {
        OrderType::from_u8(self.kind_raw).unwrap_or(OrderType::Limit)
    }

    /// Get the lifecycle status
    pub fn status(&self) -> OrderStatus {
        OrderStatus::from_u8(self.status_raw).unwrap_or(OrderStatus::New)
    }

    fn set_status(&mut self, status: OrderStatus) {
        self.status_raw = status.to_u8();
    }

    /// The limit price, or `None` for market orders
    pub fn limit_price(&self) -> Option<u64> {
        match self.kind() {
            OrderType::Limit if self.price > 0 => Some(self.price),
            _ => None,
        }
    }

    /// Check that the order can be submitted
    ///
    /// Rejects zero quantities, limit orders without a price and raw fields
    /// that do not decode.
    pub fn validate(&self) -> Result<(), BookError> {
        if Side::from_u8(self.side_raw).is_none() {
            return Err(BookError::invalid("unknown side"));
        }
        let kind = OrderType::from_u8(self.kind_raw)
            .ok_or(BookError::invalid("unknown order type"))?;
        if self.quantity == 0 || self.remaining == 0 {
            return Err(BookError::invalid("quantity must be positive"));
        }
        if self.remaining > self.quantity {
            return Err(BookError::invalid("remaining exceeds quantity"));
        }
        if kind == OrderType::Limit && self.price == 0 {
            return Err(BookError::invalid("limit order requires a price"));
        }
        if self.status().is_terminal() {
            return Err(BookError::invalid("order is already terminal"));
        }
        Ok(())
    }

    /// True while the order may still trade (New or PartiallyFilled)
    pub fn is_active(&self) -> bool {
        !self.status().is_terminal()
    }

    /// Check if the order is fully filled
    pub fn is_filled(&self) -> bool {
        self.remaining == 0
    }

    /// Get the filled quantity
    pub fn filled_quantity(&self) -> u64 {
        self.quantity.saturating_sub(self.remaining)
    }

    /// Would this order trade against a resting order at `resting_price`?
    ///
    /// Market orders cross any price. A buy crosses asks at or below its
    /// limit; a sell crosses bids at or above it.
    pub fn crosses(&self, resting_price: u64) -> bool {
        match (self.kind(), self.side()) {
            (OrderType::Market, _) => true,
            (OrderType::Limit, Side::Buy) => self.price >= resting_price,
            (OrderType::Limit, Side::Sell) => self.price <= resting_price,
        }
    }

    /// Fill a portion of this order
    ///
    /// # Returns
    ///
    /// The actual quantity filled (may be less if order doesn't have enough remaining)
    pub fn fill(&mut self, fill_qty: u64) -> u64 {
        let actual_fill = fill_qty.min(self.remaining);
        self.remaining -= actual_fill;
        if self.remaining == 0 {
            self.set_status(OrderStatus::Filled);
        } else if actual_fill > 0 {
            self.set_status(OrderStatus::PartiallyFilled);
        }
        actual_fill
    }

    /// Move an active order to `Cancelled`
    ///
    /// Returns false (and changes nothing) if the order is already terminal.
    pub fn cancel(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.set_status(OrderStatus::Cancelled);
        true
    }

    /// Drop the unfilled remainder of a market order
    ///
    /// `remaining` keeps the dropped amount so that
    /// `filled_quantity() + remaining == quantity` still holds.
    pub fn discard(&mut self) -> u64 {
        if !self.is_active() {
            return 0;
        }
        self.set_status(OrderStatus::Discarded);
        self.remaining
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
