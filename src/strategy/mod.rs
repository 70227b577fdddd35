//! Strategy interface.
//!
//! A strategy looks at a book snapshot and its own position and answers
//! with the orders it wants placed. It never touches the book or ledger
//! directly; the driver turns intents into requests against a venue.

mod market_maker;

pub use market_maker::MarketMaker;

use crate::exchange::OrderRequest;
use crate::ledger::Position;
use crate::orderbook::BookSnapshot;
use crate::types::{OrderType, Side};

/// An order a strategy wants placed, before an owner is attached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderIntent {
    pub side: Side,
    pub kind: OrderType,
    /// Fixed-point limit price; `None` for market orders
    pub price: Option<u64>,
    /// Fixed-point quantity
    pub quantity: u64,
}

impl OrderIntent {
    pub fn limit(side: Side, price: u64, quantity: u64) -> Self {
        Self {
            side,
            kind: OrderType::Limit,
            price: Some(price),
            quantity,
        }
    }

    pub fn market(side: Side, quantity: u64) -> Self {
        Self {
            side,
            kind: OrderType::Market,
            price: None,
            quantity,
        }
    }

    pub fn into_request(self, owner_id: u64) -> OrderRequest {
        OrderRequest {
            owner_id,
            side: self.side,
            kind: self.kind,
            price: self.price,
            quantity: self.quantity,
        }
    }
}

/// Decision logic plugged into the driver loop
pub trait Strategy {
    fn name(&self) -> &str;

    /// Orders to place this round
    fn decide(&mut self, snapshot: &BookSnapshot, position: &Position) -> Vec<OrderIntent>;
}
