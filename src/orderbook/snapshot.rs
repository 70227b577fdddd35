//! Read-only views of the book handed to strategies and reporting.

use serde::Serialize;

use crate::types::price;

/// Aggregated resting liquidity at one price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelDepth {
    pub price: u64,
    pub quantity: u64,
    pub order_count: usize,
}

/// Top-of-book plus depth by level, best level first on each side
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BookSnapshot {
    pub best_bid: Option<u64>,
    pub best_ask: Option<u64>,
    pub bids: Vec<LevelDepth>,
    pub asks: Vec<LevelDepth>,
    /// Price of the most recent trade, filled in by the exchange
    pub last_trade_price: Option<u64>,
}

impl BookSnapshot {
    /// `best_ask - best_bid`, when both sides have liquidity
    pub fn spread(&self) -> Option<u64> {
        match (self.best_bid, self.best_ask) {
            (Some(bid), Some(ask)) => ask.checked_sub(bid),
            _ => None,
        }
    }

    /// Mid price, when both sides have liquidity
    pub fn mid(&self) -> Option<u64> {
        match (self.best_bid, self.best_ask) {
            (Some(bid), Some(ask)) => Some(price::mid(bid, ask)),
            _ => None,
        }
    }

    /// Best available reference: mid, then last trade, then either touch
    pub fn reference_price(&self) -> Option<u64> {
        self.mid()
            .or(self.last_trade_price)
            .or(self.best_bid)
            .or(self.best_ask)
    }

    pub fn bid_quantity(&self) -> u64 {
        self.bids.iter().map(|l| l.quantity).sum()
    }

    pub fn ask_quantity(&self) -> u64 {
        self.asks.iter().map(|l| l.quantity).sum()
    }
}
