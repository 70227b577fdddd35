//! The ledger of all participants' positions.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::trace;

use crate::ledger::Position;
use crate::types::{Side, Trade};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// A trade at or below the last applied sequence was offered again
    #[error("trade {sequence} already applied (last applied {last})")]
    StaleTrade { sequence: u64, last: u64 },
}

/// Positions keyed by owner, updated from trades.
///
/// Positions are created lazily, either when the owner first submits an
/// order ([`PositionLedger::register`]) or first appears in a trade, and are
/// never removed. Iteration is in owner-id order.
#[derive(Debug, Clone)]
pub struct PositionLedger {
    starting_cash: Decimal,
    positions: BTreeMap<u64, Position>,
    last_trade_sequence: u64,
    trades_applied: u64,
}

impl Default for PositionLedger {
    fn default() -> Self {
        Self::new(Decimal::ZERO)
    }
}

impl PositionLedger {
    pub fn new(starting_cash: Decimal) -> Self {
        Self {
            starting_cash,
            positions: BTreeMap::new(),
            last_trade_sequence: 0,
            trades_applied: 0,
        }
    }

    pub fn starting_cash(&self) -> Decimal {
        self.starting_cash
    }

    /// Get or create the position for `owner_id`
    pub fn register(&mut self, owner_id: u64) -> &Position {
        self.entry(owner_id)
    }

    fn entry(&mut self, owner_id: u64) -> &mut Position {
        let starting_cash = self.starting_cash;
        self.positions
            .entry(owner_id)
            .or_insert_with(|| Position::new(owner_id, starting_cash))
    }

    /// Apply a trade to both counterparties
    ///
    /// Trades must arrive in increasing sequence order; a replayed trade is
    /// rejected before either side is touched.
    pub fn apply(&mut self, trade: &Trade) -> Result<(), LedgerError> {
        if trade.sequence <= self.last_trade_sequence {
            return Err(LedgerError::StaleTrade {
                sequence: trade.sequence,
                last: self.last_trade_sequence,
            });
        }

        let buyer = trade.buyer_owner_id();
        let seller = trade.seller_owner_id();
        if buyer == seller {
            self.entry(buyer).apply_self_trade(trade.price, trade.quantity);
        } else {
            self.entry(buyer).apply_fill(Side::Buy, trade.price, trade.quantity);
            self.entry(seller).apply_fill(Side::Sell, trade.price, trade.quantity);
        }

        self.last_trade_sequence = trade.sequence;
        self.trades_applied += 1;
        trace!(
            trade_seq = trade.sequence,
            buyer,
            seller,
            "trade applied to ledger"
        );
        Ok(())
    }

    pub fn position(&self, owner_id: u64) -> Option<&Position> {
        self.positions.get(&owner_id)
    }

    pub fn positions(&self) -> impl Iterator<Item = &Position> {
        self.positions.values()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn trades_applied(&self) -> u64 {
        self.trades_applied
    }

    /// Sum of inventories; zero whenever every trade was applied to both sides
    pub fn net_inventory(&self) -> Decimal {
        self.positions.values().map(|p| p.inventory).sum()
    }

    /// Sum of cash; equals `len() × starting_cash` for the same reason
    pub fn total_cash(&self) -> Decimal {
        self.positions.values().map(|p| p.cash).sum()
    }

    pub fn total_realized_pnl(&self) -> Decimal {
        self.positions.values().map(|p| p.realized_pnl).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::price::SCALE;

    fn trade(sequence: u64, maker_owner: u64, taker_owner: u64, taker_side: Side, price: u64, qty: u64) -> Trade {
        Trade::new(
            sequence,
            sequence * 10,
            sequence * 10 + 1,
            maker_owner,
            taker_owner,
            taker_side,
            price * SCALE,
            qty * SCALE,
            0,
        )
    }

    #[test]
    fn test_register_is_lazy_and_idempotent() {
        let mut ledger = PositionLedger::new(Decimal::from(500));
        assert!(ledger.is_empty());

        ledger.register(7);
        ledger.register(7);

        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.position(7).map(|p| p.cash), Some(Decimal::from(500)));
    }

    #[test]
    fn test_apply_updates_both_sides() {
        let mut ledger = PositionLedger::new(Decimal::from(1000));
        // Owner 2 sells into owner 1's resting bid
        ledger.apply(&trade(1, 1, 2, Side::Sell, 100, 3)).unwrap();

        let buyer = ledger.position(1).unwrap();
        let seller = ledger.position(2).unwrap();
        assert_eq!(buyer.cash, Decimal::from(700));
        assert_eq!(buyer.inventory, Decimal::from(3));
        assert_eq!(seller.cash, Decimal::from(1300));
        assert_eq!(seller.inventory, Decimal::from(-3));

        assert_eq!(ledger.net_inventory(), Decimal::ZERO);
        assert_eq!(ledger.total_cash(), Decimal::from(2000));
    }

    #[test]
    fn test_replayed_trade_rejected() {
        let mut ledger = PositionLedger::default();
        let t = trade(1, 1, 2, Side::Buy, 50, 1);
        ledger.apply(&t).unwrap();

        assert_eq!(
            ledger.apply(&t),
            Err(LedgerError::StaleTrade { sequence: 1, last: 1 })
        );
        assert_eq!(ledger.trades_applied(), 1);
        assert_eq!(ledger.position(2).map(|p| p.inventory), Some(Decimal::ONE));
    }

    #[test]
    fn test_self_trade_leaves_cash_untouched() {
        let mut ledger = PositionLedger::new(Decimal::from(10));
        ledger.apply(&trade(1, 4, 4, Side::Buy, 5, 1)).unwrap();

        let pos = ledger.position(4).unwrap();
        assert_eq!(pos.cash, Decimal::from(10));
        assert!(pos.is_flat());
        assert_eq!(pos.trade_count, 1);
    }
}
