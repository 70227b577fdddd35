//! Per-participant position: cash, signed inventory and P&L.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::types::price::fixed_to_decimal;
use crate::types::Side;

/// Cash, inventory and P&L of one participant.
///
/// All money values are in real units (not fixed-point). Inventory is
/// signed: positive is long, negative is short.
///
/// ## P&L Accounting
///
/// - Fills that grow the position (or open one from flat) move
///   `average_cost` to the size-weighted average entry price.
/// - Fills against the position realize `(price - average_cost)` per unit
///   closed, sign-adjusted for shorts.
/// - If a fill flips the sign, the flipped remainder opens at the fill price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Position {
    pub owner_id: u64,
    pub cash: Decimal,
    pub inventory: Decimal,
    pub average_cost: Decimal,
    pub realized_pnl: Decimal,
    /// Last trade price this participant saw
    pub mark_price: Option<Decimal>,
    pub trade_count: u64,
    /// Traded quantity, both directions
    pub volume: Decimal,
}

impl Position {
    pub fn new(owner_id: u64, starting_cash: Decimal) -> Self {
        Self {
            owner_id,
            cash: starting_cash,
            inventory: Decimal::ZERO,
            average_cost: Decimal::ZERO,
            realized_pnl: Decimal::ZERO,
            mark_price: None,
            trade_count: 0,
            volume: Decimal::ZERO,
        }
    }

    pub fn is_flat(&self) -> bool {
        self.inventory.is_zero()
    }

    /// Apply one fill from this participant's point of view
    ///
    /// `price` and `quantity` are fixed-point, as carried by a trade.
    pub fn apply_fill(&mut self, side: Side, price: u64, quantity: u64) {
        if quantity == 0 {
            return;
        }
        let px = fixed_to_decimal(price);
        let qty = fixed_to_decimal(quantity);
        let signed = match side {
            Side::Buy => qty,
            Side::Sell => -qty,
        };

        self.cash -= signed * px;

        let prev = self.inventory;
        let same_direction = prev.is_sign_positive() == signed.is_sign_positive();
        if prev.is_zero() || same_direction {
            let prev_abs = prev.abs();
            self.average_cost = (self.average_cost * prev_abs + px * qty) / (prev_abs + qty);
            self.inventory = prev + signed;
        } else {
            let closed = qty.min(prev.abs());
            let pnl = (px - self.average_cost) * closed;
            self.realized_pnl += if prev.is_sign_positive() { pnl } else { -pnl };
            self.inventory = prev + signed;

            if self.inventory.is_zero() {
                self.average_cost = Decimal::ZERO;
            } else if self.inventory.is_sign_positive() != prev.is_sign_positive() {
                self.average_cost = px;
            }
        }

        self.mark_price = Some(px);
        self.trade_count += 1;
        self.volume += qty;
    }

    /// Record a trade where this participant was both buyer and seller
    ///
    /// Cash and inventory net to zero, so only the counters move.
    pub fn apply_self_trade(&mut self, price: u64, quantity: u64) {
        self.mark_price = Some(fixed_to_decimal(price));
        self.trade_count += 1;
        self.volume += fixed_to_decimal(quantity) * Decimal::TWO;
    }

    /// `inventory × (mark − average_cost)`; pure, never stored
    pub fn unrealized_pnl(&self, mark: Decimal) -> Decimal {
        if self.is_flat() {
            return Decimal::ZERO;
        }
        self.inventory * (mark - self.average_cost)
    }

    /// Unrealized P&L at the last seen trade price
    pub fn marked_unrealized_pnl(&self) -> Decimal {
        self.mark_price
            .map(|mark| self.unrealized_pnl(mark))
            .unwrap_or(Decimal::ZERO)
    }

    pub fn total_pnl(&self, mark: Decimal) -> Decimal {
        self.realized_pnl + self.unrealized_pnl(mark)
    }

    /// Cash plus inventory valued at `mark`
    pub fn equity(&self, mark: Decimal) -> Decimal {
        self.cash + self.inventory * mark
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::price::SCALE;

    fn dec(n: i64) -> Decimal {
        Decimal::from(n)
    }

    fn fx(units: u64) -> u64 {
        units * SCALE
    }

    #[test]
    fn test_buy_updates_cash_and_inventory() {
        let mut pos = Position::new(1, dec(1000));
        pos.apply_fill(Side::Buy, fx(10), fx(5));

        assert_eq!(pos.cash, dec(950));
        assert_eq!(pos.inventory, dec(5));
        assert_eq!(pos.average_cost, dec(10));
        assert_eq!(pos.mark_price, Some(dec(10)));
        assert_eq!(pos.trade_count, 1);
    }

    #[test]
    fn test_weighted_average_cost() {
        let mut pos = Position::new(1, Decimal::ZERO);
        pos.apply_fill(Side::Buy, fx(10), fx(1));
        pos.apply_fill(Side::Buy, fx(16), fx(2));

        assert_eq!(pos.inventory, dec(3));
        assert_eq!(pos.average_cost, dec(14));
        assert_eq!(pos.realized_pnl, Decimal::ZERO);
    }

    #[test]
    fn test_partial_close_realizes() {
        let mut pos = Position::new(1, Decimal::ZERO);
        pos.apply_fill(Side::Buy, fx(10), fx(4));
        pos.apply_fill(Side::Sell, fx(13), fx(1));

        assert_eq!(pos.realized_pnl, dec(3));
        assert_eq!(pos.inventory, dec(3));
        assert_eq!(pos.average_cost, dec(10));
    }

    #[test]
    fn test_short_close_realizes() {
        let mut pos = Position::new(1, Decimal::ZERO);
        pos.apply_fill(Side::Sell, fx(20), fx(2));
        pos.apply_fill(Side::Buy, fx(15), fx(2));

        assert_eq!(pos.realized_pnl, dec(10));
        assert!(pos.is_flat());
        assert_eq!(pos.average_cost, Decimal::ZERO);
    }

    #[test]
    fn test_flip_opens_remainder_at_fill_price() {
        let mut pos = Position::new(1, Decimal::ZERO);
        pos.apply_fill(Side::Buy, fx(10), fx(2));
        pos.apply_fill(Side::Sell, fx(12), fx(5));

        assert_eq!(pos.realized_pnl, dec(4));
        assert_eq!(pos.inventory, dec(-3));
        assert_eq!(pos.average_cost, dec(12));
        assert_eq!(pos.unrealized_pnl(dec(11)), dec(3));
    }

    #[test]
    fn test_equity_matches_pnl() {
        let start = dec(1000);
        let mut pos = Position::new(1, start);
        pos.apply_fill(Side::Buy, fx(10), fx(4));
        pos.apply_fill(Side::Sell, fx(12), fx(1));
        pos.apply_fill(Side::Buy, fx(9), fx(3));

        let mark = dec(11);
        assert_eq!(pos.equity(mark) - start, pos.total_pnl(mark));
    }

    #[test]
    fn test_self_trade_is_neutral() {
        let mut pos = Position::new(1, dec(100));
        pos.apply_self_trade(fx(10), fx(1));

        assert_eq!(pos.cash, dec(100));
        assert!(pos.is_flat());
        assert_eq!(pos.trade_count, 1);
    }
}
