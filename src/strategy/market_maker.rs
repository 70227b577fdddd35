//! Inventory-aware two-sided quoting.

use rust_decimal::Decimal;

use crate::config::MarketMakerConfig;
use crate::ledger::Position;
use crate::orderbook::BookSnapshot;
use crate::strategy::{OrderIntent, Strategy};
use crate::types::price::{decimal_to_fixed, fixed_to_decimal};
use crate::types::Side;

/// Quotes one bid and one ask around the book's reference price.
///
/// Both quotes shift by `-inventory × inventory_skew`, so a long maker
/// quotes lower (more eager to sell) and a short one higher. A side is not
/// quoted when filling it would take inventory past `max_inventory`.
#[derive(Debug, Clone)]
pub struct MarketMaker {
    config: MarketMakerConfig,
    fallback_price: Decimal,
}

impl MarketMaker {
    /// `fallback_price` anchors quotes while the book has no price at all
    pub fn new(config: MarketMakerConfig, fallback_price: Decimal) -> Self {
        Self {
            config,
            fallback_price,
        }
    }

    pub fn config(&self) -> &MarketMakerConfig {
        &self.config
    }

    /// Quote center after the inventory penalty
    pub fn skewed_center(&self, snapshot: &BookSnapshot, position: &Position) -> Decimal {
        let reference = snapshot
            .reference_price()
            .map(fixed_to_decimal)
            .unwrap_or(self.fallback_price);
        reference - position.inventory * self.config.inventory_skew
    }
}

impl Strategy for MarketMaker {
    fn name(&self) -> &str {
        "market-maker"
    }

    fn decide(&mut self, snapshot: &BookSnapshot, position: &Position) -> Vec<OrderIntent> {
        let Some(quantity) = decimal_to_fixed(self.config.quote_size).filter(|q| *q > 0) else {
            return Vec::new();
        };
        let center = self.skewed_center(snapshot, position);
        let half_spread = self.config.spread / Decimal::TWO;
        let size = self.config.quote_size;
        let limit = self.config.max_inventory;

        let mut intents = Vec::with_capacity(2);
        if position.inventory + size <= limit {
            if let Some(bid) = decimal_to_fixed(center - half_spread).filter(|p| *p > 0) {
                intents.push(OrderIntent::limit(Side::Buy, bid, quantity));
            }
        }
        if position.inventory - size >= -limit {
            if let Some(ask) = decimal_to_fixed(center + half_spread).filter(|p| *p > 0) {
                intents.push(OrderIntent::limit(Side::Sell, ask, quantity));
            }
        }
        intents
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orderbook::LevelDepth;
    use crate::types::price::SCALE;
    use crate::types::OrderType;

    fn maker() -> MarketMaker {
        MarketMaker::new(MarketMakerConfig::default(), Decimal::from(100))
    }

    fn book(bid: u64, ask: u64) -> BookSnapshot {
        BookSnapshot {
            best_bid: Some(bid * SCALE),
            best_ask: Some(ask * SCALE),
            bids: vec![LevelDepth { price: bid * SCALE, quantity: SCALE, order_count: 1 }],
            asks: vec![LevelDepth { price: ask * SCALE, quantity: SCALE, order_count: 1 }],
            last_trade_price: None,
        }
    }

    fn position(inventory: i64) -> Position {
        let mut pos = Position::new(1, Decimal::from(10_000));
        pos.inventory = Decimal::from(inventory);
        pos
    }

    #[test]
    fn test_flat_quotes_symmetric_around_mid() {
        let intents = maker().decide(&book(99, 103), &position(0));

        assert_eq!(
            intents,
            vec![
                OrderIntent::limit(Side::Buy, 100 * SCALE, SCALE),
                OrderIntent::limit(Side::Sell, 102 * SCALE, SCALE),
            ]
        );
        assert!(intents.iter().all(|i| i.kind == OrderType::Limit));
    }

    #[test]
    fn test_empty_book_uses_fallback() {
        let intents = maker().decide(&BookSnapshot::default(), &position(0));
        assert_eq!(intents[0].price, Some(99 * SCALE));
        assert_eq!(intents[1].price, Some(101 * SCALE));
    }

    #[test]
    fn test_long_inventory_skews_quotes_down() {
        // 4 long × 0.05 skew = 0.20 lower
        let intents = maker().decide(&book(99, 103), &position(4));
        assert_eq!(intents[0].price, Some(9_980_000_000));
        assert_eq!(intents[1].price, Some(10_180_000_000));
    }

    #[test]
    fn test_inventory_limit_drops_one_side() {
        let mut mm = maker();

        let long = mm.decide(&book(99, 103), &position(10));
        assert_eq!(long.len(), 1);
        assert_eq!(long[0].side, Side::Sell);

        let short = mm.decide(&book(99, 103), &position(-10));
        assert_eq!(short.len(), 1);
        assert_eq!(short[0].side, Side::Buy);
    }

    #[test]
    fn test_intent_into_request() {
        let request = OrderIntent::market(Side::Sell, 5).into_request(9);
        assert_eq!(request.owner_id, 9);
        assert_eq!(request.kind, OrderType::Market);
        assert_eq!(request.price, None);
    }
}
