//! Seeded random taker flow.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;

use crate::config::{ConfigError, FlowConfig};
use crate::strategy::OrderIntent;
use crate::types::price::{decimal_to_fixed, SCALE};
use crate::types::Side;

/// Smallest size step the flow trades in (0.01)
const LOT: u64 = SCALE / 100;

/// Random market and limit orders around a reference price.
///
/// The same seed always yields the same sequence of intents.
#[derive(Debug, Clone)]
pub struct RandomFlow {
    config: FlowConfig,
    rng: ChaCha8Rng,
    generated: u64,
}

impl RandomFlow {
    /// Fails if `config` holds values the generator cannot sample from
    pub fn new(config: FlowConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
            generated: 0,
        })
    }

    pub fn generated(&self) -> u64 {
        self.generated
    }

    /// Next order; `None` if the config or reference cannot produce one
    pub fn next_intent(&mut self, reference: Decimal) -> Option<OrderIntent> {
        let side = if self.rng.gen_bool(self.config.buy_bias) {
            Side::Buy
        } else {
            Side::Sell
        };

        let max = decimal_to_fixed(self.config.max_quantity)?;
        let steps = max / LOT;
        let quantity = if steps == 0 {
            max
        } else {
            self.rng.gen_range(1..=steps) * LOT
        };
        if quantity == 0 {
            return None;
        }

        let intent = if self.rng.gen_bool(self.config.limit_ratio) {
            let price = self.limit_price(reference)?;
            OrderIntent::limit(side, price, quantity)
        } else {
            OrderIntent::market(side, quantity)
        };
        self.generated += 1;
        Some(intent)
    }

    /// Uniform in `reference × (1 ± max_slippage)`, on a 0.01 tick
    fn limit_price(&mut self, reference: Decimal) -> Option<u64> {
        let slip_bps = (self.config.max_slippage * Decimal::from(10_000)).to_i64()?;
        let offset_bps = self.rng.gen_range(-slip_bps..=slip_bps);
        let price = reference * Decimal::from(10_000 + offset_bps) / Decimal::from(10_000);
        decimal_to_fixed(price.round_dp(2)).filter(|p| *p > 0)
    }
}
