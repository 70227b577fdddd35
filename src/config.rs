//! Simulation configuration.
//!
//! Loaded from TOML; every field has a default so an empty file is valid.
//!
//! ```toml
//! rounds = 500
//! seed = 7
//! transaction_cost = "0.01"
//!
//! [market_maker]
//! spread = "1.50"
//! max_inventory = "5"
//!
//! [flow]
//! buy_bias = 0.55
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::price::decimal_to_fixed;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value for `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

fn invalid(field: &'static str, reason: &'static str) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

/// Top-level simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    /// Number of strategy/flow rounds to run
    pub rounds: u64,
    /// Seed for the synthetic order flow
    pub seed: u64,
    /// Depth levels per side in snapshots handed to strategies
    pub depth_levels: usize,
    /// Quote anchor while the book has no price of its own
    pub reference_price: Decimal,
    /// Cash every participant starts with
    pub starting_cash: Decimal,
    /// Fee the market maker pays per unit traded
    pub transaction_cost: Decimal,
    pub market_maker: MarketMakerConfig,
    pub flow: FlowConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            rounds: 1000,
            seed: 42,
            depth_levels: 5,
            reference_price: Decimal::from(100),
            starting_cash: Decimal::from(10_000),
            transaction_cost: Decimal::new(5, 3),
            market_maker: MarketMakerConfig::default(),
            flow: FlowConfig::default(),
        }
    }
}

/// Reference market-maker parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarketMakerConfig {
    /// Distance between bid and ask quotes
    pub spread: Decimal,
    /// Size of each quote
    pub quote_size: Decimal,
    /// Absolute inventory beyond which a side stops quoting
    pub max_inventory: Decimal,
    /// Price shift per unit of inventory, applied against the position
    pub inventory_skew: Decimal,
}

impl Default for MarketMakerConfig {
    fn default() -> Self {
        Self {
            spread: Decimal::from(2),
            quote_size: Decimal::ONE,
            max_inventory: Decimal::from(10),
            inventory_skew: Decimal::new(5, 2),
        }
    }
}

/// Synthetic taker flow used by the demo driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FlowConfig {
    /// Flow orders sent per round
    pub orders_per_round: u32,
    /// Upper bound on a single order's size
    pub max_quantity: Decimal,
    /// Largest random move of the flow's limit price, as a fraction of the reference
    pub max_slippage: Decimal,
    /// Probability that a flow order is a buy
    pub buy_bias: f64,
    /// Fraction of flow orders sent as limits instead of market orders
    pub limit_ratio: f64,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            orders_per_round: 2,
            max_quantity: Decimal::from(3),
            max_slippage: Decimal::new(2, 2),
            buy_bias: 0.5,
            limit_ratio: 0.3,
        }
    }
}

impl SimConfig {
    /// Load and validate a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rounds == 0 {
            return Err(invalid("rounds", "must be positive"));
        }
        if self.depth_levels == 0 {
            return Err(invalid("depth_levels", "must be positive"));
        }
        check_fixed("reference_price", self.reference_price)?;
        if self.starting_cash.is_sign_negative() {
            return Err(invalid("starting_cash", "must not be negative"));
        }
        if self.transaction_cost.is_sign_negative() {
            return Err(invalid("transaction_cost", "must not be negative"));
        }

        self.market_maker.validate()?;
        self.flow.validate()
    }
}

impl MarketMakerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_fixed("market_maker.spread", self.spread)?;
        check_fixed("market_maker.quote_size", self.quote_size)?;
        check_fixed("market_maker.max_inventory", self.max_inventory)?;
        if self.inventory_skew.is_sign_negative() {
            return Err(invalid("market_maker.inventory_skew", "must not be negative"));
        }
        Ok(())
    }
}

impl FlowConfig {
    /// Probabilities must be usable by the random generator as-is
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_fixed("flow.max_quantity", self.max_quantity)?;
        if self.max_slippage.is_sign_negative() || self.max_slippage >= Decimal::ONE {
            return Err(invalid("flow.max_slippage", "must be in [0, 1)"));
        }
        if !(0.0..=1.0).contains(&self.buy_bias) {
            return Err(invalid("flow.buy_bias", "must be a probability"));
        }
        if !(0.0..=1.0).contains(&self.limit_ratio) {
            return Err(invalid("flow.limit_ratio", "must be a probability"));
        }
        Ok(())
    }
}

/// Positive and representable as a fixed-point value
fn check_fixed(field: &'static str, value: Decimal) -> Result<(), ConfigError> {
    match decimal_to_fixed(value) {
        Some(fixed) if fixed > 0 => Ok(()),
        _ => Err(invalid(field, "must be a positive amount with at most 8 decimals")),
    }
}
