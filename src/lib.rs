//! # matchcore
//!
//! In-memory limit order book with strict price-time priority, a
//! deterministic matching engine and a per-participant position ledger.
//!
//! ## Architecture
//!
//! - **Types**: core data structures (Order, Trade, fixed-point prices)
//! - **OrderBook**: bid/ask price levels with slab-based FIFO queues
//! - **Engine**: deterministic matching of limit and market orders
//! - **Ledger**: cash, inventory and P&L updated from trades
//! - **Exchange**: single-writer facade tying the above together
//! - **Strategy**: decision interface plus a reference market maker
//! - **Sim**: seeded driver pitting the market maker against random flow
//!
//! ## Design Principles
//!
//! 1. **Determinism**: identical request streams give identical trades and state roots
//! 2. **No Floating Point**: book math is fixed-point (10^8 scaling), money is `Decimal`
//! 3. **Pre-allocated Memory**: slab allocation for O(1) order operations
//! 4. **Synchronous Execution**: no async and no I/O inside matching
//!
//! ## Example
//!
//! ```
//! use matchcore::exchange::{Exchange, OrderRequest};
//! use matchcore::types::{OrderStatus, Side};
//! use rust_decimal::Decimal;
//!
//! let mut exchange = Exchange::new(Decimal::from(10_000));
//! exchange.submit_order(OrderRequest::limit(1, Side::Buy, 100, 5)).unwrap();
//! let report = exchange.submit_order(OrderRequest::limit(2, Side::Sell, 99, 3)).unwrap();
//!
//! assert_eq!(report.trades[0].price, 100);
//! assert_eq!(report.status(), OrderStatus::Filled);
//! assert_eq!(exchange.snapshot(1).best_bid, Some(100));
//! ```

// ============================================================================
// Module declarations
// ============================================================================

/// Error types shared by the book, engine and exchange
pub mod error;

/// Core data types: Order, Trade, fixed-point prices
pub mod types;

/// Order book: price levels with slab-based storage
pub mod orderbook;

/// Matching engine: deterministic order matching
pub mod engine;

/// Position ledger: cash, inventory and P&L per participant
pub mod ledger;

/// Exchange facade, shared handle and audit journal
pub mod exchange;

/// Strategy interface and reference market maker
pub mod strategy;

/// Simulation configuration
pub mod config;

/// Market maker versus seeded random flow, used by the binary
pub mod sim;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use config::{ConfigError, SimConfig};
pub use engine::{MatchResult, MatchingEngine};
pub use error::BookError;
pub use exchange::{Exchange, OrderRequest, SharedExchange, SubmitReport, Venue};
pub use ledger::{Position, PositionLedger};
pub use orderbook::{BookSnapshot, OrderBook};
pub use strategy::{MarketMaker, OrderIntent, Strategy};
pub use types::{Order, OrderStatus, OrderType, Side, Trade};
