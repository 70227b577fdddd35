//! Matching engine module.
//!
//! ## Design Principles
//!
//! 1. **Determinism**: same input sequence, same trades and same book
//! 2. **Fixed-Point Math**: no floating-point operations
//! 3. **Synchronous Execution**: no async or I/O inside submit/cancel
//! 4. **Price-Time Priority**: best price first, then FIFO by sequence
//!
//! ## Matching Rules
//!
//! - **Buy orders** match against asks (lowest price first)
//! - **Sell orders** match against bids (highest price first)
//! - **Trade price** is always the resting (maker) order's price
//! - **Limit remainders** rest on the book
//! - **Market remainders** are discarded, never queued
//!
//! ## Example
//!
//! ```
//! use matchcore::engine::MatchingEngine;
//! use matchcore::orderbook::OrderBook;
//! use matchcore::types::{Order, Side};
//!
//! let mut book = OrderBook::with_capacity(1000);
//! let mut engine = MatchingEngine::new();
//!
//! engine.submit(&mut book, Order::limit(1, Side::Sell, 5_000, 100), 0).unwrap();
//! let result = engine.submit(&mut book, Order::limit(2, Side::Buy, 5_000, 100), 1000).unwrap();
//!
//! assert!(result.fully_filled());
//! assert_eq!(result.trades.len(), 1);
//! ```

pub mod matcher;

pub use matcher::{MatchResult, MatchingEngine};
