//! Core data types for the matching engine
//!
//! `Order` and `Trade` implement SSZ serialization for deterministic audit
//! encoding. Prices and quantities use fixed-point representation (scaled
//! by 10^8).
//!
//! ## Types
//!
//! - [`Order`]: an order and its fill state
//! - [`Side`]: Buy or Sell
//! - [`OrderType`]: Limit or Market
//! - [`OrderStatus`]: lifecycle status
//! - [`Trade`]: an executed match between two orders

mod order;
mod trade;
pub mod price;

pub use order::{Order, OrderStatus, OrderType, Side};
pub use trade::Trade;
