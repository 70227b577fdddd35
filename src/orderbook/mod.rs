//! Order book module.
//!
//! ## Architecture
//!
//! - **Slab-based storage**: O(1) order insertion, removal, and lookup
//! - **Price levels**: orders grouped by price using BTreeMap
//! - **Price-time priority**: FIFO ordering at each price level
//!
//! ## Components
//!
//! - [`OrderNode`]: wrapper around `Order` with linked-list pointers
//! - [`PriceLevel`]: FIFO queue of orders at a single price
//! - [`OrderBook`]: bid/ask sides plus the structural operations matching needs
//! - [`BookSnapshot`]: read-only top-of-book and depth view
//!
//! ## Performance
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | Insert resting order | O(log n) |
//! | Remove by ID | O(log n) |
//! | Best bid/ask | O(log n) |
//! | Peek front at price | O(log n) |
//!
//! n is the number of distinct price levels on a side.

pub mod node;
pub mod level;
pub mod book;
pub mod snapshot;

pub use node::OrderNode;
pub use level::PriceLevel;
pub use book::OrderBook;
pub use snapshot::{BookSnapshot, LevelDepth};
