//! Position ledger.
//!
//! Every trade is applied exactly once, to both counterparties together:
//!
//! - Buyer: `cash -= price × quantity`, `inventory += quantity`
//! - Seller: `cash += price × quantity`, `inventory -= quantity`
//!
//! Money is carried as `rust_decimal::Decimal` in real units.

mod accounts;
mod position;

pub use accounts::{LedgerError, PositionLedger};
pub use position::Position;
