//! Exchange facade.
//!
//! - [`Exchange`]: owns the book, engine, ledger and audit journal
//! - [`SharedExchange`]: `Arc<Mutex<Exchange>>` handle for many threads
//! - [`Venue`]: the trading surface drivers and strategies program against
//! - [`AuditLog`]: append-only journal, SSZ-encodable

pub mod audit;
mod market;
mod shared;

pub use audit::{AuditEntry, AuditError, AuditLog, AuditRecord, Checkpoint};
pub use market::{Exchange, OrderRequest, SubmitReport, Venue};
pub use shared::SharedExchange;
