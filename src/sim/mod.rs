//! Simulation driver used by the `matchcore` binary.
//!
//! Everything here sits on top of the public [`Exchange`](crate::exchange::Exchange)
//! API; the core never depends on it.

mod flow;
mod metrics;
mod runner;

pub use flow::RandomFlow;
pub use metrics::{EquityPoint, PerformanceMetrics};
pub use runner::{RoundSummary, SimSummary, Simulation, FLOW_OWNER, MAKER_OWNER};
