//! Rebalancing strategy.
//!
//! Contains the core logic for:
//! - Deriving corrective trades from the constant-product invariant
//! - Translating trades into slippage-protected intents
//! - Driving the per-pool rebalancing cycle

mod keeper;
mod rebalancer;

pub use keeper::{CycleOutcome, PriceKeeper};
pub use rebalancer::{RebalanceConfig, RebalanceError, Rebalancer, ReserveShift};
