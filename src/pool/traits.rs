//! Collaborator interfaces for reserve reads and trade submission.
//!
//! Implement these to plug in a real chain backend; the keeper only ever
//! talks through them. `MockPool` implements both for paper trading.

use super::error::PoolError;
use super::types::{PoolReserves, Token, TradeIntent, TxHandle};
use crate::utils::Wad;
use async_trait::async_trait;

/// Read access to a pool's reserves and quoting function.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReserveProvider: Send + Sync {
    /// Current reserves of both tokens. Callers must fetch a fresh snapshot
    /// for every rebalancing decision.
    async fn fetch_reserves(&self) -> Result<PoolReserves, PoolError>;

    /// Exact output the pool would deliver right now for the given input,
    /// net of fees.
    async fn quote_exact_input(&self, sell: Token, input_amount: Wad) -> Result<Wad, PoolError>;
}

/// Turns a trade intent into a submitted transaction.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TradeSubmitter: Send + Sync {
    /// Submit the swap. Fails with `Rejected` if execution would deliver
    /// less than the intent's minimum output.
    async fn submit(&self, intent: &TradeIntent) -> Result<TxHandle, PoolError>;
}
