//! Pool-side types and collaborator interfaces.
//!
//! The keeper never talks to a ledger directly: reserve reads, quoting and
//! swap submission sit behind the `ReserveProvider` and `TradeSubmitter`
//! traits. `MockPool` is an in-process constant-product implementation used
//! for paper trading and tests.

mod error;
pub mod mock;
mod traits;
mod types;

pub use error::PoolError;
pub use mock::MockPool;
pub use traits::{ReserveProvider, TradeSubmitter};
pub use types::{PoolReserves, Token, TradeIntent, TxHandle};

#[cfg(test)]
pub use traits::{MockReserveProvider, MockTradeSubmitter};
