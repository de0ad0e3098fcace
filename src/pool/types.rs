//! Value types crossing the pool boundary.

use crate::utils::Wad;
use ethers_core::types::{Address, H160, H256};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An opaque, comparable token identity (a 20-byte address).
///
/// The zero address is the native-coin sentinel: it marks the chain's native
/// asset participating directly in a pool, as opposed to its wrapped form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token(Address);

impl Token {
    /// The native-asset sentinel (zero address).
    pub const NATIVE: Token = Token(H160([0u8; 20]));

    pub fn new(address: Address) -> Self {
        Token(address)
    }

    pub fn address(self) -> Address {
        self.0
    }

    pub fn is_native(self) -> bool {
        self.0.is_zero()
    }
}

impl FromStr for Token {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<Address>()
            .map(Token)
            .map_err(|e| format!("invalid token address '{}': {}", s, e))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_native() {
            write!(f, "native")
        } else {
            write!(f, "{:?}", self.0)
        }
    }
}

/// A read-only snapshot of a pool's two reserves.
///
/// Fetched fresh for every rebalancing decision; reserves change every block,
/// so a snapshot is never reused across cycles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolReserves {
    pub token_a: Token,
    pub amount_a: Wad,
    pub token_b: Token,
    pub amount_b: Wad,
}

/// A fully specified swap, produced once per cycle and consumed exactly once.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeIntent {
    pub sell: Token,
    pub buy: Token,
    pub input_amount: Wad,
    /// Slippage-protected output floor, derived from a live pool quote.
    pub min_output: Wad,
}

impl TradeIntent {
    /// Swap path, sell side first.
    pub fn path(&self) -> [Token; 2] {
        [self.sell, self.buy]
    }
}

impl fmt::Display for TradeIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sell {} of {} for {} (min {})",
            self.input_amount, self.sell, self.buy, self.min_output
        )
    }
}

/// Handle to a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TxHandle(pub H256);

impl fmt::Display for TxHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}
