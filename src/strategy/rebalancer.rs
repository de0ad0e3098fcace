//! Constant-product rebalancing logic.
//!
//! Given a pool's reserves, an external reference price and a tolerance band,
//! derives the exact trade that moves the pool's implied price to the
//! reference price under the `reserve_a * reserve_b = k` invariant. Pure
//! arithmetic: no I/O, no state between calls.

use crate::pool::{PoolReserves, Token};
use crate::utils::wad::isqrt;
use crate::utils::Wad;
use ethers_core::types::{U256, U512};
use thiserror::Error;
use tracing::debug;

/// Precondition violations. Always a caller bug, never a business outcome.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RebalanceError {
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
}

/// Tolerance band configuration.
#[derive(Debug, Clone)]
pub struct RebalanceConfig {
    /// Symmetric dead zone around the market price, as a percentage
    /// (`Wad::from_int(1)` == 1%). Divergence at or below this triggers
    /// no trade.
    pub tolerance_percent: Wad,
}

impl Default for RebalanceConfig {
    fn default() -> Self {
        Self {
            tolerance_percent: Wad::from_int(1),
        }
    }
}

/// The reserve movement that realizes the market price exactly.
///
/// `expected_output` is the theoretical counterpart amount from the
/// invariant. It is an approximate floor only: on-chain fees and rounding
/// make it inexact, so the authoritative minimum output must come from the
/// pool's own quote function.
#[derive(Debug, Clone, PartialEq)]
pub struct ReserveShift {
    pub sell: Token,
    pub buy: Token,
    pub input_amount: Wad,
    pub expected_output: Wad,
}

/// Derives rebalancing trades from reserve snapshots.
pub struct Rebalancer {
    config: RebalanceConfig,
}

impl Rebalancer {
    pub fn new(config: RebalanceConfig) -> Self {
        Self { config }
    }

    /// Compare the pool's implied price of token A (in units of token B)
    /// against `market_price` and compute the corrective trade.
    ///
    /// Returns `Ok(None)` when the divergence sits inside the tolerance band
    /// (boundary inclusive) or when the required trade truncates to zero.
    /// `Err(InvalidInput)` on non-positive price or reserves.
    pub fn evaluate(
        &self,
        market_price: Wad,
        reserves: &PoolReserves,
    ) -> Result<Option<ReserveShift>, RebalanceError> {
        if market_price.is_zero() {
            return Err(RebalanceError::InvalidInput("market price must be positive"));
        }
        if reserves.amount_a.is_zero() || reserves.amount_b.is_zero() {
            return Err(RebalanceError::InvalidInput("pool has a zero reserve"));
        }

        let pool_price = reserves
            .amount_a
            .wdiv(reserves.amount_b)
            .filter(|p| !p.is_zero())
            .ok_or(RebalanceError::InvalidInput("pool price out of range"))?;

        // delta = (market / pool - 1) * 100, in wad percent
        let ratio = market_price
            .wdiv(pool_price)
            .ok_or(RebalanceError::InvalidInput("price ratio out of range"))?;
        let one = Wad::ONE.raw();
        let divergence = if ratio.raw() >= one {
            ratio.raw() - one
        } else {
            one - ratio.raw()
        };
        let delta_percent = divergence
            .checked_mul(U256::from(100u64))
            .ok_or(RebalanceError::InvalidInput("price divergence out of range"))?;

        debug!(
            market = %market_price,
            pool = %pool_price,
            delta_percent = %Wad::from_raw(delta_percent),
            "evaluated pool divergence"
        );

        if delta_percent <= self.config.tolerance_percent.raw() {
            return Ok(None);
        }

        // Reserve split realizing the market price exactly:
        // target_a = sqrt(k * price), target_b = sqrt(k / price),
        // computed over the full-width integer product.
        let k = reserves.amount_a.raw().full_mul(reserves.amount_b.raw());
        let wad = U512::from(one);
        let price = U512::from(market_price.raw());

        let scaled_a = k
            .checked_mul(price)
            .ok_or(RebalanceError::InvalidInput("reserves too large"))?;
        let target_a = Wad::from_raw(isqrt(scaled_a / wad));
        let scaled_b = k
            .checked_mul(wad)
            .ok_or(RebalanceError::InvalidInput("reserves too large"))?;
        let target_b = Wad::from_raw(isqrt(scaled_b / price));

        // The A-side target comparison is authoritative for direction; the
        // B-side action follows from the invariant.
        let shift = if target_a > reserves.amount_a {
            // Pool underprices A: sell A into the pool, withdraw B.
            ReserveShift {
                sell: reserves.token_a,
                buy: reserves.token_b,
                input_amount: target_a.saturating_sub(reserves.amount_a),
                expected_output: reserves.amount_b.saturating_sub(target_b),
            }
        } else if target_a < reserves.amount_a {
            ReserveShift {
                sell: reserves.token_b,
                buy: reserves.token_a,
                input_amount: target_b.saturating_sub(reserves.amount_b),
                expected_output: reserves.amount_a.saturating_sub(target_a),
            }
        } else {
            return Ok(None);
        };

        // Truncation just outside the band can round the trade to zero;
        // never emit a zero-amount swap.
        if shift.input_amount.is_zero() {
            return Ok(None);
        }

        Ok(Some(shift))
    }
}
