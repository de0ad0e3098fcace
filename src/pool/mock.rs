//! In-process constant-product pool for paper trading and tests.

use super::error::PoolError;
use super::traits::{ReserveProvider, TradeSubmitter};
use super::types::{PoolReserves, Token, TradeIntent, TxHandle};
use crate::utils::wad::narrow;
use crate::utils::Wad;
use async_trait::async_trait;
use chrono::Utc;
use ethers_core::types::{H256, U256, U512};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

const BPS_DENOMINATOR: u64 = 10_000;

/// A simulated pool holding two reserves under the `x * y = k` invariant.
///
/// Quotes and executes with the standard router formula
/// `out = in_fee * r_out / (r_in * 10000 + in_fee)` where
/// `in_fee = in * (10000 - fee_bps)`, so fees accrue to the reserves just as
/// they do on-chain.
pub struct MockPool {
    state: Arc<RwLock<PoolReserves>>,
    fee_bps: u64,
    deadline_secs: i64,
    tx_counter: AtomicU64,
}

impl MockPool {
    /// Create a pool with a 0.30% swap fee.
    pub fn new(token_a: Token, token_b: Token, amount_a: Wad, amount_b: Wad) -> Self {
        Self {
            state: Arc::new(RwLock::new(PoolReserves {
                token_a,
                amount_a,
                token_b,
                amount_b,
            })),
            fee_bps: 30,
            deadline_secs: 1000,
            tx_counter: AtomicU64::new(1),
        }
    }

    /// Override the swap fee in basis points.
    pub fn with_fee_bps(mut self, fee_bps: u64) -> Self {
        self.fee_bps = fee_bps;
        self
    }

    /// Override the swap deadline window.
    pub fn with_deadline_secs(mut self, deadline_secs: u64) -> Self {
        self.deadline_secs = deadline_secs as i64;
        self
    }

    /// Current reserves snapshot.
    pub async fn reserves(&self) -> PoolReserves {
        self.state.read().await.clone()
    }

    /// Replace both reserves (simulating external trades against the pool).
    pub async fn set_reserves(&self, amount_a: Wad, amount_b: Wad) {
        let mut state = self.state.write().await;
        state.amount_a = amount_a;
        state.amount_b = amount_b;
        debug!(amount_a = %amount_a, amount_b = %amount_b, "mock reserves replaced");
    }

    /// Fee-aware constant-product output for `input` of `sell`.
    fn amount_out(&self, reserves: &PoolReserves, sell: Token, input: Wad) -> Result<Wad, PoolError> {
        let (reserve_in, reserve_out) = if sell == reserves.token_a {
            (reserves.amount_a, reserves.amount_b)
        } else if sell == reserves.token_b {
            (reserves.amount_b, reserves.amount_a)
        } else {
            return Err(PoolError::Rejected(format!("token {} not in pair", sell)));
        };

        if reserve_in.is_zero() || reserve_out.is_zero() {
            return Err(PoolError::StaleReserves("pool has a zero reserve".into()));
        }
        if input.is_zero() {
            return Ok(Wad::ZERO);
        }

        let fee_factor = U256::from(BPS_DENOMINATOR - self.fee_bps);
        let in_with_fee = input
            .raw()
            .checked_mul(fee_factor)
            .ok_or_else(|| PoolError::Rejected("input amount overflows pool math".into()))?;
        let numerator = in_with_fee.full_mul(reserve_out.raw());
        let denominator = reserve_in
            .raw()
            .checked_mul(U256::from(BPS_DENOMINATOR))
            .and_then(|d| d.checked_add(in_with_fee))
            .ok_or_else(|| PoolError::Rejected("reserves overflow pool math".into()))?;

        // out <= reserve_out, so narrowing cannot fail
        let out = narrow(numerator / U512::from(denominator)).unwrap_or_default();
        Ok(Wad::from_raw(out))
    }
}

#[async_trait]
impl ReserveProvider for MockPool {
    async fn fetch_reserves(&self) -> Result<PoolReserves, PoolError> {
        let reserves = self.state.read().await.clone();
        if reserves.amount_a.is_zero() || reserves.amount_b.is_zero() {
            return Err(PoolError::StaleReserves("pool has a zero reserve".into()));
        }
        Ok(reserves)
    }

    async fn quote_exact_input(&self, sell: Token, input_amount: Wad) -> Result<Wad, PoolError> {
        let reserves = self.state.read().await.clone();
        self.amount_out(&reserves, sell, input_amount)
    }
}

#[async_trait]
impl TradeSubmitter for MockPool {
    async fn submit(&self, intent: &TradeIntent) -> Result<TxHandle, PoolError> {
        let mut state = self.state.write().await;
        let out = self.amount_out(&state, intent.sell, intent.input_amount)?;

        if out < intent.min_output {
            return Err(PoolError::Rejected(format!(
                "output {} below minimum {}",
                out, intent.min_output
            )));
        }

        if intent.sell == state.token_a {
            state.amount_a = state
                .amount_a
                .checked_add(intent.input_amount)
                .ok_or_else(|| PoolError::Rejected("reserve overflow".into()))?;
            state.amount_b = state.amount_b.saturating_sub(out);
        } else {
            state.amount_b = state
                .amount_b
                .checked_add(intent.input_amount)
                .ok_or_else(|| PoolError::Rejected("reserve overflow".into()))?;
            state.amount_a = state.amount_a.saturating_sub(out);
        }

        let id = self.tx_counter.fetch_add(1, Ordering::SeqCst);
        let handle = TxHandle(H256::from_low_u64_be(id));
        let deadline = Utc::now().timestamp() + self.deadline_secs;

        info!(
            tx = %handle,
            input = %intent.input_amount,
            output = %out,
            deadline,
            "mock swap executed"
        );

        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers_core::types::Address;

    fn token(n: u64) -> Token {
        Token::new(Address::from_low_u64_be(n))
    }

    fn pool_1000_1000() -> MockPool {
        MockPool::new(
            token(1),
            token(2),
            Wad::from_int(1000),
            Wad::from_int(1000),
        )
    }

    #[tokio::test]
    async fn test_quote_matches_router_formula() {
        let pool = pool_1000_1000();
        let out = pool
            .quote_exact_input(token(1), Wad::from_int(10))
            .await
            .unwrap();

        // 10 * 9970 * 1000e18 / (1000 * 10000 + 10 * 9970)
        // = 9.87158034397061298...
        assert!(out > Wad::from_decimal(rust_decimal_macros::dec!(9.87)).unwrap());
        assert!(out < Wad::from_decimal(rust_decimal_macros::dec!(9.88)).unwrap());
    }

    #[tokio::test]
    async fn test_quote_zero_fee_is_pure_constant_product() {
        let pool = pool_1000_1000().with_fee_bps(0);
        let out = pool
            .quote_exact_input(token(1), Wad::from_int(1000))
            .await
            .unwrap();
        // Doubling reserve A halves reserve B: out = 500 exactly
        assert_eq!(out, Wad::from_int(500));
    }

    #[tokio::test]
    async fn test_quote_unknown_token_rejected() {
        let pool = pool_1000_1000();
        let err = pool
            .quote_exact_input(token(9), Wad::from_int(1))
            .await
            .unwrap_err();
        assert!(matches!(err, PoolError::Rejected(_)));
    }

    #[tokio::test]
    async fn test_zero_reserve_is_stale() {
        let pool = pool_1000_1000();
        pool.set_reserves(Wad::ZERO, Wad::from_int(1000)).await;
        let err = pool.fetch_reserves().await.unwrap_err();
        assert!(matches!(err, PoolError::StaleReserves(_)));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_submit_applies_swap_to_reserves() {
        let pool = pool_1000_1000();
        let quoted = pool
            .quote_exact_input(token(1), Wad::from_int(50))
            .await
            .unwrap();

        let intent = TradeIntent {
            sell: token(1),
            buy: token(2),
            input_amount: Wad::from_int(50),
            min_output: quoted,
        };
        pool.submit(&intent).await.unwrap();

        let reserves = pool.reserves().await;
        assert_eq!(reserves.amount_a, Wad::from_int(1050));
        assert_eq!(reserves.amount_b, Wad::from_int(1000).saturating_sub(quoted));
    }

    #[tokio::test]
    async fn test_submit_enforces_min_output() {
        let pool = pool_1000_1000();
        let quoted = pool
            .quote_exact_input(token(1), Wad::from_int(50))
            .await
            .unwrap();

        let intent = TradeIntent {
            sell: token(1),
            buy: token(2),
            input_amount: Wad::from_int(50),
            min_output: quoted.checked_add(Wad::from_int(1)).unwrap(),
        };
        let err = pool.submit(&intent).await.unwrap_err();
        assert!(matches!(err, PoolError::Rejected(_)));

        // Reserves untouched on rejection
        let reserves = pool.reserves().await;
        assert_eq!(reserves.amount_a, Wad::from_int(1000));
        assert_eq!(reserves.amount_b, Wad::from_int(1000));
    }

    #[tokio::test]
    async fn test_tx_handles_are_distinct() {
        let pool = pool_1000_1000();
        let intent = TradeIntent {
            sell: token(1),
            buy: token(2),
            input_amount: Wad::from_int(1),
            min_output: Wad::ZERO,
        };
        let first = pool.submit(&intent).await.unwrap();
        let second = pool.submit(&intent).await.unwrap();
        assert_ne!(first, second);
    }
}
