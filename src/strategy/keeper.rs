//! Rebalancing cycle orchestration.
//!
//! One cycle per pool at a time: snapshot the reserves, ask the rebalancer
//! for a corrective trade, translate it into a slippage-protected intent via
//! a live quote, submit. Cycles are independent; a failed cycle is abandoned
//! and the next one starts from a fresh snapshot.

use crate::config::ExecutionConfig;
use crate::pool::{ReserveProvider, TradeIntent, TradeSubmitter, TxHandle};
use crate::strategy::rebalancer::Rebalancer;
use crate::utils::wad::apply_percent;
use crate::utils::Wad;
use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

/// What a single rebalancing cycle did.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CycleOutcome {
    /// Divergence within tolerance (or trade truncated to dust): no swap.
    InBand {
        pool_price: Wad,
        market_price: Wad,
    },
    /// A corrective swap was submitted.
    Rebalanced {
        intent: TradeIntent,
        tx: TxHandle,
    },
}

/// Drives rebalancing cycles against a pool.
pub struct PriceKeeper {
    rebalancer: Rebalancer,
    execution: ExecutionConfig,
}

impl PriceKeeper {
    pub fn new(rebalancer: Rebalancer, execution: ExecutionConfig) -> Self {
        Self {
            rebalancer,
            execution,
        }
    }

    /// Run one rebalancing cycle with the given market price.
    ///
    /// The minimum output is always derived from the pool's own quote on the
    /// computed input, scaled down by the configured slippage margin; the
    /// rebalancer's theoretical counterpart amount is never used as the
    /// floor.
    pub async fn run_cycle<P, S>(
        &self,
        provider: &P,
        submitter: &S,
        market_price: Wad,
    ) -> Result<CycleOutcome>
    where
        P: ReserveProvider + ?Sized,
        S: TradeSubmitter + ?Sized,
    {
        let reserves = provider
            .fetch_reserves()
            .await
            .context("fetching pool reserves")?;
        let pool_price = reserves.amount_a.wdiv(reserves.amount_b).unwrap_or(Wad::ZERO);

        let Some(shift) = self.rebalancer.evaluate(market_price, &reserves)? else {
            debug!(pool = %pool_price, market = %market_price, "pool within tolerance");
            return Ok(CycleOutcome::InBand {
                pool_price,
                market_price,
            });
        };

        let quote = provider
            .quote_exact_input(shift.sell, shift.input_amount)
            .await
            .context("quoting swap output")?;
        if quote.is_zero() {
            warn!(input = %shift.input_amount, "pool quoted zero output, skipping cycle");
            return Ok(CycleOutcome::InBand {
                pool_price,
                market_price,
            });
        }

        debug!(
            quote = %quote,
            expected = %shift.expected_output,
            "quoted swap output vs theoretical counterpart"
        );

        let min_output = apply_percent(quote, -self.execution.slippage_percent)
            .ok_or_else(|| anyhow!("invalid slippage margin"))?;

        let intent = TradeIntent {
            sell: shift.sell,
            buy: shift.buy,
            input_amount: shift.input_amount,
            min_output,
        };

        info!(
            sell = %intent.sell,
            buy = %intent.buy,
            input = %intent.input_amount,
            min_output = %intent.min_output,
            "submitting rebalancing swap"
        );

        let tx = submitter
            .submit(&intent)
            .await
            .context("submitting rebalancing swap")?;

        info!(tx = %tx, "rebalancing swap submitted");

        Ok(CycleOutcome::Rebalanced { intent, tx })
    }
}
