//! Configuration management for the pool price keeper.
//!
//! Loads settings from environment variables and config files.

use crate::pool::Token;
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Pool pair and mock seeding
    #[serde(default)]
    pub pool: PoolConfig,
    /// Rebalancing parameters
    #[serde(default)]
    pub keeper: KeeperConfig,
    /// Execution parameters
    #[serde(default)]
    pub execution: ExecutionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Address of token A (hex). The zero address is the native coin.
    #[serde(default = "default_token_a")]
    pub token_a: String,
    /// Address of token B (hex)
    #[serde(default = "default_token_b")]
    pub token_b: String,
    /// Initial token A reserve for the mock pool, in whole tokens
    #[serde(default = "default_initial_reserve")]
    pub initial_reserve_a: Decimal,
    /// Initial token B reserve for the mock pool, in whole tokens
    #[serde(default = "default_initial_reserve")]
    pub initial_reserve_b: Decimal,
    /// Swap fee in basis points (30 = 0.30%)
    #[serde(default = "default_fee_bps")]
    pub fee_bps: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeeperConfig {
    /// Dead zone around the market price, in percent (1 = 1%)
    #[serde(default = "default_tolerance_percent")]
    pub tolerance_percent: Decimal,
    /// Seconds between reserve polls in continuous mode
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Slippage margin applied below the live quote, in percent (0.5 = 0.5%)
    #[serde(default = "default_slippage_percent")]
    pub slippage_percent: Decimal,
    /// Swap deadline, seconds from submission
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,
}

// Default value functions
fn default_token_a() -> String {
    // DAI
    "0x6B175474E89094C44Da98b954EedeAC495271d0F".to_string()
}

fn default_token_b() -> String {
    // WETH
    "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2".to_string()
}

fn default_initial_reserve() -> Decimal {
    Decimal::new(1000, 0)
}

fn default_fee_bps() -> u64 {
    30
}

fn default_tolerance_percent() -> Decimal {
    Decimal::ONE // 1%
}

fn default_poll_interval() -> u64 {
    15
}

fn default_slippage_percent() -> Decimal {
    Decimal::new(5, 1) // 0.5%
}

fn default_deadline_secs() -> u64 {
    1000
}

impl Config {
    /// Load configuration from environment variables and config files.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::default().separator("__").prefix("PPK"))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        let token_a = self.pool.token_a()?;
        let token_b = self.pool.token_b()?;
        anyhow::ensure!(token_a != token_b, "pool tokens must be distinct");

        anyhow::ensure!(
            self.pool.initial_reserve_a > Decimal::ZERO
                && self.pool.initial_reserve_b > Decimal::ZERO,
            "initial reserves must be positive"
        );

        anyhow::ensure!(self.pool.fee_bps < 10_000, "fee_bps must be below 10000");

        anyhow::ensure!(
            self.keeper.tolerance_percent >= Decimal::ZERO,
            "tolerance_percent must be non-negative"
        );

        anyhow::ensure!(
            self.execution.slippage_percent >= Decimal::ZERO
                && self.execution.slippage_percent < Decimal::ONE_HUNDRED,
            "slippage_percent must be in [0, 100)"
        );

        anyhow::ensure!(
            self.keeper.poll_interval_secs >= 1,
            "poll_interval_secs must be at least 1"
        );

        Ok(())
    }
}

impl PoolConfig {
    pub fn token_a(&self) -> Result<Token> {
        self.token_a
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))
            .context("pool.token_a")
    }

    pub fn token_b(&self) -> Result<Token> {
        self.token_b
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))
            .context("pool.token_b")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pool: PoolConfig::default(),
            keeper: KeeperConfig::default(),
            execution: ExecutionConfig::default(),
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            token_a: default_token_a(),
            token_b: default_token_b(),
            initial_reserve_a: default_initial_reserve(),
            initial_reserve_b: default_initial_reserve(),
            fee_bps: default_fee_bps(),
        }
    }
}

impl Default for KeeperConfig {
    fn default() -> Self {
        Self {
            tolerance_percent: default_tolerance_percent(),
            poll_interval_secs: default_poll_interval(),
        }
    }
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            slippage_percent: default_slippage_percent(),
            deadline_secs: default_deadline_secs(),
        }
    }
}
