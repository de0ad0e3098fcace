//! Pool Price Keeper - Main Entry Point
//!
//! Runs rebalancing cycles against an in-process mock pool; a real chain
//! backend plugs in behind the `pool` traits.

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use pool_price_keeper::config::Config;
use pool_price_keeper::pool::MockPool;
use pool_price_keeper::strategy::{CycleOutcome, PriceKeeper, RebalanceConfig, Rebalancer};
use pool_price_keeper::utils::Wad;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn, Level};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

/// Pool Price Keeper CLI
#[derive(Parser)]
#[command(name = "pool-price-keeper")]
#[command(version, about = "Price-rebalancing keeper for constant-product AMM pools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single rebalancing cycle and print the outcome as JSON
    Once {
        /// Reference market price of token A in units of token B
        #[arg(short, long)]
        market_price: Decimal,

        /// Override the mock pool's token A reserve (whole tokens)
        #[arg(long)]
        reserve_a: Option<Decimal>,

        /// Override the mock pool's token B reserve (whole tokens)
        #[arg(long)]
        reserve_b: Option<Decimal>,
    },

    /// Poll the pool continuously and rebalance whenever it drifts
    Run {
        /// Reference market price of token A in units of token B
        #[arg(short, long)]
        market_price: Decimal,

        /// Seconds between cycles (defaults to config)
        #[arg(short, long)]
        interval: Option<u64>,

        /// Override the mock pool's token A reserve (whole tokens)
        #[arg(long)]
        reserve_a: Option<Decimal>,

        /// Override the mock pool's token B reserve (whole tokens)
        #[arg(long)]
        reserve_b: Option<Decimal>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging()?;

    let config = Config::load()?;
    config.validate()?;

    match cli.command {
        Commands::Once {
            market_price,
            reserve_a,
            reserve_b,
        } => run_once(&config, market_price, reserve_a, reserve_b).await,
        Commands::Run {
            market_price,
            interval,
            reserve_a,
            reserve_b,
        } => run_loop(&config, market_price, interval, reserve_a, reserve_b).await,
    }
}

/// Build the mock pool from config plus CLI reserve overrides.
fn build_pool(
    config: &Config,
    reserve_a: Option<Decimal>,
    reserve_b: Option<Decimal>,
) -> Result<MockPool> {
    let amount_a = to_wad(reserve_a.unwrap_or(config.pool.initial_reserve_a))
        .context("invalid token A reserve")?;
    let amount_b = to_wad(reserve_b.unwrap_or(config.pool.initial_reserve_b))
        .context("invalid token B reserve")?;
    anyhow::ensure!(
        !amount_a.is_zero() && !amount_b.is_zero(),
        "pool reserves must be positive"
    );

    Ok(MockPool::new(
        config.pool.token_a()?,
        config.pool.token_b()?,
        amount_a,
        amount_b,
    )
    .with_fee_bps(config.pool.fee_bps)
    .with_deadline_secs(config.execution.deadline_secs))
}

fn build_keeper(config: &Config) -> Result<PriceKeeper> {
    let tolerance_percent =
        to_wad(config.keeper.tolerance_percent).context("invalid tolerance_percent")?;
    Ok(PriceKeeper::new(
        Rebalancer::new(RebalanceConfig { tolerance_percent }),
        config.execution.clone(),
    ))
}

fn to_wad(value: Decimal) -> Result<Wad> {
    Wad::from_decimal(value).ok_or_else(|| anyhow!("value out of range: {}", value))
}

async fn run_once(
    config: &Config,
    market_price: Decimal,
    reserve_a: Option<Decimal>,
    reserve_b: Option<Decimal>,
) -> Result<()> {
    let pool = build_pool(config, reserve_a, reserve_b)?;
    let keeper = build_keeper(config)?;
    let market = to_wad(market_price).context("invalid market price")?;

    let outcome = keeper.run_cycle(&pool, &pool, market).await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);

    Ok(())
}

async fn run_loop(
    config: &Config,
    market_price: Decimal,
    interval: Option<u64>,
    reserve_a: Option<Decimal>,
    reserve_b: Option<Decimal>,
) -> Result<()> {
    let pool = build_pool(config, reserve_a, reserve_b)?;
    let keeper = build_keeper(config)?;
    let market = to_wad(market_price).context("invalid market price")?;
    let interval = Duration::from_secs(interval.unwrap_or(config.keeper.poll_interval_secs));

    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Shutdown signal received");
        shutdown_clone.store(true, Ordering::SeqCst);
    });

    let started = Utc::now();
    let mut cycles: u64 = 0;
    let mut trades: u64 = 0;
    let mut errors: u64 = 0;

    info!(
        market = %market,
        interval_secs = interval.as_secs(),
        "Keeper started"
    );

    while !shutdown.load(Ordering::SeqCst) {
        cycles += 1;

        match keeper.run_cycle(&pool, &pool, market).await {
            Ok(CycleOutcome::Rebalanced { intent, tx }) => {
                trades += 1;
                info!(cycle = cycles, %intent, %tx, "Pool rebalanced");
            }
            Ok(CycleOutcome::InBand { pool_price, .. }) => {
                info!(cycle = cycles, pool = %pool_price, "Pool within tolerance");
            }
            Err(e) => {
                errors += 1;
                // Every cycle starts from a fresh snapshot, so transient
                // collaborator failures only cost us this round.
                warn!(cycle = cycles, error = %e, "Cycle failed");
            }
        }

        tokio::time::sleep(interval).await;
    }

    let uptime = Utc::now() - started;
    info!(
        cycles,
        trades,
        errors,
        uptime_secs = uptime.num_seconds(),
        "Keeper stopped"
    );

    Ok(())
}

fn init_logging() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("pool_price_keeper=debug".parse()?)
                .add_directive(Level::INFO.into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .init();

    Ok(())
}
