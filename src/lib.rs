//! # Pool Price Keeper
//!
//! A market-making keeper that holds a constant-product AMM pool's implied
//! price in line with an external reference price: when the divergence
//! exceeds a configured tolerance, it computes and submits the minimal swap
//! that moves the pool back within tolerance.
//!
//! ## Architecture
//!
//! - `config`: Configuration management and validation
//! - `pool`: Pool value types, collaborator traits, and the mock pool
//! - `strategy`: The constant-product rebalancer and the cycle driver
//! - `utils`: Fixed-point wad arithmetic and integer square root

pub mod config;
pub mod pool;
pub mod strategy;
pub mod utils;

pub use config::Config;
