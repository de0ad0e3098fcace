//! Shared utilities.

pub mod wad;

pub use wad::{isqrt, Wad};
