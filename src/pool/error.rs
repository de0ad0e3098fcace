//! Failure taxonomy for pool collaborators.

use thiserror::Error;

/// Errors surfaced by reserve providers and trade submitters.
///
/// The rebalancing core never observes these: a failed cycle is abandoned and
/// the next one starts from a fresh reserve snapshot. Nothing here is retried
/// against a stale snapshot.
#[derive(Debug, Error)]
pub enum PoolError {
    /// Node or network unreachable.
    #[error("pool unreachable: {0}")]
    Unavailable(String),

    /// Reserves momentarily zero or invalid during a pool state transition.
    #[error("stale reserves: {0}")]
    StaleReserves(String),

    /// Execution reverted or was refused (insufficient balance/allowance,
    /// output below the minimum).
    #[error("trade rejected: {0}")]
    Rejected(String),

    /// Signing or broadcast failure.
    #[error("submission failed: {0}")]
    Submission(String),
}

impl PoolError {
    /// Transient failures clear on their own with fresh polling.
    pub fn is_transient(&self) -> bool {
        matches!(self, PoolError::Unavailable(_) | PoolError::StaleReserves(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(PoolError::Unavailable("timeout".into()).is_transient());
        assert!(PoolError::StaleReserves("mid-migration".into()).is_transient());
        assert!(!PoolError::Rejected("below min output".into()).is_transient());
        assert!(!PoolError::Submission("bad signature".into()).is_transient());
    }
}
