//! Clock and sleep abstraction
//!
//! Polling loops take an injected clock so the finalization state machine is
//! unit-testable without real delays: tests advance a manual clock, the
//! library ships a tokio-backed one.

use async_trait::async_trait;
use std::time::{Duration, Instant};

/// Monotonic time source with suspendable sleep.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Monotonic elapsed time since an arbitrary fixed origin.
    fn now(&self) -> Duration;

    /// Suspend for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Production clock backed by `tokio::time`.
pub struct TokioClock {
    origin: Instant,
}

impl TokioClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
