//! Bounded-concurrency gate for expensive view-model work.
//!
//! Wraps a semaphore so callers acquire a permit before running factory or
//! encoding work that must not exceed a fixed parallelism. Waiters are served
//! in arrival order, so a burst of requests drains fairly instead of starving
//! early arrivals.

use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::trace;

/// A permit-based gate with a fixed number of concurrent slots.
#[derive(Debug, Clone)]
pub struct ConcurrencyGate {
    semaphore: Arc<Semaphore>,
    limit: usize,
}

impl ConcurrencyGate {
    /// Create a gate admitting at most `limit` concurrent holders.
    pub fn new(limit: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(limit)),
            limit,
        }
    }

    /// The configured concurrency limit.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Slots currently free.
    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Wait for a slot. Waiters are granted permits in the order they called
    /// `acquire`. The permit releases its slot on drop.
    pub async fn acquire(&self) -> GatePermit {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .expect("gate semaphore is never closed");
        trace!(available = self.available_permits(), "Gate permit acquired");
        GatePermit { _permit: permit }
    }

    /// Take a slot only if one is free right now.
    pub fn try_acquire(&self) -> Option<GatePermit> {
        self.semaphore
            .clone()
            .try_acquire_owned()
            .ok()
            .map(|permit| GatePermit { _permit: permit })
    }
}

/// A held slot; dropping it frees the slot for the next waiter.
#[derive(Debug)]
pub struct GatePermit {
    _permit: OwnedSemaphorePermit,
}
