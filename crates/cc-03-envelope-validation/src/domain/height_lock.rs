//! # Height-Scoped Critical Section
//!
//! Block validation reads (current height, previous block hash) as one
//! consistent observation. A gossip-received block and a sync-inserted block
//! racing each other must not compute against different views, so the
//! lookup-and-compare runs under a per-height mutex — one lock per height,
//! not a global lock over all validation.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OwnedMutexGuard;

#[derive(Default)]
pub struct HeightLock {
    locks: Mutex<HashMap<u64, Arc<tokio::sync::Mutex<()>>>>,
}

impl HeightLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the critical section for one height. The guard is owned, so
    /// it may be held across awaits while the oracle answers.
    pub async fn acquire(&self, height: u64) -> OwnedMutexGuard<()> {
        let entry = {
            let mut locks = self.locks.lock();
            // Drop entries nobody is waiting on; the map stays bounded by
            // the number of heights in flight.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(height).or_default())
        };
        entry.lock_owned().await
    }

    pub fn heights_in_flight(&self) -> usize {
        self.locks.lock().len()
    }
}
