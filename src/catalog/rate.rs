use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

/// Enforces a minimum interval between item fetches. Shared across a
/// page's batch so the bounded-parallel mode cannot bypass the rate
/// budget; the interval applies even when the previous item failed.
pub struct RateGate {
    min_interval: Duration,
    next_slot: Mutex<Instant>,
}

impl RateGate {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            next_slot: Mutex::new(Instant::now()),
        }
    }

    /// Claims the next available slot and sleeps until it arrives. The
    /// first caller proceeds immediately.
    pub async fn wait(&self) {
        let slot = {
            let mut next = self.next_slot.lock().await;
            let slot = (*next).max(Instant::now());
            *next = slot + self.min_interval;
            slot
        };
        sleep_until(slot).await;
    }
}
