use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct RateGateConfig {
    /// Minimum spacing between two provider calls.
    pub min_interval: Duration,
}

impl RateGateConfig {
    /// Derive the spacing from a requests-per-minute ceiling.
    ///
    /// Zero means unlimited. Negative or non-finite ceilings are rejected.
    pub fn from_rpm(rpm: f64) -> Option<Self> {
        if !rpm.is_finite() || rpm < 0.0 {
            return None;
        }
        let min_interval = if rpm == 0.0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(60.0 / rpm)
        };
        Some(Self { min_interval })
    }

    pub fn from_interval(min_interval: Duration) -> Self {
        Self { min_interval }
    }
}

/// Minimum-interval gate in front of provider calls.
///
/// Each acquirer reserves the next free slot while holding the lock, then
/// sleeps until its slot without blocking others. Two concurrent acquirers
/// therefore never proceed within the same interval, and slots are handed out
/// in arrival order.
///
/// One gate per [`crate::embeddings::EmbeddingClient`] instance; independent
/// clients never interfere with each other.
#[derive(Debug)]
pub struct RateGate {
    min_interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl RateGate {
    pub fn new(cfg: RateGateConfig) -> Self {
        Self {
            min_interval: cfg.min_interval,
            next_slot: Mutex::new(None),
        }
    }

    /// Wait until the next call slot is free.
    pub async fn acquire(&self) {
        if self.min_interval.is_zero() {
            return;
        }
        let slot = {
            let mut next = self.next_slot.lock().await;
            let now = Instant::now();
            let slot = match *next {
                Some(at) if at > now => at,
                _ => now,
            };
            *next = Some(slot + self.min_interval);
            slot
        };
        tokio::time::sleep_until(slot).await;
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}
