use std::time::{Duration, Instant};

/// Events a connection may burst before refills matter.
const BURST: u32 = 20;
/// One slot comes back this often.
const REFILL_EVERY: Duration = Duration::from_secs(1);

/// Per-connection token bucket. Every inbound event spends one slot; a
/// drained bucket means the event is dropped before it reaches a handler.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    slots: u32,
    capacity: u32,
    refill_every: Duration,
    last_refill: Instant,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::with_limits(BURST, REFILL_EVERY)
    }

    pub fn with_limits(capacity: u32, refill_every: Duration) -> Self {
        Self {
            slots: capacity,
            capacity,
            refill_every,
            last_refill: Instant::now(),
        }
    }

    /// Spend one slot if any are available.
    pub fn try_acquire(&mut self) -> bool {
        self.refill();

        if self.slots > 0 {
            self.slots -= 1;
            true
        } else {
            false
        }
    }

    fn refill(&mut self) {
        let elapsed = self.last_refill.elapsed();
        if elapsed < self.refill_every {
            return;
        }
        let regained = (elapsed.as_millis() / self.refill_every.as_millis()) as u32;
        self.slots = self.slots.saturating_add(regained).min(self.capacity);
        self.last_refill = Instant::now();
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
