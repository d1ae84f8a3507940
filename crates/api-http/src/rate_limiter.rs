//! Rate Limiter (Token Bucket Algorithm)
//!
//! Guards job submission. State is a single packed `AtomicU64` so the check
//! never takes a lock on the request path.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Token bucket shared by all submission requests
pub struct RateLimiter {
    // Upper 32 bits: available tokens
    // Lower 32 bits: last refill, ms since `created`
    packed: AtomicU64,
    created: Instant,
    burst: u32,
    rate_per_sec: u32,
}

impl RateLimiter {
    /// # Arguments
    /// * `burst` - Bucket capacity (maximum burst size)
    /// * `rate_per_sec` - Tokens added per second
    ///
    /// A zero `burst` disables limiting.
    pub fn new(burst: u32, rate_per_sec: u32) -> Self {
        Self {
            packed: AtomicU64::new(pack(burst, 0)),
            created: Instant::now(),
            burst,
            rate_per_sec,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.burst > 0
    }

    /// Take one token; `false` when the bucket is empty
    pub fn try_acquire(&self) -> bool {
        if !self.is_enabled() {
            return true;
        }

        loop {
            let current = self.packed.load(Ordering::Acquire);
            let (tokens, last_ms) = unpack(current);

            let now_ms = self.created.elapsed().as_millis().min(u32::MAX as u128) as u32;
            let refill = (u64::from(now_ms.saturating_sub(last_ms)) * u64::from(self.rate_per_sec))
                / 1000;

            // Only move the timestamp forward when at least one token was earned,
            // otherwise frequent calls would starve the refill
            let (available, stamp) = if refill > 0 {
                let filled = (u64::from(tokens) + refill).min(u64::from(self.burst)) as u32;
                (filled, now_ms)
            } else {
                (tokens, last_ms)
            };

            if available == 0 {
                return false;
            }

            let next = pack(available - 1, stamp);
            if self
                .packed
                .compare_exchange(current, next, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                return true;
            }
        }
    }

    /// Tokens currently in the bucket (without refill)
    pub fn remaining(&self) -> u32 {
        unpack(self.packed.load(Ordering::Acquire)).0
    }
}

fn pack(tokens: u32, stamp_ms: u32) -> u64 {
    (u64::from(tokens) << 32) | u64::from(stamp_ms)
}

fn unpack(packed: u64) -> (u32, u32) {
    ((packed >> 32) as u32, (packed & 0xFFFF_FFFF) as u32)
}
