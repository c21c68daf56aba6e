//! Rate Limiter (Token Bucket)
//!
//! Guards mutating routes. Tokens and the refill timestamp share one
//! `AtomicU64` so a request costs a single CAS with no lock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Default burst size
pub const DEFAULT_BURST: u32 = 200;
/// Default tokens added per second
pub const DEFAULT_PER_SECOND: u32 = 100;

/// Token bucket rate limiter
pub struct RateLimiter {
    // Upper 32 bits: tokens
    // Lower 32 bits: last refill, ms since `started`
    packed: AtomicU64,
    started: Instant,
    max_tokens: u32,
    refill_rate: u32, // tokens per second
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_BURST, DEFAULT_PER_SECOND)
    }
}

impl RateLimiter {
    /// Allow `refill_rate` requests/sec with bursts up to `max_tokens`
    pub fn new(max_tokens: u32, refill_rate: u32) -> Self {
        Self {
            packed: AtomicU64::new((max_tokens as u64) << 32),
            started: Instant::now(),
            max_tokens,
            refill_rate,
        }
    }

    fn now_ms(&self) -> u32 {
        // Wraps after ~49 days; `wrapping_sub` below keeps deltas correct
        self.started.elapsed().as_millis() as u32
    }

    /// Consume one token; false when the caller should be throttled
    pub fn check(&self) -> bool {
        loop {
            let packed = self.packed.load(Ordering::Acquire);
            let tokens = (packed >> 32) as u32;
            let last_refill_ms = (packed & 0xFFFF_FFFF) as u32;

            let now_ms = self.now_ms();
            let delta_ms = now_ms.wrapping_sub(last_refill_ms) as u64;

            let added = delta_ms * self.refill_rate as u64 / 1000;
            let (tokens, refill_ms) = if tokens as u64 + added >= self.max_tokens as u64 {
                (self.max_tokens, now_ms)
            } else if added == 0 {
                // Keep the partial interval for the next call
                (tokens, last_refill_ms)
            } else {
                // Advance only by the time the whole tokens cost
                let used_ms = (added * 1000 / self.refill_rate.max(1) as u64) as u32;
                (tokens + added as u32, last_refill_ms.wrapping_add(used_ms))
            };

            if tokens == 0 {
                return false;
            }

            let next = (((tokens - 1) as u64) << 32) | refill_ms as u64;
            if self
                .packed
                .compare_exchange(packed, next, Ordering::Release, Ordering::Acquire)
                .is_ok()
            {
                return true;
            }
        }
    }

    /// Tokens left before refill is applied
    pub fn remaining(&self) -> u32 {
        (self.packed.load(Ordering::Acquire) >> 32) as u32
    }
}
