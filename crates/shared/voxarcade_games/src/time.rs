#![cfg(feature = "std")]

pub use core::time::Duration;

// `std::time::Instant::now()` can panic on `wasm32-unknown-unknown` depending on
// how the runtime is configured. `web-time` provides a browser-backed monotonic
// clock via `performance.now()`.
#[cfg(target_arch = "wasm32")]
pub use web_time::Instant;

#[cfg(not(target_arch = "wasm32"))]
pub use std::time::Instant;

/// Deadline `ms` milliseconds after `now`.
///
/// All reducer delays (flip-back, playback steps, level advance) are stored as
/// deadlines and fired from `tick`, never slept on.
#[inline]
pub fn after_ms(now: Instant, ms: u64) -> Instant {
    now + Duration::from_millis(ms)
}

/// True once `deadline` has passed (inclusive).
#[inline]
pub fn reached(now: Instant, deadline: Instant) -> bool {
    now >= deadline
}
