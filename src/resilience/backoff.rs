//! Exponential backoff with optional jitter.

use rand::Rng;
use std::time::Duration;

/// Delay to wait after the `retry`-th failure (1-based).
///
/// `min(base_ms * 2^(retry - 1), max_ms)`; `retry == 0` means no wait.
pub fn calculate_backoff(retry: u32, base_ms: u64, max_ms: u64) -> Duration {
    if retry == 0 {
        return Duration::from_millis(0);
    }

    let exponential_base = 2u64.saturating_pow(retry - 1);
    let delay_ms = base_ms.saturating_mul(exponential_base);

    Duration::from_millis(delay_ms.min(max_ms))
}

/// Add 0 to 10% random jitter to a delay.
pub fn apply_jitter(delay: Duration) -> Duration {
    let delay_ms = delay.as_millis() as u64;
    let jitter_range = delay_ms / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(delay_ms + jitter)
}
