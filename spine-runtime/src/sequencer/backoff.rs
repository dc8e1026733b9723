//! Exponential backoff with jitter for transient-failure retries.

use std::time::Duration;

use rand::Rng;

use spine_core::config::SequencerConfig;

/// Delay before retry `attempt` (1-based): base * 2^(attempt-1),
/// capped, plus up to 50% random jitter so parallel lanes retrying
/// against the same dependency don't thundering-herd it.
pub fn retry_delay(config: &SequencerConfig, attempt: u32) -> Duration {
    let exp = attempt.saturating_sub(1).min(16);
    let base = config
        .backoff_base_ms
        .saturating_mul(1u64 << exp)
        .min(config.backoff_cap_ms);
    let jitter = rand::thread_rng().gen_range(0..=base / 2);
    Duration::from_millis(base + jitter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_grows_and_caps() {
        let config = SequencerConfig {
            backoff_base_ms: 100,
            backoff_cap_ms: 1_000,
            ..Default::default()
        };
        // Jitter adds at most 50%, so bounds are checkable.
        let d1 = retry_delay(&config, 1).as_millis() as u64;
        assert!((100..=150).contains(&d1));
        let d4 = retry_delay(&config, 4).as_millis() as u64;
        assert!((800..=1_200).contains(&d4));
        let d10 = retry_delay(&config, 10).as_millis() as u64;
        assert!(d10 <= 1_500);
    }
}
