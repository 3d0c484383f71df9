/*!
 * Retry and pacing delays.
 *
 * Backoff before retry n+1 is `min(cap, base * 2^(n-1))` plus a uniform
 * jitter in `[jitter_min, jitter_max]`. Randomness comes from a
 * `JitterSource` so tests can substitute a fixed value.
 */

use rand::Rng;
use std::time::Duration;

/// Source of uniformly distributed durations
pub trait JitterSource: Send {
    /// Pick a duration in `[min, max]`
    fn pick(&mut self, min: Duration, max: Duration) -> Duration;
}

/// Jitter backed by the thread-local RNG
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomJitter;

impl JitterSource for RandomJitter {
    fn pick(&mut self, min: Duration, max: Duration) -> Duration {
        if max <= min {
            return min;
        }
        let millis = rand::rng().random_range(min.as_millis() as u64..=max.as_millis() as u64);
        Duration::from_millis(millis)
    }
}

/// Jitter that always returns the same fraction of the range (0.0 = min, 1.0 = max)
#[derive(Debug, Clone, Copy)]
pub struct FixedJitter(pub f64);

impl JitterSource for FixedJitter {
    fn pick(&mut self, min: Duration, max: Duration) -> Duration {
        if max <= min {
            return min;
        }
        min + (max - min).mul_f64(self.0.clamp(0.0, 1.0))
    }
}

/// Retry/backoff configuration for one unit of work
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_retries: u32,
    /// Delay after the first failed attempt, before jitter
    pub base: Duration,
    /// Upper bound of the exponential part
    pub cap: Duration,
    /// Lower bound of the jitter
    pub jitter_min: Duration,
    /// Upper bound of the jitter
    pub jitter_max: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base: Duration::from_millis(350),
            cap: Duration::from_millis(1600),
            jitter_min: Duration::from_millis(80),
            jitter_max: Duration::from_millis(200),
        }
    }
}

impl RetryPolicy {
    /// Policy with the given attempt count and no delays
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            base: Duration::ZERO,
            cap: Duration::ZERO,
            jitter_min: Duration::ZERO,
            jitter_max: Duration::ZERO,
        }
    }

    /// Exponential part of the delay after failed attempt `attempt` (1-based)
    pub fn exponential_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.base
            .checked_mul(1u32 << exponent)
            .unwrap_or(self.cap)
            .min(self.cap)
    }

    /// Full delay after failed attempt `attempt` (1-based), jitter included
    pub fn delay_for_attempt(&self, attempt: u32, jitter: &mut dyn JitterSource) -> Duration {
        self.exponential_delay(attempt) + jitter.pick(self.jitter_min, self.jitter_max)
    }

    /// Whether another attempt is allowed after `attempt` failed attempts
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_retries
    }
}

/// Randomized pause inserted between two chunks
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkDelay {
    pub min: Duration,
    pub max: Duration,
}

impl Default for ChunkDelay {
    fn default() -> Self {
        Self {
            min: Duration::from_millis(300),
            max: Duration::from_millis(500),
        }
    }
}

impl ChunkDelay {
    pub fn pick(&self, jitter: &mut dyn JitterSource) -> Duration {
        jitter.pick(self.min, self.max)
    }
}
