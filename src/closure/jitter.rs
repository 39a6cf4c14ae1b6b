//! Pluggable jitter for in-shift closure times.
//!
//! Closing every forgotten session at exactly `shift_end` would leave an
//! obviously mechanical timestamp on every row of a shift. The in-shift case
//! therefore offsets the closure by a whole number of minutes drawn from a
//! [`JitterSource`].

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Draws a jitter offset in whole minutes.
pub trait JitterSource: Send + Sync {
    /// Returns an offset in `[min, max]` (inclusive). `min <= max` is
    /// guaranteed by the caller.
    fn offset_minutes(&self, min: i64, max: i64) -> i64;
}

/// Uniform jitter from the thread-local generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomJitter;

impl JitterSource for RandomJitter {
    fn offset_minutes(&self, min: i64, max: i64) -> i64 {
        rand::rng().random_range(min..=max)
    }
}

/// Uniform jitter from a seeded generator, reproducible across runs.
///
/// # Example
///
/// ```
/// use attendance_engine::closure::{JitterSource, SeededJitter};
///
/// let a = SeededJitter::new(7);
/// let b = SeededJitter::new(7);
/// assert_eq!(a.offset_minutes(-15, 30), b.offset_minutes(-15, 30));
/// ```
#[derive(Debug)]
pub struct SeededJitter {
    rng: Mutex<StdRng>,
}

impl SeededJitter {
    /// Creates a generator from `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl JitterSource for SeededJitter {
    fn offset_minutes(&self, min: i64, max: i64) -> i64 {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        rng.random_range(min..=max)
    }
}

/// Always the same offset, clamped into the requested range.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedJitter(pub i64);

impl JitterSource for FixedJitter {
    fn offset_minutes(&self, min: i64, max: i64) -> i64 {
        self.0.clamp(min, max)
    }
}
