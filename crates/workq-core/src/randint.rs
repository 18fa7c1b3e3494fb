//! Uniform random integers for test scaffolding
//!
//! Small xorshift64*-based generator producing integers in a closed range.
//! Stateful but confined to tests and the stress tool; queue and pool logic
//! never consume randomness.

use std::time::{SystemTime, UNIX_EPOCH};

/// Generator of uniform integers in `[min, max]`
pub struct RandInt {
    state: u64,
    min: i64,
    span: u64,
}

impl RandInt {
    /// Create a generator seeded from the system clock
    pub fn new(min: i64, max: i64) -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0x9e3779b97f4a7c15);
        Self::with_seed(min, max, seed)
    }

    /// Create a generator with a fixed seed (deterministic sequences)
    pub fn with_seed(min: i64, max: i64, seed: u64) -> Self {
        assert!(min <= max, "empty range [{}, {}]", min, max);
        Self {
            // xorshift state must be non-zero
            state: seed | 1,
            min,
            span: (max as i128 - min as i128 + 1) as u64,
        }
    }

    /// Produce the next integer uniformly in `[min, max]`
    pub fn next(&mut self) -> i64 {
        // xorshift64*
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        let r = x.wrapping_mul(0x2545f4914f6cdd1d);

        if self.span == 0 {
            // Range covers all of i64
            return r as i64;
        }
        self.min.wrapping_add((r % self.span) as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stays_in_range() {
        let mut rng = RandInt::with_seed(5, 10, 42);
        for _ in 0..10_000 {
            let v = rng.next();
            assert!((5..=10).contains(&v));
        }
    }

    #[test]
    fn test_single_value_range() {
        let mut rng = RandInt::with_seed(7, 7, 42);
        for _ in 0..100 {
            assert_eq!(rng.next(), 7);
        }
    }

    #[test]
    fn test_negative_range() {
        let mut rng = RandInt::with_seed(-10, -1, 42);
        for _ in 0..1000 {
            let v = rng.next();
            assert!((-10..=-1).contains(&v));
        }
    }

    #[test]
    fn test_deterministic_with_seed() {
        let mut a = RandInt::with_seed(0, 1000, 123);
        let mut b = RandInt::with_seed(0, 1000, 123);
        for _ in 0..100 {
            assert_eq!(a.next(), b.next());
        }
    }

    #[test]
    fn test_covers_range() {
        let mut rng = RandInt::with_seed(0, 3, 99);
        let mut seen = [false; 4];
        for _ in 0..1000 {
            seen[rng.next() as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }
}
