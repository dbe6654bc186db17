//! Seedable, non-cryptographic random source.
//!
//! Components that need randomness receive a [`RandomSource`] at
//! construction instead of reaching for a global engine, so a fixed seed
//! reproduces the same draws, the same shuffles and the same trained
//! parameters.

use rand::{Rng, RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use std::time::{SystemTime, UNIX_EPOCH};

pub trait RandomSource {
    /// Uniform draw in `[0, 1)`.
    fn next_double(&mut self) -> f64;

    /// Uniform draw over the full `u64` range.
    fn next_long(&mut self) -> u64;

    fn next_double_max(&mut self, max: f64) -> f64 {
        self.next_double() * max
    }

    fn next_double_range(&mut self, min: f64, max: f64) -> f64 {
        self.next_double() * (max - min) + min
    }

    /// Unbiased draw in `[0, max)` by rejection over [`next_long`]. `max`
    /// must be positive.
    ///
    /// [`next_long`]: RandomSource::next_long
    fn next_long_max(&mut self, max: u64) -> u64 {
        assert!(max > 0, "next_long_max: max must be positive");
        // 2^64 mod max; draws below it fall in the short last bucket
        let threshold = max.wrapping_neg() % max;
        loop {
            let r = self.next_long();
            if r >= threshold {
                return r % max;
            }
        }
    }

    /// Draw in `[min, max)`. Requires `min < max`.
    fn next_long_range(&mut self, min: u64, max: u64) -> u64 {
        assert!(min < max, "next_long_range: empty range [{}, {})", min, max);
        min + self.next_long_max(max - min)
    }

    fn fill_double(&mut self, buf: &mut [f64]) {
        for x in buf.iter_mut() {
            *x = self.next_double();
        }
    }

    fn fill_double_max(&mut self, buf: &mut [f64], max: f64) {
        for x in buf.iter_mut() {
            *x = self.next_double_max(max);
        }
    }

    fn fill_double_range(&mut self, buf: &mut [f64], min: f64, max: f64) {
        for x in buf.iter_mut() {
            *x = self.next_double_range(min, max);
        }
    }

    /// Fisher-Yates shuffle.
    fn shuffle<T>(&mut self, data: &mut [T]) {
        for i in (1..data.len()).rev() {
            let j = self.next_long_max(i as u64 + 1) as usize;
            data.swap(i, j);
        }
    }

    /// Fisher-Yates shuffle applying the same permutation to both slices.
    fn shuffle_pairs<A, B>(&mut self, a: &mut [A], b: &mut [B]) {
        assert_eq!(
            a.len(),
            b.len(),
            "shuffle_pairs: slices differ in length ({} vs {})",
            a.len(),
            b.len()
        );
        for i in (1..a.len()).rev() {
            let j = self.next_long_max(i as u64 + 1) as usize;
            a.swap(i, j);
            b.swap(i, j);
        }
    }
}

/// Default [`RandomSource`], a xoshiro256++ generator.
#[derive(Debug, Clone)]
pub struct Random {
    rng: Xoshiro256PlusPlus,
}

impl Random {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
        }
    }

    /// Seeded from the wall clock; not reproducible.
    pub fn from_time() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos() as u64;
        Self::new(nanos)
    }

    pub fn reseed(&mut self, seed: u64) {
        self.rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    }
}

impl RandomSource for Random {
    fn next_double(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    fn next_long(&mut self) -> u64 {
        self.rng.next_u64()
    }
}
