// SPDX-License-Identifier: GPL-3.0-only
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Uniform random numbers in `[0, 1)`.
///
/// Every random decision the classifier makes goes through this trait so a
/// session can be replayed exactly from a seed.
pub trait RandomSource: Send {
    fn next_unit(&mut self) -> f64;

    /// Uniform index in `0..len`. `len` must be non-zero.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    fn next_index(&mut self, len: usize) -> usize {
        let index = (self.next_unit() * len as f64).floor() as usize;
        index.min(len.saturating_sub(1))
    }
}

/// Reproducible source backed by `StdRng`.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_unit(&mut self) -> f64 {
        self.rng.r#gen::<f64>()
    }
}

/// Source seeded from operating system entropy.
#[derive(Debug, Clone)]
pub struct EntropyRandom {
    rng: StdRng,
}

impl Default for EntropyRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl EntropyRandom {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl RandomSource for EntropyRandom {
    fn next_unit(&mut self) -> f64 {
        self.rng.r#gen::<f64>()
    }
}
