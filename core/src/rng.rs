//! Randomness sources for option shuffling and quiz selection.
//!
//! RULE: shuffling code never reaches for a platform RNG directly.
//! Every draw flows through a `RandomSource`, so fresh mode can be
//! replaced by a reproducible source in tests and tooling.
//!
//! Sources:
//!   - `SeededLcg`:     the deterministic-mode generator. Its recurrence is
//!                      fixed and must match other implementations bit-for-bit.
//!   - `ThreadRandom`:  fresh mode in production.
//!   - `PcgRandom`:     fresh mode with a reproducible stream (runner `--seed`).
//!   - `FixedSequence`: replays canned values (tests).

use rand::{Rng, RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

pub const LCG_MULTIPLIER: u64 = 9301;
pub const LCG_INCREMENT:  u64 = 49297;
pub const LCG_MODULUS:    u64 = 233280;

/// A source of uniformly distributed floats in [0.0, 1.0).
pub trait RandomSource {
    /// Draw the next value in [0.0, 1.0).
    fn next_unit(&mut self) -> f64;

    /// Draw an index in [0, n). `n` must be > 0.
    fn index_below(&mut self, n: usize) -> usize {
        assert!(n > 0, "n must be > 0");
        let idx = (self.next_unit() * n as f64).floor() as usize;
        idx.min(n - 1)
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_unit(&mut self) -> f64 {
        (**self).next_unit()
    }
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn next_unit(&mut self) -> f64 {
        (**self).next_unit()
    }
}

/// Linear-congruential generator: `s' = (s * 9301 + 49297) mod 233280`.
#[derive(Debug, Clone)]
pub struct SeededLcg {
    state: u64,
}

impl SeededLcg {
    pub fn new(seed: u64) -> Self {
        // (s mod m) * a + c is congruent to s * a + c, and cannot overflow.
        Self { state: seed % LCG_MODULUS }
    }

    /// Advance the recurrence and return the new raw state.
    pub fn next_state(&mut self) -> u64 {
        self.state = (self.state * LCG_MULTIPLIER + LCG_INCREMENT) % LCG_MODULUS;
        self.state
    }
}

impl RandomSource for SeededLcg {
    fn next_unit(&mut self) -> f64 {
        self.next_state() as f64 / LCG_MODULUS as f64
    }
}

/// Fresh-mode source backed by the thread-local OS-seeded RNG.
pub struct ThreadRandom {
    inner: rand::rngs::ThreadRng,
}

impl ThreadRandom {
    pub fn new() -> Self {
        Self { inner: rand::thread_rng() }
    }
}

impl Default for ThreadRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for ThreadRandom {
    fn next_unit(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }
}

/// Fresh-mode source with a reproducible PCG stream.
pub struct PcgRandom {
    inner: Pcg64Mcg,
}

impl PcgRandom {
    pub fn new(seed: u64) -> Self {
        Self { inner: Pcg64Mcg::seed_from_u64(seed) }
    }
}

impl RandomSource for PcgRandom {
    fn next_unit(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }
}

/// Replays a fixed list of values, cycling when exhausted.
#[derive(Debug, Clone)]
pub struct FixedSequence {
    values: Vec<f64>,
    pos:    usize,
}

impl FixedSequence {
    /// Values are clamped into [0.0, 1.0). An empty list always yields 0.0.
    pub fn new(values: Vec<f64>) -> Self {
        let values = values
            .into_iter()
            .map(|v| v.clamp(0.0, 1.0 - f64::EPSILON))
            .collect();
        Self { values, pos: 0 }
    }

    pub fn draws(&self) -> usize {
        self.pos
    }
}

impl RandomSource for FixedSequence {
    fn next_unit(&mut self) -> f64 {
        if self.values.is_empty() {
            self.pos += 1;
            return 0.0;
        }
        let v = self.values[self.pos % self.values.len()];
        self.pos += 1;
        v
    }
}
