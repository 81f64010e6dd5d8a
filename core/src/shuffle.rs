//! Fisher–Yates shuffle driven by a `RandomSource`.
//!
//! Swap structure (fixed, shared by seeded and fresh modes):
//!   for i from len-1 down to 1:
//!     j = floor(unit * (i + 1))
//!     swap(i, j)
//!
//! One draw per swap position. The seeded variant must reproduce the
//! exact same order as every other implementation of the recurrence.

use crate::rng::{RandomSource, SeededLcg};

/// Shuffle `items` in place using draws from `rng`.
pub fn shuffle_in_place<T, R: RandomSource + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.index_below(i + 1);
        items.swap(i, j);
    }
}

/// Return a shuffled copy of `items`. The input is left untouched.
pub fn shuffle_with<T: Clone, R: RandomSource + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut out = items.to_vec();
    shuffle_in_place(&mut out, rng);
    out
}

/// Return a copy of `items` shuffled by the seeded LCG.
/// Same (items, seed) always yields the same order.
pub fn shuffle_seeded<T: Clone>(items: &[T], seed: u64) -> Vec<T> {
    shuffle_with(items, &mut SeededLcg::new(seed))
}
