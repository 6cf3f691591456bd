//! Random number generation for winner draws.
//!
//! RULE: draws never use a comparator-based random sort. Sampling is a
//! partial Fisher–Yates over the eligible list, and the bounded sampler
//! uses rejection so every index is equally likely.
//!
//! Production draws are entropy-seeded. Tests and demos may pin the
//! stream with [`DrawRng::seeded`] to make a draw reproducible.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

pub struct DrawRng {
    inner: Pcg64Mcg,
}

impl DrawRng {
    /// Entropy-seeded stream for real draws.
    pub fn from_entropy() -> Self {
        Self {
            inner: Pcg64Mcg::from_entropy(),
        }
    }

    /// Fixed-seed stream for reproducible draws.
    pub fn seeded(seed: u64) -> Self {
        Self {
            inner: Pcg64Mcg::seed_from_u64(seed),
        }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    /// Uniform draw in [0, n). Rejection sampling: a bare modulo would
    /// favour low values whenever n does not divide 2^64.
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        let threshold = n.wrapping_neg() % n; // 2^64 mod n
        loop {
            let v = self.inner.next_u64();
            if v >= threshold {
                return v % n;
            }
        }
    }

    /// Partial Fisher–Yates: after the call, items[..k] holds k distinct
    /// elements drawn without replacement, in draw order. Elements past
    /// k are left in unspecified order.
    pub fn partial_shuffle<T>(&mut self, items: &mut [T], k: usize) {
        let n = items.len();
        for i in 0..k.min(n) {
            let j = i + self.next_u64_below((n - i) as u64) as usize;
            items.swap(i, j);
        }
    }
}
