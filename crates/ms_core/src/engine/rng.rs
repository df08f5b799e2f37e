//! Seeded deterministic random source.
//!
//! Every piece of tick-local randomness (AI stagger, cadence jitter, head
//! movement, scan focus) draws from the one `SimRng` owned by the match
//! state. Two runs with the same seed and the same draw order produce the
//! same stream; nothing in the core touches `thread_rng`.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Match-owned deterministic RNG.
#[derive(Debug, Clone)]
pub struct SimRng {
    seed: u64,
    inner: ChaCha8Rng,
}

impl SimRng {
    pub fn new(seed: u64) -> Self {
        Self { seed, inner: ChaCha8Rng::seed_from_u64(seed) }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform float in `[0, 1)`.
    #[inline]
    pub fn next_f32(&mut self) -> f32 {
        self.inner.gen::<f32>()
    }

    /// Uniform float in `[lo, hi)`.
    #[inline]
    pub fn range_f32(&mut self, lo: f32, hi: f32) -> f32 {
        if hi <= lo {
            return lo;
        }
        self.inner.gen_range(lo..hi)
    }

    /// Uniform integer in `[lo, hi]`.
    #[inline]
    pub fn range_i32(&mut self, lo: i32, hi: i32) -> i32 {
        if hi <= lo {
            return lo;
        }
        self.inner.gen_range(lo..=hi)
    }

    /// Uniform integer in `[lo, hi]`.
    #[inline]
    pub fn range_u32(&mut self, lo: u32, hi: u32) -> u32 {
        if hi <= lo {
            return lo;
        }
        self.inner.gen_range(lo..=hi)
    }

    /// True with probability `p` (clamped to `[0, 1]`).
    #[inline]
    pub fn chance(&mut self, p: f32) -> bool {
        if p <= 0.0 {
            false
        } else if p >= 1.0 {
            true
        } else {
            self.inner.gen::<f32>() < p
        }
    }

    /// Symmetric jitter in `[-spread, +spread]`.
    #[inline]
    pub fn jitter_i32(&mut self, spread: i32) -> i32 {
        if spread <= 0 {
            return 0;
        }
        self.inner.gen_range(-spread..=spread)
    }

    /// Uniform index into a collection of `len` elements. Returns 0 for an
    /// empty collection; callers guard on emptiness themselves.
    #[inline]
    pub fn pick_index(&mut self, len: usize) -> usize {
        if len <= 1 {
            0
        } else {
            self.inner.gen_range(0..len)
        }
    }
}
