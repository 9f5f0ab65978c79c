//! Deterministic random number generation for effect programs.
//!
//! The board owns one [`GameRng`]; effect programs reach it through the
//! `rand(lo, hi)` builtin. Seeding it from [`BoardConfig`](super::BoardConfig)
//! makes a scripted run reproducible tick for tick.
//!
//! ```
//! use phaseboard::core::GameRng;
//!
//! let mut a = GameRng::new(7);
//! let mut b = GameRng::new(7);
//! assert_eq!(a.roll(1, 6), b.roll(1, 6));
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Deterministic RNG backing the `rand` builtin.
///
/// ChaCha8: fast, and identical across platforms for a given seed.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// The seed this RNG was created with.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Roll an integer in the inclusive range `[lo, hi]`.
    ///
    /// The bounds may be given in either order.
    pub fn roll(&mut self, lo: i64, hi: i64) -> i64 {
        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        self.inner.gen_range(lo..=hi)
    }
}
