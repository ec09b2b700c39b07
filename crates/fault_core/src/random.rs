//! Seeded randomness source
//!
//! Each [`Fault`](crate::Fault) and [`RandomInjector`](crate::RandomInjector)
//! owns its own source, so stacking several of them never couples their
//! sequences. The generator sits behind a mutex that is held for one draw only.

use std::{fmt, sync::Arc};

use parking_lot::Mutex;
use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::warn;

/// Seed used when none is configured, keeping runs reproducible
pub const DEFAULT_SEED: u64 = 1;

/// Replacement for the uniform float draw
pub type FloatFn = Arc<dyn Fn() -> f64 + Send + Sync>;

/// Replacement for the uniform index draw, called with the number of choices
pub type IndexFn = Arc<dyn Fn(usize) -> usize + Send + Sync>;

/// Deterministic pseudo-random source
pub struct RandomSource {
    seed: u64,
    rng: Mutex<StdRng>,
    float_fn: Option<FloatFn>,
    index_fn: Option<IndexFn>,
}

impl RandomSource {
    /// Create a source seeded with `seed`
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            float_fn: None,
            index_fn: None,
        }
    }

    /// Replace the float draw, e.g. with a fixed value in tests
    #[must_use]
    pub fn with_float_fn<F>(mut self, f: F) -> Self
    where
        F: Fn() -> f64 + Send + Sync + 'static,
    {
        self.float_fn = Some(Arc::new(f));
        self
    }

    /// Replace the index draw
    #[must_use]
    pub fn with_index_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) -> usize + Send + Sync + 'static,
    {
        self.index_fn = Some(Arc::new(f));
        self
    }

    /// Seed this source was created with
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform float in `[0, 1)`
    pub fn next_float(&self) -> f64 {
        match &self.float_fn {
            Some(f) => f(),
            None => self.rng.lock().random::<f64>(),
        }
    }

    /// Uniform index in `[0, n)`.
    ///
    /// Returns `None` when `n` is zero, or when a replacement index function
    /// answers outside of the range.
    pub fn next_index(&self, n: usize) -> Option<usize> {
        if n == 0 {
            return None;
        }

        let idx = match &self.index_fn {
            Some(f) => f(n),
            None => self.rng.lock().random_range(0..n),
        };

        if idx < n {
            Some(idx)
        } else {
            warn!(index = idx, choices = n, "Random index out of range, ignoring draw");
            None
        }
    }
}

impl Default for RandomSource {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl fmt::Debug for RandomSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomSource")
            .field("seed", &self.seed)
            .field("float_fn", &self.float_fn.is_some())
            .field("index_fn", &self.index_fn.is_some())
            .finish_non_exhaustive()
    }
}
