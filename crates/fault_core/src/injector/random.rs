//! Random injector: runs exactly one of several injectors per request.

use std::{fmt, sync::Arc};

use crate::{
    handler::Handler,
    injector::Injector,
    random::{DEFAULT_SEED, IndexFn, RandomSource},
    trail::{self, TrailEntry},
};

/// Picks one choice uniformly at random for every request.
///
/// Clones start a fresh sequence from the same seed instead of sharing draws
/// with the original.
pub struct RandomInjector {
    choices: Vec<Injector>,
    seed: u64,
    index_fn: Option<IndexFn>,
    random: Arc<RandomSource>,
}

impl RandomInjector {
    /// Name used when reporting
    pub const NAME: &'static str = "RandomInjector";

    pub fn new(choices: impl IntoIterator<Item = Injector>) -> Self {
        Self {
            choices: choices.into_iter().collect(),
            seed: DEFAULT_SEED,
            index_fn: None,
            random: Arc::new(RandomSource::new(DEFAULT_SEED)),
        }
    }

    /// Seed the selection with `seed`
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self.rebuild_source()
    }

    /// Replace the selection draw. It is called with the number of choices and
    /// should answer in `[0, n)`; anything else passes the request through.
    #[must_use]
    pub fn with_index_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) -> usize + Send + Sync + 'static,
    {
        self.index_fn = Some(Arc::new(f));
        self.rebuild_source()
    }

    fn rebuild_source(mut self) -> Self {
        let mut source = RandomSource::new(self.seed);
        if let Some(f) = self.index_fn.clone() {
            source = source.with_index_fn(move |n| f(n));
        }
        self.random = Arc::new(source);
        self
    }

    pub fn choices(&self) -> &[Injector] {
        &self.choices
    }

    /// Wrap `next`. An empty choice list returns `next` unchanged.
    pub fn handler(&self, next: Handler) -> Handler {
        if self.choices.is_empty() {
            return next;
        }

        let handlers: Vec<Handler> = self
            .choices
            .iter()
            .map(|choice| choice.handler(next.clone()))
            .collect();
        let random = Arc::clone(&self.random);

        Handler::new(move |mut req| {
            let selected = random
                .next_index(handlers.len())
                .and_then(|idx| handlers.get(idx));

            match selected {
                Some(handler) => {
                    trail::record(&mut req, TrailEntry::Random);
                    handler.handle(req)
                },
                None => next.handle(req),
            }
        })
    }
}

impl Clone for RandomInjector {
    fn clone(&self) -> Self {
        Self {
            choices: self.choices.clone(),
            seed: self.seed,
            index_fn: self.index_fn.clone(),
            random: Arc::clone(&self.random),
        }
        .rebuild_source()
    }
}

impl fmt::Debug for RandomInjector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomInjector")
            .field("choices", &self.choices)
            .field("random", &self.random)
            .finish_non_exhaustive()
    }
}
