//! Chain injector: runs several injectors in order.

use crate::{
    handler::Handler,
    injector::Injector,
    trail::{self, TrailEntry},
};

/// Sequential composition of injectors.
///
/// `[a, b, c]` behaves like `a(b(c(next)))`: `a` runs first, and any step
/// that does not call its downstream handler halts the chain there.
#[derive(Debug, Clone, Default)]
pub struct ChainInjector {
    steps: Vec<Injector>,
}

impl ChainInjector {
    /// Name used when reporting
    pub const NAME: &'static str = "ChainInjector";

    pub fn new(steps: impl IntoIterator<Item = Injector>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
        }
    }

    pub fn steps(&self) -> &[Injector] {
        &self.steps
    }

    /// Wrap `next` with every step. An empty chain returns `next` unchanged.
    pub fn handler(&self, next: Handler) -> Handler {
        if self.steps.is_empty() {
            return next;
        }

        let chained = self
            .steps
            .iter()
            .rev()
            .fold(next, |next, step| step.handler(next));

        Handler::new(move |mut req| {
            trail::record(&mut req, TrailEntry::Chain);
            chained.handle(req)
        })
    }
}
