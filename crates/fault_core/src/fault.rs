//! Admission controller
//!
//! A [`Fault`] wraps one [`Injector`] with policy: a master switch, a
//! participation rate, and path/header allow and block lists. For every request
//! it decides whether the injector runs or the request passes through.
//!
//! `enabled` and `participation` can be changed while requests are in flight.
//! Both live in atomics, so a request sees either the old or the new value of
//! each field, never a torn one. Everything else is fixed at construction.

use std::{
    collections::{HashMap, HashSet},
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
};

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderName},
};
use tracing::debug;

use crate::{
    error::FaultError,
    handler::Handler,
    injector::Injector,
    random::{DEFAULT_SEED, FloatFn, RandomSource},
    trail::{self, TrailEntry},
};

/// Name given to faults built without one
pub const DEFAULT_FAULT_NAME: &str = "fault";

fn validate_participation(participation: f64) -> Result<f64, FaultError> {
    if (0.0..=1.0).contains(&participation) {
        Ok(participation)
    } else {
        Err(FaultError::InvalidParticipation(participation))
    }
}

fn parse_headers(headers: HashMap<String, String>) -> Result<Vec<(HeaderName, String)>, FaultError> {
    headers
        .into_iter()
        .map(|(key, value)| {
            HeaderName::from_bytes(key.as_bytes())
                .map(|name| (name, value))
                .map_err(|_| FaultError::InvalidHeaderName(key))
        })
        .collect()
}

/// True if any pair matches the first value of the request header
fn any_header_matches(headers: &HeaderMap, list: &[(HeaderName, String)]) -> bool {
    list.iter().any(|(name, value)| {
        headers
            .get(name)
            .is_some_and(|actual| actual.as_bytes() == value.as_bytes())
    })
}

struct FaultInner {
    name: String,
    enabled: AtomicBool,
    participation: AtomicU64,
    path_blocklist: HashSet<String>,
    path_allowlist: HashSet<String>,
    header_blocklist: Vec<(HeaderName, String)>,
    header_allowlist: Vec<(HeaderName, String)>,
    injector: Injector,
    random: RandomSource,
}

/// Policy-controlled wrapper around an injector.
///
/// Cloning is cheap and clones share state: toggling one clone affects every
/// handler built from any of them.
#[derive(Clone)]
pub struct Fault {
    inner: Arc<FaultInner>,
}

impl Fault {
    /// Start building a fault
    pub fn builder() -> FaultBuilder {
        FaultBuilder::new()
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn injector(&self) -> &Injector {
        &self.inner.injector
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.enabled.load(Ordering::Acquire)
    }

    /// Turn the fault on or off for subsequent requests
    pub fn set_enabled(&self, enabled: bool) {
        self.inner.enabled.store(enabled, Ordering::Release);
    }

    pub fn participation(&self) -> f64 {
        f64::from_bits(self.inner.participation.load(Ordering::Acquire))
    }

    /// Change the participation rate. Out-of-range values are rejected and the
    /// previous rate stays in effect.
    pub fn set_participation(&self, participation: f64) -> Result<(), FaultError> {
        let participation = validate_participation(participation)?;
        self.inner
            .participation
            .store(participation.to_bits(), Ordering::Release);
        Ok(())
    }

    fn path_allowed(&self, path: &str) -> bool {
        if self.inner.path_blocklist.contains(path) {
            return false;
        }
        self.inner.path_allowlist.is_empty() || self.inner.path_allowlist.contains(path)
    }

    fn headers_allowed(&self, headers: &HeaderMap) -> bool {
        if any_header_matches(headers, &self.inner.header_blocklist) {
            return false;
        }
        self.inner.header_allowlist.is_empty()
            || any_header_matches(headers, &self.inner.header_allowlist)
    }

    /// One participation draw: true with probability `participation`
    pub(crate) fn participate(&self) -> bool {
        self.inner.random.next_float() < self.participation()
    }

    fn admits(&self, req: &Request) -> bool {
        self.path_allowed(req.uri().path())
            && self.headers_allowed(req.headers())
            && self.participate()
    }

    /// Wrap `next`: admitted requests go to the injector, all others to `next`
    pub fn handler(&self, next: Handler) -> Handler {
        let injected = self.inner.injector.handler(next.clone());
        let fault = self.clone();

        Handler::new(move |mut req| {
            if !fault.is_enabled() {
                trail::record(&mut req, TrailEntry::Disabled);
                return next.handle(req);
            }

            if fault.admits(&req) {
                debug!(
                    fault = %fault.inner.name,
                    injector = fault.inner.injector.name(),
                    path = req.uri().path(),
                    "Fault admitted request"
                );
                trail::record(&mut req, TrailEntry::Injected);
                injected.handle(req)
            } else {
                trail::record(&mut req, TrailEntry::Skipped);
                next.handle(req)
            }
        })
    }
}

impl fmt::Debug for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fault")
            .field("name", &self.inner.name)
            .field("enabled", &self.is_enabled())
            .field("participation", &self.participation())
            .field("path_blocklist", &self.inner.path_blocklist)
            .field("path_allowlist", &self.inner.path_allowlist)
            .field("header_blocklist", &self.inner.header_blocklist)
            .field("header_allowlist", &self.inner.header_allowlist)
            .field("injector", &self.inner.injector)
            .field("random", &self.inner.random)
            .finish()
    }
}

/// Builder for [`Fault`]. Nothing is validated until [`FaultBuilder::build`].
pub struct FaultBuilder {
    name: Option<String>,
    injector: Option<Injector>,
    enabled: bool,
    participation: f64,
    path_blocklist: HashSet<String>,
    path_allowlist: HashSet<String>,
    header_blocklist: HashMap<String, String>,
    header_allowlist: HashMap<String, String>,
    seed: u64,
    float_fn: Option<FloatFn>,
}

impl FaultBuilder {
    fn new() -> Self {
        Self {
            name: None,
            injector: None,
            enabled: false,
            participation: 0.0,
            path_blocklist: HashSet::new(),
            path_allowlist: HashSet::new(),
            header_blocklist: HashMap::new(),
            header_allowlist: HashMap::new(),
            seed: DEFAULT_SEED,
            float_fn: None,
        }
    }

    /// Name used in logs and by admin tooling
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Injector to run for admitted requests. Required.
    #[must_use]
    pub fn injector(mut self, injector: impl Into<Injector>) -> Self {
        self.injector = Some(injector.into());
        self
    }

    #[must_use]
    pub const fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Fraction of eligible requests to admit, `0.0..=1.0`
    #[must_use]
    pub const fn participation(mut self, participation: f64) -> Self {
        self.participation = participation;
        self
    }

    /// Exact paths that are never admitted
    #[must_use]
    pub fn path_blocklist<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.path_blocklist = paths.into_iter().map(Into::into).collect();
        self
    }

    /// If non-empty, only these exact paths may be admitted
    #[must_use]
    pub fn path_allowlist<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.path_allowlist = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Header pairs that block admission when any one matches
    #[must_use]
    pub fn header_blocklist<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.header_blocklist = headers
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    /// If non-empty, at least one of these header pairs must match
    #[must_use]
    pub fn header_allowlist<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.header_allowlist = headers
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    /// Seed for the participation draw
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Replace the participation draw; should answer in `[0, 1)`
    #[must_use]
    pub fn float_fn<F>(mut self, f: F) -> Self
    where
        F: Fn() -> f64 + Send + Sync + 'static,
    {
        self.float_fn = Some(Arc::new(f));
        self
    }

    /// Validate and build the fault
    pub fn build(self) -> Result<Fault, FaultError> {
        let injector = self.injector.ok_or(FaultError::NilInjector)?;
        let header_blocklist = parse_headers(self.header_blocklist)?;
        let header_allowlist = parse_headers(self.header_allowlist)?;
        let participation = validate_participation(self.participation)?;

        let mut random = RandomSource::new(self.seed);
        if let Some(f) = self.float_fn {
            random = random.with_float_fn(move || f());
        }

        Ok(Fault {
            inner: Arc::new(FaultInner {
                name: self.name.unwrap_or_else(|| DEFAULT_FAULT_NAME.to_owned()),
                enabled: AtomicBool::new(self.enabled),
                participation: AtomicU64::new(participation.to_bits()),
                path_blocklist: self.path_blocklist,
                path_allowlist: self.path_allowlist,
                header_blocklist,
                header_allowlist,
                injector,
                random,
            }),
        })
    }
}

impl fmt::Debug for FaultBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FaultBuilder")
            .field("name", &self.name)
            .field("injector", &self.injector)
            .field("enabled", &self.enabled)
            .field("participation", &self.participation)
            .field("seed", &self.seed)
            .field("float_fn", &self.float_fn.is_some())
            .finish_non_exhaustive()
    }
}
