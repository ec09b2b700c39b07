//! Per-request record of fault evaluation.
//!
//! Stored in the request extensions so downstream handlers can see which
//! faults looked at the request and what they decided.

use axum::extract::Request;
use serde::Serialize;

/// A single evaluation step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrailEntry {
    /// The fault was disabled
    Disabled,
    /// Policy or participation did not admit the request
    Skipped,
    /// The fault admitted the request and ran its injector
    Injected,
    /// A chain injector ran
    Chain,
    /// A random injector ran
    Random,
    /// A slow injector delayed the request
    Slow,
}

/// Ordered evaluation steps for one request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FaultTrail(pub Vec<TrailEntry>);

impl FaultTrail {
    /// Entries recorded so far
    pub fn entries(&self) -> &[TrailEntry] {
        &self.0
    }

    /// Whether `entry` was recorded
    pub fn contains(&self, entry: TrailEntry) -> bool {
        self.0.contains(&entry)
    }
}

/// Append `entry` to the request's trail
pub(crate) fn record(req: &mut Request, entry: TrailEntry) {
    let extensions = req.extensions_mut();
    match extensions.get_mut::<FaultTrail>() {
        Some(trail) => trail.0.push(entry),
        None => {
            extensions.insert(FaultTrail(vec![entry]));
        },
    }
}
