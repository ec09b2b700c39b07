//! Ordered set of configured faults

use std::{collections::HashSet, sync::Arc};

use fault_core::{Fault, FaultConfig, Handler, SharedReporter};
use tracing::info;

use crate::error::StackError;

/// Names taken by static admin routes, so no fault can use them
pub const RESERVED_NAMES: &[&str] = &["metrics"];

/// Faults applied to the sample routes, outermost first.
///
/// Cheap to clone; clones share the same faults.
#[derive(Debug, Clone, Default)]
pub struct FaultStack {
    faults: Arc<[Fault]>,
}

impl FaultStack {
    pub fn new(faults: Vec<Fault>) -> Result<Self, StackError> {
        let mut names = HashSet::new();
        for fault in &faults {
            if RESERVED_NAMES.contains(&fault.name()) {
                return Err(StackError::ReservedName(fault.name().to_string()));
            }
            if !names.insert(fault.name()) {
                return Err(StackError::DuplicateName(fault.name().to_string()));
            }
        }
        Ok(Self {
            faults: faults.into(),
        })
    }

    /// Build every configured fault. Unnamed faults are called `fault-{index}`.
    pub fn from_configs(
        configs: &[FaultConfig],
        reporter: &SharedReporter,
    ) -> Result<Self, StackError> {
        let faults = configs
            .iter()
            .enumerate()
            .map(|(index, config)| {
                let mut config = config.clone();
                config.name.get_or_insert_with(|| format!("fault-{index}"));
                config
                    .build(reporter)
                    .map_err(|source| StackError::InvalidFault { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        for fault in &faults {
            info!(
                fault = fault.name(),
                injector = fault.injector().name(),
                enabled = fault.is_enabled(),
                participation = fault.participation(),
                "Fault configured"
            );
        }

        Self::new(faults)
    }

    pub fn get(&self, name: &str) -> Option<&Fault> {
        self.faults.iter().find(|fault| fault.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Fault> {
        self.faults.iter()
    }

    pub fn len(&self) -> usize {
        self.faults.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faults.is_empty()
    }

    /// Wrap `next` with every fault; the first fault evaluates first
    pub fn wrap(&self, next: Handler) -> Handler {
        self.faults
            .iter()
            .rev()
            .fold(next, |next, fault| fault.handler(next))
    }
}
