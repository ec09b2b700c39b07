//! Declarative fault configuration
//!
//! Serde model for faults and injectors so they can be loaded from files or
//! the environment. Nothing here is usable until compiled with `build`, which
//! applies the same validation as the programmatic builders.

use std::{collections::HashMap, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    error::FaultError,
    fault::Fault,
    injector::{ChainInjector, ErrorInjector, Injector, RandomInjector, RejectInjector, SlowInjector},
    reporter::SharedReporter,
};

/// Declarative form of a [`Fault`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaultConfig {
    /// Name used in logs and by the admin API
    pub name: Option<String>,
    pub enabled: bool,
    pub participation: f64,
    pub path_blocklist: Vec<String>,
    pub path_allowlist: Vec<String>,
    pub header_blocklist: HashMap<String, String>,
    pub header_allowlist: HashMap<String, String>,
    /// Seed for the participation draw
    pub seed: Option<u64>,
    pub injector: Option<InjectorConfig>,
}

impl FaultConfig {
    /// Compile into a validated [`Fault`]
    pub fn build(&self, reporter: &SharedReporter) -> Result<Fault, FaultError> {
        let injector = self
            .injector
            .as_ref()
            .ok_or(FaultError::NilInjector)?
            .build(reporter)?;

        let mut builder = Fault::builder()
            .injector(injector)
            .enabled(self.enabled)
            .participation(self.participation)
            .path_blocklist(self.path_blocklist.iter().cloned())
            .path_allowlist(self.path_allowlist.iter().cloned())
            .header_blocklist(self.header_blocklist.clone())
            .header_allowlist(self.header_allowlist.clone());

        if let Some(name) = &self.name {
            builder = builder.name(name.clone());
        }
        if let Some(seed) = self.seed {
            builder = builder.seed(seed);
        }

        builder.build()
    }
}

/// Declarative form of an [`Injector`], tagged by `kind`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum InjectorConfig {
    Error {
        status: u16,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
    Slow {
        duration_ms: u64,
    },
    Reject,
    Chain {
        steps: Vec<Option<InjectorConfig>>,
    },
    Random {
        choices: Vec<Option<InjectorConfig>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        seed: Option<u64>,
    },
}

impl InjectorConfig {
    /// Label used in error messages
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Error { .. } => "error",
            Self::Slow { .. } => "slow",
            Self::Reject => "reject",
            Self::Chain { .. } => "chain",
            Self::Random { .. } => "random",
        }
    }

    /// Compile into an [`Injector`]; leaf injectors report to `reporter`
    pub fn build(&self, reporter: &SharedReporter) -> Result<Injector, FaultError> {
        let injector: Injector = match self {
            Self::Error { status, text } => {
                let mut injector = ErrorInjector::new(*status)?.with_reporter(reporter.clone());
                if let Some(text) = text {
                    injector = injector.with_status_text(text.clone());
                }
                injector.into()
            },
            Self::Slow { duration_ms } => SlowInjector::new(Duration::from_millis(*duration_ms))
                .with_reporter(reporter.clone())
                .into(),
            Self::Reject => RejectInjector::new().with_reporter(reporter.clone()).into(),
            Self::Chain { steps } => {
                ChainInjector::new(build_entries(self.kind(), steps, reporter)?).into()
            },
            Self::Random { choices, seed } => {
                let mut injector = RandomInjector::new(build_entries(self.kind(), choices, reporter)?);
                if let Some(seed) = seed {
                    injector = injector.with_seed(*seed);
                }
                injector.into()
            },
        };
        Ok(injector)
    }
}

fn build_entries(
    kind: &'static str,
    entries: &[Option<InjectorConfig>],
    reporter: &SharedReporter,
) -> Result<Vec<Injector>, FaultError> {
    if entries.is_empty() {
        return Err(FaultError::EmptyInjectorList { kind });
    }

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            entry
                .as_ref()
                .ok_or(FaultError::NilInjectorEntry { index })?
                .build(reporter)
        })
        .collect()
}
