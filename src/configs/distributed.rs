use std::{env, fmt::Display, num::NonZeroUsize, str::FromStr, time::Duration};

use crate::{
    distributed::Rendezvous,
    error::{Result, TrainErr},
};

/// This process's index within the group, set per host by the cluster launcher.
pub const RANK_VAR: &str = "RANK";
pub const WORLD_SIZE_VAR: &str = "WORLD_SIZE";
pub const COORDINATOR_ADDRESS_VAR: &str = "COORDINATOR_ADDRESS";
pub const BOOTSTRAP_TIMEOUT_VAR: &str = "BOOTSTRAP_TIMEOUT_SECS";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Where this process stands in a multi-process run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributedConfig {
    pub rank: usize,
    pub world_size: NonZeroUsize,
    pub coordinator: Option<String>,
    pub timeout: Duration,
}

impl Default for DistributedConfig {
    fn default() -> Self {
        Self {
            rank: 0,
            world_size: NonZeroUsize::MIN,
            coordinator: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl DistributedConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, unset variables take single process defaults.
    ///
    /// # Errors
    /// Returns `TrainErr::InvalidConfig` if a variable does not parse, the rank does not fit the
    /// world size, or a multi-process run lacks a coordinator address.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let rank = parse_var(&lookup, RANK_VAR)?.unwrap_or(defaults.rank);
        let world_size = parse_var(&lookup, WORLD_SIZE_VAR)?.unwrap_or(defaults.world_size);
        let timeout = parse_var(&lookup, BOOTSTRAP_TIMEOUT_VAR)?
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);
        let coordinator = lookup(COORDINATOR_ADDRESS_VAR).filter(|addr| !addr.is_empty());

        if rank >= world_size.get() {
            return Err(TrainErr::InvalidConfig(format!(
                "{RANK_VAR} ({rank}) must be lower than {WORLD_SIZE_VAR} ({world_size})"
            )));
        }

        if world_size.get() > 1 && coordinator.is_none() {
            return Err(TrainErr::InvalidConfig(format!(
                "{COORDINATOR_ADDRESS_VAR} is required when {WORLD_SIZE_VAR} is {world_size}"
            )));
        }

        Ok(Self {
            rank,
            world_size,
            coordinator,
            timeout,
        })
    }

    /// Whether the run consists of this process alone.
    pub fn is_standalone(&self) -> bool {
        self.world_size.get() == 1
    }

    /// Builds the TCP rendezvous for this process.
    pub fn rendezvous(&self) -> Result<Rendezvous> {
        let coordinator = self.coordinator.clone().ok_or_else(|| {
            TrainErr::InvalidConfig(format!("{COORDINATOR_ADDRESS_VAR} is not set"))
        })?;

        Rendezvous::new(coordinator, self.rank, self.world_size.get(), self.timeout)
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim().parse().map_err(|e| {
                TrainErr::InvalidConfig(format!("{key}={raw:?} is not valid: {e}"))
            })
        })
        .transpose()
}
