//! Cluster inventories: named groups of hosts a run can be spread over.
//!
//! ```yaml
//! my-cluster:
//!   user: trainer
//!   identity_file: ~/.ssh/id_ed25519
//!   hosts: [10.0.0.1, 10.0.0.2]
//! ```

use std::{
    collections::BTreeMap,
    fs,
    net::{IpAddr, SocketAddr},
    path::{Path, PathBuf},
};

use log::{info, warn};
use serde::Deserialize;

use super::distributed::{
    DistributedConfig, COORDINATOR_ADDRESS_VAR, RANK_VAR, WORLD_SIZE_VAR,
};
use crate::error::{Result, TrainErr};

/// A port for rank zero to listen at, inventories only name hosts.
pub const DEFAULT_COORDINATOR_PORT: u16 = 8476;

#[derive(Debug, Deserialize)]
struct RawCluster {
    #[serde(default)]
    user: String,
    #[serde(default)]
    identity_file: Option<PathBuf>,
    #[serde(default)]
    hosts: Vec<String>,
}

/// A named group of hosts, the first one coordinates the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    user: String,
    identity_file: Option<PathBuf>,
    hosts: Vec<IpAddr>,
}

impl Cluster {
    fn from_raw(name: &str, raw: RawCluster) -> Option<Self> {
        if raw.hosts.is_empty() {
            warn!("expected cluster {name} to have at least 1 host, got 0");
            return None;
        }

        let mut hosts = Vec::with_capacity(raw.hosts.len());
        for host in &raw.hosts {
            match host.trim().parse() {
                Ok(ip) => hosts.push(ip),
                Err(_) => {
                    warn!("invalid IP address {host} in cluster {name}");
                    return None;
                }
            }
        }

        info!("parsed cluster {name} with {} hosts", hosts.len());
        Some(Self {
            user: raw.user,
            identity_file: raw.identity_file,
            hosts,
        })
    }

    /// The login used to reach the hosts, empty if the inventory leaves it out.
    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn identity_file(&self) -> Option<&Path> {
        self.identity_file.as_deref()
    }

    /// Every host in rank order, never empty.
    pub fn hosts(&self) -> &[IpAddr] {
        &self.hosts
    }

    pub fn world_size(&self) -> usize {
        self.hosts.len()
    }

    /// The address every process meets at: the first host, on `port`.
    pub fn coordinator(&self, port: u16) -> SocketAddr {
        SocketAddr::new(self.hosts[0], port)
    }

    /// The environment each host's process is started with, indexed by rank.
    pub fn process_envs(&self, port: u16) -> Vec<ProcessEnv> {
        let coordinator = self.coordinator(port).to_string();

        self.hosts
            .iter()
            .enumerate()
            .map(|(rank, &host)| ProcessEnv {
                host,
                vars: vec![
                    (RANK_VAR, rank.to_string()),
                    (WORLD_SIZE_VAR, self.world_size().to_string()),
                    (COORDINATOR_ADDRESS_VAR, coordinator.clone()),
                ],
            })
            .collect()
    }
}

/// The variables one host's process needs to find its place in the group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEnv {
    pub host: IpAddr,
    pub vars: Vec<(&'static str, String)>,
}

impl ProcessEnv {
    pub fn get(&self, key: &str) -> Option<String> {
        self.vars
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.clone())
    }

    /// The settings the process reads back from these variables.
    pub fn distributed_config(&self) -> Result<DistributedConfig> {
        DistributedConfig::from_lookup(|key| self.get(key))
    }
}

/// Every valid cluster of an inventory, by name.
///
/// Clusters without hosts, or with a host that is not an IP address, are dropped with a warning
/// instead of failing the whole inventory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Clusters(BTreeMap<String, Cluster>);

impl Clusters {
    pub fn from_yaml_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_yaml_str(&raw)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        let parsed: BTreeMap<String, RawCluster> = serde_yaml::from_str(raw)?;

        let clusters: BTreeMap<_, _> = parsed
            .into_iter()
            .filter_map(|(name, raw)| Cluster::from_raw(&name, raw).map(|c| (name, c)))
            .collect();

        info!(
            "available clusters: [{}]",
            clusters.keys().cloned().collect::<Vec<_>>().join(", ")
        );
        Ok(Self(clusters))
    }

    pub fn get(&self, name: &str) -> Option<&Cluster> {
        self.0.get(name)
    }

    /// Looks up `name`, failing when the inventory has no such valid cluster.
    pub fn cluster(&self, name: &str) -> Result<&Cluster> {
        self.get(name)
            .ok_or_else(|| TrainErr::InvalidConfig(format!("no valid cluster named {name:?}")))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}
