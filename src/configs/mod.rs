mod cluster;
mod distributed;
mod training;

pub use cluster::{Cluster, Clusters, ProcessEnv, DEFAULT_COORDINATOR_PORT};
pub use distributed::DistributedConfig;
pub use training::{DatasetConfig, InitConfig, TrainingConfig};
