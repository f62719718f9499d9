use crate::error::Result;

/// A process's membership in the training group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessInfo {
    rank: usize,
    world_size: usize,
}

impl ProcessInfo {
    /// Creates a new `ProcessInfo`.
    ///
    /// # Arguments
    /// * `rank` - This process's index within the group, in `0..world_size`.
    /// * `world_size` - The amount of processes in the group.
    pub fn new(rank: usize, world_size: usize) -> Self {
        Self { rank, world_size }
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn world_size(&self) -> usize {
        self.world_size
    }

    /// Whether this process is the one coordinating the group and reporting for it.
    pub fn is_leader(&self) -> bool {
        self.rank == 0
    }
}

/// Establishes this process's role in the group.
#[allow(unused)]
#[trait_variant::make(Bootstrap: Send)]
pub trait LocalBootstrap {
    /// Blocks until the process may proceed with training.
    ///
    /// # Returns
    /// The process's membership once the whole group is known.
    ///
    /// # Errors
    /// Returns a `TrainErr` if the group could not be established.
    async fn initialize(&mut self) -> Result<ProcessInfo>;
}

/// A group of one, no coordination takes place.
#[derive(Debug, Default, Clone, Copy)]
pub struct Standalone;

impl Bootstrap for Standalone {
    async fn initialize(&mut self) -> Result<ProcessInfo> {
        Ok(ProcessInfo::new(0, 1))
    }
}
