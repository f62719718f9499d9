use std::fmt;

use super::ProcessInfo;

/// A compute device visible to the group, each process contributes a single host CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Device {
    id: usize,
    process_index: usize,
}

impl Device {
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn process_index(&self) -> usize {
        self.process_index
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CpuDevice(id={})", self.id)
    }
}

/// Every device in the group, ordered by global id.
pub fn devices(info: &ProcessInfo) -> Vec<Device> {
    (0..info.world_size())
        .map(|id| Device {
            id,
            process_index: id,
        })
        .collect()
}

/// The devices owned by this process.
pub fn local_devices(info: &ProcessInfo) -> Vec<Device> {
    devices(info)
        .into_iter()
        .filter(|d| d.process_index() == info.rank())
        .collect()
}
