mod metrics;
mod report;
mod trainer;

pub use metrics::TrainMetrics;
pub use report::{progress_line, LogReporter, MemoryReporter, Reporter, COMPLETE, STARTING};
pub use trainer::Trainer;
