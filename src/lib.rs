pub mod arch;
pub mod configs;
pub mod dataset;
pub mod distributed;
pub mod error;
mod launch;
pub mod objective;
pub mod optimization;
pub mod training;

pub use error::{Result, TrainErr};
pub use launch::{launch, TrainOutcome};
