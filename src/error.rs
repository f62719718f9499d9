use std::{error::Error, fmt, io};

/// The result type used across the crate.
pub type Result<T> = std::result::Result<T, TrainErr>;

/// Failures raised while configuring, bootstrapping or training.
#[derive(Debug)]
pub enum TrainErr {
    Io(io::Error),
    Json(serde_json::Error),
    Yaml(serde_yaml::Error),
    InvalidConfig(String),
    SizeMismatch {
        a: &'static str,
        b: &'static str,
        got: usize,
        expected: usize,
    },
    EmptyDataset,
    NonFiniteLoss {
        step: usize,
        loss: f32,
    },
    Rejected {
        rank: usize,
        reason: String,
    },
    UnexpectedMessage {
        rank: usize,
        got: &'static str,
    },
    RendezvousTimeout {
        rank: usize,
        world_size: usize,
    },
}

impl fmt::Display for TrainErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrainErr::Io(e) => write!(f, "io error: {e}"),
            TrainErr::Json(e) => write!(f, "json error: {e}"),
            TrainErr::Yaml(e) => write!(f, "yaml error: {e}"),
            TrainErr::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            TrainErr::SizeMismatch {
                a,
                b,
                got,
                expected,
            } => write!(
                f,
                "size mismatch between {a} and {b}: got {got}, expected {expected}"
            ),
            TrainErr::EmptyDataset => write!(f, "dataset must have at least one sample"),
            TrainErr::NonFiniteLoss { step, loss } => {
                write!(f, "loss became non-finite at step {step}: {loss}")
            }
            TrainErr::Rejected { rank, reason } => {
                write!(f, "rank {rank} rejected by coordinator: {reason}")
            }
            TrainErr::UnexpectedMessage { rank, got } => {
                write!(f, "unexpected rendezvous message for rank {rank}: got {got}")
            }
            TrainErr::RendezvousTimeout { rank, world_size } => write!(
                f,
                "rank {rank} timed out waiting for a group of {world_size} processes"
            ),
        }
    }
}

impl Error for TrainErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TrainErr::Io(e) => Some(e),
            TrainErr::Json(e) => Some(e),
            TrainErr::Yaml(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for TrainErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for TrainErr {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<serde_yaml::Error> for TrainErr {
    fn from(value: serde_yaml::Error) -> Self {
        Self::Yaml(value)
    }
}
