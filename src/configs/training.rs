use std::{env, fs, num::NonZeroUsize, path::Path};

use log::info;
use serde::Deserialize;

use crate::{
    arch::Params,
    dataset::Dataset,
    error::{Result, TrainErr},
};

/// Names the JSON file to read the training configuration from.
pub const TRAIN_CONFIG_VAR: &str = "TRAIN_CONFIG";

const DEFAULT_STEPS: usize = 10_000;
const DEFAULT_LEARNING_RATE: f32 = 0.1;
const DEFAULT_REPORT_EVERY: usize = 100;

/// The starting point of the optimization.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InitConfig {
    pub w: f32,
    pub b: f32,
}

impl Default for InitConfig {
    fn default() -> Self {
        Self { w: 1.0, b: 0.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DatasetConfig {
    Inline { x: Vec<f32>, y: Vec<f32> },
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self::Inline {
            x: vec![1.0, 2.0, 3.0],
            y: vec![2.0, 4.0, 6.0],
        }
    }
}

/// Everything that shapes a training run. Missing fields take the values of the reference run:
/// 10000 steps at a learning rate of 0.1 from `(1, 0)`, reporting every 100 steps, over the
/// `y = 2x` samples.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainingConfig {
    pub steps: NonZeroUsize,
    pub learning_rate: f32,
    pub report_every: NonZeroUsize,
    pub init: InitConfig,
    pub dataset: DatasetConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            steps: NonZeroUsize::new(DEFAULT_STEPS).unwrap_or(NonZeroUsize::MIN),
            learning_rate: DEFAULT_LEARNING_RATE,
            report_every: NonZeroUsize::new(DEFAULT_REPORT_EVERY).unwrap_or(NonZeroUsize::MIN),
            init: InitConfig::default(),
            dataset: DatasetConfig::default(),
        }
    }
}

impl TrainingConfig {
    /// Loads the configuration from the file named by `TRAIN_CONFIG`, or falls back to the
    /// defaults when it is unset.
    pub fn from_env() -> Result<Self> {
        match env::var_os(TRAIN_CONFIG_VAR) {
            Some(path) => {
                info!("loading training config from {}", Path::new(&path).display());
                Self::from_json_path(path)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants serde cannot express.
    ///
    /// # Errors
    /// Returns `TrainErr::InvalidConfig` on a non-positive or non-finite learning rate, or a
    /// non-finite starting point.
    pub fn validate(&self) -> Result<()> {
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(TrainErr::InvalidConfig(format!(
                "learning_rate must be finite and positive, got {}",
                self.learning_rate
            )));
        }

        if !self.init_params().is_finite() {
            return Err(TrainErr::InvalidConfig(format!(
                "initial parameters must be finite, got {:?}",
                self.init
            )));
        }

        Ok(())
    }

    pub fn init_params(&self) -> Params {
        Params::new(self.init.w, self.init.b)
    }

    /// Builds the dataset, validating its shape.
    pub fn dataset(&self) -> Result<Dataset> {
        match &self.dataset {
            DatasetConfig::Inline { x, y } => Dataset::new(x.clone(), y.clone()),
        }
    }
}
