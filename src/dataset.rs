use ndarray::{Array1, ArrayView1};

use crate::error::{Result, TrainErr};

/// A fixed, in-memory set of `(x, y)` samples for a single input feature.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    x: Array1<f32>,
    y: Array1<f32>,
}

impl Dataset {
    /// Creates a new `Dataset`.
    ///
    /// # Arguments
    /// * `x` - The input feature of every sample.
    /// * `y` - The target of every sample.
    ///
    /// # Returns
    /// The dataset, or an error if `x` and `y` differ in length or are empty.
    pub fn new(x: Vec<f32>, y: Vec<f32>) -> Result<Self> {
        if x.len() != y.len() {
            return Err(TrainErr::SizeMismatch {
                a: "x",
                b: "y",
                got: y.len(),
                expected: x.len(),
            });
        }

        if x.is_empty() {
            return Err(TrainErr::EmptyDataset);
        }

        Ok(Self {
            x: Array1::from_vec(x),
            y: Array1::from_vec(y),
        })
    }

    /// The three point dataset sampled from `y = 2x`.
    pub fn doubling() -> Self {
        Self {
            x: Array1::from_vec(vec![1.0, 2.0, 3.0]),
            y: Array1::from_vec(vec![2.0, 4.0, 6.0]),
        }
    }

    pub fn x(&self) -> ArrayView1<'_, f32> {
        self.x.view()
    }

    pub fn y(&self) -> ArrayView1<'_, f32> {
        self.y.view()
    }

    /// The amount of samples, always at least one.
    pub fn num_samples(&self) -> usize {
        self.x.len()
    }
}
