use ndarray::{Array1, ArrayView1};

use super::LossFn;

/// Mean of the squared residuals between predictions and targets.
#[derive(Debug, Default, Clone, Copy)]
pub struct Mse;

impl Mse {
    pub fn new() -> Self {
        Self
    }
}

impl LossFn for Mse {
    fn loss(&self, y_pred: ArrayView1<f32>, y: ArrayView1<f32>) -> f32 {
        let residuals = &y_pred - &y;
        match residuals.len() {
            0 => 0.0,
            n => residuals.dot(&residuals) / n as f32,
        }
    }

    /// `2·(ŷ − y) / n` for every sample.
    fn loss_prime(&self, y_pred: ArrayView1<f32>, y: ArrayView1<f32>) -> Array1<f32> {
        let scale = 2.0 / y_pred.len() as f32;
        (&y_pred - &y).mapv_into(|r| scale * r)
    }
}
