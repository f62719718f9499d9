use ndarray::{Array1, ArrayView1};

use super::{Model, Params};

/// The `w * x + b` predictor.
#[derive(Debug, Default, Clone, Copy)]
pub struct Affine;

impl Affine {
    /// Returns a new `Affine`.
    pub fn new() -> Self {
        Self
    }
}

impl Model for Affine {
    fn forward(&self, params: &Params, x: ArrayView1<f32>) -> Array1<f32> {
        let (w, b) = (params.w(), params.b());
        x.mapv(|xi| w * xi + b)
    }

    fn backward(&self, _params: &Params, x: ArrayView1<f32>, d_pred: ArrayView1<f32>) -> Params {
        // d(pred_i)/dw = x_i, d(pred_i)/db = 1
        Params::new((&d_pred * &x).sum(), d_pred.sum())
    }
}
