use ndarray::{Array1, ArrayView1};

use super::Params;

/// A differentiable predictor over a single input feature.
pub trait Model {
    /// Computes the prediction for every sample in `x`.
    fn forward(&self, params: &Params, x: ArrayView1<f32>) -> Array1<f32>;

    /// Propagates the derivative of the loss with respect to the predictions back to the
    /// parameters.
    ///
    /// # Arguments
    /// * `params` - The parameters the predictions were made with.
    /// * `x` - The inputs the predictions were made for.
    /// * `d_pred` - The derivative of the loss with respect to every prediction.
    ///
    /// # Returns
    /// The gradient of the loss with respect to `params`.
    fn backward(&self, params: &Params, x: ArrayView1<f32>, d_pred: ArrayView1<f32>) -> Params;
}
