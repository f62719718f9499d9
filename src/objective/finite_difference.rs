use crate::{arch::Params, dataset::Dataset, error::Result};

use super::{Evaluation, Objective};

const DEFAULT_STEP: f32 = 1e-3;

/// Wraps an objective and replaces its gradient with central finite differences of its loss.
///
/// Useful for checking analytic gradients, or for models that only provide a forward pass.
#[derive(Debug, Clone, Copy)]
pub struct FiniteDifference<O> {
    inner: O,
    step: f32,
}

impl<O: Objective> FiniteDifference<O> {
    /// Returns a new `FiniteDifference` with a default perturbation of `1e-3`.
    pub fn new(inner: O) -> Self {
        Self::with_step(inner, DEFAULT_STEP)
    }

    /// Returns a new `FiniteDifference`.
    ///
    /// # Arguments
    /// * `inner` - The objective whose loss is differentiated.
    /// * `step` - The perturbation applied to each parameter in both directions.
    pub fn with_step(inner: O, step: f32) -> Self {
        Self { inner, step }
    }
}

impl<O: Objective> Objective for FiniteDifference<O> {
    fn evaluate(&self, params: &Params, dataset: &Dataset) -> Result<Evaluation> {
        let loss = self.inner.evaluate(params, dataset)?.loss;
        let h = self.step;

        let mut grad = Params::default();
        for (i, g) in grad.as_mut_slice().iter_mut().enumerate() {
            let mut plus = *params;
            let mut minus = *params;
            plus.as_mut_slice()[i] += h;
            minus.as_mut_slice()[i] -= h;

            let loss_plus = self.inner.evaluate(&plus, dataset)?.loss;
            let loss_minus = self.inner.evaluate(&minus, dataset)?.loss;
            *g = (loss_plus - loss_minus) / (2.0 * h);
        }

        Ok(Evaluation { loss, grad })
    }
}
