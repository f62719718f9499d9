use crate::{
    arch::{loss::LossFn, Affine, Model, Params},
    dataset::Dataset,
    error::{Result, TrainErr},
};

use super::{Evaluation, Objective};

/// Composes a model with a loss function, differentiating by the chain rule: the loss is first
/// differentiated with respect to the predictions and then pulled back through the model.
#[derive(Debug, Clone, Copy)]
pub struct Supervised<L: LossFn, M: Model = Affine> {
    model: M,
    loss_fn: L,
}

impl<L: LossFn, M: Model> Supervised<L, M> {
    /// Returns a new `Supervised` objective.
    ///
    /// # Arguments
    /// * `model` - The predictor being trained.
    /// * `loss_fn` - The loss comparing predictions against targets.
    pub fn new(model: M, loss_fn: L) -> Self {
        Self { model, loss_fn }
    }
}

impl<L: LossFn, M: Model> Objective for Supervised<L, M> {
    fn evaluate(&self, params: &Params, dataset: &Dataset) -> Result<Evaluation> {
        let (x, y) = (dataset.x(), dataset.y());
        let y_pred = self.model.forward(params, x);

        if y_pred.len() != y.len() {
            return Err(TrainErr::SizeMismatch {
                a: "predictions",
                b: "targets",
                got: y_pred.len(),
                expected: y.len(),
            });
        }

        let loss = self.loss_fn.loss(y_pred.view(), y);
        let d_pred = self.loss_fn.loss_prime(y_pred.view(), y);
        let grad = self.model.backward(params, x, d_pred.view());

        Ok(Evaluation { loss, grad })
    }
}
