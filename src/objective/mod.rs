mod finite_difference;
mod supervised;

pub use finite_difference::FiniteDifference;
pub use supervised::Supervised;

use crate::{arch::Params, dataset::Dataset, error::Result};

/// The loss and its gradient at a given point of the parameter space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub loss: f32,
    pub grad: Params,
}

/// A differentiable training objective.
pub trait Objective {
    /// Computes the loss and its gradient with respect to `params` over the whole `dataset`.
    ///
    /// Implementations must be pure: evaluating twice with the same inputs yields bit-identical
    /// results.
    ///
    /// # Errors
    /// Returns a `TrainErr` if the inputs violate a shape invariant.
    fn evaluate(&self, params: &Params, dataset: &Dataset) -> Result<Evaluation>;
}
