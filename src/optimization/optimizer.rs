use crate::arch::Params;

/// A rule that turns the gradient of one step into a parameter update.
pub trait Optimizer {
    /// Moves `params` in place using `grad`, the gradient evaluated at their current values.
    fn update(&mut self, params: &mut Params, grad: &Params);
}
