use super::Optimizer;
use crate::arch::Params;

/// Fixed rate gradient descent, `p ← p − η·∂p` for every parameter.
#[derive(Debug, Clone, Copy)]
pub struct GradientDescent {
    learning_rate: f32,
}

impl GradientDescent {
    /// Creates a new `GradientDescent`.
    ///
    /// # Arguments
    /// * `learning_rate` - The factor `η` every gradient is scaled by before being subtracted.
    pub fn new(learning_rate: f32) -> Self {
        Self { learning_rate }
    }

    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }
}

impl Optimizer for GradientDescent {
    /// Both parameters move from their pre-update values, so `w` never sees the new `b` or vice
    /// versa.
    fn update(&mut self, params: &mut Params, grad: &Params) {
        let eta = self.learning_rate;
        *params = Params::new(params.w() - eta * grad.w(), params.b() - eta * grad.b());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_against_the_gradient() {
        let mut params = Params::new(1.0, 0.0);
        GradientDescent::new(0.5).update(&mut params, &Params::new(2.0, -4.0));
        assert_eq!(params, Params::new(0.0, 2.0));
    }

    #[test]
    fn zero_gradient_is_a_fixed_point() {
        let mut params = Params::new(1.5, -0.25);
        GradientDescent::new(0.1).update(&mut params, &Params::default());
        assert_eq!(params, Params::new(1.5, -0.25));
    }
}
