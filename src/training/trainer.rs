use std::{num::NonZeroUsize, time::Instant};

use log::debug;

use super::{Reporter, TrainMetrics};
use crate::{
    arch::Params,
    dataset::Dataset,
    error::{Result, TrainErr},
    objective::{Evaluation, Objective},
    optimization::Optimizer,
};

/// Drives a fixed amount of full-batch optimization steps over a dataset.
pub struct Trainer<J, O, R> {
    objective: J,
    optimizer: O,
    reporter: R,
    steps: NonZeroUsize,
    report_every: NonZeroUsize,
}

impl<J, O, R> Trainer<J, O, R>
where
    J: Objective,
    O: Optimizer,
    R: Reporter,
{
    /// Creates a new `Trainer`.
    ///
    /// # Arguments
    /// * `objective` - Computes the loss and gradient at every step.
    /// * `optimizer` - Turns each gradient into a parameter update.
    /// * `reporter` - Receives the lifecycle and progress notices.
    /// * `steps` - The exact amount of steps `run` executes.
    /// * `report_every` - The step interval between progress notices.
    ///
    /// # Returns
    /// A new `Trainer` instance.
    pub fn new(
        objective: J,
        optimizer: O,
        reporter: R,
        steps: NonZeroUsize,
        report_every: NonZeroUsize,
    ) -> Self {
        Self {
            objective,
            optimizer,
            reporter,
            steps,
            report_every,
        }
    }

    /// Executes step `index`: evaluates the objective at `params` and updates them in place.
    ///
    /// Both parameters are updated from the same gradient, computed before any of them moves.
    ///
    /// # Returns
    /// The evaluation at the pre-update parameters.
    ///
    /// # Errors
    /// Propagates the objective's failure, or returns `TrainErr::NonFiniteLoss` if the loss is
    /// NaN or infinite. In both cases `params` is left untouched.
    pub fn step(
        &mut self,
        index: usize,
        params: &mut Params,
        dataset: &Dataset,
    ) -> Result<Evaluation> {
        let eval = self.objective.evaluate(params, dataset)?;
        if !eval.loss.is_finite() {
            return Err(TrainErr::NonFiniteLoss {
                step: index,
                loss: eval.loss,
            });
        }

        self.optimizer.update(params, &eval.grad);
        Ok(eval)
    }

    /// Runs every configured step, reporting the loss every `report_every` steps starting at
    /// step zero.
    ///
    /// # Returns
    /// The run's metrics, `params` holds the trained values.
    ///
    /// # Errors
    /// Returns a `TrainErr` if the objective fails or the loss stops being finite.
    pub fn run(&mut self, params: &mut Params, dataset: &Dataset) -> Result<TrainMetrics> {
        let start = Instant::now();
        let mut metrics = TrainMetrics::default();

        self.reporter.started();

        for step in 0..self.steps.get() {
            let eval = self.step(step, params, dataset)?;

            if step == 0 {
                metrics.initial_loss = eval.loss;
            }

            if step % self.report_every.get() == 0 {
                self.reporter.progress(step, eval.loss);
                metrics.bump_report();
            }

            metrics.bump_step();
        }

        metrics.final_loss = self.objective.evaluate(params, dataset)?.loss;
        metrics.elapsed = start.elapsed();

        self.reporter.completed();

        debug!(
            steps = metrics.steps,
            w = params.w(),
            b = params.b();
            "trainer finished"
        );

        Ok(metrics)
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    pub fn into_reporter(self) -> R {
        self.reporter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        arch::{loss::Mse, Affine},
        objective::Supervised,
        optimization::GradientDescent,
        training::MemoryReporter,
    };

    struct Failing;

    impl Objective for Failing {
        fn evaluate(&self, _params: &Params, _dataset: &Dataset) -> Result<Evaluation> {
            Err(TrainErr::EmptyDataset)
        }
    }

    struct Exploding;

    impl Objective for Exploding {
        fn evaluate(&self, params: &Params, _dataset: &Dataset) -> Result<Evaluation> {
            Ok(Evaluation {
                loss: f32::NAN,
                grad: *params,
            })
        }
    }

    fn nz(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn single_step_is_a_simultaneous_update() {
        let objective = Supervised::new(Affine::new(), Mse::new());
        let mut trainer = Trainer::new(
            objective,
            GradientDescent::new(0.1),
            MemoryReporter::new(),
            nz(1),
            nz(1),
        );

        let dataset = Dataset::doubling();
        let mut params = Params::new(1.0, 0.0);
        let eval = trainer.step(0, &mut params, &dataset).unwrap();

        // grad = (-28/3, -4) at (1, 0)
        assert!((eval.loss - 14.0 / 3.0).abs() < 1e-5);
        assert!((params.w() - (1.0 + 2.8 / 3.0)).abs() < 1e-5);
        assert!((params.b() - 0.4).abs() < 1e-5);

        // Coordinate descent would have moved b using the already updated w.
        let mut sequential = Params::new(1.0, 0.0);
        let grad_w = objective.evaluate(&sequential, &dataset).unwrap().grad.w();
        sequential = Params::new(sequential.w() - 0.1 * grad_w, sequential.b());
        let grad_b = objective.evaluate(&sequential, &dataset).unwrap().grad.b();
        sequential = Params::new(sequential.w(), sequential.b() - 0.1 * grad_b);

        assert!((params.b() - sequential.b()).abs() > 0.1);
    }

    #[test]
    fn failing_objective_leaves_params_untouched() {
        let mut trainer = Trainer::new(
            Failing,
            GradientDescent::new(0.1),
            MemoryReporter::new(),
            nz(10),
            nz(1),
        );

        let mut params = Params::new(1.0, 0.0);
        let res = trainer.run(&mut params, &Dataset::doubling());

        assert!(matches!(res, Err(TrainErr::EmptyDataset)));
        assert_eq!(params, Params::new(1.0, 0.0));
        assert_eq!(trainer.reporter().lines(), ["Starting training"]);
    }

    #[test]
    fn non_finite_loss_aborts_the_run() {
        let mut trainer = Trainer::new(
            Exploding,
            GradientDescent::new(0.1),
            MemoryReporter::new(),
            nz(10),
            nz(1),
        );

        let mut params = Params::new(1.0, 0.0);
        let res = trainer.run(&mut params, &Dataset::doubling());

        assert!(matches!(res, Err(TrainErr::NonFiniteLoss { step: 0, .. })));
        assert!(trainer.reporter().reports().is_empty());
        assert_eq!(params, Params::new(1.0, 0.0));
    }

    #[test]
    fn non_finite_step_keeps_params() {
        let mut trainer = Trainer::new(
            Exploding,
            GradientDescent::new(0.1),
            MemoryReporter::new(),
            nz(1),
            nz(1),
        );

        let mut params = Params::new(3.0, -1.0);
        let res = trainer.step(7, &mut params, &Dataset::doubling());

        assert!(matches!(res, Err(TrainErr::NonFiniteLoss { step: 7, .. })));
        assert_eq!(params, Params::new(3.0, -1.0));
    }

    #[test]
    fn reports_on_every_interval_boundary() {
        let mut trainer = Trainer::new(
            Supervised::new(Affine::new(), Mse::new()),
            GradientDescent::new(0.1),
            MemoryReporter::new(),
            nz(25),
            nz(10),
        );

        let mut params = Params::new(1.0, 0.0);
        let metrics = trainer.run(&mut params, &Dataset::doubling()).unwrap();

        let steps: Vec<_> = trainer.reporter().reports().iter().map(|(s, _)| *s).collect();
        assert_eq!(steps, [0, 10, 20]);
        assert_eq!(metrics.steps, 25);
        assert_eq!(metrics.reports, 3);
        assert!(metrics.final_loss < metrics.initial_loss);
    }
}
