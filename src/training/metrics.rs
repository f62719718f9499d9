use std::time::Duration;

/// Counters gathered over a whole training run.
#[derive(Debug, Default, Clone, Copy)]
pub struct TrainMetrics {
    pub steps: usize,
    pub reports: usize,

    /// Loss at the initial parameters.
    pub initial_loss: f32,

    /// Loss at the parameters left by the last update.
    pub final_loss: f32,

    pub elapsed: Duration,
}

impl TrainMetrics {
    #[inline]
    pub fn bump_step(&mut self) {
        self.steps += 1;
    }

    #[inline]
    pub fn bump_report(&mut self) {
        self.reports += 1;
    }
}
