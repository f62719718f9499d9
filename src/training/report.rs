use log::{debug, info};

pub const STARTING: &str = "Starting training";
pub const COMPLETE: &str = "Training complete";

/// Formats a periodic progress line, the loss rounded to four decimals.
pub fn progress_line(step: usize, loss: f32) -> String {
    format!("Step {step}: loss = {loss:.4}")
}

/// Receives the lifecycle and progress notices of a training run, in execution order.
pub trait Reporter {
    /// Called once, before the first step.
    fn started(&mut self);

    /// Called at every reporting step with that step's loss.
    fn progress(&mut self, step: usize, loss: f32);

    /// Called once, after the last step.
    fn completed(&mut self);
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn started(&mut self) {
        (**self).started()
    }

    fn progress(&mut self, step: usize, loss: f32) {
        (**self).progress(step, loss)
    }

    fn completed(&mut self) {
        (**self).completed()
    }
}

/// Writes every notice through the `log` facade.
///
/// Only the leader process emits progress at `info`, the rest of the group logs it at `debug` so
/// a multi-host run prints a single stream of progress lines.
#[derive(Debug, Clone, Copy)]
pub struct LogReporter {
    leader: bool,
}

impl LogReporter {
    pub fn new(leader: bool) -> Self {
        Self { leader }
    }
}

impl Default for LogReporter {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Reporter for LogReporter {
    fn started(&mut self) {
        info!("{STARTING}");
    }

    fn progress(&mut self, step: usize, loss: f32) {
        let line = progress_line(step, loss);
        if self.leader {
            info!(step = step, loss = loss; "{line}");
        } else {
            debug!(step = step, loss = loss; "{line}");
        }
    }

    fn completed(&mut self) {
        info!("{COMPLETE}");
    }
}

/// Keeps every notice in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryReporter {
    lines: Vec<String>,
    progress: Vec<(usize, f32)>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every line in the order it was reported.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The raw `(step, loss)` pair of every progress notice.
    pub fn reports(&self) -> &[(usize, f32)] {
        &self.progress
    }
}

impl Reporter for MemoryReporter {
    fn started(&mut self) {
        self.lines.push(STARTING.to_string());
    }

    fn progress(&mut self, step: usize, loss: f32) {
        self.lines.push(progress_line(step, loss));
        self.progress.push((step, loss));
    }

    fn completed(&mut self) {
        self.lines.push(COMPLETE.to_string());
    }
}
