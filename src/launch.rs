use std::io;

use log::{debug, info};
use tokio::task;

use crate::{
    arch::{loss::Mse, Affine, Params},
    configs::TrainingConfig,
    distributed::{devices, local_devices, Bootstrap, ProcessInfo},
    error::{Result, TrainErr},
    objective::Supervised,
    optimization::GradientDescent,
    training::{LogReporter, TrainMetrics, Trainer},
};

/// What a finished run leaves behind.
#[derive(Debug, Clone, Copy)]
pub struct TrainOutcome {
    pub params: Params,
    pub metrics: TrainMetrics,
    pub process: ProcessInfo,
}

/// Initializes the distributed runtime and trains the affine model to completion.
///
/// The bootstrap runs exactly once and must succeed before any training starts. The training
/// loop itself is CPU bound and runs on the blocking pool.
///
/// # Arguments
/// * `bootstrap` - Establishes this process's role in the group.
/// * `config` - The training run's settings.
///
/// # Returns
/// The trained parameters and the run's metrics.
///
/// # Errors
/// Returns a `TrainErr` if the bootstrap fails, the dataset is malformed, or training diverges.
pub async fn launch<B: Bootstrap>(mut bootstrap: B, config: TrainingConfig) -> Result<TrainOutcome> {
    config.validate()?;
    let dataset = config.dataset()?;

    let process = bootstrap.initialize().await?;

    let names: Vec<_> = devices(&process).iter().map(ToString::to_string).collect();
    info!("distributed runtime initialized [{}]", names.join(", "));
    debug!(
        rank = process.rank(),
        local_devices = local_devices(&process).len();
        "process ready"
    );

    let optimizer = GradientDescent::new(config.learning_rate);
    debug!(
        learning_rate = optimizer.learning_rate(),
        steps = config.steps.get();
        "training the affine model"
    );

    let mut trainer = Trainer::new(
        Supervised::new(Affine::new(), Mse::new()),
        optimizer,
        LogReporter::new(process.is_leader()),
        config.steps,
        config.report_every,
    );

    let mut params = config.init_params();
    let (params, metrics) = task::spawn_blocking(move || {
        let metrics = trainer.run(&mut params, &dataset)?;
        Ok::<_, TrainErr>((params, metrics))
    })
    .await
    .map_err(|e| io::Error::other(format!("training join error: {e}")))??;

    debug!(
        w = params.w(),
        b = params.b(),
        final_loss = metrics.final_loss;
        "run finished in {:?}",
        metrics.elapsed
    );

    Ok(TrainOutcome {
        params,
        metrics,
        process,
    })
}
