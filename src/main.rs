use anyhow::Context;
use env_logger::Env;
use log::info;

use affine_descent::{
    configs::{DistributedConfig, TrainingConfig},
    distributed::Standalone,
    launch,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let distributed = DistributedConfig::from_env().context("reading distributed settings")?;
    let training = TrainingConfig::from_env().context("loading training config")?;

    let outcome = if distributed.is_standalone() {
        launch(Standalone, training).await
    } else {
        let rendezvous = distributed.rendezvous()?;
        info!(
            "joining a group of {} as rank {}",
            distributed.world_size, distributed.rank
        );
        launch(rendezvous, training).await
    }
    .context("training failed")?;

    log::debug!(
        "final parameters: w = {:.4}, b = {:.4}",
        outcome.params.w(),
        outcome.params.b()
    );

    Ok(())
}
