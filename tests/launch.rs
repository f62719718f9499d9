use affine_descent::{
    configs::TrainingConfig,
    distributed::{Bootstrap, ProcessInfo, Standalone},
    launch, Result, TrainErr,
};
use tokio_test::assert_ok;

struct Unreachable;

impl Bootstrap for Unreachable {
    async fn initialize(&mut self) -> Result<ProcessInfo> {
        Err(TrainErr::RendezvousTimeout {
            rank: 1,
            world_size: 2,
        })
    }
}

struct Follower;

impl Bootstrap for Follower {
    async fn initialize(&mut self) -> Result<ProcessInfo> {
        Ok(ProcessInfo::new(1, 2))
    }
}

#[tokio::test]
async fn standalone_run_converges() {
    let outcome = assert_ok!(launch(Standalone, TrainingConfig::default()).await);

    assert_eq!(outcome.process, ProcessInfo::new(0, 1));
    assert_eq!(outcome.metrics.steps, 10_000);
    assert!((outcome.params.w() - 2.0).abs() < 1e-3);
    assert!(outcome.params.b().abs() < 1e-3);
}

#[tokio::test]
async fn bootstrap_failure_stops_the_run() {
    let err = launch(Unreachable, TrainingConfig::default())
        .await
        .unwrap_err();

    assert!(matches!(err, TrainErr::RendezvousTimeout { .. }));
}

#[tokio::test]
async fn followers_train_the_same_model() {
    let outcome = assert_ok!(launch(Follower, TrainingConfig::default()).await);

    assert_eq!(outcome.process.rank(), 1);
    assert!((outcome.params.w() - 2.0).abs() < 1e-3);
}

#[tokio::test]
async fn malformed_dataset_is_refused_before_bootstrap() {
    let config = TrainingConfig::from_json_str(
        r#"{ "dataset": { "kind": "inline", "x": [1.0, 2.0], "y": [2.0] } }"#,
    )
    .unwrap();

    let err = launch(Unreachable, config).await.unwrap_err();
    assert!(matches!(err, TrainErr::SizeMismatch { .. }));
}
