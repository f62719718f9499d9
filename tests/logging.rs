use std::{
    num::NonZeroUsize,
    sync::{Mutex, Once},
    thread::{self, ThreadId},
};

use log::{Level, LevelFilter, Log, Metadata, Record};

use affine_descent::{
    arch::{loss::Mse, Affine, Params},
    dataset::Dataset,
    objective::Supervised,
    optimization::GradientDescent,
    training::{LogReporter, Reporter, Trainer, COMPLETE, STARTING},
};

type Captured = Vec<(ThreadId, Level, String)>;

/// Keeps every record along with the thread that logged it, tests run concurrently.
struct Capture {
    records: Mutex<Captured>,
}

impl Log for Capture {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        self.records.lock().unwrap().push((
            thread::current().id(),
            record.level(),
            record.args().to_string(),
        ));
    }

    fn flush(&self) {}
}

static CAPTURE: Capture = Capture {
    records: Mutex::new(Vec::new()),
};
static INSTALL: Once = Once::new();

fn take_own() -> Vec<(Level, String)> {
    let me = thread::current().id();
    let mut records = CAPTURE.records.lock().unwrap();
    let (mine, rest): (Captured, Captured) = std::mem::take(&mut *records)
        .into_iter()
        .partition(|(id, ..)| *id == me);
    *records = rest;

    mine.into_iter().map(|(_, level, msg)| (level, msg)).collect()
}

/// Runs `f` and returns what it logged from the current thread.
fn captured(f: impl FnOnce()) -> Vec<(Level, String)> {
    INSTALL.call_once(|| {
        log::set_logger(&CAPTURE).unwrap();
        log::set_max_level(LevelFilter::Trace);
    });

    take_own();
    f();
    take_own()
}

fn drive(mut reporter: LogReporter) {
    reporter.started();
    reporter.progress(0, 14.0 / 3.0);
    reporter.completed();
}

#[test]
fn leader_logs_progress_at_info() {
    let records = captured(|| drive(LogReporter::new(true)));

    assert_eq!(
        records,
        [
            (Level::Info, STARTING.to_string()),
            (Level::Info, "Step 0: loss = 4.6667".to_string()),
            (Level::Info, COMPLETE.to_string()),
        ]
    );
}

#[test]
fn followers_log_progress_at_debug() {
    let records = captured(|| drive(LogReporter::new(false)));

    assert_eq!(
        records,
        [
            (Level::Info, STARTING.to_string()),
            (Level::Debug, "Step 0: loss = 4.6667".to_string()),
            (Level::Info, COMPLETE.to_string()),
        ]
    );
}

#[test]
fn follower_run_keeps_info_to_the_lifecycle() {
    let records = captured(|| {
        let mut trainer = Trainer::new(
            Supervised::new(Affine::new(), Mse::new()),
            GradientDescent::new(0.1),
            LogReporter::new(false),
            NonZeroUsize::new(300).unwrap(),
            NonZeroUsize::new(100).unwrap(),
        );
        let mut params = Params::new(1.0, 0.0);
        trainer.run(&mut params, &Dataset::doubling()).unwrap();
    });

    let info: Vec<_> = records
        .iter()
        .filter(|(level, _)| *level == Level::Info)
        .map(|(_, msg)| msg.as_str())
        .collect();
    assert_eq!(info, [STARTING, COMPLETE]);

    let progress = records
        .iter()
        .filter(|(level, msg)| *level == Level::Debug && msg.starts_with("Step "))
        .count();
    assert_eq!(progress, 3);
}
