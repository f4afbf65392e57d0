//! Coordinator engine: one run from partitioning to report.

use std::sync::Arc;
use std::time::Instant;

use forkscan_core::{
    Aggregator, Partition, RunConfig, RunReport, TransportKind, WorkerOutcome, ensure_output_dir,
    generate_array, partition,
};
use tracing::{debug, info, warn};

use crate::deadline::TimeoutController;
use crate::error::RunError;
use crate::launcher::WorkerLauncher;
use crate::process::{Supervisor, WaitOutcome};
use crate::transport::{self, Transport};

/// Runs parallel min/max reductions with one worker process per partition.
pub struct Coordinator {
    config: RunConfig,
    launcher: Arc<dyn WorkerLauncher>,
}

/// State owned by a single invocation of [`Coordinator::run`].
struct RunContext {
    partitions: Vec<Partition>,
    transport: Box<dyn Transport>,
    supervisor: Supervisor,
    timer: TimeoutController,
    started: Instant,
}

impl RunContext {
    fn dispatched(&self) -> usize {
        self.partitions.iter().filter(|p| !p.is_empty()).count()
    }

    fn cleanup(&self) {
        for partition in &self.partitions {
            self.transport.cleanup(partition);
        }
    }
}

impl Coordinator {
    pub fn new(config: RunConfig, launcher: Arc<dyn WorkerLauncher>) -> Self {
        Self { config, launcher }
    }

    pub const fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Generate the array from the configured seed and size, then run.
    pub async fn run_generated(&self) -> Result<RunReport, RunError> {
        self.config.validate()?;
        let array: Arc<[i32]> = generate_array(self.config.seed, self.config.array_size).into();
        self.run(array).await
    }

    /// Reduce `array` across the configured number of workers.
    ///
    /// The configured seed and array size only drive generation and are not
    /// consulted here; the partitioning follows `array.len()`.
    ///
    /// Timeouts and missing results degrade the report; only configuration,
    /// spawn and channel-setup failures are errors.
    pub async fn run(&self, array: Arc<[i32]>) -> Result<RunReport, RunError> {
        let config = &self.config;
        config.validate_dispatch()?;

        let partitions = partition(array.len(), config.workers)?;
        if config.transport == TransportKind::File {
            ensure_output_dir(&config.output_dir).map_err(forkscan_core::CoreError::from)?;
        }

        let mut ctx = RunContext {
            partitions,
            transport: transport::for_config(config),
            supervisor: Supervisor::new(config.grace_period),
            timer: TimeoutController::new(),
            started: Instant::now(),
        };
        debug!(
            len = array.len(),
            partitions = ctx.partitions.len(),
            dispatched = ctx.dispatched(),
            transport = %config.transport,
            "Starting run"
        );

        ctx.timer.arm(config.timeout);
        if let Err(e) = ctx
            .supervisor
            .spawn_all(&ctx.partitions, &array, self.launcher.as_ref(), ctx.transport.as_ref())
            .await
        {
            ctx.cleanup();
            return Err(e.into());
        }

        let outcome = ctx.supervisor.wait(&mut ctx.timer).await;
        let mut workers = ctx.supervisor.reap_all().await;

        let mut aggregator = Aggregator::new(ctx.partitions.len());
        for (index, mut channel) in ctx.supervisor.take_channels() {
            if aggregator.collect(channel.as_mut()).await.is_some() {
                mark_reported(&mut workers, index);
            }
        }
        ctx.cleanup();

        let dispatched = ctx.dispatched();
        let missing = aggregator.skipped();
        let aggregate = aggregator.finish();
        let timed_out = outcome == WaitOutcome::TimedOut;
        if aggregate.is_partial() {
            warn!(
                received = aggregate.received,
                expected = aggregate.expected,
                dispatched,
                missing,
                timed_out,
                "Partial results"
            );
        }

        let report = RunReport::new(
            aggregate,
            ctx.partitions.len(),
            dispatched,
            timed_out,
            ctx.started.elapsed(),
            workers,
        );
        info!(
            received = report.results_received,
            expected = report.total_expected,
            min = ?report.global_min(),
            max = ?report.global_max(),
            elapsed_ms = report.elapsed_millis(),
            "Run finished"
        );
        Ok(report)
    }
}

fn mark_reported(workers: &mut [WorkerOutcome], index: usize) {
    if let Some(worker) = workers.iter_mut().find(|w| w.index == index) {
        worker.reported = true;
    }
}
