//! Enumerator → transform pool → reporter pipeline

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, Scope, ScopedJoinHandle};

use crossbeam::channel::bounded;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::error::{Result, ScalerError};
use crate::processing::ImageTransformer;

pub mod enumerator;
pub mod progress;
pub mod work;
pub mod worker;

pub use progress::*;
pub use work::*;
pub use worker::{process_item, WorkerReport};

use enumerator::enumerate;
use worker::run_worker;

/// Fixed-size worker pool wired between two bounded queues
pub struct BatchPipeline {
    config: PipelineConfig,
    transformer: ImageTransformer,
    sink: Arc<dyn ProgressSink>,
}

impl BatchPipeline {
    /// Create a pipeline reporting through [`LogSink`]
    pub fn new(config: PipelineConfig, transformer: ImageTransformer) -> Self {
        Self {
            config,
            transformer,
            sink: Arc::new(LogSink),
        }
    }

    /// Replace the progress sink
    pub fn with_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn workers(&self) -> usize {
        self.config.workers
    }

    /// Run every stage to completion.
    ///
    /// Teardown order: join the enumerator, close the work queue, join all
    /// workers, close the completion queue, join the reporter. Per-item
    /// failures are skipped and counted; only setup and stage failures
    /// return an error.
    pub fn run(&self, job: &BatchJob) -> Result<RunSummary> {
        self.config.validate()?;
        if job.target_width == 0 || job.target_height == 0 {
            return Err(ScalerError::invalid_parameters(
                "Width and height must be greater than 0"
            ));
        }

        std::fs::create_dir_all(&job.dest_dir).map_err(|source| ScalerError::OutputDirectory {
            path: job.dest_dir.clone(),
            source,
        })?;

        info!(
            "Scaling {} files from {:?} to {:?} at {}x{} with {} workers",
            job.files.len(),
            job.source_dir,
            job.dest_dir,
            job.target_width,
            job.target_height,
            self.config.workers
        );

        let counters = ProgressCounters::new(job.files.len());
        let active = AtomicUsize::new(0);

        let reports = thread::scope(|scope| self.run_stages(scope, job, &counters, &active))?;

        let summary = RunSummary {
            total_eligible: counters.total_eligible(),
            processed: counters.processed(),
            skipped: counters.skipped(),
            workers: self.config.workers,
            elapsed_seconds: counters.elapsed().as_secs_f64(),
            worker_reports: reports,
        };
        debug_assert_eq!(
            summary.processed,
            summary.worker_reports.iter().map(|r| r.processed).sum::<usize>()
        );

        self.sink.on_finished(&summary);
        Ok(summary)
    }

    fn run_stages<'scope, 'env>(
        &'env self,
        scope: &'scope Scope<'scope, 'env>,
        job: &'env BatchJob,
        counters: &'env ProgressCounters,
        active: &'env AtomicUsize,
    ) -> Result<Vec<WorkerReport>> {
        let capacity = self.config.queue_capacity();
        let (work_tx, work_rx) = bounded::<WorkItem>(capacity);
        let (done_tx, done_rx) = bounded::<CompletionRecord>(capacity);

        let reporter = Reporter::new(counters, self.sink.as_ref(), self.config.eta_interval());
        let reporter_handle = spawn_stage(scope, "scaler-reporter".to_string(), move || {
            reporter.run(done_rx)
        })?;

        let mut worker_handles = Vec::with_capacity(self.config.workers);
        for id in 1..=self.config.workers {
            let jobs = work_rx.clone();
            let done = done_tx.clone();
            active.fetch_add(1, Ordering::AcqRel);
            debug!("Starting worker {}", id);

            let spawned = spawn_stage(scope, format!("scaler-worker-{}", id), move || {
                run_worker(id, jobs, done, &self.transformer, counters, active)
            });
            match spawned {
                Ok(handle) => worker_handles.push(handle),
                Err(e) => {
                    active.fetch_sub(1, Ordering::AcqRel);
                    return Err(e);
                }
            }
        }
        drop(work_rx);

        let producer_tx = work_tx.clone();
        let enumerator_handle = spawn_stage(scope, "scaler-enumerator".to_string(), move || {
            enumerate(job, producer_tx)
        })?;

        let queued = join_stage(enumerator_handle, "enumerator")?;
        info!("All {} work items for {:?} queued, closing work queue", queued, job.source_dir);
        drop(work_tx);

        let mut reports = Vec::with_capacity(worker_handles.len());
        for handle in worker_handles {
            reports.push(join_stage(handle, "worker")?);
        }
        info!("All workers for {:?} are done, closing completion queue", job.source_dir);
        drop(done_tx);

        let reported = join_stage(reporter_handle, "reporter")?;
        debug!("Reporter drained {} completion records", reported);

        Ok(reports)
    }
}

fn spawn_stage<'scope, 'env, T, F>(
    scope: &'scope Scope<'scope, 'env>,
    name: String,
    f: F,
) -> Result<ScopedJoinHandle<'scope, T>>
where
    F: FnOnce() -> T + Send + 'scope,
    T: Send + 'scope,
{
    thread::Builder::new()
        .name(name.clone())
        .spawn_scoped(scope, f)
        .map_err(|e| ScalerError::parallel(format!("Failed to spawn {}: {}", name, e)))
}

fn join_stage<T>(handle: ScopedJoinHandle<'_, T>, stage: &str) -> Result<T> {
    handle
        .join()
        .map_err(|_| ScalerError::parallel(format!("{} thread panicked", stage)))
}

/// Outcome of one run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub total_eligible: usize,
    pub processed: usize,
    pub skipped: usize,
    pub workers: usize,
    pub elapsed_seconds: f64,
    pub worker_reports: Vec<WorkerReport>,
}

impl RunSummary {
    /// Every eligible file was either processed or skipped
    pub fn is_fully_accounted(&self) -> bool {
        self.processed + self.skipped == self.total_eligible
    }

    pub fn files_per_second(&self) -> f64 {
        if self.elapsed_seconds <= 0.0 {
            return 0.0;
        }
        self.processed as f64 / self.elapsed_seconds
    }
}
