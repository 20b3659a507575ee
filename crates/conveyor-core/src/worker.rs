//! Worker consumption loop.
//!
//! Drains tasks from the queue and executes them to completion until
//! shut down. A single task's failure never terminates the loop; it is
//! recorded on the task and the loop moves on.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::domain::{ConveyorError, Profile, Status, Task};
use crate::queue::Queue;
use crate::runtime::JobRegistry;

/// Per-worker knobs.
#[derive(Debug, Clone, Default)]
pub struct WorkerOptions {
    /// Restrict reservation to one lane. `None` drains all lanes.
    pub profile: Option<Profile>,

    /// Upper bound on a single job execution. `None` lets jobs run
    /// unbounded.
    pub execution_timeout: Option<Duration>,
}

/// Worker group handle.
/// - `request_shutdown` stops taking new reservations; the in-flight
///   task finishes first.
/// - `shutdown_and_join` waits for every worker to exit.
pub struct WorkerGroup {
    shutdown_tx: watch::Sender<bool>,
    joins: Vec<JoinHandle<()>>,
}

impl WorkerGroup {
    /// Spawn `n` workers against a shared queue and registry.
    pub fn spawn(
        n: usize,
        queue: Arc<dyn Queue>,
        registry: Arc<JobRegistry>,
        options: WorkerOptions,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let mut joins = Vec::with_capacity(n);
        for worker_id in 0..n {
            let queue = Arc::clone(&queue);
            let registry = Arc::clone(&registry);
            let options = options.clone();
            let mut rx = shutdown_rx.clone();

            joins.push(tokio::spawn(async move {
                worker_loop(worker_id, queue, registry, options, &mut rx).await;
            }));
        }

        Self { shutdown_tx, joins }
    }

    /// Request shutdown for all workers. Does not cancel in-flight job
    /// execution; workers just stop reserving.
    pub fn request_shutdown(&self) {
        // ignore send error: receivers may already be dropped
        let _ = self.shutdown_tx.send(true);
    }

    /// Shutdown and wait for all workers.
    pub async fn shutdown_and_join(self) {
        self.request_shutdown();
        for join in self.joins {
            let _ = join.await;
        }
    }
}

async fn worker_loop(
    worker_id: usize,
    queue: Arc<dyn Queue>,
    registry: Arc<JobRegistry>,
    options: WorkerOptions,
    shutdown_rx: &mut watch::Receiver<bool>,
) {
    info!(worker_id, "worker started");

    loop {
        if *shutdown_rx.borrow() {
            break;
        }

        // reserve() may suspend indefinitely; race it against shutdown.
        let reserved = tokio::select! {
            _ = shutdown_rx.changed() => continue,
            reserved = queue.reserve(options.profile.as_ref()) => reserved,
        };

        let Some(task) = reserved else {
            // The queue shut down underneath us.
            break;
        };

        consume_one(worker_id, queue.as_ref(), &registry, &options, task).await;
    }

    info!(worker_id, "worker stopped");
}

/// Execute one reserved task through its full lifecycle.
async fn consume_one(
    worker_id: usize,
    queue: &dyn Queue,
    registry: &JobRegistry,
    options: &WorkerOptions,
    mut task: Task,
) {
    if task.status() != Status::Waiting {
        warn!(worker_id, task = %task.id(), status = %task.status(), "skipping non-waiting task");
        return;
    }

    // Persist Waiting -> Running before execution begins, so a crashed
    // worker leaves visible evidence of the in-flight task.
    task.set_status(Status::Running);
    if let Err(e) = queue.update(&task).await {
        error!(worker_id, task = %task.id(), error = %e, "failed to persist running status");
        return;
    }

    match run_job(registry, options, &task).await {
        Ok(()) => {
            task.set_status(Status::Succeeded);
            info!(worker_id, task = %task.id(), job = %task.job(), "task succeeded");
        }
        Err(e) => {
            task.set_status(Status::Failed);
            warn!(worker_id, task = %task.id(), job = %task.job(), error = %e, "task failed");
        }
    }

    if let Err(e) = queue.update(&task).await {
        error!(worker_id, task = %task.id(), error = %e, "failed to persist final status");
    }
}

/// Resolve and execute the task's job, bounded by the execution
/// timeout when one is configured.
async fn run_job(
    registry: &JobRegistry,
    options: &WorkerOptions,
    task: &Task,
) -> Result<(), ConveyorError> {
    let job = registry.resolve(task.job())?;

    match options.execution_timeout {
        Some(limit) => match tokio::time::timeout(limit, job.run(task.parameters())).await {
            Ok(result) => result,
            Err(_) => Err(ConveyorError::ExecutionTimeout(limit)),
        },
        None => job.run(task.parameters()).await,
    }
}
