//! Conveyor worker binary.
//!
//! The default `consume` command hosts the queue, the worker group and
//! the HTTP control-plane in one process; `show` prints a task fetched
//! from a running control-plane.

use std::error::Error;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use tracing::info;

use conveyor_core::api::{self, ApiState};
use conveyor_core::codec::TaskCodec;
use conveyor_core::domain::{ConveyorError, JobName, Parameters, Profile};
use conveyor_core::queue::{InMemoryQueue, Queue};
use conveyor_core::runtime::{ExecutableJob, JobRegistry};
use conveyor_core::worker::{WorkerGroup, WorkerOptions};

#[derive(Parser)]
#[command(name = "conveyor", version, about = "Task queue worker and control-plane")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the worker consumption loop and the HTTP control-plane (default)
    Consume,
    /// Show a task from a running control-plane
    Show {
        /// Task identifier
        identifier: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    match Cli::parse().command.unwrap_or(Command::Consume) {
        Command::Consume => consume().await,
        Command::Show { identifier } => show(&identifier).await,
    }
}

/// Built-in sample job: pretends to deliver an email to the address in
/// the "to" parameter.
struct SendEmailJob;

#[async_trait]
impl ExecutableJob for SendEmailJob {
    async fn run(&self, parameters: &Parameters) -> Result<(), ConveyorError> {
        let to = parameters
            .get("to")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ConveyorError::execution("missing \"to\" parameter"))?;
        info!(to, "sending email");
        Ok(())
    }
}

/// Built-in sample job: sweeps the path given in the "path" parameter.
struct CleanupJob;

#[async_trait]
impl ExecutableJob for CleanupJob {
    async fn run(&self, parameters: &Parameters) -> Result<(), ConveyorError> {
        let path = parameters
            .get("path")
            .and_then(|v| v.as_str())
            .unwrap_or("/tmp");
        info!(path, "cleanup pass complete");
        Ok(())
    }
}

fn build_registry() -> Result<JobRegistry, ConveyorError> {
    let mut registry = JobRegistry::new();
    registry.register("SendEmailJob", || Box::new(SendEmailJob))?;
    registry.register("CleanupJob", || Box::new(CleanupJob))?;
    Ok(registry)
}

async fn consume() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let port: u16 = env_parse("CONVEYOR_HTTP_PORT", 8080);
    let workers: usize = env_parse("CONVEYOR_WORKERS", 2);
    let timeout_secs: u64 = env_parse("CONVEYOR_JOB_TIMEOUT_SECS", 0);
    let profile = std::env::var("CONVEYOR_PROFILE").ok().map(Profile::new);

    let registry = Arc::new(build_registry()?);
    info!(jobs = ?registry.registered_names(), "job registry ready");

    let queue = InMemoryQueue::new(TaskCodec::new(Arc::clone(&registry))).into_shared();

    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    let api_state = ApiState {
        queue: Arc::clone(&queue) as Arc<dyn Queue>,
        registry: Arc::clone(&registry),
    };
    let api = tokio::spawn(api::serve(addr, api_state));

    let options = WorkerOptions {
        profile,
        execution_timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
    };
    let group = WorkerGroup::spawn(
        workers,
        Arc::clone(&queue) as Arc<dyn Queue>,
        Arc::clone(&registry),
        options,
    );
    info!(workers, port, "conveyor running; press Ctrl-C to stop");

    tokio::signal::ctrl_c().await?;
    info!("shutting down; letting in-flight tasks finish");

    queue.close().await;
    group.shutdown_and_join().await;
    api.abort();

    Ok(())
}

async fn show(identifier: &str) -> Result<(), Box<dyn Error>> {
    let base = env_or("CONVEYOR_API_URL", "http://127.0.0.1:8080");
    let url = format!("{base}/task/{identifier}");

    let response = reqwest::get(&url).await?;
    if response.status() == reqwest::StatusCode::NOT_FOUND {
        eprintln!("No task found for identifier {identifier}");
        std::process::exit(1);
    }
    if !response.status().is_success() {
        eprintln!("Control-plane error ({})", response.status());
        std::process::exit(1);
    }

    let view: serde_json::Value = response.json().await?;
    print_task_block(&view);
    Ok(())
}

fn print_task_block(view: &serde_json::Value) {
    let raw_job = view["job"].as_str().unwrap_or_default();
    let human = JobName::new(raw_job).human_readable();

    println!("Identifier  {}", view["identifier"].as_str().unwrap_or_default());
    println!("Status      {}", view["status"].as_str().unwrap_or_default());
    println!("Profile     {}", view["profile"].as_str().unwrap_or_default());
    println!("Job         {human} ({raw_job})");
    println!("Created     {}", view["date"].as_str().unwrap_or_default());

    match view["parameters"].as_object() {
        Some(parameters) if !parameters.is_empty() => {
            println!("Parameters");
            for (key, value) in parameters {
                println!("  {key}: {value}");
            }
        }
        _ => println!("Parameters  (none)"),
    }

    match view["tags"].as_array() {
        Some(tags) if !tags.is_empty() => {
            let joined = tags
                .iter()
                .filter_map(|t| t.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            println!("Tags        {joined}");
        }
        _ => println!("Tags        (none)"),
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: FromStr + Copy>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
