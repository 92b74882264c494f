//! CLI commands implementation.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use console::style;

use crate::config::Config;
use crate::ledger::JsonRpcLedgerClient;
use crate::models::{ComplaintRecord, Location, Task, TaskPayload, UserRecord};
use crate::pinner::HttpPinner;
use crate::queue::{queue_for, RedisTaskQueue, TaskQueue};
use crate::results::{RedisResultStore, ResultStore};
use crate::worker::{Worker, WorkerConfig};

#[derive(Parser)]
#[command(name = "civicledger")]
#[command(about = "Grievance record pipeline committing citizen submissions to an append-only ledger")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Run the worker loop until interrupted
    Worker,

    /// Enqueue a task (producer side, for testing)
    Enqueue {
        /// Task kind to enqueue
        #[arg(value_enum)]
        kind: EnqueueKind,
        /// JSON payload file; a built-in sample is used when omitted
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Query the recorded outcome for a task id
    Result {
        /// Task id returned by enqueue
        task_id: String,
    },

    /// Print the effective configuration (credentials redacted)
    Config,
}

#[derive(Clone, Copy, ValueEnum)]
enum EnqueueKind {
    User,
    Complaint,
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Worker => run_worker().await,
        Commands::Enqueue { kind, file } => enqueue(kind, file).await,
        Commands::Result { task_id } => show_result(&task_id).await,
        Commands::Config => show_config(),
    }
}

async fn run_worker() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    let queue = RedisTaskQueue::new(&config.redis_url)
        .await
        .context("connecting task queue")?;
    let results = RedisResultStore::new(&config.redis_url)
        .await
        .context("connecting result store")?;
    let pinner = HttpPinner::new(&config.pinner_api_url, &config.pinner_jwt)
        .context("building content pinner")?;
    let ledger = JsonRpcLedgerClient::new(
        &config.ledger_rpc_url,
        &config.ledger_contract_address,
        &config.ledger_signing_key,
    )
    .context("building ledger client")?;

    let worker = Arc::new(Worker::new(
        Arc::new(queue),
        Arc::new(pinner),
        Arc::new(ledger),
        Arc::new(results),
        WorkerConfig::from(&config),
    ));

    let runner = {
        let worker = worker.clone();
        tokio::spawn(async move { worker.run().await })
    };

    tokio::signal::ctrl_c().await?;
    eprintln!(
        "{}",
        style("shutdown requested, finishing in-flight task...").yellow()
    );
    worker.shutdown();
    runner.await?;

    Ok(())
}

async fn enqueue(kind: EnqueueKind, file: Option<PathBuf>) -> anyhow::Result<()> {
    let payload = match (kind, file) {
        (EnqueueKind::User, Some(path)) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            TaskPayload::UserRegistration(serde_json::from_str::<UserRecord>(&raw)?)
        }
        (EnqueueKind::Complaint, Some(path)) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            TaskPayload::ComplaintRegistration(serde_json::from_str::<ComplaintRecord>(&raw)?)
        }
        (EnqueueKind::User, None) => TaskPayload::UserRegistration(sample_user()),
        (EnqueueKind::Complaint, None) => TaskPayload::ComplaintRegistration(sample_complaint()),
    };

    let task = Task::new(payload);
    let queue_name = queue_for(task.payload.category());
    let raw = serde_json::to_string(&task)?;

    let queue = RedisTaskQueue::new(&redis_url_from_env()).await?;
    queue.push(queue_name, &raw).await?;

    println!(
        "{} task {} pushed to {}",
        style("queued:").green().bold(),
        style(&task.id).cyan(),
        queue_name
    );
    Ok(())
}

async fn show_result(task_id: &str) -> anyhow::Result<()> {
    let results = RedisResultStore::new(&redis_url_from_env()).await?;

    match results.get_result(task_id).await? {
        Some(outcome) => {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        None => {
            println!(
                "{} no outcome recorded for task {} (pending, unknown, or expired)",
                style("not found:").yellow().bold(),
                task_id
            );
        }
    }
    Ok(())
}

fn show_config() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    for (key, value) in config.redacted() {
        println!("{}={}", style(key).bold(), value);
    }
    Ok(())
}

fn redis_url_from_env() -> String {
    std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string())
}

fn sample_complaint() -> ComplaintRecord {
    ComplaintRecord {
        id: None,
        category_id: Some("C-WATER".to_string()),
        sub_category: "Water Supply".to_string(),
        description: Some("No water supply in Ward 5 for the past 48 hours".to_string()),
        urgency: Some("critical".to_string()),
        attachment_url: None,
        assigned_department: "Public Health Engineering".to_string(),
        is_public: true,
        location: Some(Location {
            pin: "834001".to_string(),
            district: "Ranchi".to_string(),
            city: "Ranchi".to_string(),
            locality: Some("Ward 5".to_string()),
            municipal: None,
            state: Some("Jharkhand".to_string()),
        }),
        user_id: Some("U1".to_string()),
        submission_date: Some(chrono::Utc::now()),
    }
}

fn sample_user() -> UserRecord {
    UserRecord {
        id: format!("USR-{}", uuid::Uuid::new_v4()),
        email: "citizen@example.com".to_string(),
        phone_number: None,
        name: "Test Citizen".to_string(),
        national_id: None,
        date_of_creation: Some(chrono::Utc::now()),
        location: Location {
            pin: "834001".to_string(),
            district: "Ranchi".to_string(),
            city: "Ranchi".to_string(),
            locality: None,
            municipal: Some("Ranchi Municipal Corporation".to_string()),
            state: Some("Jharkhand".to_string()),
        },
    }
}
