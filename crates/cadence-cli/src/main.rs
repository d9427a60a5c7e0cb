//! cadence - study planner CLI
//!
//! Each invocation loads the JSON snapshot, runs one request, prints the
//! response envelope on stdout and writes the snapshot back after a
//! successful mutation. Logs go to stderr.

mod settings;

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use cadence_core::domain::OwnerId;
use cadence_core::impls::{InMemoryStore, StoreSnapshot};
use cadence_core::{PlannerBuilder, Request, handle};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "cadence", version, about = "Spaced-repetition study planner")]
struct Cli {
    /// Snapshot file (overrides `db_path` from configuration).
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[arg(long, global = true, default_value = "local")]
    owner: String,

    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a task and its scheduled revisions.
    Create {
        #[arg(long)]
        subject: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        text: Option<String>,
        /// YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// task, pyq, test, fullrevision or general
        #[arg(long = "type", default_value = "task")]
        task_type: String,
        #[arg(long, allow_negative_numbers = true)]
        repeat_every_days: Option<i64>,
    },
    /// List tasks between two dates (inclusive).
    List {
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
    },
    /// Tasks for today (or --date).
    Today {
        #[arg(long)]
        date: Option<String>,
    },
    /// Unfinished tasks before today (or --date).
    Buffer {
        #[arg(long)]
        date: Option<String>,
    },
    /// Today and buffer together.
    Overview {
        #[arg(long)]
        date: Option<String>,
    },
    /// Set a task's status (pending, completed, missed).
    Status { id: String, status: String },
    /// Move one occurrence.
    Reschedule {
        id: String,
        #[arg(long)]
        new_date: String,
    },
    /// Regenerate a task's group from a new date.
    RescheduleAll {
        id: String,
        #[arg(long)]
        new_date: String,
        #[arg(long, allow_negative_numbers = true)]
        repeat_every_days: Option<i64>,
    },
    /// Change a task's type, optionally regenerating its future revisions.
    Retype {
        id: String,
        #[arg(long = "type")]
        task_type: String,
        #[arg(long, allow_negative_numbers = true)]
        repeat_every_days: Option<i64>,
        #[arg(long)]
        reschedule_all: bool,
    },
    /// Delete a buffered task that is old enough.
    DeleteBuffered {
        id: String,
        #[arg(long, allow_negative_numbers = true)]
        threshold: Option<i64>,
        #[arg(long)]
        date: Option<String>,
    },
    /// Upcoming free and light days.
    Available,
    /// This month vs last month.
    Stats,
    /// Manage subject labels.
    #[command(subcommand)]
    Subject(SubjectCommand),
    /// Report inconsistent occurrence groups.
    Check,
    /// Run a JSON request read from stdin.
    Raw,
}

#[derive(Debug, Subcommand)]
enum SubjectCommand {
    List,
    Add { name: String },
    Remove { id: String },
}

impl Command {
    fn into_request(self) -> anyhow::Result<Request> {
        let request = match self {
            Command::Create {
                subject,
                title,
                text,
                date,
                task_type,
                repeat_every_days,
            } => Request::CreateTaskGroup {
                subject: Some(subject),
                title: Some(title),
                text,
                assigned_date: Some(date),
                task_type: Some(task_type),
                repeat_every_days,
            },
            Command::List { start, end } => Request::ListRange {
                start: Some(start),
                end: Some(end),
            },
            Command::Today { date } => Request::ListToday { date },
            Command::Buffer { date } => Request::ListBuffer { date },
            Command::Overview { date } => Request::BufferOverview { date },
            Command::Status { id, status } => Request::UpdateStatus {
                id: Some(id),
                status: Some(status),
            },
            Command::Reschedule { id, new_date } => Request::Reschedule {
                id: Some(id),
                new_date: Some(new_date),
            },
            Command::RescheduleAll {
                id,
                new_date,
                repeat_every_days,
            } => Request::RescheduleAll {
                id: Some(id),
                new_date: Some(new_date),
                repeat_every_days,
            },
            Command::Retype {
                id,
                task_type,
                repeat_every_days,
                reschedule_all,
            } => Request::Retype {
                id: Some(id),
                task_type: Some(task_type),
                repeat_every_days,
                reschedule_all: Some(reschedule_all),
            },
            Command::DeleteBuffered { id, threshold, date } => Request::DeleteBuffered {
                id: Some(id),
                buffer_threshold: threshold,
                date,
            },
            Command::Available => Request::AvailableDates,
            Command::Stats => Request::PerformanceStats,
            Command::Subject(SubjectCommand::List) => Request::ListSubjects,
            Command::Subject(SubjectCommand::Add { name }) => Request::AddSubject { name: Some(name) },
            Command::Subject(SubjectCommand::Remove { id }) => Request::RemoveSubject { id: Some(id) },
            Command::Check => Request::IntegrityScan,
            Command::Raw => {
                let mut body = String::new();
                std::io::stdin()
                    .read_to_string(&mut body)
                    .context("reading request from stdin")?;
                serde_json::from_str(&body).context("decoding request JSON")?
            }
        };
        Ok(request)
    }
}

fn init_tracing(fallback: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)))
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let settings = settings::load(cli.config.as_deref())?;
    init_tracing(&settings.log_level);

    let db_path = cli.db.unwrap_or(settings.db_path);
    let owner = OwnerId::new(cli.owner);
    let request = cli.command.into_request()?;

    let snapshot = StoreSnapshot::load(&db_path)
        .with_context(|| format!("loading snapshot {}", db_path.display()))?;
    debug!(path = %db_path.display(), tasks = snapshot.tasks.len(), "snapshot loaded");

    let store = InMemoryStore::from_snapshot(snapshot);
    let planner = PlannerBuilder::new()
        .in_memory(store.clone())
        .config(settings.planner)
        .build()?;

    let mutates = request.is_mutation();
    let response = handle(&planner, &owner, request).await;
    println!("{}", serde_json::to_string_pretty(&response)?);

    if response.success && mutates {
        store
            .snapshot()
            .await
            .save(&db_path)
            .with_context(|| format!("saving snapshot {}", db_path.display()))?;
        info!(path = %db_path.display(), "snapshot saved");
    }

    Ok(if response.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
