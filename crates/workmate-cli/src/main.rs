mod config;

use clap::{Parser, Subcommand};
use config::{LoggingConfig, WorkmateConfig, DEFAULT_CONFIG_FILE};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use workmate_core::{Payload, Task, TaskPriority};
use workmate_orchestrator::{AssistantContext, ExecutionMode, SubtaskSpec};
use workmate_platforms::default_platforms;

#[derive(Parser)]
#[command(
    name = "workmate",
    version,
    about = "Workmate: routes work to GitHub, Gmail, Jira and Calendar agents"
)]
struct Cli {
    /// Path to config file (defaults to ./workmate.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dispatch a single task, evaluate it, and print the outcome
    Run {
        /// Task type, e.g. send_email or github_create_issue
        #[arg(long = "type")]
        task_type: String,
        /// Task payload as a JSON object
        #[arg(long)]
        payload: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        /// low, medium, high or urgent
        #[arg(long, default_value = "medium")]
        priority: String,
        /// Also dispatch generated follow-up tasks
        #[arg(long)]
        follow_ups: bool,
    },
    /// Run a JSON list of tasks as one workflow
    Workflow {
        /// File containing `[{"description", "task_type", "payload"}]`
        file: PathBuf,
        /// serial or parallel
        #[arg(short, long, default_value = "serial")]
        mode: String,
    },
    /// Probe every platform and report system health
    Status,
    /// List platforms, their sub-agents, and the task types they accept
    Capabilities,
}

fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    // stdout carries command output; logs go to stderr.
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if config.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let (config_path, explicit) = match cli.config {
        Some(path) => (path, true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };
    let mut config = WorkmateConfig::load(&config_path, explicit)?;
    config.apply_github_token(std::env::var("GITHUB_TOKEN").ok());
    init_logging(&config.logging);

    let platforms = default_platforms(&config.platforms)?;
    let context = AssistantContext::from_platforms(platforms);
    info!(
        platforms = context.dispatcher().platforms().len(),
        github_token = config.platforms.github.token.is_some(),
        "Workmate ready"
    );

    match cli.command {
        Commands::Run {
            task_type,
            payload,
            description,
            priority,
            follow_ups,
        } => {
            let payload: Payload = match payload {
                Some(raw) => serde_json::from_str(&raw)
                    .map_err(|e| anyhow::anyhow!("--payload must be a JSON object: {e}"))?,
                None => Payload::new(),
            };
            let description = description.unwrap_or_else(|| format!("CLI task: {task_type}"));
            let task = Task::new(description, task_type)
                .with_payload(payload)
                .with_priority(TaskPriority::from_label(&priority));

            let processed = context.process_task(task, follow_ups).await;
            print_json(&processed)?;
        }
        Commands::Workflow { file, mode } => {
            let mode: ExecutionMode = mode.parse()?;
            let source = tokio::fs::read_to_string(&file).await.map_err(|e| {
                anyhow::anyhow!("Failed to read workflow file '{}': {e}", file.display())
            })?;
            let specs: Vec<SubtaskSpec> = serde_json::from_str(&source)?;
            let mut tasks: Vec<Task> = specs.into_iter().map(SubtaskSpec::into_task).collect();

            let report = context.run_workflow(&mut tasks, mode).await;
            let evaluator = context.evaluator();
            print_json(&serde_json::json!({
                "report": report,
                "evaluation_summary": evaluator.summary(),
                "improvement_opportunities": evaluator
                    .identify_improvement_opportunities(&context.dispatcher().history()),
                "dispatch_metrics": context.dispatcher().monitor().to_json().await,
            }))?;
        }
        Commands::Status => {
            print_json(&context.system_status().await)?;
        }
        Commands::Capabilities => {
            let capabilities = context.platform_capabilities();
            if capabilities.is_empty() {
                println!("No platforms enabled.");
                println!("Enable platforms in {DEFAULT_CONFIG_FILE} under [github], [gmail], [jira] or [calendar]");
            } else {
                print_json(&capabilities)?;
            }
        }
    }

    Ok(())
}
