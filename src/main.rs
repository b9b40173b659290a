use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result, bail};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use conductor_capability::table::OPERATIONS;
use conductor_config::EngineConfig;
use conductor_engine::{Context, Engine, EngineEvent, TaskSnapshot};

/// Conductor - autonomous task orchestration across agent phases
#[derive(Parser)]
#[command(name = "conductor")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the config file (default: ~/.conductor/config.yaml)
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Submit a task and wait for its report
  Run {
    /// Free-text description of the work
    description: String,

    /// Path to a JSON file with the task context (default: stdin, if piped)
    #[arg(long)]
    context: Option<PathBuf>,
  },

  /// List the operations each phase can perform
  Capabilities,

  /// Print the effective configuration
  Config,
}

fn main() -> Result<()> {
  init_tracing();
  let cli = Cli::parse();

  let config_path = match cli.config {
    Some(path) => path,
    None => dirs::home_dir()
      .context("could not determine home directory")?
      .join(".conductor")
      .join("config.yaml"),
  };

  match cli.command {
    Some(Commands::Run {
      description,
      context,
    }) => {
      let config = load_config(&config_path)?;
      run_task(config, description, context)?;
    }
    Some(Commands::Capabilities) => {
      println!("{}", serde_json::to_string_pretty(&OPERATIONS)?);
    }
    Some(Commands::Config) => {
      let mut config = load_config(&config_path)?;
      if config.provider.api_key.is_some() {
        config.provider.api_key = Some("<redacted>".to_string());
      }
      println!("{}", serde_json::to_string_pretty(&config)?);
    }
    None => {
      println!("conductor - use --help to see available commands");
    }
  }

  Ok(())
}

fn init_tracing() {
  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "conductor=info".into()))
    .with(fmt::layer().with_target(false).with_writer(io::stderr))
    .init();
}

fn load_config(path: &Path) -> Result<EngineConfig> {
  EngineConfig::load_or_default(path)
    .with_context(|| format!("failed to load config: {}", path.display()))
}

fn run_task(config: EngineConfig, description: String, context: Option<PathBuf>) -> Result<()> {
  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async { run_task_async(config, description, context).await })
}

async fn run_task_async(
  config: EngineConfig,
  description: String,
  context_file: Option<PathBuf>,
) -> Result<()> {
  let context = match context_file {
    Some(path) => {
      let content = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("failed to read context file: {}", path.display()))?;
      serde_json::from_str(&content)
        .with_context(|| format!("failed to parse context file: {}", path.display()))?
    }
    None => read_context_from_stdin()?,
  };

  let engine = Arc::new(Engine::from_config(&config, None).context("failed to create engine")?);
  let mut events = engine.subscribe();

  let cancel = CancellationToken::new();
  let runner = tokio::spawn({
    let engine = engine.clone();
    let cancel = cancel.clone();
    async move { engine.start(cancel).await }
  });

  let task_id = engine
    .submit(&description, context)
    .context("task was rejected")?;
  info!(task_id = %task_id, "waiting for task");

  loop {
    tokio::select! {
      event = events.recv() => match event {
        Some(EngineEvent::StepCompleted { task_id: id, operation, success }) if id == task_id => {
          eprintln!("  {} {}", if success { "ok  " } else { "fail" }, operation);
        }
        Some(EngineEvent::TaskFinished { task_id: id, .. })
        | Some(EngineEvent::TaskCancelled { task_id: id }) if id == task_id => break,
        Some(_) => {}
        None => bail!("engine stopped before the task finished"),
      },
      _ = tokio::signal::ctrl_c() => {
        warn!(task_id = %task_id, "interrupted, cancelling task");
        engine.cancel(&task_id);
        break;
      }
    }
  }

  engine.shutdown().await;
  cancel.cancel();
  runner.await?.context("engine loop failed")?;

  match engine.get_status(&task_id) {
    Some(TaskSnapshot::Finished(report)) => {
      eprintln!(
        "Task {}: {} ({} steps, {}ms)",
        if report.success { "completed" } else { "failed" },
        report.task.title,
        report.steps.len(),
        report.elapsed_ms
      );
      println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Some(snapshot) => {
      eprintln!("Task ended as {}", snapshot.status());
      println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }
    None => bail!("task {} disappeared", task_id),
  }

  Ok(())
}

fn read_context_from_stdin() -> Result<Context> {
  use std::io::IsTerminal;

  if io::stdin().is_terminal() {
    return Ok(Context::default());
  }

  let mut input = String::new();
  io::stdin()
    .read_to_string(&mut input)
    .context("failed to read context from stdin")?;

  if input.trim().is_empty() {
    Ok(Context::default())
  } else {
    serde_json::from_str(&input).context("failed to parse context JSON from stdin")
  }
}
