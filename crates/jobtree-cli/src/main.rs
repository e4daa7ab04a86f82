use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use jobtree_application::HierarchyService;
use jobtree_infrastructure::ConfigService;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;

#[derive(Parser)]
#[command(name = "jobtree")]
#[command(about = "Jobtree CLI - organize a job's tasks as an ordered tree", long_about = None)]
struct Cli {
    /// Directory holding job files (defaults to the platform data directory)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Path to config.toml (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Job to operate on
    #[arg(long, short, global = true, default_value = "default")]
    job: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the task tree
    Tree {
        /// Only expand these tasks (everything is expanded by default)
        #[arg(long, value_delimiter = ',')]
        expand: Option<Vec<String>>,
        /// Print the nested tree as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a task
    Add {
        title: String,
        /// Parent task id
        #[arg(long)]
        parent: Option<String>,
        #[command(flatten)]
        place: commands::Placement,
    },
    /// Move tasks like a drag-and-drop gesture
    Move {
        /// Tasks to move, in any order
        #[arg(required = true)]
        task_ids: Vec<String>,
        #[command(flatten)]
        target: DropTarget,
    },
    /// Nest a task under its previous sibling
    Indent { task_id: String },
    /// Move a task out of its parent, right after it
    Outdent { task_id: String },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct DropTarget {
    /// Nest as the last children of this task
    #[arg(long)]
    nest: Option<String>,
    /// Place right before this task
    #[arg(long)]
    before: Option<String>,
    /// Place right after this task
    #[arg(long)]
    after: Option<String>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config_service = match cli.config {
        Some(path) => ConfigService::with_path(path),
        None => ConfigService::new()?,
    };
    let config = config_service
        .get_config()
        .with_context(|| format!("Failed to load {}", config_service.path().display()))?;
    let service = HierarchyService::with_toml_store(cli.data_dir.as_deref(), &config)?;
    let job = cli.job.as_str();

    match cli.command {
        Commands::Tree { expand, json } => commands::tree(&service, job, expand, json).await?,
        Commands::Add {
            title,
            parent,
            place,
        } => commands::add(&service, job, &title, parent.as_deref(), place).await?,
        Commands::Move { task_ids, target } => {
            let zone = commands::drop_zone(target.nest, target.before, target.after)?;
            commands::move_tasks(&service, job, task_ids, zone).await?
        }
        Commands::Indent { task_id } => commands::indent(&service, job, &task_id).await?,
        Commands::Outdent { task_id } => commands::outdent(&service, job, &task_id).await?,
    }

    Ok(())
}
