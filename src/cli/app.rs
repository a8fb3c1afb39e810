//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;

use super::output::{Output, OutputFormat};
use super::{artifact, collection, generate, graph, watch, workspace_cmd};
use crate::domain::{ArtifactId, ArtifactKind};
use crate::storage::{Config, Project};

#[derive(Parser)]
#[command(name = "scaffold")]
#[command(author, version, about = "Versioned workspaces for generated backend code")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config setting, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Workspace to operate on (defaults to the project's default workspace)
    #[arg(long, short = 'w', global = true, env = "SCAFFOLD_WORKSPACE")]
    pub workspace: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new scaffold project
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Show project and workspace status
    Status,

    /// Manage workspaces
    #[command(subcommand)]
    Workspace(workspace_cmd::WorkspaceCommands),

    /// Inspect artifacts and their history
    #[command(subcommand)]
    Artifact(artifact::ArtifactCommands),

    /// Snapshot every changed artifact of a kind
    Commit {
        kind: ArtifactKind,

        /// Message stored with the snapshots
        #[arg(long, short)]
        message: Option<String>,
    },

    /// Restore an artifact to an earlier snapshot
    Revert {
        kind: ArtifactKind,
        id: ArtifactId,

        /// Snapshot timestamp (milliseconds, see `artifact history`)
        timestamp: i64,
    },

    /// Reconcile a generated batch file into the workspace
    Reconcile {
        kind: ArtifactKind,

        /// JSON file holding an item array or a {kind, items} object
        #[arg(long)]
        file: PathBuf,
    },

    /// Generate a batch with the configured generator and reconcile it
    Generate {
        kind: ArtifactKind,

        /// Extra instructions for the generator
        #[arg(long, short)]
        prompt: Option<String>,
    },

    /// Rebuild handler groups and routers from the endpoints
    Derive,

    /// Manage endpoint collections
    #[command(subcommand)]
    Collection(collection::CollectionCommands),

    /// Show the dependency graph
    Graph {
        /// Print Graphviz DOT instead
        #[arg(long)]
        dot: bool,

        /// Show only the neighbours of one artifact
        #[arg(long, conflicts_with = "dot")]
        node: Option<ArtifactId>,
    },

    /// Reconcile batch files dropped into .scaffold/inbox/
    Watch {
        /// Process pending files and exit
        #[arg(long)]
        once: bool,
    },
}

/// Installs the `log` backend; `RUST_LOG` overrides the default level
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .try_init();
}

/// Output format from the flag, else the global config
fn resolve_format(flag: Option<OutputFormat>) -> OutputFormat {
    flag.unwrap_or_else(|| {
        Config::load()
            .map(|config| config.global.default_format.into())
            .unwrap_or_default()
    })
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let output = Output::new(resolve_format(cli.format), cli.verbose);
    let workspace = cli.workspace.as_deref();

    output.verbose("Scaffold CLI starting");

    match cli.command {
        Commands::Init { path } => {
            output.verbose_ctx("init", &format!("Initializing project at: {}", path.display()));
            let project = Project::init(&path)?;
            output.verbose_ctx(
                "init",
                &format!("Created .scaffold directory at: {}", project.scaffold_dir().display()),
            );
            if output.is_json() {
                output.data(&serde_json::json!({
                    "root": project.root().display().to_string(),
                    "default_workspace": project.config().project.default_workspace,
                }));
            } else {
                output.success(&format!("Initialized scaffold project at {}", project.root().display()));
            }
        }

        Commands::Status => workspace_cmd::status(&output, workspace)?,
        Commands::Workspace(cmd) => workspace_cmd::run(cmd, &output, workspace)?,
        Commands::Artifact(cmd) => artifact::run(cmd, &output, workspace)?,

        Commands::Commit { kind, message } => {
            artifact::commit(&output, workspace, kind, message.as_deref())?
        }
        Commands::Revert { kind, id, timestamp } => {
            artifact::revert(&output, workspace, kind, &id, timestamp)?
        }

        Commands::Reconcile { kind, file } => {
            output.verbose_ctx("reconcile", &format!("Reading {}", file.display()));
            generate::reconcile_file(&output, workspace, kind, &file)?
        }
        Commands::Generate { kind, prompt } => {
            generate::generate(&output, workspace, kind, prompt.as_deref())?
        }
        Commands::Derive => generate::derive(&output, workspace)?,

        Commands::Collection(cmd) => collection::run(cmd, &output, workspace)?,
        Commands::Graph { dot, node } => graph::run(&output, workspace, dot, node.as_ref())?,
        Commands::Watch { once } => watch::run(&output, workspace, once)?,
    }

    output.verbose("Command completed successfully");
    Ok(())
}
