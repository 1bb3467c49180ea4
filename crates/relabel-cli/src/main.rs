//! relabel CLI: drive a label-editing session from the shell.
//!
//! # Configuration
//!
//! Configuration is loaded from multiple sources with priority:
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`RELABEL_*`)
//! 3. Project config (`.relabel/config.toml` under `-C`, default: current directory)
//! 4. Global config (`~/.relabel/config.toml`)
//! 5. Default values (lowest priority)
//!
//! # Examples
//!
//! ```text
//! relabel load embryo-3
//! relabel edit embryo-3 swap_single_frame label_1=3 label_2=7 frame=0
//! relabel undo embryo-3
//! relabel display embryo-3 frame 12
//! relabel cache list
//! ```

mod commands;
mod tracing_writer;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{CacheOp, Intent};
use relabel_runtime::{ConfigLoader, ConfigResolver, RelabelConfig};
use relabel_types::ProjectId;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// relabel: label-editing client
#[derive(Parser, Debug)]
#[command(name = "relabel")]
#[command(version, about, long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Project root holding `.relabel/config.toml` (defaults to current directory)
    #[arg(short = 'C', long, global = true, value_name = "DIR")]
    project_root: Option<PathBuf>,

    /// Label service base URL (also: RELABEL_API_URL)
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,

    /// Project cache directory (also: RELABEL_STORE_DIR)
    #[arg(long, global = true, value_name = "DIR")]
    store_dir: Option<PathBuf>,

    /// Write logs to a file in this directory
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// File log level (also: RELABEL_LOG_LEVEL, default: debug)
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a project and print a summary
    Load {
        /// Project id
        project: ProjectId,
    },
    /// Apply a label edit
    Edit {
        /// Project id
        project: ProjectId,
        /// Service action, e.g. `swap_single_frame`
        action: String,
        /// Action arguments as key=value
        #[arg(value_parser = parse_arg)]
        args: Vec<(String, String)>,
    },
    /// Undo the latest edit on the service
    Undo {
        /// Project id
        project: ProjectId,
    },
    /// Redo the latest undone edit on the service
    Redo {
        /// Project id
        project: ProjectId,
    },
    /// Change a display dimension (frame, feature, channel)
    Display {
        /// Project id
        project: ProjectId,
        /// Dimension name
        dimension: String,
        /// New index
        value: usize,
    },
    /// Toggle RGB display mode
    Rgb {
        /// Project id
        project: ProjectId,
    },
    /// Inspect the local project cache
    Cache {
        #[command(subcommand)]
        op: CacheCommand,
    },
}

#[derive(Subcommand, Debug)]
enum CacheCommand {
    /// List cached projects, newest first
    List,
    /// Remove a project from the cache
    Delete {
        /// Project id
        project: ProjectId,
    },
}

/// Parses one `key=value` edit argument.
fn parse_arg(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got `{s}`")),
    }
}

/// CLI-based configuration resolver.
///
/// Applies CLI argument overrides as the highest-priority layer on top of
/// what [`ConfigLoader`] merged from files and environment.
struct CliConfigResolver {
    project_root: PathBuf,
    debug: bool,
    api_url: Option<String>,
    store_dir: Option<PathBuf>,
    log_file: Option<PathBuf>,
    log_level: Option<String>,
}

impl CliConfigResolver {
    fn from_args(args: &Args) -> Self {
        let project_root = args.project_root.clone().unwrap_or_else(|| {
            std::env::current_dir().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to get current directory, using '.'");
                PathBuf::from(".")
            })
        });

        Self {
            project_root,
            debug: args.debug,
            api_url: args.api_url.clone(),
            store_dir: args.store_dir.clone(),
            log_file: args.log_file.clone(),
            log_level: args.log_level.clone(),
        }
    }

    fn resolve(&self) -> Result<RelabelConfig> {
        let mut config = ConfigLoader::new()
            .with_project_root(&self.project_root)
            .load()?;
        self.apply(&mut config);
        Ok(config)
    }
}

impl ConfigResolver for CliConfigResolver {
    fn apply(&self, config: &mut RelabelConfig) {
        if self.debug {
            config.debug = true;
        }
        if let Some(ref url) = self.api_url {
            config.api.base_url.clone_from(url);
        }
        if let Some(ref dir) = self.store_dir {
            config.store.dir = Some(dir.clone());
        }
        if let Some(ref path) = self.log_file {
            config.logging.file = true;
            config.logging.file_path = Some(path.clone());
        }
        if let Some(ref level) = self.log_level {
            config.logging.file_level.clone_from(level);
        }
    }
}

/// Installs terminal and file layers with independent filters.
///
/// Terminal: `--debug` > `--verbose` > `RUST_LOG` > `warn`, on stderr.
/// File: `logging.file_level`, ANSI disabled.
fn init_tracing(args: &Args, config: &RelabelConfig) {
    let terminal_filter = if args.debug || config.debug {
        EnvFilter::new("debug,hyper=warn,hyper_util=warn,h2=warn,reqwest=warn,rustls=warn,tokio=warn")
    } else if args.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let terminal_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(terminal_filter);

    let file_layer = config
        .logging
        .file
        .then(|| tracing_writer::open_log_file(&config.logging.file_path_or_default()))
        .flatten()
        .map(|file| {
            let filter = EnvFilter::try_new(&config.logging.file_level)
                .unwrap_or_else(|_| EnvFilter::new("debug"));
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(tracing_writer::FileMakeWriter::new(file))
                .with_filter(filter)
        });

    tracing_subscriber::registry()
        .with(terminal_layer)
        .with(file_layer)
        .init();
}

// Single-threaded: actors only run once main awaits, so the outcome
// observer is subscribed before the first load can be published.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let resolver = CliConfigResolver::from_args(&args);
    let config = resolver
        .resolve()
        .map_err(|e| anyhow::anyhow!("Config error: {e}"))?;

    init_tracing(&args, &config);
    info!(
        root = %resolver.project_root.display(),
        api = %config.api.base_url,
        "configuration resolved"
    );

    match args.command {
        Command::Load { project } => commands::run_project(&config, project, Intent::Show).await,
        Command::Edit {
            project,
            action,
            args,
        } => {
            let args: BTreeMap<_, _> = args.into_iter().collect();
            commands::run_project(&config, project, Intent::Edit { action, args }).await
        }
        Command::Undo { project } => commands::run_project(&config, project, Intent::Undo).await,
        Command::Redo { project } => commands::run_project(&config, project, Intent::Redo).await,
        Command::Display {
            project,
            dimension,
            value,
        } => {
            commands::run_project(&config, project, Intent::Display { dimension, value }).await
        }
        Command::Rgb { project } => commands::run_project(&config, project, Intent::Rgb).await,
        Command::Cache { op } => {
            let op = match op {
                CacheCommand::List => CacheOp::List,
                CacheCommand::Delete { project } => CacheOp::Delete(project),
            };
            commands::run_cache(&config, op).await
        }
    }
}
