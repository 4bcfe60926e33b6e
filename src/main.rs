//! Filesystem Watcher - report changes to files and directories.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use filesystem_watcher::config::{ConfigError, ConfigLoader, ObjectConfig, OutputConfig};
use filesystem_watcher::display;
use filesystem_watcher::manager::{ManagerError, WatchManager};
use filesystem_watcher::watcher::{EventMask, Interest, WatchPayload};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EventArg {
    Added,
    Removed,
    Modified,
    Renamed,
}

impl From<EventArg> for Interest {
    fn from(arg: EventArg) -> Self {
        match arg {
            EventArg::Added => Interest::Added,
            EventArg::Removed => Interest::Removed,
            EventArg::Modified => Interest::Modified,
            EventArg::Renamed => Interest::Renamed,
        }
    }
}

#[derive(Parser)]
#[command(
    name = "filesystem-watcher",
    about = "Watch files and directories and report changes",
    version
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch files or directories until interrupted.
    Watch {
        /// Paths to watch. Replaces the objects from the config file.
        paths: Vec<PathBuf>,
        /// Watch subdirectories of directory paths too.
        #[arg(short, long)]
        recursive: bool,
        /// Event kinds to report (default: all).
        #[arg(short, long, value_enum, value_delimiter = ',')]
        events: Vec<EventArg>,
        /// Config file to use instead of the default search paths.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Print events as JSON lines.
        #[arg(long)]
        json: bool,
        /// Do not truncate long paths.
        #[arg(long)]
        raw: bool,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Manager(#[from] ManagerError),

    #[error("Nothing to watch: pass paths or configure [[objects]]")]
    NothingToWatch,

    #[error("Every watched object failed")]
    AllFailed,
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

struct WatchArgs {
    paths: Vec<PathBuf>,
    recursive: bool,
    events: Vec<EventArg>,
    config: Option<PathBuf>,
    json: bool,
    raw: bool,
}

fn load_output_and_objects(args: &WatchArgs) -> Result<(OutputConfig, Vec<ObjectConfig>), CliError> {
    let loader = args
        .config
        .clone()
        .map_or_else(ConfigLoader::new, ConfigLoader::with_path);
    let config = loader.load()?;

    let mut output = config.output;
    output.json |= args.json;
    output.raw |= args.raw;
    Ok((output, config.objects))
}

fn start_watches(args: &WatchArgs, configured: &[ObjectConfig]) -> Result<WatchManager, CliError> {
    let mut manager = WatchManager::new();
    if args.paths.is_empty() {
        for object in configured {
            manager.add(object.to_object()?);
        }
    } else {
        let mask = if args.events.is_empty() {
            EventMask::ALL
        } else {
            args.events.iter().copied().map(Interest::from).collect()
        };
        for path in &args.paths {
            manager.add_path(path, args.recursive, mask)?;
        }
    }

    if manager.is_empty() {
        return Err(CliError::NothingToWatch);
    }
    Ok(manager)
}

async fn run_watch(args: WatchArgs) -> Result<(), CliError> {
    let (output, configured) = load_output_and_objects(&args)?;
    let mut manager = start_watches(&args, &configured)?;
    if !output.json {
        for managed in manager.objects() {
            display::print_watch_start(managed.object());
        }
    }

    let result = loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, stopping watchers");
                break Ok(());
            }
            message = manager.next_message() => {
                let Some(message) = message else { break Ok(()) };
                if output.json {
                    display::print_json(&message);
                } else {
                    display::print_message(&message, output.raw);
                }
                if matches!(message.payload, WatchPayload::Error(_))
                    && manager.objects().all(|m| m.status().is_failed())
                {
                    break Err(CliError::AllFailed);
                }
            }
        }
    };

    manager.shutdown().await;
    result
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Watch {
            paths,
            recursive,
            events,
            config,
            json,
            raw,
        } => {
            let args = WatchArgs {
                paths,
                recursive,
                events,
                config,
                json,
                raw,
            };
            match run_watch(args).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    display::print_error(&e.to_string());
                    ExitCode::FAILURE
                }
            }
        }
    }
}
