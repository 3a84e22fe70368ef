//! # JSON Snapshot CLI (`jsnap`)
//!
//! Run with no command to fetch every collection, group posts and
//! incomplete todos per user, print the results, and then prompt for
//! keyword searches until answered with anything but `Y`.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `jsnap` / `jsnap run` | Full pipeline, then interactive search |
//! | `jsnap fetch` | Fetch and save all configured resources |
//! | `jsnap group` | Group cached posts and todos per user |
//! | `jsnap search <keyword>` | Search the cached base collections once |
//! | `jsnap show <name>` | Print a cached collection |
//! | `jsnap list` | List cached collections |
//! | `jsnap session` | Interactive search over the cached collections |
//!
//! Logging goes to stderr and is controlled with `RUST_LOG`
//! (e.g. `RUST_LOG=json_snapshot=debug`).

use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use json_snapshot::config;
use json_snapshot::display::{ColorMode, Console};
use json_snapshot::fetch::HttpSource;
use json_snapshot::list;
use json_snapshot::pipeline;
use json_snapshot::progress::ProgressMode;
use json_snapshot::store::JsonFileStore;

/// Snapshot a public REST dataset locally, group it per user, and search it.
#[derive(Parser)]
#[command(
    name = "jsnap",
    version,
    about = "Snapshot a public REST dataset locally, group it per user, and search it"
)]
struct Cli {
    /// Path to configuration file (TOML). Built-in defaults apply when
    /// the file does not exist.
    #[arg(long, global = true, default_value = "./config/jsnap.toml")]
    config: PathBuf,

    /// Fetch progress on stderr. Defaults to `human` when stderr is a TTY.
    #[arg(long, global = true, value_enum)]
    progress: Option<ProgressMode>,

    /// Colorize collection labels.
    #[arg(long, global = true, value_enum, default_value = "auto")]
    color: ColorMode,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, group, display, then search interactively (the default).
    Run,

    /// Fetch every configured resource and save it locally.
    Fetch,

    /// Group cached posts per user and incomplete todos per user.
    Group,

    /// Search the cached base collections for a keyword.
    Search {
        /// Case-insensitive keyword.
        keyword: String,
    },

    /// Print a cached collection.
    Show {
        /// Collection name, with or without `.json`.
        name: String,
    },

    /// List cached collections with record counts and sizes.
    List,

    /// Interactive search over the cached collections, without fetching.
    Session,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config_or_default(&cli.config)?;

    let store = JsonFileStore::new(&cfg.store.dir, cfg.store.indent);
    let palette = cli.color.palette();
    let mut console = Console::stdout(palette, cfg.store.indent);
    let progress = cli.progress.unwrap_or_else(ProgressMode::default_for_tty);

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let source = HttpSource::new(&cfg.source)?;
            let reporter = progress.reporter();
            let stdin = io::stdin();
            pipeline::run_all(
                &cfg,
                &source,
                &store,
                &*reporter,
                stdin.lock(),
                console,
            )?;
        }
        Commands::Fetch => {
            let source = HttpSource::new(&cfg.source)?;
            let reporter = progress.reporter();
            pipeline::run_fetch(&cfg, &source, &store, &*reporter, &mut console)?;
        }
        Commands::Group => {
            pipeline::run_grouping(&cfg, &store, &mut console)?;
        }
        Commands::Search { keyword } => {
            pipeline::run_search(&store, &keyword, &mut console)?;
        }
        Commands::Show { name } => {
            console.show_collection(&store, &name)?;
        }
        Commands::List => {
            list::run_list(&store, console.writer())?;
        }
        Commands::Session => {
            let stdin = io::stdin();
            pipeline::run_session(&cfg, &store, stdin.lock(), console)?;
        }
    }

    Ok(())
}
