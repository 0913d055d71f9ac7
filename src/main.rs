#![forbid(unsafe_code)]
//! Block Inspector Command Line Interface

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use block_inspector::commands::{
    execute_index, execute_init, execute_render, execute_replay, execute_resolve, execute_scan,
    IndexOptions, InitOptions, RenderOptions, ReplayOptions, ResolveOptions, ScanOptions,
};
use block_inspector::Config;

#[derive(Parser)]
#[command(name = "block-inspector")]
#[command(about = "Inspect template block markers in rendered HTML pages")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true, default_value = ".inspector.config.json")]
    config: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },

    /// List every element that received a marker
    Index {
        /// Saved HTML page
        page: PathBuf,

        /// Output as JSON (default: human-readable)
        #[arg(long)]
        json: bool,
    },

    /// Show the block hierarchy for an element
    Resolve {
        /// Saved HTML page
        page: PathBuf,

        /// Element: `#id`, `@node` or a tag name
        target: String,

        /// Output as JSON (default: human-readable)
        #[arg(long)]
        json: bool,
    },

    /// Print the tooltip markup for an element
    Render {
        /// Saved HTML page
        page: PathBuf,

        /// Element: `#id`, `@node` or a tag name
        target: String,
    },

    /// Run a timed input script against a headless session
    Replay {
        /// Saved HTML page
        page: PathBuf,

        /// JSON array of `{ "at_ms": n, "event": {...} }` steps
        script: PathBuf,

        /// Advance the clock to this time (ms) after the last step
        #[arg(long)]
        until: Option<u64>,

        /// Output as JSON (default: human-readable)
        #[arg(long)]
        json: bool,
    },

    /// Summarize markers across a directory of pages
    Scan {
        /// Directory to scan
        #[arg(default_value = ".")]
        root: PathBuf,

        /// Output as JSON (default: human-readable)
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Init may be overwriting a broken config, so it never loads one
    if let Commands::Init { force } = cli.command {
        return execute_init(InitOptions {
            path: cli.config,
            force,
        });
    }

    // Load config
    let config = if cli.config.exists() {
        Config::load(&cli.config)?
    } else {
        Config::default()
    };

    match cli.command {
        Commands::Init { .. } => unreachable!("handled above"),

        Commands::Index { page, json } => {
            execute_index(IndexOptions { page, json })?;
        }

        Commands::Resolve { page, target, json } => {
            let options = ResolveOptions { page, target, json };
            execute_resolve(options, config)?;
        }

        Commands::Render { page, target } => {
            execute_render(RenderOptions { page, target }, config)?;
        }

        Commands::Replay { page, script, until, json } => {
            let options = ReplayOptions {
                page,
                script,
                until_ms: until,
                json,
            };
            execute_replay(options, config)?;
        }

        Commands::Scan { root, json } => {
            execute_scan(ScanOptions { root, json }, config)?;
        }
    }

    Ok(())
}
